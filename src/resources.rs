// ABOUTME: Centralized resource container for dependency injection into the HTTP layer
// ABOUTME: Holds the knowledge base, nutrient catalog, guarded collaborators, and readiness state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server Resources
//!
//! Everything a request needs is built once at start-up and shared behind an
//! `Arc`. Static documents are immutable after loading. The readiness flag is
//! flipped once the listener is bound and collaborators have been checked.

use crate::config::ServerConfig;
use crate::services::MealAnalysisService;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fitbites_core::collaborators::{FoodGate, IngredientResolver, VisionExtractor};
use fitbites_core::constants::collaborators::{FOOD_GATE, INGREDIENT_RESOLVER, VISION_EXTRACTOR};
use fitbites_intelligence::{
    CatalogTokenResolver, KnowledgeBase, NutrientCatalog, NutritionAggregator,
};
use fitbites_providers::http_client::initialize_shared_client;
use fitbites_providers::{
    AcceptAllFoodGate, GuardConfig, Guarded, HttpFoodGate, HttpVectorIndexResolver,
    OpenAiVisionExtractor, VisionConfig,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// TCP connect timeout for collaborator calls
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Shared state injected into every route
pub struct ServerResources {
    /// Configuration the server was started with
    pub config: Arc<ServerConfig>,
    /// BMR formulas, activity factors, and goal rules
    pub knowledge_base: Arc<KnowledgeBase>,
    /// Resolves and sums detected ingredients
    pub aggregator: NutritionAggregator,
    /// Gate, extract, aggregate pipeline for uploads
    pub meal_analysis: MealAnalysisService,
    ready: AtomicBool,
    started_at: DateTime<Utc>,
}

impl ServerResources {
    /// Assemble resources from already-built parts
    ///
    /// The instance starts not ready; call [`ServerResources::mark_ready`].
    #[must_use]
    pub fn new(
        config: Arc<ServerConfig>,
        knowledge_base: Arc<KnowledgeBase>,
        catalog: Arc<NutrientCatalog>,
        resolver: Arc<dyn IngredientResolver>,
        vision: Arc<dyn VisionExtractor>,
        food_gate: Arc<dyn FoodGate>,
    ) -> Self {
        let aggregator = NutritionAggregator::new(catalog, resolver)
            .with_min_match_score(config.resolver.min_score);
        let meal_analysis = MealAnalysisService::new(food_gate, vision, aggregator.clone());

        Self {
            config,
            knowledge_base,
            aggregator,
            meal_analysis,
            ready: AtomicBool::new(false),
            started_at: Utc::now(),
        }
    }

    /// Load the static documents and wire the configured collaborators
    ///
    /// Remote collaborators are wrapped in a [`Guarded`] adapter with the
    /// configured timeout and retry budget. Without a vector index URL the
    /// in-process token resolver is used.
    ///
    /// # Errors
    ///
    /// Returns an error if the knowledge base or catalog cannot be loaded
    pub fn from_config(config: ServerConfig) -> Result<Self> {
        let knowledge_base = KnowledgeBase::load(&config.data.knowledge_base_path)
            .context("Failed to load knowledge base")?;
        let catalog = NutrientCatalog::load(&config.data.catalog_path)
            .context("Failed to load nutrient catalog")?;
        info!(
            genders = knowledge_base.genders().len(),
            activity_levels = knowledge_base.activity_levels().len(),
            goals = knowledge_base.goal_names().len(),
            catalog_entries = catalog.len(),
            "Static nutrition data loaded"
        );

        initialize_shared_client(
            config.collaborators.timeout_secs.saturating_mul(2),
            CONNECT_TIMEOUT_SECS,
        );
        let guard_config = GuardConfig {
            timeout: config.collaborators.timeout(),
            max_retries: config.collaborators.max_retries,
            ..GuardConfig::default()
        };

        let resolver: Arc<dyn IngredientResolver> = match &config.resolver.vector_index_url {
            Some(url) => {
                info!(url = %url, "Using remote vector index resolver");
                let remote: Arc<dyn IngredientResolver> =
                    Arc::new(HttpVectorIndexResolver::new(url.clone()));
                Arc::new(Guarded::new(remote, INGREDIENT_RESOLVER, guard_config.clone()))
            }
            None => {
                info!("Using in-process token resolver");
                Arc::new(CatalogTokenResolver::new(&catalog))
            }
        };

        let extractor: Arc<dyn VisionExtractor> =
            Arc::new(OpenAiVisionExtractor::new(VisionConfig {
                base_url: config.vision.base_url.clone(),
                api_key: config.vision.api_key.clone(),
                model: config.vision.model.clone(),
            }));
        let vision: Arc<dyn VisionExtractor> = Arc::new(Guarded::new(
            extractor,
            VISION_EXTRACTOR,
            guard_config.clone(),
        ));

        let food_gate: Arc<dyn FoodGate> = match (config.food_gate.enabled, &config.food_gate.url) {
            (true, Some(url)) => {
                info!(url = %url, "Food gate enabled");
                let gate: Arc<dyn FoodGate> = Arc::new(HttpFoodGate::new(
                    url.clone(),
                    config.food_gate.api_key.clone(),
                ));
                Arc::new(Guarded::new(gate, FOOD_GATE, guard_config))
            }
            _ => Arc::new(AcceptAllFoodGate),
        };

        Ok(Self::new(
            Arc::new(config),
            Arc::new(knowledge_base),
            Arc::new(catalog),
            resolver,
            vision,
            food_gate,
        ))
    }

    /// Flag the server as able to serve traffic
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
        info!("Server resources ready");
    }

    /// Check collaborators, then mark the server ready
    ///
    /// A resolver that is down at start-up is logged but does not hold back
    /// start-up; `/ready` keeps reporting it until it recovers.
    pub async fn complete_start_up(&self) {
        if self.aggregator.is_ready().await {
            info!("Ingredient resolver reachable");
        } else {
            warn!("Ingredient resolver not ready at start-up");
        }
        self.mark_ready();
    }

    /// Whether [`ServerResources::mark_ready`] has been called
    #[must_use]
    pub fn has_started(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Whether loading has finished and the resolver can serve queries
    pub async fn is_ready(&self) -> bool {
        self.has_started() && self.aggregator.is_ready().await
    }

    /// Start-up time
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Seconds since start-up
    #[must_use]
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
