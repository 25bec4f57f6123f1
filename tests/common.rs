// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, stub collaborators, and resource construction from the bundled data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `fitbites_server`

use async_trait::async_trait;
use fitbites_core::collaborators::{FoodGate, IngredientResolver, VisionExtractor};
use fitbites_core::errors::ProviderError;
use fitbites_core::models::{CatalogMatch, DetectedIngredient};
use fitbites_intelligence::{CatalogTokenResolver, KnowledgeBase, NutrientCatalog};
use fitbites_server::config::ServerConfig;
use fitbites_server::resources::ServerResources;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        // Another test binary harness may already have installed one
        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Bundled knowledge base document
pub fn knowledge_base_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data/nutrition_db.json")
}

/// Bundled nutrient catalog document
pub fn catalog_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data/food_db.json")
}

/// Vision extractor returning a canned result
pub struct StubVision(pub Option<Vec<DetectedIngredient>>);

impl StubVision {
    /// A salad the bundled catalog can resolve
    pub fn salad() -> Self {
        Self(Some(vec![
            DetectedIngredient::new("Carrots, raw, sliced", 100.0),
            DetectedIngredient::new("Rice, white, steamed", 150.0),
        ]))
    }
}

#[async_trait]
impl VisionExtractor for StubVision {
    async fn extract(
        &self,
        _image: &[u8],
    ) -> Result<Option<Vec<DetectedIngredient>>, ProviderError> {
        Ok(self.0.clone())
    }
}

/// Vision extractor whose upstream answers 503
pub struct FailingVision;

#[async_trait]
impl VisionExtractor for FailingVision {
    async fn extract(
        &self,
        _image: &[u8],
    ) -> Result<Option<Vec<DetectedIngredient>>, ProviderError> {
        Err(ProviderError::http("vision", 503, "upstream overloaded"))
    }
}

/// Food gate with a fixed verdict
pub struct StubFoodGate(pub bool);

#[async_trait]
impl FoodGate for StubFoodGate {
    async fn is_food(&self, _image: &[u8]) -> Result<bool, ProviderError> {
        Ok(self.0)
    }
}

/// Resolver whose index is unreachable
pub struct UnreachableResolver;

#[async_trait]
impl IngredientResolver for UnreachableResolver {
    async fn search(&self, _query: &str, _k: usize) -> Result<Vec<CatalogMatch>, ProviderError> {
        Err(ProviderError::transport("ingredient-resolver", "connection refused"))
    }

    async fn is_ready(&self) -> bool {
        false
    }
}

/// Resources over the bundled data with injected collaborators, not yet ready
pub fn create_unready_resources(
    config: ServerConfig,
    vision: Arc<dyn VisionExtractor>,
    food_gate: Arc<dyn FoodGate>,
) -> Arc<ServerResources> {
    create_resources_with_resolver(config, None, vision, food_gate)
}

/// Like [`create_unready_resources`] with an optional replacement resolver
pub fn create_resources_with_resolver(
    config: ServerConfig,
    resolver: Option<Arc<dyn IngredientResolver>>,
    vision: Arc<dyn VisionExtractor>,
    food_gate: Arc<dyn FoodGate>,
) -> Arc<ServerResources> {
    init_test_logging();
    let knowledge_base =
        Arc::new(KnowledgeBase::load(knowledge_base_path()).expect("Failed to load knowledge base"));
    let catalog =
        Arc::new(NutrientCatalog::load(catalog_path()).expect("Failed to load nutrient catalog"));
    let resolver =
        resolver.unwrap_or_else(|| Arc::new(CatalogTokenResolver::new(&catalog)));

    Arc::new(ServerResources::new(
        Arc::new(config),
        knowledge_base,
        catalog,
        resolver,
        vision,
        food_gate,
    ))
}

/// Ready resources with default configuration
pub fn create_test_resources(
    vision: Arc<dyn VisionExtractor>,
    food_gate: Arc<dyn FoodGate>,
) -> Arc<ServerResources> {
    let resources = create_unready_resources(ServerConfig::default(), vision, food_gate);
    resources.mark_ready();
    resources
}
