// ABOUTME: Nutrition route handlers: macro calculation, meal photo upload, and ingredient search
// ABOUTME: Thin transport layer mapping requests onto the metabolic calculator and meal analysis
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Nutrition routes
//!
//! - `POST /calculate` takes body metrics and returns daily macro targets.
//! - `POST /upload` takes a multipart `file` field holding a meal photo.
//! - `GET /ingredients/search` ranks catalog entries similar to a query.

use crate::errors::AppError;
use crate::resources::ServerResources;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, QueryRejection},
        Multipart, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use fitbites_core::constants::limits::DEFAULT_SIMILAR_INGREDIENTS;
use fitbites_core::models::{MacroPlan, MealNutrition, UserProfile};
use fitbites_intelligence::{calculate_macro_plan, SimilarIngredient};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Multipart field carrying the image
const FILE_FIELD: &str = "file";

/// Query string of the ingredient search endpoint
#[derive(Debug, Deserialize)]
pub struct IngredientSearchQuery {
    /// Free-text ingredient description
    pub query: String,
    /// Number of results, defaults to 5
    pub k: Option<usize>,
}

/// Nutrition routes implementation
pub struct NutritionRoutes;

impl NutritionRoutes {
    /// Create all nutrition routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/calculate", post(Self::handle_calculate))
            .route("/upload", post(Self::handle_upload))
            .route("/ingredients/search", get(Self::handle_search))
            .with_state(resources)
    }

    /// Handle macro calculation
    async fn handle_calculate(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<UserProfile>, JsonRejection>,
    ) -> Result<Json<MacroPlan>, AppError> {
        Self::ensure_started(&resources)?;
        let Json(profile) = payload.map_err(|rejection| {
            AppError::invalid_input(format!("Invalid request body: {}", rejection.body_text()))
        })?;

        let plan = calculate_macro_plan(&profile, &resources.knowledge_base)?;
        info!(
            goal = %profile.goal,
            activity_level = %profile.activity_level,
            calories = plan.calories,
            "Calculated macro plan"
        );
        Ok(Json(plan))
    }

    /// Handle meal photo upload
    async fn handle_upload(
        State(resources): State<Arc<ServerResources>>,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Json<MealNutrition>, AppError> {
        Self::ensure_started(&resources)?;
        let upload_id = Uuid::new_v4();
        let limit = resources.config.max_upload_bytes;
        let mut multipart = multipart.map_err(|rejection| {
            AppError::invalid_input(format!(
                "Expected multipart/form-data: {}",
                rejection.body_text()
            ))
        })?;

        let image = Self::read_file_field(&mut multipart, limit).await?;
        info!(%upload_id, bytes = image.len(), "Received meal photo");

        let meal = resources
            .meal_analysis
            .analyze(&image)
            .await
            .inspect_err(|e| warn!(%upload_id, error = %e, "Meal analysis failed"))?;

        info!(
            %upload_id,
            ingredients = meal.ingredient_count(),
            unresolved = meal.unresolved_count(),
            "Meal photo analyzed"
        );
        Ok(Json(meal))
    }

    /// Handle similar-ingredient search
    async fn handle_search(
        State(resources): State<Arc<ServerResources>>,
        query: Result<Query<IngredientSearchQuery>, QueryRejection>,
    ) -> Result<Json<Vec<SimilarIngredient>>, AppError> {
        Self::ensure_started(&resources)?;
        let Query(params) = query.map_err(|rejection| {
            AppError::invalid_input(format!("Invalid query string: {}", rejection.body_text()))
        })?;

        let results = resources
            .aggregator
            .similar_ingredients(&params.query, params.k.unwrap_or(DEFAULT_SIMILAR_INGREDIENTS))
            .await?;
        Ok(Json(results))
    }

    fn ensure_started(resources: &ServerResources) -> Result<(), AppError> {
        if resources.has_started() {
            Ok(())
        } else {
            Err(AppError::not_ready())
        }
    }

    /// Bytes of the `file` field; other fields are skipped
    async fn read_file_field(multipart: &mut Multipart, limit: usize) -> Result<Bytes, AppError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(&e, limit))?
        {
            if field.name() != Some(FILE_FIELD) {
                continue;
            }

            let data = field.bytes().await.map_err(|e| multipart_error(&e, limit))?;
            if data.len() > limit {
                return Err(AppError::payload_too_large(limit));
            }
            return Ok(data);
        }

        Err(AppError::invalid_input(format!(
            "Missing multipart field '{FILE_FIELD}'"
        )))
    }
}

fn multipart_error(error: &MultipartError, limit: usize) -> AppError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large(limit)
    } else {
        AppError::invalid_input(format!("Malformed multipart body: {}", error.body_text()))
    }
}
