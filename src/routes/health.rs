// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Liveness always answers; readiness reports 503 until static data and resolver are loaded
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Health check routes for load balancers and orchestrators

use crate::resources::ServerResources;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use fitbites_core::constants::service_names;
use serde_json::{json, Value};
use std::sync::Arc;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create `/health` and `/ready`
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .route("/ready", get(Self::handle_ready))
            .with_state(resources)
    }

    async fn handle_health(State(resources): State<Arc<ServerResources>>) -> Json<Value> {
        Json(json!({
            "status": "healthy",
            "service": service_names::FITBITES_SERVER,
            "version": env!("CARGO_PKG_VERSION"),
            "uptime_secs": resources.uptime_secs(),
            "timestamp": Utc::now().to_rfc3339()
        }))
    }

    async fn handle_ready(
        State(resources): State<Arc<ServerResources>>,
    ) -> (StatusCode, Json<Value>) {
        let ready = resources.is_ready().await;
        let status = if ready {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };

        (
            status,
            Json(json!({
                "status": if ready { "ready" } else { "not_ready" },
                "knowledge_base": {
                    "goals": resources.knowledge_base.goal_names(),
                    "activity_levels": resources.knowledge_base.activity_levels()
                },
                "catalog_entries": resources.aggregator.catalog().len(),
                "timestamp": Utc::now().to_rfc3339()
            })),
        )
    }
}
