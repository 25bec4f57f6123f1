// ABOUTME: HTTP server assembly: router composition, middleware stack, and graceful shutdown
// ABOUTME: Applies CORS, request ids, request tracing, and the upload body limit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # HTTP Server
//!
//! The middleware stack, outermost first:
//!
//! 1. `x-request-id` assignment (kept when the client sends one)
//! 2. request span and latency logging
//! 3. `x-request-id` propagation to the response
//! 4. CORS
//!
//! The body limit is the configured upload size plus room for multipart framing.

use crate::config::ServerConfig;
use crate::resources::ServerResources;
use crate::routes::{HealthRoutes, NutritionRoutes};
use anyhow::{Context, Result};
use axum::{body::Body, extract::DefaultBodyLimit, Router};
use http::{header::HeaderName, HeaderValue, Method, Request};
#[cfg(not(unix))]
use std::future::pending;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, info_span, warn};
use uuid::Uuid;

/// Header carrying the request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Allowance for multipart boundaries and part headers on top of the file size
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Generates `req_<uuid>` request ids
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixedRequestId;

impl MakeRequestId for PrefixedRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&format!("req_{}", Uuid::new_v4().simple()))
            .ok()
            .map(RequestId::new)
    }
}

/// Configure CORS from `CORS_ALLOWED_ORIGINS`
///
/// `*` (or an origin list that fails to parse) allows any origin.
#[must_use]
pub fn setup_cors(config: &ServerConfig) -> CorsLayer {
    let allow_origin = if config.cors_allowed_origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect();

        if origins.is_empty() {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(origins)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
}

/// Compose all routes with the middleware stack
pub fn build_router(resources: &Arc<ServerResources>) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let body_limit = resources
        .config
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            PrefixedRequestId,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");
                info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id
                )
            }),
        )
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(setup_cors(&resources.config));

    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(resources)))
        .merge(NutritionRoutes::routes(Arc::clone(resources)))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware)
}

/// Bind and serve until Ctrl-C or SIGTERM
///
/// Nutrition routes answer `SERVICE_NOT_READY` until the start-up check
/// spawned after binding has finished.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
pub async fn run(resources: Arc<ServerResources>) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", resources.config.host, resources.config.http_port)
        .parse()
        .context("Invalid HOST/HTTP_PORT combination")?;

    let app = build_router(&resources);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    let start_up = Arc::clone(&resources);
    tokio::spawn(async move { start_up.complete_start_up().await });

    info!(%addr, "HTTP server listening");
    info!("   Macro Calculation: POST http://{addr}/calculate");
    info!("   Meal Upload:       POST http://{addr}/upload");
    info!("   Ingredient Search: GET  http://{addr}/ingredients/search?query=<text>&k=<n>");
    info!("   Health:            GET  http://{addr}/health");
    info!("   Readiness:         GET  http://{addr}/ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => warn!(error = %e, "Failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
