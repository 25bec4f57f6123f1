// ABOUTME: Main library entry point for the FitBites nutrition server
// ABOUTME: Wires configuration, logging, shared resources, services, and HTTP routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # `FitBites` Server
//!
//! Estimates the nutritional content of a meal from a photo and computes
//! personalized daily calorie and macronutrient targets from body metrics.
//!
//! ## Architecture
//!
//! - **`fitbites-core`**: errors, models, constants, collaborator traits
//! - **`fitbites-intelligence`**: formula evaluator, knowledge base, nutrient
//!   catalog, metabolic calculator, nutrition aggregator
//! - **`fitbites-providers`**: HTTP clients for the vision model, food
//!   classifier, and vector index, plus timeout/retry/circuit-breaker guards
//! - **this crate**: configuration, logging, resources, services, routes
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fitbites_server::config::environment::ServerConfig;
//! use fitbites_server::resources::ServerResources;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let resources = Arc::new(ServerResources::from_config(config)?);
//!     resources.mark_ready();
//!     fitbites_server::server::run(resources).await
//! }
//! ```

/// Environment-driven configuration
pub mod config;

/// Unified error handling re-exported from `fitbites-core`
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Shared state built once at start-up
pub mod resources;

/// HTTP routes
pub mod routes;

/// Router assembly and server loop
pub mod server;

/// Request-level services
pub mod services;
