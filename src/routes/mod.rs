// ABOUTME: Route module organization for the FitBites HTTP endpoints
// ABOUTME: Health probes and nutrition endpoints, each a Router over shared ServerResources
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! HTTP routes
//!
//! Each domain module contains only route definitions and thin handlers
//! that delegate to the intelligence crate and the service layer.

/// Health check and readiness routes
pub mod health;
/// Macro calculation, meal upload, and ingredient search routes
pub mod nutrition;

pub use health::HealthRoutes;
pub use nutrition::NutritionRoutes;
