// ABOUTME: Core types and constants for the FitBites nutrition service
// ABOUTME: Foundation crate with error handling, domain models, constants, and collaborator traits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # `FitBites` Core
//!
//! Foundation crate providing shared types for the `FitBites` meal nutrition
//! service. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and domain-specific errors
//! - **constants**: Nutrient keys, energy densities, and service defaults
//! - **models**: Meal and body-metric data models shared across crates
//! - **collaborators**: Narrow async interfaces to the external model services

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (ingredients, nutrient vectors, profiles, macro plans)
pub mod models;

/// Interfaces to external collaborators (resolver, vision extractor, food gate)
pub mod collaborators;
