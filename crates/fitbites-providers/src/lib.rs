// ABOUTME: External model service clients for the FitBites nutrition service
// ABOUTME: Vision extractor, food gate, vector index resolver, and the call guard wrapping them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # `FitBites` Providers
//!
//! Concrete implementations of the collaborator traits defined in
//! `fitbites_core::collaborators`. Each talks to one HTTP service. None of
//! them retries on its own; wrap them with [`guard::Guarded`] at start-up.

/// Circuit breaker for collaborator calls
pub mod circuit_breaker;
/// Food gate implementations
pub mod food_gate;
/// Timeout, retry, and breaker wrapper
pub mod guard;
/// Shared HTTP client and JSON helper
pub mod http_client;
/// Vector index ingredient resolver
pub mod vector_index;
/// OpenAI-compatible vision extractor
pub mod vision;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use food_gate::{AcceptAllFoodGate, HttpFoodGate};
pub use guard::{CollaboratorGuard, GuardConfig, Guarded};
pub use vector_index::HttpVectorIndexResolver;
pub use vision::{parse_ingredient_list, OpenAiVisionExtractor, VisionConfig};
