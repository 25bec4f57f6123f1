// ABOUTME: Narrow async interfaces to the external model services used by meal analysis
// ABOUTME: Ingredient resolver (vector search), vision extractor (multimodal LLM), food gate (classifier)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Collaborator Interfaces
//!
//! The similarity search, the image-to-ingredient extraction, and the food
//! classifier are vendored ML capabilities. The core only depends on these
//! traits; concrete HTTP clients live in `fitbites-providers` and are injected
//! at start-up.
//!
//! None of the traits promise latency or retry behavior. Wrap implementations
//! with a guard (timeout, retry, circuit breaker) at the wiring layer.

use crate::errors::ProviderError;
use crate::models::{CatalogMatch, DetectedIngredient};
use async_trait::async_trait;

/// Maps free-text ingredient names to canonical nutrient catalog entries
#[async_trait]
pub trait IngredientResolver: Send + Sync {
    /// Return up to `k` catalog matches ranked by similarity, best first
    async fn search(&self, query: &str, k: usize) -> Result<Vec<CatalogMatch>, ProviderError>;

    /// Whether the backing index is loaded and can serve queries
    async fn is_ready(&self) -> bool {
        true
    }
}

/// Maps a meal photo to a list of detected ingredients with estimated weights
#[async_trait]
pub trait VisionExtractor: Send + Sync {
    /// Detected ingredients, or `None` when the model output was empty or unparseable
    async fn extract(&self, image: &[u8]) -> Result<Option<Vec<DetectedIngredient>>, ProviderError>;
}

/// Binary admission filter: does the photo show food at all?
#[async_trait]
pub trait FoodGate: Send + Sync {
    /// `true` when the image looks like food
    async fn is_food(&self, image: &[u8]) -> Result<bool, ProviderError>;
}
