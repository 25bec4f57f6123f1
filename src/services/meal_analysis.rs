// ABOUTME: Meal photo analysis: food gate, vision extraction, and nutrition aggregation
// ABOUTME: Orchestrates the collaborators for one uploaded image
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Meal Analysis
//!
//! One upload flows through three steps, each a single collaborator call:
//!
//! 1. the food gate rejects photos that do not show food,
//! 2. the vision extractor lists ingredients with estimated grams,
//! 3. the aggregator resolves, scales, and sums them.
//!
//! Nothing is cached between requests.

use fitbites_core::collaborators::{FoodGate, VisionExtractor};
use fitbites_core::errors::NutritionError;
use fitbites_core::models::MealNutrition;
use fitbites_intelligence::NutritionAggregator;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Turns a meal photo into a nutrition summary
#[derive(Clone)]
pub struct MealAnalysisService {
    food_gate: Arc<dyn FoodGate>,
    vision: Arc<dyn VisionExtractor>,
    aggregator: NutritionAggregator,
}

impl MealAnalysisService {
    /// Build the service from its collaborators
    #[must_use]
    pub fn new(
        food_gate: Arc<dyn FoodGate>,
        vision: Arc<dyn VisionExtractor>,
        aggregator: NutritionAggregator,
    ) -> Self {
        Self {
            food_gate,
            vision,
            aggregator,
        }
    }

    /// Aggregator used for the final step
    #[must_use]
    pub const fn aggregator(&self) -> &NutritionAggregator {
        &self.aggregator
    }

    /// Analyze one image
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty upload
    /// - `NotFoodImage` when the food gate rejects the photo
    /// - `ExtractionFailed` when no ingredients could be extracted
    /// - `Collaborator` when the gate or the vision model fails
    pub async fn analyze(&self, image: &[u8]) -> Result<MealNutrition, NutritionError> {
        if image.is_empty() {
            return Err(NutritionError::invalid_input("Uploaded file is empty"));
        }

        if !self.food_gate.is_food(image).await? {
            info!(bytes = image.len(), "Food gate rejected upload");
            return Err(NutritionError::NotFoodImage);
        }

        let detected = self.vision.extract(image).await?;
        match &detected {
            Some(ingredients) => {
                debug!(count = ingredients.len(), "Vision model detected ingredients");
            }
            None => warn!("Vision model returned no usable ingredient list"),
        }

        let meal = self.aggregator.aggregate(detected.as_deref()).await?;
        info!(
            ingredients = meal.ingredient_count(),
            unresolved = meal.unresolved_count(),
            "Meal analyzed"
        );
        Ok(meal)
    }
}
