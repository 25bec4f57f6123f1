// ABOUTME: Core data models shared by the calculator, aggregator, and HTTP layer
// ABOUTME: Re-exports meal nutrition and body-metric profile types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Meal analysis models (detected ingredients, nutrient vectors, meal summaries)
pub mod nutrition;
/// Body metrics and daily macro targets
pub mod profile;

pub use nutrition::{
    display_name, round_2dp, CatalogMatch, DetectedIngredient, IngredientNutrition,
    MealNutrition, NutrientVector,
};
pub use profile::{MacroPlan, UserProfile};
