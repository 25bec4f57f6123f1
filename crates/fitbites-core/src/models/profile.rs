// ABOUTME: Body metric profile and daily macronutrient plan models
// ABOUTME: Request and response shapes of the macro calculation endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::energy::{KCAL_PER_GRAM_CARBS, KCAL_PER_GRAM_FAT, KCAL_PER_GRAM_PROTEIN};
use crate::errors::NutritionError;
use serde::{Deserialize, Serialize};

/// Body metrics and preferences for one macro calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Body weight in kilograms
    pub weight: f64,
    /// Height in centimeters
    pub height: f64,
    /// Age in years
    pub age: u32,
    /// Key into the knowledge base `bmr_formula` section
    pub gender: String,
    /// Key into the knowledge base `activity_factors` section
    pub activity_level: String,
    /// Key into the knowledge base `goals` section
    pub goal: String,
}

impl UserProfile {
    /// Reject non-positive or non-finite body metrics
    ///
    /// # Errors
    ///
    /// Returns `NutritionError::InvalidInput` naming the first offending field
    pub fn validate_metrics(&self) -> Result<(), NutritionError> {
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(NutritionError::invalid_input(
                "Weight must be a positive number of kilograms",
            ));
        }
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(NutritionError::invalid_input(
                "Height must be a positive number of centimeters",
            ));
        }
        if self.age == 0 {
            return Err(NutritionError::invalid_input(
                "Age must be a positive number of years",
            ));
        }
        Ok(())
    }
}

/// Goal-adjusted daily calorie and macronutrient targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroPlan {
    /// Goal-adjusted TDEE in kcal/day
    pub calories: f64,
    /// Protein in grams/day
    pub protein: f64,
    /// Carbohydrates in grams/day
    pub carbs: f64,
    /// Fats in grams/day
    pub fats: f64,
}

impl MacroPlan {
    /// Energy implied by the macro grams (4/4/9 kcal per gram)
    #[must_use]
    pub fn macro_calories(&self) -> f64 {
        self.fats.mul_add(
            KCAL_PER_GRAM_FAT,
            self.protein
                .mul_add(KCAL_PER_GRAM_PROTEIN, self.carbs * KCAL_PER_GRAM_CARBS),
        )
    }
}
