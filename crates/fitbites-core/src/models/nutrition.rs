// ABOUTME: Meal nutrition models for photo-based food intake analysis
// ABOUTME: DetectedIngredient, NutrientVector, IngredientNutrition, and MealNutrition definitions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::{limits::DISPLAY_NAME_SEGMENTS, nutrients};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

/// Round to two decimal places
#[must_use]
pub fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Short display name: the first two comma-separated segments of `name`
///
/// `"Carrot, fresh, organic, whole"` becomes `"Carrot, fresh"`.
#[must_use]
pub fn display_name(name: &str) -> String {
    name.split(',')
        .take(DISPLAY_NAME_SEGMENTS)
        .collect::<Vec<_>>()
        .join(",")
}

/// Ingredient detected in a meal photo by the vision extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedIngredient {
    /// Descriptive name (e.g. "Tomato, raw, Roma, for salad")
    pub name: String,
    /// Estimated mass in grams
    pub grams: f64,
}

impl DetectedIngredient {
    /// Create a detected ingredient
    #[must_use]
    pub fn new(name: impl Into<String>, grams: f64) -> Self {
        Self {
            name: name.into(),
            grams,
        }
    }

    /// Name is non-blank and grams is a finite positive number
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && self.grams.is_finite() && self.grams > 0.0
    }
}

/// Candidate catalog entry returned by the ingredient resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogMatch {
    /// Canonical catalog name used to look up the nutrient vector
    pub name: String,
    /// Similarity score, higher is closer
    #[serde(default)]
    pub score: f32,
}

/// Nutrient amounts keyed by nutrient name (`calories`, `protein`, `carbs`, `fats`, ...)
///
/// Keys iterate in sorted order so serialized output is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NutrientVector(BTreeMap<String, f64>);

impl NutrientVector {
    /// Empty vector
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// `{calories: 0, protein: 0, carbs: 0, fats: 0}`
    #[must_use]
    pub fn zero() -> Self {
        nutrients::CORE_KEYS
            .iter()
            .map(|key| ((*key).to_owned(), 0.0))
            .collect()
    }

    /// Amount for `key`, if present
    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    /// Set the amount for `key`
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    /// Every value multiplied by `factor` and rounded to two decimals
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        self.0
            .iter()
            .map(|(key, value)| (key.clone(), round_2dp(value * factor)))
            .collect()
    }

    /// Add `other` into `self`, re-rounding each touched key to two decimals
    pub fn accumulate(&mut self, other: &Self) {
        for (key, value) in &other.0 {
            let entry = self.0.entry(key.clone()).or_insert(0.0);
            *entry = round_2dp(*entry + value);
        }
    }

    /// Iterate `(key, amount)` pairs
    pub fn iter(&self) -> btree_map::Iter<'_, String, f64> {
        self.0.iter()
    }

    /// Nutrient keys present
    pub fn keys(&self) -> btree_map::Keys<'_, String, f64> {
        self.0.keys()
    }

    /// Number of nutrients present
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector holds no nutrients
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for NutrientVector {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a NutrientVector {
    type Item = (&'a String, &'a f64);
    type IntoIter = btree_map::Iter<'a, String, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Scaled nutrition for one detected ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientNutrition {
    /// Nutrients scaled to the detected weight
    #[serde(flatten)]
    pub nutrients: NutrientVector,
    /// Detected weight in grams
    pub grams: f64,
    /// Short display name
    pub name: String,
    /// No catalog entry was found; nutrients are the zero vector
    #[serde(default)]
    pub unresolved: bool,
    /// Canonical catalog entry the ingredient resolved to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,
}

/// Nutrition summary for a whole meal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealNutrition {
    /// Per-ingredient nutrition keyed by the detected ingredient name
    pub ingredients: BTreeMap<String, IngredientNutrition>,
    /// Sum across all ingredients
    pub total_meal: NutrientVector,
}

impl MealNutrition {
    /// Number of distinct ingredient entries
    #[must_use]
    pub fn ingredient_count(&self) -> usize {
        self.ingredients.len()
    }

    /// Number of entries without catalog data
    #[must_use]
    pub fn unresolved_count(&self) -> usize {
        self.ingredients.values().filter(|i| i.unresolved).count()
    }
}
