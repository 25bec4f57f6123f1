// ABOUTME: Meal nutrition aggregation from detected ingredients via resolver and nutrient catalog
// ABOUTME: Scales per-100g vectors to detected grams and accumulates a rounded meal total
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Nutrition Aggregator
//!
//! For each detected ingredient, in order:
//!
//! 1. Resolve the name to the top-1 catalog entry
//! 2. Scale that entry's per-100g nutrients by `grams / 100`
//! 3. Record it under the full detected name with a short display name
//! 4. Add it into the meal total, re-rounding after each addition
//!
//! A miss (no match, a match missing from the catalog, a match below the
//! configured minimum score, or a resolver failure) contributes the zero
//! vector and is flagged `unresolved`.

use crate::nutrient_catalog::NutrientCatalog;
use fitbites_core::collaborators::IngredientResolver;
use fitbites_core::constants::energy::REFERENCE_PORTION_GRAMS;
use fitbites_core::constants::limits::MAX_SIMILAR_INGREDIENTS;
use fitbites_core::errors::NutritionError;
use fitbites_core::models::{
    display_name, DetectedIngredient, IngredientNutrition, MealNutrition, NutrientVector,
};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One catalog entry returned by the similar-ingredient search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarIngredient {
    /// Nutrients per 100 g
    #[serde(flatten)]
    pub nutrients: NutrientVector,
    /// Canonical catalog name
    pub name: String,
    /// Always the reference portion (100 g)
    pub grams: f64,
    /// Resolver similarity score
    pub score: f32,
}

struct Resolution {
    per_100g: NutrientVector,
    matched: Option<String>,
}

impl Resolution {
    fn miss() -> Self {
        Self {
            per_100g: NutrientVector::zero(),
            matched: None,
        }
    }
}

/// Converts detected ingredients into a meal nutrition summary
#[derive(Clone)]
pub struct NutritionAggregator {
    catalog: Arc<NutrientCatalog>,
    resolver: Arc<dyn IngredientResolver>,
    min_match_score: Option<f32>,
}

impl NutritionAggregator {
    /// Create an aggregator accepting the resolver's top match regardless of score
    #[must_use]
    pub fn new(catalog: Arc<NutrientCatalog>, resolver: Arc<dyn IngredientResolver>) -> Self {
        Self {
            catalog,
            resolver,
            min_match_score: None,
        }
    }

    /// Treat matches scoring below `min_score` as misses
    #[must_use]
    pub const fn with_min_match_score(mut self, min_score: Option<f32>) -> Self {
        self.min_match_score = min_score;
        self
    }

    /// Catalog backing the aggregator
    #[must_use]
    pub fn catalog(&self) -> &NutrientCatalog {
        &self.catalog
    }

    /// Catalog has entries and the resolver can serve queries
    pub async fn is_ready(&self) -> bool {
        !self.catalog.is_empty() && self.resolver.is_ready().await
    }

    /// Aggregate nutrition for a meal
    ///
    /// Entries with a blank name or non-positive grams are skipped. Identical
    /// full names are merged into one entry.
    ///
    /// # Errors
    ///
    /// Returns `NutritionError::ExtractionFailed` when `ingredients` is absent
    /// or holds no valid entries
    pub async fn aggregate(
        &self,
        ingredients: Option<&[DetectedIngredient]>,
    ) -> Result<MealNutrition, NutritionError> {
        let ingredients = ingredients.unwrap_or_default();
        let mut meal = MealNutrition {
            ingredients: Default::default(),
            total_meal: NutrientVector::zero(),
        };

        for ingredient in ingredients {
            if !ingredient.is_valid() {
                warn!(name = %ingredient.name, grams = ingredient.grams, "Skipping invalid ingredient");
                continue;
            }

            let resolution = self.resolve(&ingredient.name).await;
            let scaled = resolution
                .per_100g
                .scaled(ingredient.grams / REFERENCE_PORTION_GRAMS);
            let unresolved = resolution.matched.is_none();

            meal.total_meal.accumulate(&scaled);

            match meal.ingredients.entry(ingredient.name.clone()) {
                Entry::Occupied(mut existing) => {
                    let existing = existing.get_mut();
                    existing.grams += ingredient.grams;
                    existing.nutrients.accumulate(&scaled);
                    existing.unresolved &= unresolved;
                    if existing.matched.is_none() {
                        existing.matched = resolution.matched;
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(IngredientNutrition {
                        nutrients: scaled,
                        grams: ingredient.grams,
                        name: display_name(&ingredient.name),
                        unresolved,
                        matched: resolution.matched,
                    });
                }
            }
        }

        if meal.ingredients.is_empty() {
            return Err(NutritionError::ExtractionFailed);
        }

        info!(
            ingredients = meal.ingredient_count(),
            unresolved = meal.unresolved_count(),
            calories = meal.total_meal.get("calories").unwrap_or_default(),
            "Aggregated meal nutrition"
        );
        Ok(meal)
    }

    async fn resolve(&self, name: &str) -> Resolution {
        let top = match self.resolver.search(name, 1).await {
            Ok(matches) => matches.into_iter().next(),
            Err(e) => {
                warn!(ingredient = %name, error = %e, "Ingredient resolver failed; treating as miss");
                return Resolution::miss();
            }
        };

        let Some(top) = top else {
            debug!(ingredient = %name, "No catalog match");
            return Resolution::miss();
        };

        if let Some(min) = self.min_match_score {
            if top.score < min {
                debug!(ingredient = %name, candidate = %top.name, score = top.score, min, "Match below minimum score");
                return Resolution::miss();
            }
        }

        match self.catalog.lookup(&top.name) {
            Some(per_100g) => {
                debug!(ingredient = %name, matched = %top.name, score = top.score, "Resolved ingredient");
                Resolution {
                    per_100g: per_100g.clone(),
                    matched: Some(top.name),
                }
            }
            None => {
                warn!(ingredient = %name, candidate = %top.name, "Resolver returned a name missing from the catalog");
                Resolution::miss()
            }
        }
    }

    /// Up to `k` catalog entries most similar to `query`, per 100 g
    ///
    /// # Errors
    ///
    /// Returns `NutritionError::InvalidInput` for a blank query or `k` outside
    /// `1..=50`, and `NutritionError::Collaborator` when the resolver fails
    pub async fn similar_ingredients(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<SimilarIngredient>, NutritionError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(NutritionError::invalid_input("Query must not be empty"));
        }
        if !(1..=MAX_SIMILAR_INGREDIENTS).contains(&k) {
            return Err(NutritionError::invalid_input(format!(
                "k must be between 1 and {MAX_SIMILAR_INGREDIENTS}"
            )));
        }

        let matches = self.resolver.search(query, k).await.map_err(|e| {
            warn!(query, error = %e, "Similar-ingredient search failed");
            NutritionError::Collaborator(e)
        })?;

        Ok(matches
            .into_iter()
            .filter_map(|candidate| {
                self.catalog
                    .lookup(&candidate.name)
                    .map(|nutrients| SimilarIngredient {
                        nutrients: nutrients.clone(),
                        name: candidate.name,
                        grams: REFERENCE_PORTION_GRAMS,
                        score: candidate.score,
                    })
            })
            .take(k)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_resolver::CatalogTokenResolver;

    fn aggregator() -> NutritionAggregator {
        let catalog = Arc::new(
            NutrientCatalog::from_json_str(
                r#"[{"name": "Rice, white, cooked", "nutrients": {"calories": 130, "protein": 2.7, "carbs": 28.2, "fats": 0.3}}]"#,
            )
            .unwrap(),
        );
        let resolver = Arc::new(CatalogTokenResolver::new(&catalog));
        NutritionAggregator::new(catalog, resolver)
    }

    #[tokio::test]
    async fn test_absent_or_empty_input_fails() {
        let agg = aggregator();
        assert!(matches!(
            agg.aggregate(None).await,
            Err(NutritionError::ExtractionFailed)
        ));
        assert!(matches!(
            agg.aggregate(Some(&[])).await,
            Err(NutritionError::ExtractionFailed)
        ));
        let invalid = [DetectedIngredient::new("Rice", 0.0)];
        assert!(matches!(
            agg.aggregate(Some(&invalid)).await,
            Err(NutritionError::ExtractionFailed)
        ));
    }

    #[tokio::test]
    async fn test_identical_names_merge() {
        let agg = aggregator();
        let input = [
            DetectedIngredient::new("Rice, white, steamed", 100.0),
            DetectedIngredient::new("Rice, white, steamed", 50.0),
        ];
        let meal = agg.aggregate(Some(&input)).await.unwrap();
        assert_eq!(meal.ingredient_count(), 1);
        let rice = &meal.ingredients["Rice, white, steamed"];
        assert!((rice.grams - 150.0).abs() < 1e-9);
        assert_eq!(rice.nutrients.get("calories"), Some(195.0));
        assert_eq!(meal.total_meal.get("calories"), Some(195.0));
        assert_eq!(rice.matched.as_deref(), Some("Rice, white, cooked"));
    }

    #[tokio::test]
    async fn test_min_score_turns_weak_match_into_miss() {
        let agg = aggregator().with_min_match_score(Some(0.9));
        let input = [DetectedIngredient::new("Rice pudding", 100.0)];
        let meal = agg.aggregate(Some(&input)).await.unwrap();
        let entry = &meal.ingredients["Rice pudding"];
        assert!(entry.unresolved);
        assert_eq!(entry.nutrients, NutrientVector::zero());
    }

    #[tokio::test]
    async fn test_similar_ingredients_validates_arguments() {
        let agg = aggregator();
        assert!(matches!(
            agg.similar_ingredients("  ", 5).await,
            Err(NutritionError::InvalidInput(_))
        ));
        assert!(matches!(
            agg.similar_ingredients("rice", 0).await,
            Err(NutritionError::InvalidInput(_))
        ));
        assert!(matches!(
            agg.similar_ingredients("rice", 51).await,
            Err(NutritionError::InvalidInput(_))
        ));
        let results = agg.similar_ingredients("rice", 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].grams - 100.0).abs() < f64::EPSILON);
    }
}
