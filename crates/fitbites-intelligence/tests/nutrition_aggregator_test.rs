// ABOUTME: Integration tests for meal nutrition aggregation with stub ingredient resolvers
// ABOUTME: Covers portion scaling, display names, meal totals, and resolver failure handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::float_cmp)]
#![allow(missing_docs)]

use async_trait::async_trait;
use fitbites_core::collaborators::IngredientResolver;
use fitbites_core::errors::{NutritionError, ProviderError};
use fitbites_core::models::{CatalogMatch, DetectedIngredient, NutrientVector};
use fitbites_intelligence::{CatalogTokenResolver, NutrientCatalog, NutritionAggregator};
use std::sync::Arc;

/// Always answers with the same catalog name
struct FixedResolver(&'static str);

#[async_trait]
impl IngredientResolver for FixedResolver {
    async fn search(&self, _query: &str, k: usize) -> Result<Vec<CatalogMatch>, ProviderError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        Ok(vec![CatalogMatch {
            name: self.0.to_owned(),
            score: 1.0,
        }])
    }
}

/// Fails every lookup as an unreachable index would
struct FailingResolver;

#[async_trait]
impl IngredientResolver for FailingResolver {
    async fn search(&self, _query: &str, _k: usize) -> Result<Vec<CatalogMatch>, ProviderError> {
        Err(ProviderError::http("vector-index", 503, "unavailable"))
    }

    async fn is_ready(&self) -> bool {
        false
    }
}

/// Fails only for queries containing `needle`
struct FlakyResolver {
    needle: &'static str,
    inner: CatalogTokenResolver,
}

#[async_trait]
impl IngredientResolver for FlakyResolver {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<CatalogMatch>, ProviderError> {
        if query.contains(self.needle) {
            return Err(ProviderError::transport("vector-index", "connection reset"));
        }
        Ok(self.inner.rank(query, k))
    }
}

fn single_entry_catalog() -> Arc<NutrientCatalog> {
    Arc::new(
        NutrientCatalog::from_json_str(
            r#"[{"name": "Test food", "nutrients": {"calories": 100, "protein": 10, "carbs": 20, "fats": 5}}]"#,
        )
        .unwrap(),
    )
}

fn sample_catalog() -> Arc<NutrientCatalog> {
    Arc::new(
        NutrientCatalog::from_json_str(
            r#"[
                {"name": "Carrots, raw", "nutrients": {"calories": 41, "protein": 0.93, "carbs": 9.58, "fats": 0.24}},
                {"name": "Rice, white, cooked", "nutrients": {"calories": 130, "protein": 2.69, "carbs": 28.17, "fats": 0.28}},
                {"name": "Cheese, feta", "nutrients": {"calories": 264, "protein": 14.21, "carbs": 4.09, "fats": 21.28}},
                {"name": "Oil, olive, salad or cooking", "nutrients": {"calories": 884, "protein": 0, "carbs": 0, "fats": 100}}
            ]"#,
        )
        .unwrap(),
    )
}

fn token_aggregator(catalog: Arc<NutrientCatalog>) -> NutritionAggregator {
    let resolver = Arc::new(CatalogTokenResolver::new(&catalog));
    NutritionAggregator::new(catalog, resolver)
}

// ============================================================================
// Scaling and naming
// ============================================================================

#[tokio::test]
async fn test_portion_is_scaled_from_per_100g() {
    let aggregator =
        NutritionAggregator::new(single_entry_catalog(), Arc::new(FixedResolver("Test food")));
    let input = [DetectedIngredient::new("Mystery stew", 250.0)];

    let meal = aggregator.aggregate(Some(&input)).await.unwrap();
    let entry = &meal.ingredients["Mystery stew"];

    assert_eq!(entry.nutrients.get("calories"), Some(250.0));
    assert_eq!(entry.nutrients.get("protein"), Some(25.0));
    assert_eq!(entry.nutrients.get("carbs"), Some(50.0));
    assert_eq!(entry.nutrients.get("fats"), Some(12.5));
    assert_eq!(entry.grams, 250.0);
    assert!(!entry.unresolved);
    assert_eq!(entry.matched.as_deref(), Some("Test food"));
    assert_eq!(meal.total_meal, entry.nutrients);
}

#[tokio::test]
async fn test_entries_keyed_by_full_name_with_short_display_name() {
    let aggregator = token_aggregator(sample_catalog());
    let input = [
        DetectedIngredient::new("Carrots, raw, whole", 60.0),
        DetectedIngredient::new("Carrots, raw, diced", 40.0),
    ];

    let meal = aggregator.aggregate(Some(&input)).await.unwrap();

    assert_eq!(meal.ingredient_count(), 2);
    let whole = &meal.ingredients["Carrots, raw, whole"];
    let diced = &meal.ingredients["Carrots, raw, diced"];
    assert_eq!(whole.name, "Carrots, raw");
    assert_eq!(diced.name, "Carrots, raw");
    assert_eq!(whole.nutrients.get("calories"), Some(24.6));
    assert_eq!(diced.nutrients.get("calories"), Some(16.4));
    assert_eq!(meal.total_meal.get("calories"), Some(41.0));
}

// ============================================================================
// Meal totals
// ============================================================================

#[tokio::test]
async fn test_total_is_sum_of_ingredients() {
    let aggregator = token_aggregator(sample_catalog());
    let names = [
        "Carrots, raw, sliced",
        "Rice, white, steamed",
        "Cheese, feta, crumbled",
        "Oil, olive, drizzle",
    ];

    for count in 1..=20_u32 {
        let input: Vec<DetectedIngredient> = (0..count)
            .map(|i| {
                let name = names[i as usize % names.len()];
                DetectedIngredient::new(format!("{name}, portion {i}"), 7.5 + f64::from(i) * 13.3)
            })
            .collect();

        let meal = aggregator.aggregate(Some(&input)).await.unwrap();
        assert_eq!(meal.ingredient_count(), count as usize);

        for (key, total) in &meal.total_meal {
            let sum: f64 = meal
                .ingredients
                .values()
                .filter_map(|entry| entry.nutrients.get(key))
                .sum();
            assert!(
                (total - sum).abs() <= 0.02,
                "count={count} key={key} total={total} sum={sum}"
            );
        }
    }
}

#[tokio::test]
async fn test_total_always_carries_core_keys() {
    let aggregator = NutritionAggregator::new(sample_catalog(), Arc::new(FailingResolver));
    let input = [DetectedIngredient::new("Unknown thing", 80.0)];

    let meal = aggregator.aggregate(Some(&input)).await.unwrap();
    assert_eq!(meal.total_meal, NutrientVector::zero());
}

// ============================================================================
// Misses
// ============================================================================

#[tokio::test]
async fn test_resolver_failure_marks_ingredient_unresolved() {
    let catalog = sample_catalog();
    let resolver = FlakyResolver {
        needle: "Cheese",
        inner: CatalogTokenResolver::new(&catalog),
    };
    let aggregator = NutritionAggregator::new(catalog, Arc::new(resolver));
    let input = [
        DetectedIngredient::new("Rice, white, steamed", 200.0),
        DetectedIngredient::new("Cheese, feta, crumbled", 30.0),
    ];

    let meal = aggregator.aggregate(Some(&input)).await.unwrap();

    let cheese = &meal.ingredients["Cheese, feta, crumbled"];
    assert!(cheese.unresolved);
    assert!(cheese.matched.is_none());
    assert_eq!(cheese.nutrients, NutrientVector::zero());
    assert_eq!(cheese.grams, 30.0);

    let rice = &meal.ingredients["Rice, white, steamed"];
    assert!(!rice.unresolved);
    assert_eq!(meal.unresolved_count(), 1);
    assert_eq!(meal.total_meal.get("calories"), Some(260.0));
}

#[tokio::test]
async fn test_match_missing_from_catalog_is_a_miss() {
    let aggregator =
        NutritionAggregator::new(single_entry_catalog(), Arc::new(FixedResolver("Not in catalog")));
    let input = [DetectedIngredient::new("Toast", 40.0)];

    let meal = aggregator.aggregate(Some(&input)).await.unwrap();
    let toast = &meal.ingredients["Toast"];
    assert!(toast.unresolved);
    assert_eq!(toast.nutrients, NutrientVector::zero());
}

#[tokio::test]
async fn test_only_invalid_entries_is_extraction_failure() {
    let aggregator = token_aggregator(sample_catalog());
    let input = [
        DetectedIngredient::new("   ", 50.0),
        DetectedIngredient::new("Rice", -10.0),
        DetectedIngredient::new("Rice", f64::NAN),
    ];

    assert!(matches!(
        aggregator.aggregate(Some(&input)).await,
        Err(NutritionError::ExtractionFailed)
    ));
}

// ============================================================================
// Readiness and search
// ============================================================================

#[tokio::test]
async fn test_readiness_follows_resolver() {
    assert!(token_aggregator(sample_catalog()).is_ready().await);
    assert!(
        !NutritionAggregator::new(sample_catalog(), Arc::new(FailingResolver))
            .is_ready()
            .await
    );
}

#[tokio::test]
async fn test_similar_ingredients_surfaces_resolver_errors() {
    let aggregator = NutritionAggregator::new(sample_catalog(), Arc::new(FailingResolver));
    let err = aggregator.similar_ingredients("rice", 3).await.unwrap_err();
    assert!(matches!(
        err,
        NutritionError::Collaborator(ProviderError::Http { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_similar_ingredients_are_per_100g() {
    let aggregator = token_aggregator(sample_catalog());
    let results = aggregator.similar_ingredients("raw carrots", 2).await.unwrap();

    assert_eq!(results[0].name, "Carrots, raw");
    assert_eq!(results[0].grams, 100.0);
    assert_eq!(results[0].nutrients.get("calories"), Some(41.0));
    assert!(results.len() <= 2);
}
