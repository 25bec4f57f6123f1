// ABOUTME: Tests for the in-process token resolver against the bundled nutrient catalog
// ABOUTME: Uses ingredient names worded the way the vision model reports them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::float_cmp)]
#![allow(missing_docs)]

use fitbites_core::models::DetectedIngredient;
use fitbites_intelligence::{CatalogTokenResolver, NutrientCatalog, NutritionAggregator};
use std::path::Path;
use std::sync::Arc;

fn bundled_catalog() -> Arc<NutrientCatalog> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/food_db.json");
    Arc::new(NutrientCatalog::load(path).expect("Failed to load bundled catalog"))
}

fn top_match(resolver: &CatalogTokenResolver, query: &str) -> Option<String> {
    resolver.rank(query, 1).into_iter().next().map(|m| m.name)
}

#[test]
fn test_vision_style_names_resolve_to_the_right_food() {
    let resolver = CatalogTokenResolver::new(&bundled_catalog());
    let cases = [
        ("Tomato, raw", "Tomatoes, red, ripe, raw, year round average"),
        ("Carrot, fresh, organic, whole", "Carrots, raw"),
        (
            "Carrot, cooked, diced, for soup",
            "Carrots, cooked, boiled, drained, without salt",
        ),
        ("Onion, raw, sliced", "Onions, raw"),
        ("Feta cheese, crumbled", "Cheese, feta"),
        ("Olive oil", "Oil, olive, salad or cooking"),
        ("Red bell pepper, sliced", "Peppers, sweet, red, raw"),
        ("Lettuce, romaine", "Lettuce, cos or romaine, raw"),
        ("Egg, boiled", "Egg, whole, cooked, hard-boiled"),
    ];

    for (query, expected) in cases {
        assert_eq!(
            top_match(&resolver, query).as_deref(),
            Some(expected),
            "query {query:?}"
        );
    }
}

#[test]
fn test_shared_descriptors_alone_never_match() {
    let resolver = CatalogTokenResolver::new(&bundled_catalog());
    for query in ["Mango, raw", "Spaghetti, cooked", "whole", "Raw, sliced, fresh"] {
        assert!(resolver.rank(query, 3).is_empty(), "query {query:?}");
    }
}

#[tokio::test]
async fn test_unknown_food_is_reported_unresolved() {
    let catalog = bundled_catalog();
    let aggregator =
        NutritionAggregator::new(Arc::clone(&catalog), Arc::new(CatalogTokenResolver::new(&catalog)));
    let input = [
        DetectedIngredient::new("Tomato, raw", 100.0),
        DetectedIngredient::new("Mango, raw", 80.0),
    ];

    let meal = aggregator.aggregate(Some(&input)).await.unwrap();

    let tomato = &meal.ingredients["Tomato, raw"];
    assert!(!tomato.unresolved);
    assert_eq!(
        tomato.matched.as_deref(),
        Some("Tomatoes, red, ripe, raw, year round average")
    );
    assert_eq!(tomato.nutrients.get("calories"), Some(18.0));

    let mango = &meal.ingredients["Mango, raw"];
    assert!(mango.unresolved);
    assert!(mango.matched.is_none());
    assert_eq!(meal.total_meal.get("calories"), Some(18.0));
}
