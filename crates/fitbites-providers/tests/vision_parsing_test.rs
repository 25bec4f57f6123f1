// ABOUTME: Tests for parsing vision model replies into detected ingredients
// ABOUTME: Fenced, bare array, wrapped object, partial garbage, and unusable replies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use fitbites_providers::vision::parse_ingredient_list;

#[test]
fn test_fenced_array() {
    let reply = "```json\n[\n  {\"name\": \"Carrot, fresh, organic, whole\", \"grams\": 50},\n  {\"name\": \"Tomato, raw, Roma, for salad\", \"grams\": 30}\n]\n```";
    let ingredients = parse_ingredient_list(reply).unwrap();
    assert_eq!(ingredients.len(), 2);
    assert_eq!(ingredients[0].name, "Carrot, fresh, organic, whole");
    assert!((ingredients[1].grams - 30.0).abs() < f64::EPSILON);
}

#[test]
fn test_bare_array_preserves_order() {
    let reply = r#"[{"name": "Rice, white, cooked", "grams": 150}, {"name": "Egg, fried", "grams": 46.5}]"#;
    let names: Vec<_> = parse_ingredient_list(reply)
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(names, vec!["Rice, white, cooked", "Egg, fried"]);
}

#[test]
fn test_wrapped_object() {
    let reply = r#"{"ingredients": [{"name": "Feta cheese, crumbled, for garnish", "grams": "30 g"}]}"#;
    let ingredients = parse_ingredient_list(reply).unwrap();
    assert_eq!(ingredients.len(), 1);
    assert!((ingredients[0].grams - 30.0).abs() < f64::EPSILON);
}

#[test]
fn test_invalid_records_dropped() {
    let reply = r#"[
        {"name": "Carrot, raw", "grams": 40},
        {"name": "", "grams": 10},
        {"name": "Salt", "grams": 0},
        {"name": "Oil", "grams": -5},
        {"grams": 12},
        "cucumber"
    ]"#;
    let ingredients = parse_ingredient_list(reply).unwrap();
    assert_eq!(ingredients.len(), 1);
    assert_eq!(ingredients[0].name, "Carrot, raw");
}

#[test]
fn test_unusable_replies_are_absent() {
    assert!(parse_ingredient_list("I could not see any food in this picture.").is_none());
    assert!(parse_ingredient_list("[]").is_none());
    assert!(parse_ingredient_list(r#"{"items": []}"#).is_none());
    assert!(parse_ingredient_list("42").is_none());
    assert!(parse_ingredient_list(r#"[{"name": "Water", "grams": 0}]"#).is_none());
}
