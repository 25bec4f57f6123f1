// ABOUTME: Nutrition intelligence crate: metabolic targets and photo-meal nutrition aggregation
// ABOUTME: Knowledge base, nutrient catalog, safe formula evaluation, and ingredient resolution
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # `FitBites` Intelligence
//!
//! Domain logic behind the `FitBites` server:
//!
//! - [`metabolic_calculator`]: BMR, TDEE, and daily macro targets driven by the
//!   [`knowledge_base`]
//! - [`nutrition_aggregator`]: per-ingredient and meal totals from detected
//!   ingredients, resolved against the [`nutrient_catalog`]
//! - [`formula`]: arithmetic-only evaluator for knowledge-base BMR formulas
//! - [`token_resolver`]: in-process ingredient resolver

/// Safe arithmetic formula parser and evaluator
pub mod formula;
/// Knowledge base of BMR formulas, activity factors, and goal rules
pub mod knowledge_base;
/// BMR, TDEE, and macronutrient calculations
pub mod metabolic_calculator;
/// Canonical ingredient nutrient catalog
pub mod nutrient_catalog;
/// Meal nutrition aggregation
pub mod nutrition_aggregator;
/// Token-overlap ingredient resolver
pub mod token_resolver;

pub use formula::{Formula, FormulaError, FormulaInputs};
pub use knowledge_base::{GoalRules, KnowledgeBase, KnowledgeBaseError};
pub use metabolic_calculator::{
    calculate_bmr, calculate_macro_plan, calculate_macros, calculate_tdee,
};
pub use nutrient_catalog::{CatalogError, NutrientCatalog};
pub use nutrition_aggregator::{NutritionAggregator, SimilarIngredient};
pub use token_resolver::CatalogTokenResolver;
