// ABOUTME: Knowledge-base driven BMR, TDEE, and macronutrient target calculations
// ABOUTME: Pure functions; the knowledge base supplies formulas, multipliers, and goal rules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Metabolic Calculator
//!
//! Computes daily calorie and macronutrient targets from body metrics:
//!
//! 1. BMR from the gender's knowledge-base formula over `weight`, `height`, `age`
//! 2. TDEE = BMR x activity multiplier
//! 3. Goal TDEE = TDEE + goal adjustment
//! 4. Protein = weight x goal protein factor (4 kcal/g)
//! 5. Remaining calories split between carbs (4 kcal/g) and fats (9 kcal/g)
//!    by the goal's relative percentages
//!
//! All results are rounded to two decimals. A goal whose protein calories
//! exceed the goal TDEE yields negative carbs and fats; nothing is clamped.

use crate::formula::FormulaInputs;
use crate::knowledge_base::{GoalRules, KnowledgeBase};
use fitbites_core::constants::energy::{
    KCAL_PER_GRAM_CARBS, KCAL_PER_GRAM_FAT, KCAL_PER_GRAM_PROTEIN,
};
use fitbites_core::errors::NutritionError;
use fitbites_core::models::{round_2dp, MacroPlan, UserProfile};
use tracing::debug;

/// Basal Metabolic Rate in kcal/day using the gender's knowledge-base formula
///
/// # Errors
///
/// Returns `NutritionError::UnsupportedGender` when the knowledge base has no
/// formula for `gender`, or `NutritionError::Formula` if evaluation fails
pub fn calculate_bmr(
    weight: f64,
    height: f64,
    age: u32,
    gender: &str,
    kb: &KnowledgeBase,
) -> Result<f64, NutritionError> {
    let formula = kb
        .bmr_formula(gender)
        .ok_or_else(|| NutritionError::UnsupportedGender {
            gender: gender.to_owned(),
            supported: kb.genders(),
        })?;

    let inputs = FormulaInputs {
        weight,
        height,
        age: f64::from(age),
    };

    formula
        .evaluate(&inputs)
        .map_err(|e| NutritionError::Formula {
            gender: gender.to_owned(),
            reason: e.to_string(),
        })
}

/// Total Daily Energy Expenditure: `bmr` times the activity multiplier
///
/// # Errors
///
/// Returns `NutritionError::UnsupportedActivityLevel` for an unknown level
pub fn calculate_tdee(
    bmr: f64,
    activity_level: &str,
    kb: &KnowledgeBase,
) -> Result<f64, NutritionError> {
    let factor = kb.activity_factor(activity_level).ok_or_else(|| {
        NutritionError::UnsupportedActivityLevel {
            level: activity_level.to_owned(),
            valid: kb.activity_levels(),
        }
    })?;
    Ok(bmr * factor)
}

/// Daily macro targets for a goal-adjusted TDEE
#[must_use]
pub fn calculate_macros(weight: f64, tdee_goal: f64, rules: &GoalRules) -> MacroPlan {
    let protein_g = weight * rules.protein_g_per_kg;
    let protein_cal = protein_g * KCAL_PER_GRAM_PROTEIN;
    let remaining_cal = tdee_goal - protein_cal;

    let carbs_g = remaining_cal * rules.carb_share() / KCAL_PER_GRAM_CARBS;
    let fats_g = remaining_cal * rules.fat_share() / KCAL_PER_GRAM_FAT;

    MacroPlan {
        calories: round_2dp(tdee_goal),
        protein: round_2dp(protein_g),
        carbs: round_2dp(carbs_g),
        fats: round_2dp(fats_g),
    }
}

/// End-to-end daily plan for a user profile
///
/// The goal is checked before anything is computed.
///
/// # Errors
///
/// Returns `NutritionError::UnknownGoal`, `NutritionError::InvalidInput` for
/// non-positive metrics, or any error from [`calculate_bmr`] / [`calculate_tdee`]
pub fn calculate_macro_plan(
    profile: &UserProfile,
    kb: &KnowledgeBase,
) -> Result<MacroPlan, NutritionError> {
    let rules = kb
        .goal_rules(&profile.goal)
        .ok_or_else(|| NutritionError::UnknownGoal {
            goal: profile.goal.clone(),
            available: kb.goal_names(),
        })?;

    profile.validate_metrics()?;

    let bmr = calculate_bmr(
        profile.weight,
        profile.height,
        profile.age,
        &profile.gender,
        kb,
    )?;
    let tdee = calculate_tdee(bmr, &profile.activity_level, kb)?;
    let tdee_goal = tdee + rules.tdee_adjustment;

    debug!(
        bmr,
        tdee,
        tdee_goal,
        goal = %profile.goal,
        "Computed energy expenditure"
    );

    Ok(calculate_macros(profile.weight, tdee_goal, rules))
}
