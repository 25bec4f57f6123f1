// ABOUTME: Request-level services composing the nutrition engine with external collaborators
// ABOUTME: Currently the meal photo analysis pipeline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Gate, extract, and aggregate for an uploaded meal photo
pub mod meal_analysis;

pub use meal_analysis::MealAnalysisService;
