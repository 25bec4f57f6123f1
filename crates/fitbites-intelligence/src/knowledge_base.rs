// ABOUTME: Nutrition knowledge base loader with BMR formulas, activity multipliers, and goal rules
// ABOUTME: Validates and compiles the JSON document once at start-up; read-only afterwards
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Knowledge Base
//!
//! The knowledge base is a JSON document with three sections:
//!
//! ```json
//! {
//!   "bmr_formula": { "male": "10 * weight + 6.25 * height - 5 * age + 5" },
//!   "activity_factors": { "sedentary": 1.2 },
//!   "goals": {
//!     "maintenance": {
//!       "tdee_adjustment": 0,
//!       "protein_g_per_kg": 1.6,
//!       "carbs_percentage": 50,
//!       "fats_percentage": 25
//!     }
//!   }
//! }
//! ```
//!
//! Gender and activity keys are case-insensitive and stored lowercased. Goal
//! names are matched exactly.

use crate::formula::{Formula, FormulaError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Failure to load or validate a knowledge base document
#[derive(Debug, Error)]
pub enum KnowledgeBaseError {
    /// File does not exist
    #[error("Knowledge base file '{}' not found", .path.display())]
    NotFound {
        /// Requested path
        path: PathBuf,
    },
    /// File exists but could not be read
    #[error("Failed to read knowledge base '{}': {source}", .path.display())]
    Io {
        /// Requested path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
    /// Document is not valid JSON of the expected shape
    #[error("Knowledge base is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// A required section has no entries
    #[error("Knowledge base section '{0}' is empty")]
    EmptySection(&'static str),
    /// Two keys collide after lowercasing
    #[error("Knowledge base section '{section}' has duplicate key '{key}'")]
    DuplicateKey {
        /// Section name
        section: &'static str,
        /// Lowercased key
        key: String,
    },
    /// BMR formula does not compile
    #[error("BMR formula for '{gender}' is invalid: {source}")]
    InvalidFormula {
        /// Gender key
        gender: String,
        /// Parse error
        #[source]
        source: FormulaError,
    },
    /// Activity multiplier is not a finite number >= 1
    #[error("Activity factor '{level}' must be a finite multiplier of at least 1, got {value}")]
    InvalidActivityFactor {
        /// Activity key
        level: String,
        /// Offending value
        value: f64,
    },
    /// Goal rules are out of range
    #[error("Goal '{goal}' is invalid: {reason}")]
    InvalidGoal {
        /// Goal name
        goal: String,
        /// What is wrong
        reason: String,
    },
}

/// Calorie and macro rules for one goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalRules {
    /// Added to TDEE (kcal/day), may be negative
    pub tdee_adjustment: f64,
    /// Protein grams per kilogram of body weight
    pub protein_g_per_kg: f64,
    /// Carbohydrate share of remaining calories (relative weight)
    pub carbs_percentage: f64,
    /// Fat share of remaining calories (relative weight)
    pub fats_percentage: f64,
}

impl GoalRules {
    fn validate(&self) -> Result<(), String> {
        if !self.tdee_adjustment.is_finite() {
            return Err("tdee_adjustment must be finite".to_owned());
        }
        if !self.protein_g_per_kg.is_finite() || self.protein_g_per_kg < 0.0 {
            return Err("protein_g_per_kg must be a finite non-negative number".to_owned());
        }
        for (field, value) in [
            ("carbs_percentage", self.carbs_percentage),
            ("fats_percentage", self.fats_percentage),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{field} must be a finite non-negative number"));
            }
        }
        if self.carbs_percentage + self.fats_percentage <= 0.0 {
            return Err("carbs_percentage and fats_percentage must not both be zero".to_owned());
        }
        Ok(())
    }

    /// Carbohydrate fraction of the non-protein calories
    #[must_use]
    pub fn carb_share(&self) -> f64 {
        self.carbs_percentage / (self.carbs_percentage + self.fats_percentage)
    }

    /// Fat fraction of the non-protein calories
    #[must_use]
    pub fn fat_share(&self) -> f64 {
        self.fats_percentage / (self.carbs_percentage + self.fats_percentage)
    }
}

#[derive(Debug, Deserialize)]
struct KnowledgeBaseDocument {
    bmr_formula: BTreeMap<String, String>,
    activity_factors: BTreeMap<String, f64>,
    goals: BTreeMap<String, GoalRules>,
}

/// Validated, compiled knowledge base
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    bmr_formulas: BTreeMap<String, Formula>,
    activity_factors: BTreeMap<String, f64>,
    goals: BTreeMap<String, GoalRules>,
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

impl KnowledgeBase {
    /// Load and validate a knowledge base file
    ///
    /// # Errors
    ///
    /// Returns `KnowledgeBaseError::NotFound` for a missing file, or any
    /// parse/validation error from [`KnowledgeBase::from_json_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, KnowledgeBaseError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                KnowledgeBaseError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                KnowledgeBaseError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let kb = Self::from_json_str(&contents)?;
        info!(
            path = %path.display(),
            genders = kb.bmr_formulas.len(),
            activity_levels = kb.activity_factors.len(),
            goals = kb.goals.len(),
            "Loaded nutrition knowledge base"
        );
        Ok(kb)
    }

    /// Parse and validate a knowledge base document
    ///
    /// # Errors
    ///
    /// Returns `KnowledgeBaseError` when the JSON is malformed, a section is
    /// empty, a formula does not compile, or a numeric rule is out of range
    pub fn from_json_str(json: &str) -> Result<Self, KnowledgeBaseError> {
        let document: KnowledgeBaseDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    fn from_document(document: KnowledgeBaseDocument) -> Result<Self, KnowledgeBaseError> {
        if document.bmr_formula.is_empty() {
            return Err(KnowledgeBaseError::EmptySection("bmr_formula"));
        }
        if document.activity_factors.is_empty() {
            return Err(KnowledgeBaseError::EmptySection("activity_factors"));
        }
        if document.goals.is_empty() {
            return Err(KnowledgeBaseError::EmptySection("goals"));
        }

        let mut bmr_formulas = BTreeMap::new();
        for (gender, source) in document.bmr_formula {
            let key = normalize_key(&gender);
            let formula =
                Formula::parse(&source).map_err(|source| KnowledgeBaseError::InvalidFormula {
                    gender: gender.clone(),
                    source,
                })?;
            if bmr_formulas.insert(key.clone(), formula).is_some() {
                return Err(KnowledgeBaseError::DuplicateKey {
                    section: "bmr_formula",
                    key,
                });
            }
        }

        let mut activity_factors = BTreeMap::new();
        for (level, value) in document.activity_factors {
            if !value.is_finite() || value < 1.0 {
                return Err(KnowledgeBaseError::InvalidActivityFactor { level, value });
            }
            let key = normalize_key(&level);
            if activity_factors.insert(key.clone(), value).is_some() {
                return Err(KnowledgeBaseError::DuplicateKey {
                    section: "activity_factors",
                    key,
                });
            }
        }

        for (goal, rules) in &document.goals {
            rules
                .validate()
                .map_err(|reason| KnowledgeBaseError::InvalidGoal {
                    goal: goal.clone(),
                    reason,
                })?;
        }

        Ok(Self {
            bmr_formulas,
            activity_factors,
            goals: document.goals,
        })
    }

    /// Compiled BMR formula for `gender` (case-insensitive)
    #[must_use]
    pub fn bmr_formula(&self, gender: &str) -> Option<&Formula> {
        self.bmr_formulas.get(&normalize_key(gender))
    }

    /// TDEE multiplier for `level` (case-insensitive)
    #[must_use]
    pub fn activity_factor(&self, level: &str) -> Option<f64> {
        self.activity_factors.get(&normalize_key(level)).copied()
    }

    /// Rules for `goal` (exact match after trimming)
    #[must_use]
    pub fn goal_rules(&self, goal: &str) -> Option<&GoalRules> {
        self.goals.get(goal.trim())
    }

    /// Supported gender keys, sorted
    #[must_use]
    pub fn genders(&self) -> Vec<String> {
        self.bmr_formulas.keys().cloned().collect()
    }

    /// Valid activity levels, sorted
    #[must_use]
    pub fn activity_levels(&self) -> Vec<String> {
        self.activity_factors.keys().cloned().collect()
    }

    /// Available goal names, sorted
    #[must_use]
    pub fn goal_names(&self) -> Vec<String> {
        self.goals.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "bmr_formula": {
            "Male": "10 * weight + 6.25 * height - 5 * age + 5",
            "female": "10 * weight + 6.25 * height - 5 * age - 161"
        },
        "activity_factors": { "Sedentary": 1.2, "very_active": 1.725 },
        "goals": {
            "lose_weight": {
                "tdee_adjustment": -500,
                "protein_g_per_kg": 2.0,
                "carbs_percentage": 40,
                "fats_percentage": 30
            }
        }
    }"#;

    #[test]
    fn test_keys_are_case_insensitive() {
        let kb = KnowledgeBase::from_json_str(SAMPLE).unwrap();
        assert!(kb.bmr_formula("MALE").is_some());
        assert!(kb.bmr_formula(" female ").is_some());
        assert_eq!(kb.activity_factor("sedentary"), Some(1.2));
        assert_eq!(kb.genders(), vec!["female", "male"]);
        assert!(kb.goal_rules("lose_weight").is_some());
        assert!(kb.goal_rules("Lose_Weight").is_none());
    }

    #[test]
    fn test_goal_shares_normalize() {
        let kb = KnowledgeBase::from_json_str(SAMPLE).unwrap();
        let rules = kb.goal_rules("lose_weight").unwrap();
        assert!((rules.carb_share() - 40.0 / 70.0).abs() < 1e-12);
        assert!((rules.carb_share() + rules.fat_share() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_unsafe_formula() {
        let json = SAMPLE.replace("- 161", "- __import__('os')");
        let err = KnowledgeBase::from_json_str(&json).unwrap_err();
        assert!(matches!(err, KnowledgeBaseError::InvalidFormula { ref gender, .. } if gender == "female"));
    }

    #[test]
    fn test_rejects_bad_numbers() {
        let json = SAMPLE.replace("1.725", "0.5");
        assert!(matches!(
            KnowledgeBase::from_json_str(&json),
            Err(KnowledgeBaseError::InvalidActivityFactor { .. })
        ));

        let json = SAMPLE
            .replace("\"carbs_percentage\": 40", "\"carbs_percentage\": 0")
            .replace("\"fats_percentage\": 30", "\"fats_percentage\": 0");
        assert!(matches!(
            KnowledgeBase::from_json_str(&json),
            Err(KnowledgeBaseError::InvalidGoal { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_sections_and_duplicates() {
        let json = r#"{"bmr_formula": {}, "activity_factors": {"a": 1.2}, "goals": {}}"#;
        assert!(matches!(
            KnowledgeBase::from_json_str(json),
            Err(KnowledgeBaseError::EmptySection("bmr_formula"))
        ));

        let json = SAMPLE.replace("\"female\"", "\"MALE\"");
        assert!(matches!(
            KnowledgeBase::from_json_str(&json),
            Err(KnowledgeBaseError::DuplicateKey { section: "bmr_formula", .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = KnowledgeBase::load("/nonexistent/nutrition_db.json").unwrap_err();
        assert!(matches!(err, KnowledgeBaseError::NotFound { .. }));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let kb = KnowledgeBase::load(file.path()).unwrap();
        assert_eq!(kb.activity_levels(), vec!["sedentary", "very_active"]);
    }
}
