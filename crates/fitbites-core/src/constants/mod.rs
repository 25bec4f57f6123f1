// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Nutrient keys, energy densities, service names, and default limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single large file.

/// Canonical nutrient keys used in nutrient vectors
pub mod nutrients {
    /// Energy in kilocalories
    pub const CALORIES: &str = "calories";
    /// Protein in grams
    pub const PROTEIN: &str = "protein";
    /// Carbohydrates in grams
    pub const CARBS: &str = "carbs";
    /// Fats in grams
    pub const FATS: &str = "fats";

    /// Keys present in the zero vector substituted for unresolved ingredients
    pub const CORE_KEYS: [&str; 4] = [CALORIES, PROTEIN, CARBS, FATS];
}

/// Energy density of macronutrients (Atwater factors)
pub mod energy {
    /// Kilocalories per gram of protein
    pub const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
    /// Kilocalories per gram of carbohydrate
    pub const KCAL_PER_GRAM_CARBS: f64 = 4.0;
    /// Kilocalories per gram of fat
    pub const KCAL_PER_GRAM_FAT: f64 = 9.0;
    /// Catalog values are expressed per this many grams
    pub const REFERENCE_PORTION_GRAMS: f64 = 100.0;
}

/// Service identification for logs and health responses
pub mod service_names {
    /// Server binary / service name
    pub const FITBITES_SERVER: &str = "fitbites-server";
}

/// Default limits
pub mod limits {
    /// Maximum accepted upload size in bytes (10 MiB)
    pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
    /// Maximum number of results for similar-ingredient search
    pub const MAX_SIMILAR_INGREDIENTS: usize = 50;
    /// Default number of results for similar-ingredient search
    pub const DEFAULT_SIMILAR_INGREDIENTS: usize = 5;
    /// Number of comma-separated segments kept in an ingredient display name
    pub const DISPLAY_NAME_SEGMENTS: usize = 2;
}

/// Collaborator service names used in logs and error messages
pub mod collaborators {
    /// Vision extraction model
    pub const VISION_EXTRACTOR: &str = "vision-extractor";
    /// Zero-shot food classifier
    pub const FOOD_GATE: &str = "food-gate";
    /// Vector index / semantic retriever
    pub const INGREDIENT_RESOLVER: &str = "ingredient-resolver";
}
