// ABOUTME: Nutrient catalog of canonical ingredients with per-100-gram nutrient vectors
// ABOUTME: Loaded once from JSON; exact-name lookup feeds the nutrition aggregator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Nutrient Catalog
//!
//! Accepts either a list of `{"name": ..., "nutrients": {...}}` records or a
//! map from canonical name to nutrient object. All values are per 100 grams.
//! When a list repeats a name, the first record wins.

use fitbites_core::constants::nutrients::CORE_KEYS;
use fitbites_core::models::NutrientVector;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Failure to load or validate the nutrient catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// File does not exist
    #[error("Nutrient catalog file '{}' not found", .path.display())]
    NotFound {
        /// Requested path
        path: PathBuf,
    },
    /// File exists but could not be read
    #[error("Failed to read nutrient catalog '{}': {source}", .path.display())]
    Io {
        /// Requested path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
    /// Document is not valid JSON of the expected shape
    #[error("Nutrient catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// Entry has a blank name
    #[error("Nutrient catalog entry #{index} has an empty name")]
    EmptyName {
        /// Position in the document
        index: usize,
    },
    /// Nutrient value is negative or not finite
    #[error("Nutrient '{nutrient}' of '{name}' must be a finite non-negative number, got {value}")]
    InvalidValue {
        /// Catalog entry
        name: String,
        /// Nutrient key
        nutrient: String,
        /// Offending value
        value: f64,
    },
}

#[derive(Debug, Deserialize)]
struct CatalogRecord {
    name: String,
    nutrients: NutrientVector,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Records(Vec<CatalogRecord>),
    ByName(BTreeMap<String, NutrientVector>),
}

/// Canonical ingredients and their nutrients per 100 g
#[derive(Debug, Clone, Default)]
pub struct NutrientCatalog {
    entries: BTreeMap<String, NutrientVector>,
}

impl NutrientCatalog {
    /// Load and validate a catalog file
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for a missing file, or any parse or
    /// validation error from [`NutrientCatalog::from_json_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                CatalogError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                CatalogError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let catalog = Self::from_json_str(&contents)?;
        info!(
            path = %path.display(),
            entries = catalog.len(),
            "Loaded nutrient catalog"
        );
        Ok(catalog)
    }

    /// Parse and validate a catalog document
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` for malformed JSON, blank names, or negative values
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let records = match serde_json::from_str::<CatalogDocument>(json)? {
            CatalogDocument::Records(records) => records,
            CatalogDocument::ByName(map) => map
                .into_iter()
                .map(|(name, nutrients)| CatalogRecord { name, nutrients })
                .collect(),
        };
        Self::from_records(records)
    }

    fn from_records(records: Vec<CatalogRecord>) -> Result<Self, CatalogError> {
        let mut entries = BTreeMap::new();
        for (index, record) in records.into_iter().enumerate() {
            let name = record.name.trim().to_owned();
            if name.is_empty() {
                return Err(CatalogError::EmptyName { index });
            }
            for (nutrient, value) in &record.nutrients {
                if !value.is_finite() || *value < 0.0 {
                    return Err(CatalogError::InvalidValue {
                        name,
                        nutrient: nutrient.clone(),
                        value: *value,
                    });
                }
            }
            if CORE_KEYS.iter().any(|key| record.nutrients.get(key).is_none()) {
                warn!(entry = %name, "Catalog entry is missing core nutrients");
            }
            if entries.contains_key(&name) {
                warn!(entry = %name, "Duplicate catalog entry ignored");
                continue;
            }
            entries.insert(name, record.nutrients);
        }
        Ok(Self { entries })
    }

    /// Build a catalog directly from `(name, nutrients)` pairs
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = (String, NutrientVector)>) -> Self {
        let mut catalog = Self::default();
        for (name, nutrients) in entries {
            catalog.entries.entry(name).or_insert(nutrients);
        }
        catalog
    }

    /// Nutrients per 100 g for an exact canonical name
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&NutrientVector> {
        self.entries.get(name)
    }

    /// Canonical names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_list_first_wins() {
        let json = r#"[
            {"name": "Rice, white, cooked", "nutrients": {"calories": 130, "protein": 2.7, "carbs": 28, "fats": 0.3}},
            {"name": "Rice, white, cooked", "nutrients": {"calories": 999, "protein": 0, "carbs": 0, "fats": 0}}
        ]"#;
        let catalog = NutrientCatalog::from_json_str(json).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.lookup("Rice, white, cooked").unwrap().get("calories"),
            Some(130.0)
        );
    }

    #[test]
    fn test_map_form_and_extra_nutrients() {
        let json = r#"{"Egg, whole, boiled": {"calories": 155, "protein": 13, "carbs": 1.1, "fats": 11, "fiber": 0}}"#;
        let catalog = NutrientCatalog::from_json_str(json).unwrap();
        let egg = catalog.lookup("Egg, whole, boiled").unwrap();
        assert_eq!(egg.len(), 5);
        assert_eq!(egg.get("fiber"), Some(0.0));
        assert!(catalog.lookup("egg, whole, boiled").is_none());
    }

    #[test]
    fn test_rejects_negative_values_and_blank_names() {
        let json = r#"[{"name": "Oil", "nutrients": {"fats": -1}}]"#;
        assert!(matches!(
            NutrientCatalog::from_json_str(json),
            Err(CatalogError::InvalidValue { .. })
        ));
        let json = r#"[{"name": "  ", "nutrients": {}}]"#;
        assert!(matches!(
            NutrientCatalog::from_json_str(json),
            Err(CatalogError::EmptyName { index: 0 })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            NutrientCatalog::load("/nonexistent/food_db.json"),
            Err(CatalogError::NotFound { .. })
        ));
    }
}
