// ABOUTME: In-process ingredient resolver ranking catalog names by normalized token overlap
// ABOUTME: Fallback for deployments without a vector index service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Token Resolver
//!
//! Names are split at the first comma into a head segment ("Carrots") and
//! descriptors ("raw, sliced"). Tokens are lowercased with plurals folded, so
//! "carrot" and "Carrots" agree. Preparation words such as "raw" or "whole"
//! never count as head tokens.
//!
//! A catalog entry is a candidate only when a head token of one name appears
//! in the other name. Overlap on descriptors alone is a miss. Candidates score
//! `0.6` for a head-to-head match (`0.3` for a head matching a descriptor)
//! plus `0.4` times the Jaccard similarity of all tokens.

use crate::nutrient_catalog::NutrientCatalog;
use async_trait::async_trait;
use fitbites_core::collaborators::IngredientResolver;
use fitbites_core::errors::ProviderError;
use fitbites_core::models::CatalogMatch;
use std::collections::BTreeSet;

/// Weight of a head-to-head match
const HEAD_WEIGHT: f32 = 0.6;

/// Weight of a head token found only among the other name's descriptors
const CROSS_HEAD_WEIGHT: f32 = 0.3;

/// Weight of the all-token Jaccard similarity
const OVERLAP_WEIGHT: f32 = 0.4;

/// Connectives dropped before matching
const STOP_WORDS: &[&str] = &["a", "an", "and", "for", "in", "of", "on", "or", "the", "to", "with"];

/// Preparation and state words that describe a food without identifying it
const GENERIC_DESCRIPTORS: &[&str] = &[
    "baked", "boiled", "chopped", "cooked", "crumbled", "cubed", "diced", "dried", "drained",
    "fresh", "fried", "frozen", "grated", "grilled", "large", "mashed", "medium", "minced",
    "organic", "peeled", "plain", "portion", "raw", "roasted", "shredded", "sliced", "small",
    "steamed", "whole",
];

/// Fold common English plurals onto their singular form
fn singular(token: &str) -> String {
    if token.len() <= 3 || !token.ends_with('s') || token.ends_with("ss") {
        return token.to_owned();
    }
    if let Some(stem) = token.strip_suffix("ies") {
        return format!("{stem}y");
    }
    for suffix in ["oes", "ches", "shes", "xes"] {
        if token.ends_with(suffix) {
            return token[..token.len() - 2].to_owned();
        }
    }
    token[..token.len() - 1].to_owned()
}

/// Normalized tokens of `text`
fn tokenize(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .filter(|token| !STOP_WORDS.contains(&token.as_str()))
        .map(|token| singular(&token))
        .collect()
}

/// Tokenized name split into the identifying head and every token
#[derive(Debug, Clone)]
struct NameTokens {
    head: BTreeSet<String>,
    all: BTreeSet<String>,
}

impl NameTokens {
    fn new(text: &str) -> Self {
        let head_segment = text.split(',').next().unwrap_or_default();
        let head = tokenize(head_segment)
            .into_iter()
            .filter(|token| !GENERIC_DESCRIPTORS.contains(&token.as_str()))
            .collect();
        Self {
            head,
            all: tokenize(text),
        }
    }

    /// Combined score, `None` when no head token is shared
    fn score(&self, other: &Self) -> Option<f32> {
        let head_weight = if self.head.is_disjoint(&other.head) {
            if self.head.is_disjoint(&other.all) && other.head.is_disjoint(&self.all) {
                return None;
            }
            CROSS_HEAD_WEIGHT
        } else {
            HEAD_WEIGHT
        };
        Some(OVERLAP_WEIGHT.mul_add(jaccard(&self.all, &other.all), head_weight))
    }
}

/// Jaccard similarity of two token sets
#[allow(clippy::cast_precision_loss)]
fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    let intersection = a.intersection(b).count();
    if intersection == 0 {
        return 0.0;
    }
    let union = a.union(b).count();
    intersection as f32 / union as f32
}

/// Resolves ingredient names against the catalog by weighted token overlap
///
/// Equal scores are ordered by canonical name.
#[derive(Debug, Clone)]
pub struct CatalogTokenResolver {
    entries: Vec<(String, NameTokens)>,
}

impl CatalogTokenResolver {
    /// Index every catalog name
    #[must_use]
    pub fn new(catalog: &NutrientCatalog) -> Self {
        let entries = catalog
            .names()
            .map(|name| (name.to_owned(), NameTokens::new(name)))
            .collect();
        Self { entries }
    }

    /// Synchronous ranking used by the async trait method
    #[must_use]
    pub fn rank(&self, query: &str, k: usize) -> Vec<CatalogMatch> {
        let query_tokens = NameTokens::new(query);
        if query_tokens.all.is_empty() || k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<CatalogMatch> = self
            .entries
            .iter()
            .filter_map(|(name, tokens)| {
                query_tokens.score(tokens).map(|score| CatalogMatch {
                    name: name.clone(),
                    score,
                })
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        scored.truncate(k);
        scored
    }
}

#[async_trait]
impl IngredientResolver for CatalogTokenResolver {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<CatalogMatch>, ProviderError> {
        Ok(self.rank(query, k))
    }

    async fn is_ready(&self) -> bool {
        !self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitbites_core::models::NutrientVector;

    fn resolver() -> CatalogTokenResolver {
        let catalog = NutrientCatalog::from_entries(
            [
                "Carrots, raw",
                "Carrots, cooked, boiled",
                "Tomatoes, red, ripe, raw",
                "Rice, white, cooked",
                "Rice, brown, cooked",
                "Cheese, feta",
                "Bananas, raw",
            ]
            .into_iter()
            .map(|name| (name.to_owned(), NutrientVector::zero())),
        );
        CatalogTokenResolver::new(&catalog)
    }

    fn top(query: &str) -> Option<String> {
        resolver().rank(query, 1).into_iter().next().map(|m| m.name)
    }

    #[test]
    fn test_plurals_fold() {
        assert_eq!(singular("carrots"), "carrot");
        assert_eq!(singular("tomatoes"), "tomato");
        assert_eq!(singular("berries"), "berry");
        assert_eq!(singular("peaches"), "peach");
        assert_eq!(singular("glass"), "glass");
        assert_eq!(singular("oats"), "oat");
        assert_eq!(singular("cos"), "cos");
    }

    #[test]
    fn test_best_overlap_first() {
        let matches = resolver().rank("carrots, raw, organic", 2);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].name, "Carrots, raw");
        assert!(matches[0].score > matches[1].score);
    }

    #[test]
    fn test_singular_query_reaches_plural_entry() {
        assert_eq!(top("Tomato, raw").as_deref(), Some("Tomatoes, red, ripe, raw"));
        assert_eq!(top("Carrot, cooked, diced").as_deref(), Some("Carrots, cooked, boiled"));
    }

    #[test]
    fn test_head_found_among_descriptors() {
        assert_eq!(top("Feta, crumbled").as_deref(), Some("Cheese, feta"));
    }

    #[test]
    fn test_descriptor_overlap_alone_is_a_miss() {
        assert!(resolver().rank("cooked", 5).is_empty());
        assert!(resolver().rank("Mango, raw", 5).is_empty());
    }

    #[test]
    fn test_no_shared_tokens_is_empty() {
        assert!(resolver().rank("Dragon fruit", 5).is_empty());
        assert!(resolver().rank("  ,, ", 5).is_empty());
    }

    #[test]
    fn test_ties_break_by_name() {
        let matches = resolver().rank("rice", 5);
        let names: Vec<_> = matches.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Rice, brown, cooked", "Rice, white, cooked"]);
    }
}
