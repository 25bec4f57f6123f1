// ABOUTME: Food gate implementations: zero-shot image classifier over HTTP, and an accept-all gate
// ABOUTME: The photo is food when the top-scoring label names a dish, fruit, vegetable, or drink
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::http_client::{send_json, shared_client};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use fitbites_core::collaborators::FoodGate;
use fitbites_core::constants::collaborators::FOOD_GATE;
use fitbites_core::errors::ProviderError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Labels offered to the zero-shot classifier
pub const CANDIDATE_LABELS: [&str; 10] = [
    "a dish of food",
    "a fruit",
    "a vegetable",
    "a drink",
    "a person",
    "an electronic device",
    "a car",
    "an animal",
    "a landscape",
    "no food",
];

/// A top label containing any of these marks the image as food
const FOOD_KEYWORDS: [&str; 5] = ["food", "fruit", "vegetable", "drink", "dish"];

/// Whether a classifier label counts as food
///
/// Negated labels such as `"no food"` never count.
#[must_use]
pub fn is_food_label(label: &str) -> bool {
    let label = label.trim().to_lowercase();
    !label.starts_with("no ") && FOOD_KEYWORDS.iter().any(|keyword| label.contains(keyword))
}

/// One classifier score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    /// Candidate label
    pub label: String,
    /// Probability-like score
    pub score: f64,
}

/// Highest-scoring label, if any
#[must_use]
pub fn top_label(scores: &[LabelScore]) -> Option<&LabelScore> {
    scores.iter().max_by(|a, b| a.score.total_cmp(&b.score))
}

#[derive(Debug, Serialize)]
struct ClassificationRequest<'a> {
    image: String,
    candidate_labels: &'a [&'a str],
}

/// Food gate backed by a zero-shot image classification endpoint
///
/// POSTs `{image: <base64>, candidate_labels: [...]}` and expects a
/// `[{label, score}]` array back.
pub struct HttpFoodGate {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl HttpFoodGate {
    /// Gate posting to `url`
    #[must_use]
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: shared_client().clone(),
            url: url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl FoodGate for HttpFoodGate {
    async fn is_food(&self, image: &[u8]) -> Result<bool, ProviderError> {
        let body = ClassificationRequest {
            image: STANDARD.encode(image),
            candidate_labels: &CANDIDATE_LABELS,
        };
        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let scores: Vec<LabelScore> = send_json(FOOD_GATE, request).await?;
        let top = top_label(&scores)
            .ok_or_else(|| ProviderError::invalid_response(FOOD_GATE, "no label scores returned"))?;

        let food = is_food_label(&top.label);
        debug!(label = %top.label, score = top.score, food, "Food gate classified image");
        Ok(food)
    }
}

/// Gate used when classification is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllFoodGate;

#[async_trait]
impl FoodGate for AcceptAllFoodGate {
    async fn is_food(&self, _image: &[u8]) -> Result<bool, ProviderError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(label: &str, score: f64) -> LabelScore {
        LabelScore {
            label: label.to_owned(),
            score,
        }
    }

    #[test]
    fn test_top_label_decides() {
        let scores = [score("a car", 0.2), score("a fruit", 0.7), score("a person", 0.1)];
        let top = top_label(&scores).unwrap();
        assert_eq!(top.label, "a fruit");
        assert!(is_food_label(&top.label));
        assert!(!is_food_label("a landscape"));
        assert!(top_label(&[]).is_none());
    }

    #[test]
    fn test_negated_label_is_not_food() {
        assert!(!is_food_label("no food"));
        assert!(is_food_label("A Dish Of Food"));
    }

    #[tokio::test]
    async fn test_accept_all() {
        assert!(AcceptAllFoodGate.is_food(b"anything").await.unwrap());
    }
}
