// ABOUTME: Ingredient resolver backed by a remote vector similarity search service
// ABOUTME: POSTs {query, k} and reads back ranked canonical catalog names with scores
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::http_client::{send_json, shared_client};
use async_trait::async_trait;
use fitbites_core::collaborators::IngredientResolver;
use fitbites_core::constants::collaborators::INGREDIENT_RESOLVER;
use fitbites_core::errors::ProviderError;
use fitbites_core::models::CatalogMatch;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// How long a readiness check result is reused
const READINESS_TTL: Duration = Duration::from_secs(30);

/// Query sent by the readiness check
const READINESS_QUERY: &str = "water";

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    k: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    matches: Vec<CatalogMatch>,
}

/// Resolver calling an external embedding index
///
/// Readiness is a `k = 1` search, cached for [`READINESS_TTL`].
pub struct HttpVectorIndexResolver {
    client: Client,
    url: String,
    last_check: Mutex<Option<(Instant, bool)>>,
}

impl HttpVectorIndexResolver {
    /// Resolver posting searches to `url`
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: shared_client().clone(),
            url: url.into(),
            last_check: Mutex::new(None),
        }
    }

    async fn check_reachable(&self) -> bool {
        match self.search(READINESS_QUERY, 1).await {
            Ok(_) => true,
            Err(e) => {
                warn!(url = %self.url, error = %e, "Vector index readiness check failed");
                false
            }
        }
    }
}

#[async_trait]
impl IngredientResolver for HttpVectorIndexResolver {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<CatalogMatch>, ProviderError> {
        let request = self.client.post(&self.url).json(&SearchRequest { query, k });
        let mut response: SearchResponse = send_json(INGREDIENT_RESOLVER, request).await?;

        response
            .matches
            .sort_by(|a, b| b.score.total_cmp(&a.score));
        response.matches.truncate(k);

        debug!(query, k, returned = response.matches.len(), "Vector index search");
        Ok(response.matches)
    }

    async fn is_ready(&self) -> bool {
        let mut last_check = self.last_check.lock().await;
        if let Some((at, ready)) = *last_check {
            if at.elapsed() < READINESS_TTL {
                return ready;
            }
        }
        let ready = self.check_reachable().await;
        *last_check = Some((Instant::now(), ready));
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_index_is_not_ready() {
        let resolver = HttpVectorIndexResolver::new("http://127.0.0.1:9/search");
        assert!(!resolver.is_ready().await);
        assert!(matches!(*resolver.last_check.lock().await, Some((_, false))));
    }

    #[tokio::test]
    async fn test_cached_readiness_is_reused() {
        let resolver = HttpVectorIndexResolver::new("http://127.0.0.1:9/search");
        *resolver.last_check.lock().await = Some((Instant::now(), true));
        assert!(resolver.is_ready().await);
    }
}
