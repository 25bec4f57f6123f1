// ABOUTME: Call guard adding timeout, bounded retry, and circuit breaking to collaborator calls
// ABOUTME: Guarded<T> wraps any collaborator trait object and implements the same trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Collaborator Guard
//!
//! Every attempt runs under the circuit breaker and a per-attempt deadline.
//! Retryable failures are retried up to `max_retries` times with linear
//! backoff (`retry_backoff * attempt`). Non-retryable failures and an open
//! circuit return immediately.

use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
use async_trait::async_trait;
use fitbites_core::collaborators::{FoodGate, IngredientResolver, VisionExtractor};
use fitbites_core::errors::ProviderError;
use fitbites_core::models::{CatalogMatch, DetectedIngredient};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::warn;

/// Timeout and retry policy for one collaborator
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Deadline for a single attempt
    pub timeout: Duration,
    /// Extra attempts after the first for retryable failures
    pub max_retries: u32,
    /// Base delay between attempts, multiplied by the attempt number
    pub retry_backoff: Duration,
    /// Breaker thresholds
    pub breaker: CircuitBreakerConfig,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_retries: 1,
            retry_backoff: Duration::from_millis(250),
            breaker: CircuitBreakerConfig::default(),
        }
    }
}

/// Timeout, retry, and circuit breaker for one collaborator
pub struct CollaboratorGuard {
    service: String,
    config: GuardConfig,
    breaker: CircuitBreaker,
}

impl CollaboratorGuard {
    /// Guard named after the collaborator it protects
    #[must_use]
    pub fn new(service: &str, config: GuardConfig) -> Self {
        let breaker = CircuitBreaker::with_config(service, config.breaker.clone());
        Self {
            service: service.to_owned(),
            config,
            breaker,
        }
    }

    /// Underlying circuit breaker
    #[must_use]
    pub const fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    async fn attempt<T, Fut>(&self, call: Fut) -> Result<T, ProviderError>
    where
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        timeout(self.config.timeout, call)
            .await
            .unwrap_or_else(|_| {
                Err(ProviderError::Timeout {
                    service: self.service.clone(),
                    timeout_secs: self.config.timeout.as_secs(),
                })
            })
    }

    /// Run `operation` with the guard's policy; `operation` is invoked once per attempt
    ///
    /// # Errors
    ///
    /// The last attempt's error, or `ProviderError::CircuitBreakerOpen`
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match self.breaker.call(self.attempt(operation())).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = self.config.retry_backoff * attempt;
                    warn!(
                        service = %self.service,
                        attempt,
                        max_retries = self.config.max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "Collaborator call failed, retrying"
                    );
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// A collaborator wrapped in a [`CollaboratorGuard`]
pub struct Guarded<T: ?Sized> {
    inner: Arc<T>,
    guard: CollaboratorGuard,
}

impl<T: ?Sized> Guarded<T> {
    /// Wrap `inner`
    #[must_use]
    pub fn new(inner: Arc<T>, service: &str, config: GuardConfig) -> Self {
        Self {
            inner,
            guard: CollaboratorGuard::new(service, config),
        }
    }

    /// The guard applied to calls
    #[must_use]
    pub const fn guard(&self) -> &CollaboratorGuard {
        &self.guard
    }
}

#[async_trait]
impl IngredientResolver for Guarded<dyn IngredientResolver> {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<CatalogMatch>, ProviderError> {
        self.guard.run(|| self.inner.search(query, k)).await
    }

    async fn is_ready(&self) -> bool {
        timeout(self.guard.config.timeout, self.inner.is_ready())
            .await
            .unwrap_or(false)
    }
}

#[async_trait]
impl VisionExtractor for Guarded<dyn VisionExtractor> {
    async fn extract(&self, image: &[u8]) -> Result<Option<Vec<DetectedIngredient>>, ProviderError> {
        self.guard.run(|| self.inner.extract(image)).await
    }
}

#[async_trait]
impl FoodGate for Guarded<dyn FoodGate> {
    async fn is_food(&self, image: &[u8]) -> Result<bool, ProviderError> {
        self.guard.run(|| self.inner.is_food(image)).await
    }
}
