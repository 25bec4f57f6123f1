// ABOUTME: Circuit breaker for calls to external model services
// ABOUTME: Fails fast while a collaborator is down and probes for recovery after a cool-down
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use fitbites_core::errors::ProviderError;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls pass through; consecutive failures are counted
    Closed,
    /// Calls are rejected until the recovery timeout elapses
    Open,
    /// One probe call at a time is admitted to test recovery
    HalfOpen,
}

impl CircuitState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Closed,
            1 => Self::Open,
            _ => Self::HalfOpen,
        }
    }

    const fn as_u8(self) -> u8 {
        match self {
            Self::Closed => 0,
            Self::Open => 1,
            Self::HalfOpen => 2,
        }
    }
}

/// Thresholds and cool-down for a [`CircuitBreaker`]
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive retryable failures that open the circuit
    pub failure_threshold: u32,
    /// Time spent open before a recovery probe is admitted
    pub recovery_timeout: Duration,
    /// Consecutive probe successes needed to close again
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 1,
        }
    }
}

impl CircuitBreakerConfig {
    /// Create a configuration
    #[must_use]
    pub const fn new(
        failure_threshold: u32,
        recovery_timeout: Duration,
        success_threshold: u32,
    ) -> Self {
        Self {
            failure_threshold,
            recovery_timeout,
            success_threshold,
        }
    }
}

/// Lock-free circuit breaker shared by all requests hitting one collaborator
///
/// Only errors for which [`ProviderError::is_retryable`] holds count as
/// failures. A malformed response says nothing about availability.
pub struct CircuitBreaker {
    service: String,
    state: AtomicU8,
    failure_count: AtomicU32,
    success_count: AtomicU32,
    probe_in_flight: AtomicBool,
    opened_at_ms: AtomicU64,
    config: CircuitBreakerConfig,
    epoch: Instant,
}

impl CircuitBreaker {
    /// Breaker with default thresholds
    #[must_use]
    pub fn new(service: &str) -> Self {
        Self::with_config(service, CircuitBreakerConfig::default())
    }

    /// Breaker with explicit thresholds
    #[must_use]
    pub fn with_config(service: &str, config: CircuitBreakerConfig) -> Self {
        Self {
            service: service.to_owned(),
            state: AtomicU8::new(CircuitState::Closed.as_u8()),
            failure_count: AtomicU32::new(0),
            success_count: AtomicU32::new(0),
            probe_in_flight: AtomicBool::new(false),
            opened_at_ms: AtomicU64::new(0),
            config,
            epoch: Instant::now(),
        }
    }

    /// Collaborator this breaker protects
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> CircuitState {
        CircuitState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Consecutive failures recorded while closed
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::SeqCst)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    #[allow(clippy::cast_possible_truncation)]
    fn recovery_ms(&self) -> u64 {
        self.config.recovery_timeout.as_millis() as u64
    }

    fn set_state(&self, state: CircuitState) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }

    fn trip(&self) {
        self.set_state(CircuitState::Open);
        self.opened_at_ms.store(self.now_ms(), Ordering::SeqCst);
        self.success_count.store(0, Ordering::SeqCst);
        self.probe_in_flight.store(false, Ordering::SeqCst);
    }

    /// Admit a call, moving open to half-open once the cool-down has passed
    ///
    /// In half-open only one probe is admitted until it completes.
    #[must_use]
    pub fn try_acquire(&self) -> bool {
        match self.state() {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let opened_at = self.opened_at_ms.load(Ordering::SeqCst);
                if self.now_ms().saturating_sub(opened_at) < self.recovery_ms() {
                    return false;
                }
                let moved = self
                    .state
                    .compare_exchange(
                        CircuitState::Open.as_u8(),
                        CircuitState::HalfOpen.as_u8(),
                        Ordering::SeqCst,
                        Ordering::SeqCst,
                    )
                    .is_ok();
                if moved {
                    info!(service = %self.service, "Circuit half-open, probing collaborator");
                }
                self.acquire_probe()
            }
            CircuitState::HalfOpen => self.acquire_probe(),
        }
    }

    fn acquire_probe(&self) -> bool {
        self.probe_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Record a completed call
    pub fn record_success(&self) {
        match self.state() {
            CircuitState::Closed => self.failure_count.store(0, Ordering::SeqCst),
            CircuitState::HalfOpen => {
                self.probe_in_flight.store(false, Ordering::SeqCst);
                let successes = self.success_count.fetch_add(1, Ordering::SeqCst) + 1;
                if successes >= self.config.success_threshold {
                    self.set_state(CircuitState::Closed);
                    self.failure_count.store(0, Ordering::SeqCst);
                    self.success_count.store(0, Ordering::SeqCst);
                    info!(service = %self.service, "Circuit closed, collaborator recovered");
                }
            }
            CircuitState::Open => {}
        }
    }

    /// Record a retryable failure
    pub fn record_failure(&self) {
        match self.state() {
            CircuitState::Closed => {
                let failures = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
                if failures >= self.config.failure_threshold {
                    self.trip();
                    warn!(
                        service = %self.service,
                        failures,
                        recovery_timeout_secs = self.config.recovery_timeout.as_secs(),
                        "Circuit opened, collaborator failing"
                    );
                }
            }
            CircuitState::HalfOpen => {
                self.trip();
                warn!(service = %self.service, "Recovery probe failed, circuit re-opened");
            }
            CircuitState::Open => {
                self.opened_at_ms.store(self.now_ms(), Ordering::SeqCst);
            }
        }
    }

    /// Release a half-open probe slot without judging the collaborator
    fn release_probe(&self) {
        if self.state() == CircuitState::HalfOpen {
            self.probe_in_flight.store(false, Ordering::SeqCst);
        }
    }

    /// Whole seconds until a probe will be admitted, rounded up
    #[must_use]
    pub fn retry_after_secs(&self) -> u64 {
        let since_open = self
            .now_ms()
            .saturating_sub(self.opened_at_ms.load(Ordering::SeqCst));
        self.recovery_ms()
            .saturating_sub(since_open)
            .saturating_add(999)
            / 1000
    }

    /// Run `operation` under the breaker
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::CircuitBreakerOpen` without polling `operation`
    /// when the circuit rejects the call, otherwise the operation's own error
    pub async fn call<F, T>(&self, operation: F) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        if !self.try_acquire() {
            return Err(ProviderError::CircuitBreakerOpen {
                service: self.service.clone(),
                retry_after_secs: self.retry_after_secs(),
            });
        }

        // Frees the half-open probe slot even if this future is dropped mid-call
        let _probe = ProbeSlot(self);

        match operation.await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(e) => {
                if e.is_retryable() {
                    self.record_failure();
                }
                Err(e)
            }
        }
    }

    /// Force the breaker closed
    pub fn reset(&self) {
        self.set_state(CircuitState::Closed);
        self.failure_count.store(0, Ordering::SeqCst);
        self.success_count.store(0, Ordering::SeqCst);
        self.probe_in_flight.store(false, Ordering::SeqCst);
        info!(service = %self.service, "Circuit manually reset");
    }
}

struct ProbeSlot<'a>(&'a CircuitBreaker);

impl Drop for ProbeSlot<'_> {
    fn drop(&mut self) {
        self.0.release_probe();
    }
}
