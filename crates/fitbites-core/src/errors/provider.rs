// ABOUTME: Error types for calls to external model services (vision, classifier, vector index)
// ABOUTME: Classifies failures as retryable or permanent for the circuit breaker and retry policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{AppError, ErrorCode};
use thiserror::Error;

/// Failure of an external collaborator call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Call did not complete within the configured timeout
    #[error("{service} did not respond within {timeout_secs}s")]
    Timeout {
        /// Collaborator name
        service: String,
        /// Timeout that elapsed
        timeout_secs: u64,
    },

    /// Network-level failure (connect, reset, DNS)
    #[error("{service} request failed: {reason}")]
    Transport {
        /// Collaborator name
        service: String,
        /// Underlying failure
        reason: String,
    },

    /// Non-success HTTP status
    #[error("{service} returned HTTP {status}: {body}")]
    Http {
        /// Collaborator name
        service: String,
        /// HTTP status code
        status: u16,
        /// Truncated response body
        body: String,
    },

    /// Response arrived but could not be understood
    #[error("{service} returned an invalid response: {reason}")]
    InvalidResponse {
        /// Collaborator name
        service: String,
        /// Parse failure
        reason: String,
    },

    /// Circuit breaker is open; calls are rejected without being attempted
    #[error("{service} is temporarily unavailable, retry in {retry_after_secs}s")]
    CircuitBreakerOpen {
        /// Collaborator name
        service: String,
        /// Seconds until a recovery probe is allowed
        retry_after_secs: u64,
    },

    /// Collaborator is not configured in this deployment
    #[error("{service} is not configured: {reason}")]
    NotConfigured {
        /// Collaborator name
        service: String,
        /// Missing setting
        reason: String,
    },
}

impl ProviderError {
    /// Create a transport error
    #[must_use]
    pub fn transport(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            service: service.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-response error
    #[must_use]
    pub fn invalid_response(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            service: service.into(),
            reason: reason.into(),
        }
    }

    /// Create an HTTP status error, truncating the body for logs
    #[must_use]
    pub fn http(service: impl Into<String>, status: u16, body: &str) -> Self {
        Self::Http {
            service: service.into(),
            status,
            body: body.chars().take(200).collect(),
        }
    }

    /// Collaborator this error came from
    #[must_use]
    pub fn service(&self) -> &str {
        match self {
            Self::Timeout { service, .. }
            | Self::Transport { service, .. }
            | Self::Http { service, .. }
            | Self::InvalidResponse { service, .. }
            | Self::CircuitBreakerOpen { service, .. }
            | Self::NotConfigured { service, .. } => service,
        }
    }

    /// Whether retrying the same call could succeed
    ///
    /// Only retryable errors count as failures for the circuit breaker.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport { .. } => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidResponse { .. }
            | Self::CircuitBreakerOpen { .. }
            | Self::NotConfigured { .. } => false,
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(error: ProviderError) -> Self {
        match &error {
            ProviderError::CircuitBreakerOpen {
                retry_after_secs, ..
            } => Self::new(ErrorCode::ExternalServiceUnavailable, error.to_string())
                .with_details(serde_json::json!({ "retry_after_secs": retry_after_secs })),
            ProviderError::Timeout { .. } | ProviderError::NotConfigured { .. } => {
                Self::new(ErrorCode::ExternalServiceUnavailable, error.to_string())
            }
            _ => Self::new(ErrorCode::ExternalServiceError, error.to_string()),
        }
    }
}
