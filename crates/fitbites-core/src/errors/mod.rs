// ABOUTME: Unified error handling with standard error codes and HTTP response formatting
// ABOUTME: Defines AppError, ErrorCode, and conversions from the domain-specific error enums
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! This module provides a centralized error handling system for the `FitBites`
//! service. Library crates raise typed, domain-specific errors
//! ([`NutritionError`], [`ProviderError`]); the transport boundary converts them
//! into [`AppError`], which carries a stable [`ErrorCode`] and knows its HTTP status.

/// Meal analysis and metabolic calculation errors
pub mod nutrition;
/// External collaborator (model service) errors
pub mod provider;

pub use nutrition::NutritionError;
pub use provider::ProviderError;

#[cfg(feature = "http-response")]
use axum::{
    response::{IntoResponse, Response},
    Json,
};
#[cfg(feature = "http-response")]
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// Malformed or out-of-range request data
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// Goal not present in the knowledge base
    #[serde(rename = "UNKNOWN_GOAL")]
    UnknownGoal = 3001,
    /// Gender has no BMR formula in the knowledge base
    #[serde(rename = "UNSUPPORTED_GENDER")]
    UnsupportedGender = 3002,
    /// Activity level has no multiplier in the knowledge base
    #[serde(rename = "UNSUPPORTED_ACTIVITY_LEVEL")]
    UnsupportedActivityLevel = 3003,
    /// Upload exceeds the configured size limit
    #[serde(rename = "PAYLOAD_TOO_LARGE")]
    PayloadTooLarge = 3004,

    // Image analysis (4000-4999)
    /// Vision model produced no usable ingredient list
    #[serde(rename = "EXTRACTION_FAILED")]
    ExtractionFailed = 4000,
    /// Food gate rejected the image
    #[serde(rename = "NOT_FOOD_IMAGE")]
    NotFoodImage = 4001,

    // External Services (5000-5999)
    /// An external model service returned an error
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalServiceError = 5000,
    /// An external model service is down or its circuit is open
    #[serde(rename = "EXTERNAL_SERVICE_UNAVAILABLE")]
    ExternalServiceUnavailable = 5001,

    // Configuration (6000-6999)
    /// Configuration error
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,
    /// Configuration is present but invalid
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6002,

    // Internal Errors (9000-9999)
    /// Service has not finished loading its static data
    #[serde(rename = "SERVICE_NOT_READY")]
    ServiceNotReady = 9001,
    /// Catch-all internal error
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Serialization failed
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::InvalidInput
            | Self::UnknownGoal
            | Self::UnsupportedGender
            | Self::UnsupportedActivityLevel
            | Self::ExtractionFailed
            | Self::NotFoodImage => 400,

            // 413 Payload Too Large
            Self::PayloadTooLarge => 413,

            // 502 Bad Gateway
            Self::ExternalServiceError => 502,

            // 503 Service Unavailable
            Self::ExternalServiceUnavailable | Self::ServiceNotReady => 503,

            // 500 Internal Server Error
            Self::ConfigError
            | Self::ConfigInvalid
            | Self::InternalError
            | Self::SerializationError => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::UnknownGoal => "The requested goal is not recognized",
            Self::UnsupportedGender => "The provided gender is not supported",
            Self::UnsupportedActivityLevel => "The provided activity level is not supported",
            Self::PayloadTooLarge => "The uploaded file is too large",
            Self::ExtractionFailed => "Could not analyze the image",
            Self::NotFoodImage => "The image does not appear to contain food",
            Self::ExternalServiceError => "An external service encountered an error",
            Self::ExternalServiceUnavailable => "An external service is currently unavailable",
            Self::ConfigError => "Configuration error encountered",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::ServiceNotReady => "The service is still starting up",
            Self::InternalError => "An internal server error occurred",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }

    /// Whether the message of this error is safe to show to API clients
    ///
    /// Server-side faults are reported with the generic description only.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.http_status() < 500
    }
}

/// Unified error type for the application
#[derive(Debug, Clone)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Structured details (valid options, retry hints, ...)
    pub details: Option<serde_json::Value>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach structured details
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Invalid input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Internal server error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Service still loading static data
    #[must_use]
    pub fn not_ready() -> Self {
        Self::new(
            ErrorCode::ServiceNotReady,
            "Knowledge base and nutrient catalog are not loaded yet",
        )
    }

    /// Upload exceeded the size limit
    #[must_use]
    pub fn payload_too_large(limit_bytes: usize) -> Self {
        Self::new(
            ErrorCode::PayloadTooLarge,
            format!("Uploaded file exceeds the limit of {limit_bytes} bytes"),
        )
        .with_details(serde_json::json!({ "limit_bytes": limit_bytes }))
    }

    /// External service error
    #[must_use]
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }

    /// Message to expose to API clients
    ///
    /// Server faults never leak their internal message.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.code.is_client_error() {
            self.message.clone()
        } else {
            self.code.description().to_owned()
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl StdError for AppError {}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response format: `{"error": "<message>", "code": "<CODE>"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    /// Stable machine-readable code
    pub code: ErrorCode,
    /// Optional structured details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        let details = if error.code.is_client_error() {
            error.details.clone()
        } else {
            None
        };
        Self {
            error: error.public_message(),
            code: error.code,
            details,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::SerializationError, error.to_string())
    }
}

#[cfg(feature = "http-response")]
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.code.is_client_error() {
            tracing::debug!(code = ?self.code, message = %self.message, "Client error");
        } else {
            tracing::error!(code = ?self.code, message = %self.message, "Server error");
        }

        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
