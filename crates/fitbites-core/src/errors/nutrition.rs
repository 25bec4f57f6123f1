// ABOUTME: Typed errors for metabolic calculations and meal nutrition analysis
// ABOUTME: Validation failures list the valid options loaded from the knowledge base
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{AppError, ErrorCode, ProviderError};
use thiserror::Error;

/// Errors raised by the metabolic calculator and the nutrition aggregator.
///
/// A catalog miss is deliberately absent: unresolved ingredients degrade to a
/// zero vector and are flagged on the ingredient record instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NutritionError {
    /// Goal not present in the loaded knowledge base
    #[error("Goal '{goal}' is not recognized. Available options: {}", .available.join(", "))]
    UnknownGoal {
        /// Goal as requested
        goal: String,
        /// Goals present in the knowledge base
        available: Vec<String>,
    },

    /// No BMR formula for this gender
    #[error("Unsupported gender '{gender}'. Use one of: {}", .supported.join(", "))]
    UnsupportedGender {
        /// Gender as requested
        gender: String,
        /// Genders with a BMR formula
        supported: Vec<String>,
    },

    /// No activity multiplier for this level
    #[error("Unsupported activity level '{level}'. Choose from: {}", .valid.join(", "))]
    UnsupportedActivityLevel {
        /// Activity level as requested
        level: String,
        /// Activity levels with a multiplier
        valid: Vec<String>,
    },

    /// Vision model produced no usable ingredient list
    #[error("Failed to extract ingredients or calculate nutrition.")]
    ExtractionFailed,

    /// Food gate rejected the image
    #[error("The uploaded image does not appear to show food.")]
    NotFoodImage,

    /// Request data failed validation
    #[error("{0}")]
    InvalidInput(String),

    /// A configured BMR formula could not be evaluated
    #[error("BMR formula for '{gender}' could not be evaluated: {reason}")]
    Formula {
        /// Gender whose formula failed
        gender: String,
        /// Evaluator failure
        reason: String,
    },

    /// An external collaborator failed outright
    #[error(transparent)]
    Collaborator(#[from] ProviderError),
}

impl NutritionError {
    /// Create an invalid-input error
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Error code for the transport layer
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownGoal { .. } => ErrorCode::UnknownGoal,
            Self::UnsupportedGender { .. } => ErrorCode::UnsupportedGender,
            Self::UnsupportedActivityLevel { .. } => ErrorCode::UnsupportedActivityLevel,
            Self::ExtractionFailed => ErrorCode::ExtractionFailed,
            Self::NotFoodImage => ErrorCode::NotFoodImage,
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::Formula { .. } => ErrorCode::ConfigInvalid,
            Self::Collaborator(_) => ErrorCode::ExternalServiceError,
        }
    }

    /// Valid options for validation errors, if any
    #[must_use]
    pub fn valid_options(&self) -> Option<&[String]> {
        match self {
            Self::UnknownGoal { available, .. } => Some(available),
            Self::UnsupportedGender { supported, .. } => Some(supported),
            Self::UnsupportedActivityLevel { valid, .. } => Some(valid),
            _ => None,
        }
    }
}

impl From<NutritionError> for AppError {
    fn from(error: NutritionError) -> Self {
        if let NutritionError::Collaborator(provider_error) = error {
            return provider_error.into();
        }
        let app_error = Self::new(error.code(), error.to_string());
        match error.valid_options() {
            Some(options) => {
                app_error.with_details(serde_json::json!({ "available_options": options }))
            }
            None => app_error,
        }
    }
}
