// ABOUTME: Unified error handling re-exported from fitbites-core
// ABOUTME: AppError, ErrorCode, and domain errors used by the HTTP layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use fitbites_core::errors::*;
