// ABOUTME: Shared HTTP client and JSON request helper for model service calls
// ABOUTME: Maps reqwest failures and non-2xx statuses onto ProviderError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use fitbites_core::errors::ProviderError;
use reqwest::{Client, ClientBuilder, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

/// Transport-level request timeout; the call guard applies its own, usually shorter, deadline
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// TCP connect timeout
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

static CLIENT_TIMEOUTS: OnceLock<(u64, u64)> = OnceLock::new();
static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

/// Set timeouts for the shared client; only the first call has an effect
pub fn initialize_shared_client(timeout_secs: u64, connect_timeout_secs: u64) {
    let _ = CLIENT_TIMEOUTS.set((timeout_secs, connect_timeout_secs));
}

/// Pooled client shared by every collaborator
pub fn shared_client() -> &'static Client {
    SHARED_CLIENT.get_or_init(|| {
        let (timeout, connect_timeout) = CLIENT_TIMEOUTS
            .get()
            .copied()
            .unwrap_or((DEFAULT_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS));

        ClientBuilder::new()
            .timeout(Duration::from_secs(timeout))
            .connect_timeout(Duration::from_secs(connect_timeout))
            .user_agent(concat!("fitbites-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}

fn send_error(service: &str, error: &reqwest::Error) -> ProviderError {
    if error.is_connect() {
        ProviderError::transport(service, format!("connection failed: {error}"))
    } else if error.is_timeout() {
        ProviderError::transport(service, format!("request timed out: {error}"))
    } else {
        ProviderError::transport(service, error.to_string())
    }
}

/// Send `request` and decode a JSON body
///
/// # Errors
///
/// `ProviderError::Transport` if the request cannot be sent or the body read,
/// `ProviderError::Http` for non-2xx statuses, and
/// `ProviderError::InvalidResponse` if the body does not decode as `T`
pub async fn send_json<T: DeserializeOwned>(
    service: &str,
    request: RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| send_error(service, &e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::transport(service, format!("failed to read body: {e}")))?;

    if !status.is_success() {
        return Err(ProviderError::http(service, status.as_u16(), &body));
    }

    debug!(service, status = status.as_u16(), bytes = body.len(), "Collaborator responded");

    serde_json::from_str(&body)
        .map_err(|e| ProviderError::invalid_response(service, format!("undecodable body: {e}")))
}
