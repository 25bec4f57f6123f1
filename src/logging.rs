// ABOUTME: Logging configuration and structured logging setup for the nutrition server
// ABOUTME: Builds the tracing subscriber from environment variables with json, pretty, or compact output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Structured logging configuration
//!
//! | Variable | Effect |
//! |---|---|
//! | `RUST_LOG` | filter directives, `info` when unset |
//! | `LOG_FORMAT` | `json`, `compact`, anything else is pretty |
//! | `ENVIRONMENT` | `production` forces source locations on |
//! | `LOG_INCLUDE_LOCATION` | include file and line |
//! | `LOG_INCLUDE_SPANS` | emit span open and close events |

use anyhow::{Context, Result};
use fitbites_core::constants::service_names;
use std::env;
use std::io;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Dependencies that are too chatty at the application level
const NOISE_DIRECTIVES: [&str; 4] = [
    "hyper=warn",
    "hyper::proto=warn",
    "reqwest=warn",
    "tower_http=info",
];

/// Workspace crates that follow the configured level
const OWN_CRATES: [&str; 3] = [
    "fitbites_server",
    "fitbites_intelligence",
    "fitbites_providers",
];

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line, for log aggregation
    Json,
    /// Human readable multi-field output
    #[default]
    Pretty,
    /// Single-line output without targets
    Compact,
}

impl LogFormat {
    /// Parse a `LOG_FORMAT` value; unknown values fall back to pretty
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default level for the workspace crates
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Emit span open/close events
    pub include_spans: bool,
    /// Deployment environment name
    pub environment: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::default(),
            include_location: false,
            include_spans: false,
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Self {
            level: env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
            format: env::var("LOG_FORMAT")
                .map(|value| LogFormat::parse(&value))
                .unwrap_or_default(),
            include_location: environment == "production"
                || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_spans: env::var("LOG_INCLUDE_SPANS").is_ok(),
            environment,
        }
    }

    /// Filter from the configured level with noise reduction applied
    ///
    /// A `level` that is not a bare level (e.g. `debug,hyper=trace`) is used
    /// as the base directive list and the workspace crates are left alone.
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("info"));

        for directive in NOISE_DIRECTIVES {
            if let Ok(parsed) = directive.parse() {
                filter = filter.add_directive(parsed);
            }
        }

        if !self.level.contains(['=', ',']) {
            for krate in OWN_CRATES {
                if let Ok(parsed) = format!("{krate}={}", self.level).parse() {
                    filter = filter.add_directive(parsed);
                }
            }
        }
        filter
    }

    fn span_events(&self) -> FmtSpan {
        if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    /// Install the global tracing subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());
        let base = fmt::layer()
            .with_writer(io::stdout)
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_span_events(self.span_events());

        let installed = match self.format {
            LogFormat::Json => registry.with(base.json().with_current_span(true)).try_init(),
            LogFormat::Pretty => registry.with(base.with_target(true)).try_init(),
            LogFormat::Compact => registry.with(base.compact().with_target(false)).try_init(),
        };
        installed.context("Failed to install tracing subscriber")?;

        info!(
            service.name = service_names::FITBITES_SERVER,
            service.version = env!("CARGO_PKG_VERSION"),
            environment = %self.environment,
            log.level = %self.level,
            log.format = ?self.format,
            log.spans = self.include_spans,
            "Logging configured"
        );
        Ok(())
    }
}

/// Initialize logging from environment variables
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" Compact "), LogFormat::Compact);
        assert_eq!(LogFormat::parse("fancy"), LogFormat::Pretty);
    }

    #[test]
    fn test_span_events_follow_flag() {
        let mut config = LoggingConfig::default();
        assert_eq!(config.span_events(), FmtSpan::NONE);
        config.include_spans = true;
        assert_eq!(config.span_events(), FmtSpan::NEW | FmtSpan::CLOSE);
    }

    #[test]
    fn test_env_filter_accepts_directive_lists() {
        let config = LoggingConfig {
            level: "debug,hyper=trace".into(),
            ..LoggingConfig::default()
        };
        let rendered = config.env_filter().to_string();
        assert!(rendered.contains("reqwest=warn"));
        assert!(!rendered.contains("fitbites_server="));
    }
}
