// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses ports, data file paths, collaborator endpoints, and resilience limits from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration

use anyhow::{anyhow, Context, Result};
use fitbites_core::constants::limits;
use fitbites_providers::vision::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use serde::{Deserialize, Serialize};
use std::env;
use std::error::Error as StdError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Default HTTP port
pub const DEFAULT_HTTP_PORT: u16 = 8000;
/// Default bind address
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default knowledge base document
pub const DEFAULT_KNOWLEDGE_BASE_PATH: &str = "data/nutrition_db.json";
/// Default nutrient catalog document
pub const DEFAULT_CATALOG_PATH: &str = "data/food_db.json";

/// Static data files loaded at start-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// BMR formulas, activity factors, and goal rules
    pub knowledge_base_path: PathBuf,
    /// Per-100g nutrient catalog
    pub catalog_path: PathBuf,
}

/// Vision model endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionLlmConfig {
    /// OpenAI-compatible API base URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Bearer token
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

/// Zero-shot food classifier endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodGateConfig {
    /// Reject non-food photos before extraction
    pub enabled: bool,
    /// Classification endpoint
    pub url: Option<String>,
    /// Bearer token
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

/// Ingredient resolver selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Remote vector search endpoint; the in-process token resolver is used when unset
    pub vector_index_url: Option<String>,
    /// Matches scoring below this are treated as catalog misses
    pub min_score: Option<f32>,
}

/// Timeout and retry limits applied to every collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaboratorConfig {
    /// Per-attempt timeout in seconds
    pub timeout_secs: u64,
    /// Retries after the first attempt
    pub max_retries: u32,
}

impl CollaboratorConfig {
    /// Per-attempt timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP port
    pub http_port: u16,
    /// Bind address
    pub host: String,
    /// Comma-separated allowed origins, or `*`
    pub cors_allowed_origins: Vec<String>,
    /// Maximum accepted request body in bytes
    pub max_upload_bytes: usize,
    /// Static data files
    pub data: DataConfig,
    /// Vision model
    pub vision: VisionLlmConfig,
    /// Food classifier
    pub food_gate: FoodGateConfig,
    /// Ingredient resolver
    pub resolver: ResolverConfig,
    /// Collaborator resilience limits
    pub collaborators: CollaboratorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            host: DEFAULT_HOST.to_owned(),
            cors_allowed_origins: vec!["*".to_owned()],
            max_upload_bytes: limits::DEFAULT_MAX_UPLOAD_BYTES,
            data: DataConfig {
                knowledge_base_path: PathBuf::from(DEFAULT_KNOWLEDGE_BASE_PATH),
                catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            },
            vision: VisionLlmConfig {
                base_url: DEFAULT_BASE_URL.to_owned(),
                model: DEFAULT_MODEL.to_owned(),
                api_key: None,
            },
            food_gate: FoodGateConfig {
                enabled: false,
                url: None,
                api_key: None,
            },
            resolver: ResolverConfig {
                vector_index_url: None,
                min_score: None,
            },
            collaborators: CollaboratorConfig {
                timeout_secs: 60,
                max_retries: 1,
            },
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed, or if
    /// the resulting configuration fails [`ServerConfig::validate`]
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        let defaults = Self::default();

        let config = Self {
            http_port: parse_var("HTTP_PORT", defaults.http_port)?,
            host: env_var_or("HOST", DEFAULT_HOST),
            cors_allowed_origins: parse_origins(&env_var_or("CORS_ALLOWED_ORIGINS", "*")),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            data: DataConfig {
                knowledge_base_path: PathBuf::from(env_var_or(
                    "KNOWLEDGE_BASE_PATH",
                    DEFAULT_KNOWLEDGE_BASE_PATH,
                )),
                catalog_path: PathBuf::from(env_var_or(
                    "NUTRIENT_CATALOG_PATH",
                    DEFAULT_CATALOG_PATH,
                )),
            },
            vision: VisionLlmConfig {
                base_url: env_var_or("VISION_LLM_BASE_URL", DEFAULT_BASE_URL),
                model: env_var_or("VISION_LLM_MODEL", DEFAULT_MODEL),
                api_key: optional_var("VISION_LLM_API_KEY")
                    .or_else(|| optional_var("OPENAI_API_KEY")),
            },
            food_gate: FoodGateConfig {
                enabled: parse_var("FOOD_GATE_ENABLED", false)?,
                url: optional_var("FOOD_GATE_URL"),
                api_key: optional_var("FOOD_GATE_API_KEY"),
            },
            resolver: ResolverConfig {
                vector_index_url: optional_var("VECTOR_INDEX_URL"),
                min_score: optional_var("RESOLVER_MIN_SCORE")
                    .map(|raw| {
                        raw.parse::<f32>()
                            .with_context(|| format!("Invalid RESOLVER_MIN_SCORE value: {raw}"))
                    })
                    .transpose()?,
            },
            collaborators: CollaboratorConfig {
                timeout_secs: parse_var(
                    "COLLABORATOR_TIMEOUT_SECS",
                    defaults.collaborators.timeout_secs,
                )?,
                max_retries: parse_var(
                    "COLLABORATOR_MAX_RETRIES",
                    defaults.collaborators.max_retries,
                )?,
            },
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error for settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            return Err(anyhow!("MAX_UPLOAD_BYTES must be greater than zero"));
        }

        if self.collaborators.timeout_secs == 0 {
            return Err(anyhow!("COLLABORATOR_TIMEOUT_SECS must be greater than zero"));
        }

        if let Some(score) = self.resolver.min_score {
            if !(0.0..=1.0).contains(&score) {
                return Err(anyhow!(
                    "RESOLVER_MIN_SCORE must be between 0 and 1, got {score}"
                ));
            }
        }

        if self.food_gate.enabled && self.food_gate.url.is_none() {
            return Err(anyhow!("FOOD_GATE_ENABLED is set but FOOD_GATE_URL is missing"));
        }

        if self.vision.api_key.is_none() {
            warn!("No vision API key configured; uploads only work against an unauthenticated endpoint");
        }

        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "FitBites Server Configuration:\n\
             - Bind: {}:{}\n\
             - Knowledge Base: {}\n\
             - Nutrient Catalog: {}\n\
             - Max Upload: {} bytes\n\
             - CORS Origins: {}\n\
             - Vision Model: {} via {} (key {})\n\
             - Food Gate: {}\n\
             - Resolver: {}\n\
             - Resolver Min Score: {}\n\
             - Collaborator Timeout: {}s, Retries: {}",
            self.host,
            self.http_port,
            self.data.knowledge_base_path.display(),
            self.data.catalog_path.display(),
            self.max_upload_bytes,
            self.cors_allowed_origins.join(","),
            self.vision.model,
            self.vision.base_url,
            if self.vision.api_key.is_some() {
                "set"
            } else {
                "unset"
            },
            if self.food_gate.enabled {
                "Enabled"
            } else {
                "Disabled"
            },
            self.resolver
                .vector_index_url
                .as_deref()
                .unwrap_or("local token index"),
            self.resolver
                .min_score
                .map_or_else(|| "none".to_owned(), |score| score.to_string()),
            self.collaborators.timeout_secs,
            self.collaborators.max_retries,
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Non-empty environment variable
fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    optional_var(key).map_or(Ok(default), |raw| {
        raw.parse::<T>()
            .with_context(|| format!("Invalid {key} value: {raw}"))
    })
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), vec!["*"]);
        assert_eq!(
            parse_origins("https://a.example, https://b.example,"),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.http_port, 8000);
        assert_eq!(config.collaborators.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_validate_rejects_gate_without_url() {
        let mut config = ServerConfig::default();
        config.food_gate.enabled = true;
        assert!(config.validate().is_err());
        config.food_gate.url = Some("http://localhost:9000/classify".to_owned());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_score() {
        let mut config = ServerConfig::default();
        config.resolver.min_score = Some(1.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_summary_hides_secrets() {
        let mut config = ServerConfig::default();
        config.vision.api_key = Some("sk-secret".to_owned());
        let summary = config.summary();
        assert!(!summary.contains("sk-secret"));
        assert!(summary.contains("key set"));
    }
}
