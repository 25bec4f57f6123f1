// ABOUTME: Vision extractor backed by an OpenAI-compatible multimodal chat completions endpoint
// ABOUTME: Prompts for descriptive ingredient names with gram estimates and parses the JSON reply
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Vision Extractor
//!
//! Sends the meal photo as a base64 `data:` URL together with an
//! ingredient-naming prompt, then parses the model's reply. The reply may be
//! wrapped in a ```` ```json ```` fence and may be either a bare array of
//! `{name, grams}` records or an object with an `ingredients` array.
//! Unparseable output is treated as "nothing found", not as an error.

use crate::http_client::{send_json, shared_client};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use fitbites_core::collaborators::VisionExtractor;
use fitbites_core::constants::collaborators::VISION_EXTRACTOR;
use fitbites_core::errors::ProviderError;
use fitbites_core::models::DetectedIngredient;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Default OpenAI-compatible API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default multimodal model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Ingredient-naming instructions sent with every image
pub const INGREDIENT_PROMPT: &str = r#"Analyze the given image and identify all the visible ingredients. For each ingredient, provide its name and the estimated weight in grams.

Naming Rules:
Avoid generic names like "Carrot" or "Tomato." Instead:
Specify type: (e.g., "Carrot, fresh, organic," "Tomato, raw, Roma").
Specify state or form: (e.g., "shredded," "sliced," "diced," "whole").
Specify preparation or intended use, if applicable (e.g., "Tomato, raw, for salad" or "Carrot, cooked, diced, for soup").
If the ingredient is raw, explicitly state it (e.g., "Tomato, raw").
If the ingredient is part of a prepared dish, describe it (e.g., "Tomato soup, canned, ready-to-serve").
Response Requirements:
The response must be a strict JSON object containing an array of objects.
Each object must have:
name (the detailed name of the ingredient).
grams (the estimated weight in grams).
Additional Notes:
Generic ingredient names are not acceptable.
Only include descriptive names that match the ingredient's form, state, and intended use.
Example Output:
[
  {"name": "Carrot, fresh, organic, whole", "grams": 50},
  {"name": "Tomato, raw, Roma, for salad", "grams": 30},
  {"name": "Feta cheese, crumbled, for garnish", "grams": 30}
]
"#;

/// Connection settings for the vision model
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// API base URL, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    /// Bearer token; optional for local servers
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: None,
            model: DEFAULT_MODEL.to_owned(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: [ContentPart<'a>; 2],
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// MIME type guessed from the image's leading bytes, JPEG when unknown
#[must_use]
pub fn image_mime_type(image: &[u8]) -> &'static str {
    if image.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if image.starts_with(b"GIF8") {
        "image/gif"
    } else if image.len() >= 12 && &image[0..4] == b"RIFF" && &image[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

/// Strip a surrounding Markdown code fence from a model reply
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    inner.strip_prefix("json").unwrap_or(inner).trim()
}

fn grams_from(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('g').trim().parse().ok(),
        _ => None,
    }
}

/// Parse a vision model reply into detected ingredients
///
/// Returns `None` when the reply is not JSON, has an unexpected shape, or
/// contains no valid records. Records with a blank name or non-positive grams
/// are dropped.
#[must_use]
pub fn parse_ingredient_list(reply: &str) -> Option<Vec<DetectedIngredient>> {
    let body = strip_code_fence(reply);
    let parsed: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Vision reply is not valid JSON");
            return None;
        }
    };

    let records = match parsed {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("ingredients") {
            Some(Value::Array(items)) => items,
            _ => {
                warn!("Vision reply object has no ingredients array");
                return None;
            }
        },
        _ => {
            warn!("Vision reply is neither an array nor an object");
            return None;
        }
    };

    let total = records.len();
    let ingredients: Vec<DetectedIngredient> = records
        .iter()
        .filter_map(|record| {
            let name = record.get("name")?.as_str()?.trim();
            let grams = grams_from(record.get("grams")?)?;
            let ingredient = DetectedIngredient::new(name, grams);
            ingredient.is_valid().then_some(ingredient)
        })
        .collect();

    if ingredients.len() < total {
        warn!(
            dropped = total - ingredients.len(),
            kept = ingredients.len(),
            "Dropped malformed ingredient records from vision reply"
        );
    }

    (!ingredients.is_empty()).then_some(ingredients)
}

/// Vision extractor for any OpenAI-compatible chat completions API
pub struct OpenAiVisionExtractor {
    client: Client,
    config: VisionConfig,
}

impl OpenAiVisionExtractor {
    /// Extractor using the shared HTTP client
    #[must_use]
    pub fn new(config: VisionConfig) -> Self {
        info!(base_url = %config.base_url, model = %config.model, "Initializing vision extractor");
        Self {
            client: shared_client().clone(),
            config,
        }
    }

    fn api_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl VisionExtractor for OpenAiVisionExtractor {
    async fn extract(&self, image: &[u8]) -> Result<Option<Vec<DetectedIngredient>>, ProviderError> {
        let data_url = format!(
            "data:{};base64,{}",
            image_mime_type(image),
            STANDARD.encode(image)
        );

        let body = ChatRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: [
                    ContentPart::Text {
                        text: INGREDIENT_PROMPT,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
        };

        let mut request = self.client.post(self.api_url()).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response: ChatResponse = send_json(VISION_EXTRACTOR, request).await?;
        let Some(content) = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
        else {
            warn!("Vision model returned no content");
            return Ok(None);
        };

        debug!(chars = content.len(), "Received vision reply");
        Ok(parse_ingredient_list(&content))
    }
}
