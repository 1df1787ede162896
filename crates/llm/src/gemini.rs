//! Google Gemini provider implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::{LlmError, LlmResult};
use crate::provider::{GenerateOptions, Message, ModelProvider, ModelResponse, Role, TokenUsage};

/// Gemini API base URL.
const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Part of a Gemini content block - either text or inline image data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum GeminiPart {
    Text(String),
    #[serde(rename_all = "camelCase")]
    InlineData { mime_type: String, data: String },
}

/// A content block in a Gemini request.
#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

/// Generation parameters.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// Gemini generateContent request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    generation_config: GenerationConfig,
}

/// System instruction block (Gemini keeps it outside `contents`).
#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<GeminiPart>,
}

/// Gemini response content part.
#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

/// Gemini generateContent response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

/// Gemini API error payload.
#[derive(Debug, Deserialize)]
struct GeminiApiError {
    #[serde(default)]
    status: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiApiError,
}

/// Google Gemini provider.
pub struct GeminiProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider with an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: Some(api_key.into()),
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    /// Create from the `GOOGLE_API_KEY` environment variable.
    pub fn from_env() -> Self {
        Self {
            client: Client::new(),
            api_key: std::env::var("GOOGLE_API_KEY").ok(),
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    /// Set a custom base URL (used by tests).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Convert provider-neutral messages to Gemini format.
    ///
    /// System messages map to the separate `systemInstruction` field; user
    /// messages become `contents` entries with text first, then any images.
    fn convert_messages(messages: &[Message]) -> (Option<SystemInstruction>, Vec<GeminiContent>) {
        let mut system = None;
        let mut contents = Vec::new();

        for msg in messages {
            match msg.role {
                Role::System => {
                    system = Some(SystemInstruction {
                        parts: vec![GeminiPart::Text(msg.text.clone())],
                    });
                }
                Role::User => {
                    let mut parts = vec![GeminiPart::Text(msg.text.clone())];
                    for img in &msg.images {
                        parts.push(GeminiPart::InlineData {
                            mime_type: img.mime_type.clone(),
                            data: img.data.clone(),
                        });
                    }
                    contents.push(GeminiContent {
                        role: "user".to_string(),
                        parts,
                    });
                }
            }
        }

        (system, contents)
    }
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(
        &self,
        model: &str,
        messages: &[Message],
        options: &GenerateOptions,
    ) -> LlmResult<ModelResponse> {
        let api_key = self.api_key.as_ref().ok_or_else(|| LlmError::NotConfigured {
            reason: "GOOGLE_API_KEY not set".to_string(),
        })?;

        let (system_instruction, contents) = Self::convert_messages(messages);

        let request = GeminiRequest {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_tokens,
            },
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        tracing::debug!(model, "Calling Gemini API");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Request {
                reason: format!("Gemini API request failed: {e}"),
            })?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.map_err(|e| LlmError::Request {
                reason: format!("failed to read error response: {e}"),
            })?;

            if let Ok(err) = serde_json::from_str::<GeminiErrorResponse>(&body) {
                return Err(LlmError::Api {
                    status: err.error.status,
                    message: err.error.message,
                });
            }
            return Err(LlmError::Api {
                status: status.to_string(),
                message: body,
            });
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| LlmError::Request {
            reason: format!("failed to decode Gemini response: {e}"),
        })?;

        let text: String = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        let usage = parsed.usage_metadata.map_or_else(TokenUsage::default, |u| TokenUsage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        tracing::debug!(
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Gemini call complete"
        );

        Ok(ModelResponse {
            text,
            usage,
            model: parsed.model_version.unwrap_or_else(|| model.to_string()),
        })
    }
}

impl Default for GeminiProvider {
    fn default() -> Self {
        Self::from_env()
    }
}
