//! Model provider trait and common message types.
//!
//! Defines the interface the pipeline uses to talk to a generative-model
//! service, independent of the concrete vendor API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::LlmResult;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message (sets context/behavior)
    System,
    /// User message (input)
    User,
}

/// An inline image attached to a message, already encoded for transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePart {
    /// MIME type of the encoded image (e.g. "image/jpeg")
    pub mime_type: String,
    /// Base64-encoded image bytes
    pub data: String,
}

impl ImagePart {
    /// Create a JPEG image part from base64-encoded data.
    pub fn jpeg(data: impl Into<String>) -> Self {
        Self {
            mime_type: "image/jpeg".to_string(),
            data: data.into(),
        }
    }
}

/// A message sent to a model, optionally carrying inline images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Text content
    pub text: String,
    /// Inline images, for vision-capable endpoints
    #[serde(default)]
    pub images: Vec<ImagePart>,
}

impl Message {
    /// Create a new system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            text: text.into(),
            images: Vec::new(),
        }
    }

    /// Create a new user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            images: Vec::new(),
        }
    }

    /// Create a user message with attached images.
    pub fn user_with_images(text: impl Into<String>, images: Vec<ImagePart>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            images,
        }
    }
}

/// Token usage information from a model response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens
    pub input_tokens: u32,
    /// Number of output tokens
    pub output_tokens: u32,
    /// Total tokens (input + output)
    pub total_tokens: u32,
}

/// Response from a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Generated text content
    pub text: String,
    /// Token usage information
    pub usage: TokenUsage,
    /// Model that generated the response
    pub model: String,
}

/// Options for text generation.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Temperature for sampling (0.0 to 1.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

/// Trait for generative-model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Get the provider name (e.g., "gemini").
    fn name(&self) -> &'static str;

    /// Check if the provider has credentials.
    fn is_configured(&self) -> bool;

    /// Generate text from messages.
    async fn generate(
        &self,
        model: &str,
        messages: &[Message],
        options: &GenerateOptions,
    ) -> LlmResult<ModelResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let sys = Message::system("be terse");
        assert_eq!(sys.role, Role::System);
        assert!(sys.images.is_empty());

        let user = Message::user_with_images("describe this", vec![ImagePart::jpeg("QUJD")]);
        assert_eq!(user.role, Role::User);
        assert_eq!(user.images.len(), 1);
        assert_eq!(user.images[0].mime_type, "image/jpeg");
    }
}
