//! Generative-model client layer.
//!
//! This crate provides:
//! - A provider abstraction for text-and-image completion services
//! - A Google Gemini REST implementation
//! - A closed error taxonomy for model invocation failures

pub mod errors;
pub mod gemini;
pub mod provider;

// Re-export main types
pub use errors::{LlmError, LlmResult};
pub use gemini::GeminiProvider;
pub use provider::{
    GenerateOptions, ImagePart, Message, ModelProvider, ModelResponse, Role, TokenUsage,
};
