//! Error types for the scenario generation pipeline.
//!
//! The taxonomy distinguishes failures that abort the run (configuration,
//! model invocation, output writing) from per-source loading failures, which
//! are collected and only become fatal when no source loads at all. Parse
//! failures never surface as errors - the parser degrades to a partial or
//! empty list instead.

use thiserror::Error;

/// Errors surfaced by the pipeline and its components.
#[derive(Error, Debug)]
pub enum ScengenError {
    // Configuration errors - fatal, raised before any remote call
    #[error("configuration error: {reason}")]
    Config { reason: String },

    // Source-loading errors - per-source, non-fatal while another source
    // loads. The field is `source_name` rather than `source` so thiserror
    // does not treat it as an error-source chain.
    #[error("failed to load {source_name} source: {reason}")]
    SourceLoad { source_name: String, reason: String },

    #[error("no valid data sources were loaded. {details}")]
    NoSources { details: String },

    // Model-invocation errors - fatal to the run
    #[error(transparent)]
    Model(#[from] llm::LlmError),

    // Output-write errors - fatal, after generation succeeded
    #[error("failed to write '{path}': {reason}")]
    OutputWrite { path: String, reason: String },
}

impl ScengenError {
    /// Shorthand for a per-source loading failure.
    pub fn source_load(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceLoad {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for pipeline operations.
pub type ScengenResult<T> = Result<T, ScengenError>;
