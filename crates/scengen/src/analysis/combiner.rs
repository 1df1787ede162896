//! Merges the loaded source texts into one feature analysis.

use std::sync::Arc;

use llm::{GenerateOptions, Message, ModelProvider};
use serde_json::json;

use crate::errors::ScengenResult;
use crate::sources::{AnalysisBundle, SourceKind};

use super::prompts::PromptManager;

/// First model pass: one text call that fuses whatever sources loaded.
pub struct DataCombiner {
    provider: Arc<dyn ModelProvider>,
    prompts: PromptManager,
    model: String,
    options: GenerateOptions,
}

impl DataCombiner {
    /// Create a new combiner.
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        model: String,
        options: GenerateOptions,
    ) -> ScengenResult<Self> {
        let prompts = PromptManager::new()?;
        Ok(Self {
            provider,
            prompts,
            model,
            options,
        })
    }

    /// Produce the combined feature analysis. Blank sources are omitted
    /// from the prompt entirely.
    pub async fn combine(&self, bundle: &AnalysisBundle) -> ScengenResult<String> {
        let data = json!({
            "jira": bundle.get_non_blank(SourceKind::Jira),
            "images": bundle.get_non_blank(SourceKind::Images),
            "excel": bundle.get_non_blank(SourceKind::Excel),
        });
        let prompt = self.prompts.render("combine", &data)?;

        tracing::info!(
            sources = ?bundle.loaded_names(),
            model = %self.model,
            "Combining data sources"
        );
        let response = self
            .provider
            .generate(&self.model, &[Message::user(prompt)], &self.options)
            .await?;

        tracing::debug!(chars = response.text.len(), "Combined analysis received");
        Ok(response.text)
    }
}
