//! Second model pass: the combined analysis becomes test scenarios.

use std::sync::Arc;

use llm::{GenerateOptions, Message, ModelProvider};
use serde_json::json;

use crate::errors::ScengenResult;

use super::parser::parse_scenarios;
use super::prompts::PromptManager;
use super::scenario::ScenarioRecord;

pub struct ScenarioGenerator {
    provider: Arc<dyn ModelProvider>,
    prompts: PromptManager,
    model: String,
    options: GenerateOptions,
}

impl ScenarioGenerator {
    /// Create a new generator.
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

    /// Ask the model for scenarios and parse whatever comes back.
    ///
    /// Model failures propagate; parse problems degrade to a shorter (or
    /// empty) list instead.
    pub async fn generate(&self, analysis: &str) -> ScengenResult<Vec<ScenarioRecord>> {
        let prompt = self
            .prompts
            .render("scenarios", &json!({ "analysis": analysis }))?;

        tracing::info!(model = %self.model, "Generating test scenarios");
        let response = self
            .provider
            .generate(&self.model, &[Message::user(prompt)], &self.options)
            .await?;

        let scenarios = parse_scenarios(&response.text);
        tracing::info!(count = scenarios.len(), "Parsed test scenarios");
        Ok(scenarios)
    }
}
