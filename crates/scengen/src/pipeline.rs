//! The run orchestrator: load sources, score them, run the three model
//! passes, write the workbook and report.

use std::path::PathBuf;
use std::sync::Arc;

use llm::{GenerateOptions, ModelProvider};

use crate::analysis::summary::render_report;
use crate::analysis::{
    assess, CompletenessReport, DataCombiner, ScenarioAnalyzer, ScenarioGenerator,
};
use crate::config::Config;
use crate::errors::{ScengenError, ScengenResult};
use crate::output;
use crate::sources::{self, AnalysisBundle, ImageAnalyzer, JiraClient, SourceKind};

/// Default workbook filename when the caller does not pick one.
pub const DEFAULT_OUTPUT_NAME: &str = "test_scenarios.xlsx";

/// What to load for a run. At least one source must be given.
#[derive(Debug, Clone, Default)]
pub struct RunInputs {
    /// Jira issue key or URL.
    pub jira: Option<String>,
    /// Screenshot paths.
    pub images: Vec<PathBuf>,
    /// Impact-area spreadsheet path.
    pub excel: Option<PathBuf>,
    /// Workbook filename, relative to the output directory.
    pub output_name: Option<String>,
}

/// What a successful run produced.
#[derive(Debug)]
pub struct RunResult {
    pub sources_loaded: Vec<&'static str>,
    /// Per-source failures that did not stop the run.
    pub source_errors: Vec<String>,
    pub completeness: CompletenessReport,
    pub scenario_count: usize,
    pub workbook_path: PathBuf,
    pub report_path: PathBuf,
}

pub struct Pipeline {
    config: Config,
    provider: Arc<dyn ModelProvider>,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: Config, provider: Arc<dyn ModelProvider>) -> Self {
        Self { config, provider }
    }

    fn options(&self) -> GenerateOptions {
        GenerateOptions {
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
        }
    }

    /// Run the whole pipeline from raw inputs.
    ///
    /// Source loading is best-effort: a failing source is recorded and the
    /// run continues, but zero loaded sources aborts before any generative
    /// call is made.
    pub async fn run(&self, inputs: RunInputs) -> ScengenResult<RunResult> {
        if inputs.jira.is_none() && inputs.images.is_empty() && inputs.excel.is_none() {
            return Err(ScengenError::Config {
                reason: "at least one data source is required (Jira issue, images, or Excel file)"
                    .to_string(),
            });
        }

        let (bundle, source_errors) = self.load_sources(&inputs).await;
        if bundle.is_empty() {
            return Err(ScengenError::NoSources {
                details: source_errors.join("; "),
            });
        }

        self.run_from_bundle(bundle, inputs.output_name, source_errors)
            .await
    }

    /// Run the model passes and writers on an already-built bundle.
    ///
    /// Useful when the source texts were extracted elsewhere.
    pub async fn run_from_bundle(
        &self,
        bundle: AnalysisBundle,
        output_name: Option<String>,
        source_errors: Vec<String>,
    ) -> ScengenResult<RunResult> {
        let completeness = assess(&bundle);
        tracing::info!(
            overall = completeness.overall,
            sufficient = completeness.sufficient,
            "Input completeness assessed"
        );
        if !completeness.sufficient {
            tracing::warn!("Input data may be too thin for high-quality scenarios");
            for recommendation in &completeness.recommendations {
                tracing::warn!("  - {recommendation}");
            }
        }

        let model = self.config.model.clone();
        let options = self.options();

        let combiner = DataCombiner::new(self.provider.clone(), model.clone(), options.clone())?;
        let combined = combiner.combine(&bundle).await?;

        let generator =
            ScenarioGenerator::new(self.provider.clone(), model.clone(), options.clone())?;
        let scenarios = generator.generate(&combined).await?;

        let analyzer = ScenarioAnalyzer::new(self.provider.clone(), model, options)?;
        let outcome = analyzer.summarize(&scenarios, &combined).await;
        let report = render_report(&outcome);

        let name = output_name.unwrap_or_else(|| DEFAULT_OUTPUT_NAME.to_string());
        let workbook_path = self.config.output_dir.join(name);
        output::write_scenarios(&workbook_path, &scenarios)?;
        let report_path = output::write_report(&workbook_path, &report)?;

        Ok(RunResult {
            sources_loaded: bundle.loaded_names(),
            source_errors,
            completeness,
            scenario_count: scenarios.len(),
            workbook_path,
            report_path,
        })
    }

    /// Load every requested source, collecting failures instead of
    /// stopping on the first one.
    pub async fn load_sources(&self, inputs: &RunInputs) -> (AnalysisBundle, Vec<String>) {
        let mut bundle = AnalysisBundle::new();
        let mut errors = Vec::new();

        if let Some(jira_input) = &inputs.jira {
            match self.load_jira(jira_input).await {
                Ok(text) => bundle.insert(SourceKind::Jira, text),
                Err(err) => {
                    tracing::error!(error = %err, "Jira source failed");
                    errors.push(err.to_string());
                }
            }
        }

        if !inputs.images.is_empty() {
            match self.load_images(&inputs.images).await {
                Ok(text) => bundle.insert(SourceKind::Images, text),
                Err(err) => {
                    tracing::error!(error = %err, "Image source failed");
                    errors.push(err.to_string());
                }
            }
        }

        if let Some(excel_path) = &inputs.excel {
            match load_excel(excel_path) {
                Ok(text) => bundle.insert(SourceKind::Excel, text),
                Err(err) => {
                    tracing::error!(error = %err, "Excel source failed");
                    errors.push(err.to_string());
                }
            }
        }

        (bundle, errors)
    }

    async fn load_jira(&self, input: &str) -> ScengenResult<String> {
        let client = JiraClient::new(self.config.jira()?);
        let issue = client.load_from_input(input).await?;
        Ok(sources::jira::format_issue(&issue))
    }

    async fn load_images(&self, paths: &[PathBuf]) -> ScengenResult<String> {
        let images = sources::images::load_images(paths);
        if images.is_empty() {
            return Err(ScengenError::source_load(
                "images",
                "none of the provided image files could be loaded",
            ));
        }

        let analyzer =
            ImageAnalyzer::new(self.provider.clone(), self.config.model.clone(), self.options())?;
        let text = analyzer.analyze(&images).await?;
        if text.trim().is_empty() {
            return Err(ScengenError::source_load(
                "images",
                "image analysis returned empty results",
            ));
        }
        Ok(text)
    }
}

fn load_excel(path: &std::path::Path) -> ScengenResult<String> {
    let sheet = sources::excel::read_impact_areas(path)?;
    let text = sources::excel::format_impact_text(&sheet);
    if sheet.is_empty() {
        return Err(ScengenError::source_load(
            "excel",
            format!("no usable rows in '{}'", path.display()),
        ));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use llm::{LlmError, LlmResult, Message, ModelResponse, TokenUsage};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Provider returning canned responses in call order.
    struct ScriptedProvider {
        responses: Mutex<VecDeque<String>>,
    }

    impl ScriptedProvider {
        fn new(responses: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.iter().map(|s| (*s).to_string()).collect()),
            })
        }
    }

    #[async_trait]
    impl ModelProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn generate(
            &self,
            model: &str,
            _messages: &[Message],
            _options: &GenerateOptions,
        ) -> LlmResult<ModelResponse> {
            let text = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(LlmError::EmptyResponse)?;
            Ok(ModelResponse {
                text,
                usage: TokenUsage::default(),
                model: model.to_string(),
            })
        }
    }

    fn pipeline_with(provider: Arc<dyn ModelProvider>, output_dir: &std::path::Path) -> Pipeline {
        let mut config = Config::new("test-key".to_string());
        config.output_dir = output_dir.to_path_buf();
        Pipeline::new(config, provider)
    }

    #[tokio::test]
    async fn run_requires_at_least_one_input() {
        let provider = ScriptedProvider::new(&[]);
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_with(provider, dir.path());
        let err = pipeline.run(RunInputs::default()).await.unwrap_err();
        assert!(matches!(err, ScengenError::Config { .. }));
    }

    #[tokio::test]
    async fn all_sources_failing_aborts_with_details() {
        let provider = ScriptedProvider::new(&[]);
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_with(provider, dir.path());
        let inputs = RunInputs {
            excel: Some(dir.path().join("missing.xlsx")),
            ..RunInputs::default()
        };
        let err = pipeline.run(inputs).await.unwrap_err();
        match err {
            ScengenError::NoSources { details } => assert!(details.contains("excel")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn bundle_run_generates_and_writes_outputs() {
        let scenarios_json = r#"[
            {"id": "TS001", "category": "Functional", "scenario": "Verify save works", "priority": "P0"},
            {"id": "TS002", "category": "Data", "scenario": "Verify records persist", "priority": "P2"}
        ]"#;
        let provider =
            ScriptedProvider::new(&["combined feature analysis", scenarios_json, "summary body"]);
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_with(provider, dir.path());

        let mut bundle = AnalysisBundle::new();
        bundle.insert(SourceKind::Jira, "PROJ-1: add bulk export".to_string());

        let result = pipeline
            .run_from_bundle(bundle, None, Vec::new())
            .await
            .unwrap();

        assert_eq!(result.scenario_count, 2);
        assert_eq!(result.sources_loaded, vec!["jira"]);
        assert!(result.workbook_path.ends_with("test_scenarios.xlsx"));
        assert!(result.workbook_path.exists());
        let report = std::fs::read_to_string(&result.report_path).unwrap();
        assert!(report.contains("summary body"));
        assert!(report.contains("Successfully generated 2 test scenarios"));
    }

    #[tokio::test]
    async fn generation_failure_aborts_the_run() {
        // Only the combine response is scripted; the generate call fails.
        let provider = ScriptedProvider::new(&["combined feature analysis"]);
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_with(provider, dir.path());

        let mut bundle = AnalysisBundle::new();
        bundle.insert(SourceKind::Jira, "PROJ-1".to_string());

        let err = pipeline
            .run_from_bundle(bundle, None, Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ScengenError::Model(_)));
        assert!(!dir.path().join("test_scenarios.xlsx").exists());
    }

    #[tokio::test]
    async fn summary_failure_degrades_into_the_report() {
        let scenarios_json =
            r#"[{"id": "TS001", "category": "Functional", "scenario": "Verify save", "priority": "P1"}]"#;
        // No third response: the summary call errors and is folded in.
        let provider = ScriptedProvider::new(&["combined", scenarios_json]);
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_with(provider, dir.path());

        let mut bundle = AnalysisBundle::new();
        bundle.insert(SourceKind::Excel, "impact rows".to_string());

        let result = pipeline
            .run_from_bundle(bundle, Some("custom.xlsx".to_string()), Vec::new())
            .await
            .unwrap();
        assert_eq!(result.scenario_count, 1);
        let report = std::fs::read_to_string(&result.report_path).unwrap();
        assert!(report.contains("Summary generation failed"));
    }
}
