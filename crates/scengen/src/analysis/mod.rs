//! Model-backed analysis: prompt templates, the scenario parser, the
//! completeness scorer, and the three pipeline agents.

pub mod combiner;
pub mod completeness;
pub mod generator;
pub mod parser;
pub mod prompts;
pub mod scenario;
pub mod summary;

pub use combiner::DataCombiner;
pub use completeness::{assess, CompletenessReport, SourceStatus};
pub use generator::ScenarioGenerator;
pub use parser::parse_scenarios;
pub use prompts::PromptManager;
pub use scenario::ScenarioRecord;
pub use summary::{AnalysisOutcome, ScenarioAnalyzer};
