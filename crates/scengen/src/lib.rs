//! Test scenario generation pipeline.
//!
//! This crate provides:
//! - Source loaders for Jira issues, UI screenshots, and impact-area spreadsheets
//! - Model-backed combination, scenario generation, and summary agents
//! - A scenario response parser with a line-oriented fallback
//! - Spreadsheet and report output writers

pub mod analysis;
pub mod config;
pub mod errors;
pub mod output;
pub mod pipeline;
pub mod sources;

// Re-export main types
pub use analysis::{parse_scenarios, CompletenessReport, ScenarioRecord};
pub use config::Config;
pub use errors::{ScengenError, ScengenResult};
pub use pipeline::{Pipeline, RunInputs, RunResult};
pub use sources::AnalysisBundle;
