//! Heuristic scoring of how much usable source material a run has.
//!
//! Scores are advisory only. A low score is logged with recommendations
//! but never stops a run on its own.

use std::fmt;

use crate::sources::{AnalysisBundle, SourceKind};

/// Character counts treated as "fully detailed" for each source. Anything
/// longer scores 1.0.
fn reference_length(kind: SourceKind) -> usize {
    match kind {
        SourceKind::Jira => 1000,
        SourceKind::Images => 500,
        SourceKind::Excel => 300,
    }
}

/// Overall scores at or below this are flagged as insufficient.
const SUFFICIENT_THRESHOLD: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    Available,
    Empty,
    Missing,
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Empty => write!(f, "empty"),
            Self::Missing => write!(f, "missing"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceAssessment {
    pub kind: SourceKind,
    pub status: SourceStatus,
    /// Present only for available sources.
    pub score: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct CompletenessReport {
    pub sources: Vec<SourceAssessment>,
    pub overall: f32,
    pub sufficient: bool,
    pub recommendations: Vec<String>,
}

/// Score the bundle's sources against their reference lengths.
///
/// The overall score is the mean over sources that carry content; a run is
/// sufficient when at least one source is present and the mean clears the
/// threshold.
pub fn assess(bundle: &AnalysisBundle) -> CompletenessReport {
    let mut sources = Vec::new();
    let mut recommendations = Vec::new();
    let mut total = 0.0_f32;
    let mut available = 0_usize;

    for &kind in SourceKind::all() {
        let (status, score) = match bundle.get(kind) {
            None => {
                recommendations.push(format!("No {kind} content provided"));
                (SourceStatus::Missing, None)
            }
            Some(text) if text.trim().is_empty() => {
                recommendations.push(format!("{kind} content is empty"));
                (SourceStatus::Empty, None)
            }
            Some(text) => {
                #[allow(clippy::cast_precision_loss)]
                let score = (text.trim().len() as f32 / reference_length(kind) as f32).min(1.0);
                total += score;
                available += 1;
                (SourceStatus::Available, Some(score))
            }
        };
        sources.push(SourceAssessment { kind, status, score });
    }

    #[allow(clippy::cast_precision_loss)]
    let overall = if available > 0 {
        total / available as f32
    } else {
        0.0
    };

    if overall < 0.5 {
        recommendations
            .push("Consider providing more detailed content in available data sources".to_string());
    }
    if available < 2 {
        recommendations
            .push("Having multiple data sources will improve test scenario quality".to_string());
    }

    CompletenessReport {
        sources,
        overall,
        sufficient: available >= 1 && overall > SUFFICIENT_THRESHOLD,
        recommendations,
    }
}
