//! Input source loaders and the per-run analysis bundle.

pub mod excel;
pub mod images;
pub mod jira;

pub use excel::ImpactSheet;
pub use images::{ImageAnalyzer, LoadedImage};
pub use jira::{extract_issue_key, JiraClient, JiraIssue};

use std::fmt;

/// The fixed set of input sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Issue-tracker ticket text.
    Jira,
    /// Vision-model analysis of UI screenshots.
    Images,
    /// Impact-area spreadsheet text.
    Excel,
}

impl SourceKind {
    /// All sources in pipeline order.
    #[must_use]
    pub fn all() -> &'static [SourceKind] {
        &[SourceKind::Jira, SourceKind::Images, SourceKind::Excel]
    }

    /// Canonical name used in prompts and diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Jira => "jira",
            SourceKind::Images => "images",
            SourceKind::Excel => "excel",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-run mapping of source to extracted plain text.
///
/// Built once by the orchestrator, consumed by the prompt builders, then
/// discarded. A source that failed to load is simply absent.
#[derive(Debug, Clone, Default)]
pub struct AnalysisBundle {
    jira: Option<String>,
    images: Option<String>,
    excel: Option<String>,
}

impl AnalysisBundle {
    /// Create an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store extracted text for a source.
    pub fn insert(&mut self, kind: SourceKind, text: String) {
        let slot = match kind {
            SourceKind::Jira => &mut self.jira,
            SourceKind::Images => &mut self.images,
            SourceKind::Excel => &mut self.excel,
        };
        *slot = Some(text);
    }

    /// Get the text for a source, if it loaded.
    #[must_use]
    pub fn get(&self, kind: SourceKind) -> Option<&str> {
        match kind {
            SourceKind::Jira => self.jira.as_deref(),
            SourceKind::Images => self.images.as_deref(),
            SourceKind::Excel => self.excel.as_deref(),
        }
    }

    /// Get the text for a source only when it is present and non-blank.
    #[must_use]
    pub fn get_non_blank(&self, kind: SourceKind) -> Option<&str> {
        self.get(kind).filter(|t| !t.trim().is_empty())
    }

    /// Number of loaded sources.
    #[must_use]
    pub fn len(&self) -> usize {
        SourceKind::all().iter().filter(|k| self.get(**k).is_some()).count()
    }

    /// Whether no source loaded at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of the loaded sources, in pipeline order.
    #[must_use]
    pub fn loaded_names(&self) -> Vec<&'static str> {
        SourceKind::all()
            .iter()
            .filter(|k| self.get(**k).is_some())
            .map(SourceKind::name)
            .collect()
    }
}
