//! Writes the text analysis report that accompanies the workbook.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{ScengenError, ScengenResult};

/// Report path derived from the workbook path: same directory, same base
/// name, `_analysis_report.txt` suffix.
#[must_use]
pub fn report_path(workbook_path: &Path) -> PathBuf {
    let stem = workbook_path
        .file_stem()
        .map_or_else(|| "test_scenarios".to_string(), |s| s.to_string_lossy().into_owned());
    workbook_path.with_file_name(format!("{stem}_analysis_report.txt"))
}

/// Write the report next to the workbook and return its path.
pub fn write_report(workbook_path: &Path, content: &str) -> ScengenResult<PathBuf> {
    let path = report_path(workbook_path);
    fs::write(&path, content).map_err(|err| ScengenError::OutputWrite {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    tracing::info!(path = %path.display(), "Analysis report written");
    Ok(path)
}
