//! Impact-area spreadsheet loading.
//!
//! Reads the first worksheet, drops fully-empty rows and columns, trims
//! string cells, and renders the result as plain text for the combination
//! prompt.

use calamine::{open_workbook_auto, Data, Reader};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::Path;

use crate::errors::{ScengenError, ScengenResult};

/// Column-name fragments that suggest impact-area content.
const IMPACT_KEYWORDS: &[&str] = &[
    "impact", "area", "component", "module", "system", "feature", "service", "api", "endpoint",
    "database", "table", "function", "class", "method", "file", "page", "screen", "workflow",
];

/// A cleaned impact-area worksheet.
#[derive(Debug, Clone)]
pub struct ImpactSheet {
    pub file_name: String,
    pub headers: Vec<String>,
    /// Data rows, aligned with `headers`.
    pub rows: Vec<Vec<String>>,
}

impl ImpactSheet {
    /// Whether the sheet carries no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read the first worksheet of a tabular file.
pub fn read_impact_areas(path: &Path) -> ScengenResult<ImpactSheet> {
    if !path.exists() {
        return Err(ScengenError::source_load(
            "excel",
            format!("file not found: {}", path.display()),
        ));
    }

    tracing::info!(path = %path.display(), "Loading spreadsheet");

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ScengenError::source_load("excel", format!("failed to open workbook: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ScengenError::source_load("excel", "workbook has no sheets"))?
        .map_err(|e| ScengenError::source_load("excel", format!("failed to read sheet: {e}")))?;

    let mut raw_rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    if raw_rows.is_empty() {
        tracing::warn!(file = file_name, "Spreadsheet is empty");
        return Ok(ImpactSheet {
            file_name,
            headers: Vec::new(),
            rows: Vec::new(),
        });
    }

    let headers = raw_rows.remove(0);
    let (headers, rows) = clean(headers, raw_rows);

    tracing::info!(
        rows = rows.len(),
        columns = headers.len(),
        "Loaded spreadsheet"
    );

    Ok(ImpactSheet {
        file_name,
        headers,
        rows,
    })
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string().trim().to_string(),
    }
}

/// Drop fully-empty data rows, then columns whose data cells are all empty.
fn clean(headers: Vec<String>, rows: Vec<Vec<String>>) -> (Vec<String>, Vec<Vec<String>>) {
    let rows: Vec<Vec<String>> = rows
        .into_iter()
        .filter(|row| row.iter().any(|c| !c.is_empty()))
        .collect();

    let width = headers.len();
    let keep: Vec<bool> = (0..width)
        .map(|col| rows.iter().any(|row| row.get(col).is_some_and(|c| !c.is_empty())))
        .collect();

    let filter_row = |row: Vec<String>| -> Vec<String> {
        row.into_iter()
            .enumerate()
            .filter(|(i, _)| keep.get(*i).copied().unwrap_or(false))
            .map(|(_, c)| c)
            .collect()
    };

    let headers = filter_row(headers);
    let rows = rows.into_iter().map(filter_row).collect();
    (headers, rows)
}

/// Identify columns that likely contain impact-area information.
#[must_use]
pub fn detect_impact_columns(headers: &[String]) -> Vec<String> {
    headers
        .iter()
        .filter(|h| {
            let lower = h.to_lowercase();
            IMPACT_KEYWORDS.iter().any(|kw| lower.contains(kw))
        })
        .cloned()
        .collect()
}

/// Render the sheet as plain text: a summary block followed by one entry
/// per data row.
#[must_use]
pub fn format_impact_text(sheet: &ImpactSheet) -> String {
    if sheet.is_empty() {
        return "No impact areas data available".to_string();
    }

    let mut out = String::new();
    out.push_str("=== IMPACTED AREAS ===\n");
    let _ = writeln!(out, "=== Excel Data Summary: {} ===", sheet.file_name);
    let _ = writeln!(out, "Total Rows: {}", sheet.rows.len());
    let _ = writeln!(out, "Total Columns: {}", sheet.headers.len());
    out.push_str("\nColumn Information:\n");

    for (col, header) in sheet.headers.iter().enumerate() {
        let filled = sheet
            .rows
            .iter()
            .filter(|row| row.get(col).is_some_and(|c| !c.is_empty()))
            .count();
        let unique: BTreeSet<&str> = sheet
            .rows
            .iter()
            .filter_map(|row| row.get(col))
            .filter(|c| !c.is_empty())
            .map(String::as_str)
            .collect();

        let mut line = format!("  - {header}: {filled}/{} non-empty", sheet.rows.len());
        if unique.len() <= 20 && !unique.is_empty() {
            let shown: Vec<&str> = unique.iter().copied().take(10).collect();
            let _ = write!(line, " | Unique values: {}", shown.join(", "));
            if unique.len() > 10 {
                line.push_str("...");
            }
        }
        let _ = writeln!(out, "{line}");
    }

    out.push_str("\nSample Data (First 3 rows):\n");
    for row in sheet.rows.iter().take(3) {
        let _ = writeln!(out, "  {}", row.join(" | "));
    }

    let impact_columns = detect_impact_columns(&sheet.headers);
    if !impact_columns.is_empty() {
        out.push_str("\nPotential Impact Area Columns:\n");
        let _ = writeln!(out, "{}", impact_columns.join(", "));
    }

    out.push_str("\nDetailed Impact Areas Data:\n");
    for (idx, row) in sheet.rows.iter().enumerate() {
        let _ = writeln!(out, "Entry {}:", idx + 1);
        for (header, cell) in sheet.headers.iter().zip(row) {
            if !cell.is_empty() {
                let _ = writeln!(out, "  - {header}: {cell}");
            }
        }
        out.push('\n');
    }

    out
}
