//! Writes the generated scenarios to an xlsx workbook.

use std::fs;
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::analysis::ScenarioRecord;
use crate::errors::{ScengenError, ScengenResult};

const SHEET_NAME: &str = "Test_Scenarios";
const HEADERS: [&str; 4] = ["ID", "Category", "Scenario", "Priority"];
const MAX_COLUMN_WIDTH: usize = 80;

/// Write the workbook at `path`, creating parent directories as needed.
pub fn write_scenarios(path: &Path, scenarios: &[ScenarioRecord]) -> ScengenResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| write_error(path, &err.to_string()))?;
        }
    }

    let mut workbook = Workbook::new();
    build_sheet(&mut workbook, scenarios).map_err(|err| write_error(path, &err.to_string()))?;
    workbook
        .save(path)
        .map_err(|err| write_error(path, &err.to_string()))?;

    tracing::info!(path = %path.display(), rows = scenarios.len(), "Workbook written");
    Ok(())
}

fn build_sheet(workbook: &mut Workbook, scenarios: &[ScenarioRecord]) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let bold = Format::new().set_bold();
    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_with_format(0, col_index(col), *header, &bold)?;
    }

    for (row, record) in scenarios.iter().enumerate() {
        let row = u32::try_from(row + 1).unwrap_or(u32::MAX);
        sheet.write(row, 0, record.id.as_str())?;
        sheet.write(row, 1, record.category.as_str())?;
        sheet.write(row, 2, record.scenario.as_str())?;
        sheet.write(row, 3, record.priority.as_str())?;
    }

    for (col, width) in column_widths(scenarios).into_iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        sheet.set_column_width(col_index(col), width as f64)?;
    }

    Ok(())
}

/// Width per column: longest cell plus padding, capped so a long scenario
/// does not blow the sheet apart.
fn column_widths(scenarios: &[ScenarioRecord]) -> [usize; 4] {
    let mut widths = HEADERS.map(str::len);
    for record in scenarios {
        let cells = [
            record.id.as_str(),
            record.category.as_str(),
            record.scenario.as_str(),
            record.priority.as_str(),
        ];
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths.map(|w| (w + 2).min(MAX_COLUMN_WIDTH))
}

fn col_index(col: usize) -> u16 {
    u16::try_from(col).unwrap_or(u16::MAX)
}

fn write_error(path: &Path, reason: &str) -> ScengenError {
    ScengenError::OutputWrite {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, Data, Reader, Xlsx};

    fn sample() -> Vec<ScenarioRecord> {
        vec![
            ScenarioRecord::new("TS001", "Functional", "Verify the form saves", "P0"),
            ScenarioRecord::new("TS002", "Security", "Verify access is denied without auth", "P1"),
        ]
    }

    #[test]
    fn workbook_round_trips_through_calamine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("test_scenarios.xlsx");
        write_scenarios(&path, &sample()).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("ID".to_string())));
        assert_eq!(
            range.get_value((1, 0)),
            Some(&Data::String("TS001".to_string()))
        );
        assert_eq!(
            range.get_value((2, 3)),
            Some(&Data::String("P1".to_string()))
        );
        assert_eq!(range.height(), 3);
    }

    #[test]
    fn empty_scenario_list_still_writes_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        write_scenarios(&path, &[]).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        assert_eq!(range.height(), 1);
    }

    #[test]
    fn widths_are_padded_and_capped() {
        let mut scenarios = sample();
        scenarios[0].scenario = "x".repeat(200);
        let widths = column_widths(&scenarios);
        assert_eq!(widths[0], "TS001".len() + 2);
        assert_eq!(widths[2], MAX_COLUMN_WIDTH);
    }

    #[test]
    fn unwritable_path_maps_to_output_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the save fail.
        let path = dir.path().join("blocked.xlsx");
        std::fs::create_dir(&path).unwrap();
        let err = write_scenarios(&path, &sample()).unwrap_err();
        assert!(matches!(err, ScengenError::OutputWrite { .. }));
    }
}
