//! Result writers: the scenario workbook and the text report next to it.

pub mod report;
pub mod workbook;

pub use report::{report_path, write_report};
pub use workbook::write_scenarios;
