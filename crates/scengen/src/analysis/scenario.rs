//! The test scenario record shared by the parser, the output writers and
//! the report builder.

use serde::{Deserialize, Serialize};

/// Priority labels the generation prompt asks the model to use. Records
/// carrying anything else are rejected during validation.
pub const PRIORITIES: [&str; 5] = ["P0", "P1", "P2", "P3", "P4"];

/// A single validated test scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub id: String,
    pub category: String,
    pub scenario: String,
    pub priority: String,
}

impl ScenarioRecord {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        scenario: impl Into<String>,
        priority: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            scenario: scenario.into(),
            priority: priority.into(),
        }
    }
}
