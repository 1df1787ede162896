//! Prompt template management.

use handlebars::Handlebars;
use serde::Serialize;

use crate::errors::{ScengenError, ScengenResult};

/// Manages Handlebars prompt templates.
pub struct PromptManager {
    handlebars: Handlebars<'static>,
}

impl PromptManager {
    /// Create a new prompt manager with embedded templates.
    pub fn new() -> ScengenResult<Self> {
        let mut handlebars = Handlebars::new();
        // Prompts are plain text, never HTML.
        handlebars.register_escape_fn(handlebars::no_escape);

        handlebars
            .register_template_string("combine", COMBINE_TEMPLATE)
            .map_err(template_error)?;
        handlebars
            .register_template_string("scenarios", SCENARIOS_TEMPLATE)
            .map_err(template_error)?;
        handlebars
            .register_template_string("summary", SUMMARY_TEMPLATE)
            .map_err(template_error)?;
        handlebars
            .register_template_string("image", IMAGE_TEMPLATE)
            .map_err(template_error)?;

        Ok(Self { handlebars })
    }

    /// Render a template with the given data.
    pub fn render<T: Serialize>(&self, template: &str, data: &T) -> ScengenResult<String> {
        self.handlebars
            .render(template, data)
            .map_err(|err| ScengenError::Config {
                reason: format!("failed to render prompt '{template}': {err}"),
            })
    }
}

fn template_error(err: handlebars::TemplateError) -> ScengenError {
    ScengenError::Config {
        reason: format!("invalid prompt template: {err}"),
    }
}

/// Combines the loaded source texts into one feature analysis.
const COMBINE_TEMPLATE: &str = r"You are a senior QA analyst preparing a feature for test planning.
Combine the data sources below into a single comprehensive feature analysis.

{{#if jira}}
## Jira Issue
{{jira}}

{{/if}}
{{#if images}}
## UI Screenshot Analysis
{{images}}

{{/if}}
{{#if excel}}
## Impact Areas
{{excel}}

{{/if}}
Produce a unified analysis with these sections:
1. Feature Overview - what the feature does and who uses it
2. Functional Requirements - concrete behaviors that must work
3. UI and User Flows - screens, states and interactions involved
4. Affected Areas and Integrations - systems, data and services touched
5. Risks and Edge Cases - failure modes, boundary conditions, regressions to watch

Be specific and ground every point in the provided data. Do not invent
requirements that none of the sources support.
";

/// Turns the combined analysis into a JSON array of test scenarios.
const SCENARIOS_TEMPLATE: &str = r#"You are a senior QA engineer. Based on the feature analysis below,
generate a comprehensive set of test scenarios.

## Feature Analysis
{{analysis}}

## Instructions
Cover functional behavior, integrations, data handling, security,
performance and user experience. Include negative and edge cases, not
just happy paths.

Respond with ONLY a JSON array. Each element must have exactly these
fields:
- "id": sequential identifier "TS001", "TS002", ...
- "category": one of "Functional", "Integration", "User Experience", "Data", "Security", "Performance"
- "scenario": one clear, testable statement starting with "Verify"
- "priority": one of "P0", "P1", "P2", "P3", "P4" (P0 = most critical)

Example:
[
  {
    "id": "TS001",
    "category": "Functional",
    "scenario": "Verify the user can submit the form with all required fields filled",
    "priority": "P0"
  },
  {
    "id": "TS002",
    "category": "Security",
    "scenario": "Verify the form rejects submissions without a valid session",
    "priority": "P1"
  }
]
"#;

/// Summarizes the generated scenarios for the analysis report.
const SUMMARY_TEMPLATE: &str = r"You are a QA lead writing a short report for stakeholders.

## Feature Analysis
{{analysis}}

## Generated Test Scenarios
{{scenarios_json}}

Write a concise summary (3-5 paragraphs) covering:
- what the feature does, in plain language
- the scope of the generated test coverage, by category and priority
- notable risks or areas that deserve extra manual attention

Do not repeat the scenarios verbatim.
";

/// Per-screenshot vision prompt.
const IMAGE_TEMPLATE: &str = r"Analyze this UI screenshot for QA test planning.

Describe:
1. The screen's purpose and the visible UI elements (buttons, forms, tables, navigation)
2. The user flows and interactions the screen supports
3. Any visible states, validation messages or error handling
4. Anything else relevant for testing this interface

Be factual and specific. Only describe what is actually visible.
";
