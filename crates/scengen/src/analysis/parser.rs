//! Turns raw model output into validated scenario records.
//!
//! The primary path cuts the first `[` .. last `]` span out of the response
//! and decodes it as a JSON array, so markdown fences and prose around the
//! array are ignored for free. When no array can be decoded, a line-oriented
//! fallback salvages whatever scenario-shaped text the model produced.
//! Parsing never fails: the worst outcome is an empty list.

use serde_json::{Map, Value};

use super::scenario::{ScenarioRecord, PRIORITIES};

/// Lowercased keywords that start a new record in the text fallback.
const START_KEYWORDS: [&str; 3] = ["scenario", "test", "ts"];

/// Keyword-to-category rules applied when the fallback finalizes a record.
/// First match wins, scanned top to bottom.
const CATEGORY_RULES: [(&[&str], &str); 5] = [
    (&["integration", "api", "service"], "Integration"),
    (&["user", "ui", "interface", "experience"], "User Experience"),
    (&["data", "database", "storage"], "Data"),
    (&["security", "access", "auth"], "Security"),
    (&["performance", "load", "speed"], "Performance"),
];

const HIGH_PRIORITY_KEYWORDS: [&str; 4] = ["critical", "core", "main", "primary"];
const MEDIUM_PRIORITY_KEYWORDS: [&str; 2] = ["important", "key"];

/// Parse a model response into scenario records.
///
/// Invalid records are skipped with a warning rather than aborting the
/// whole batch, and record order is preserved.
pub fn parse_scenarios(raw: &str) -> Vec<ScenarioRecord> {
    let Some(span) = bracketed_span(raw) else {
        tracing::warn!("No JSON array found in response, using text fallback");
        return parse_text_fallback(raw);
    };

    match serde_json::from_str::<Vec<Value>>(span) {
        Ok(values) => validate_records(values),
        Err(err) => {
            tracing::warn!(error = %err, "JSON parsing failed, using text fallback");
            parse_text_fallback(raw)
        }
    }
}

/// The substring from the first `[` through the last `]`, if that forms a
/// plausible array span.
fn bracketed_span(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

fn validate_records(values: Vec<Value>) -> Vec<ScenarioRecord> {
    let mut kept = Vec::new();
    for (index, value) in values.iter().enumerate() {
        let Some(fields) = value.as_object() else {
            tracing::warn!(index, "Response array holds a non-record entry, skipping");
            continue;
        };
        match validate_record(fields) {
            Some(record) => kept.push(record),
            None => tracing::warn!(index, "Invalid scenario format, skipping"),
        }
    }
    kept
}

/// A record is valid when all four fields carry usable text and the
/// priority is one of the exact labels the prompt asks for.
fn validate_record(fields: &Map<String, Value>) -> Option<ScenarioRecord> {
    let id = field_text(fields.get("id")?)?;
    let category = field_text(fields.get("category")?)?;
    let scenario = field_text(fields.get("scenario")?)?;
    let priority = field_text(fields.get("priority")?)?;
    if !PRIORITIES.contains(&priority.as_str()) {
        return None;
    }
    Some(ScenarioRecord {
        id,
        category,
        scenario,
        priority,
    })
}

/// Usable field text: a non-empty string, or a non-zero number rendered as
/// text. Nulls, empty strings, zeros and structured values are rejected.
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Line-oriented salvage pass for responses with no decodable JSON array.
///
/// Lines mentioning a start keyword open a new record; other non-blank
/// lines extend the current one. Ids are assigned sequentially and the
/// category and priority are derived from keywords in the collected text.
fn parse_text_fallback(content: &str) -> Vec<ScenarioRecord> {
    let mut scenarios = Vec::new();
    let mut counter: usize = 1;
    let mut current: Option<ScenarioRecord> = None;

    for line in content.lines() {
        let line = line.trim();
        let lower = line.to_lowercase();
        if START_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            if let Some(record) = current.take() {
                if !record.scenario.is_empty() {
                    scenarios.push(finalize(record));
                    counter += 1;
                }
            }
            current = Some(ScenarioRecord::new(
                format!("TS{counter:03}"),
                "Functional",
                line,
                "Medium",
            ));
        } else if let Some(record) = current.as_mut() {
            if !line.is_empty() {
                record.scenario.push(' ');
                record.scenario.push_str(line);
            }
        }
    }

    if let Some(record) = current {
        if !record.scenario.is_empty() {
            scenarios.push(finalize(record));
        }
    }

    tracing::info!(count = scenarios.len(), "Extracted scenarios from text fallback");
    scenarios
}

fn finalize(mut record: ScenarioRecord) -> ScenarioRecord {
    let text = record.scenario.to_lowercase();

    record.category = CATEGORY_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| text.contains(kw)))
        .map_or("Functional", |(_, category)| category)
        .to_string();

    // The "important"/"key" tier maps to the same label as the default
    // today, but the tiers are kept distinct so they can diverge.
    record.priority = if HIGH_PRIORITY_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        "High"
    } else if MEDIUM_PRIORITY_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        "Medium"
    } else {
        "Medium"
    }
    .to_string();

    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_json_array() {
        let raw = r#"[
            {"id": "TS001", "category": "Functional", "scenario": "Verify login succeeds with valid credentials", "priority": "P0"},
            {"id": "TS002", "category": "Security", "scenario": "Verify login fails with an expired token", "priority": "P1"}
        ]"#;
        let records = parse_scenarios(raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "TS001");
        assert_eq!(records[0].priority, "P0");
        assert_eq!(records[1].category, "Security");
    }

    #[test]
    fn ignores_markdown_fences_and_prose_around_the_array() {
        let raw = "Here are the scenarios:\n```json\n[{\"id\": \"TS001\", \"category\": \"Data\", \"scenario\": \"Verify records persist\", \"priority\": \"P2\"}]\n```\nLet me know if you need more.";
        let records = parse_scenarios(raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "TS001");
    }

    #[test]
    fn skips_invalid_records_and_preserves_order() {
        let raw = r#"[
            {"id": "TS001", "category": "Functional", "scenario": "First valid", "priority": "P1"},
            {"id": "TS002", "category": "Functional", "scenario": "", "priority": "P1"},
            {"id": "TS003", "category": "Functional", "scenario": "Missing priority"},
            {"id": "TS004", "category": "Functional", "scenario": "Bad priority", "priority": "High"},
            {"id": "TS005", "category": "Functional", "scenario": "Second valid", "priority": "P4"}
        ]"#;
        let records = parse_scenarios(raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "TS001");
        assert_eq!(records[1].id, "TS005");
    }

    #[test]
    fn fenced_array_with_one_empty_scenario_yields_one_record() {
        let raw = "```json\n[{\"id\":\"TS001\",\"category\":\"Functional\",\"scenario\":\"Verify login\",\"priority\":\"P0\"},\n {\"id\":\"TS002\",\"category\":\"Bogus\",\"scenario\":\"\",\"priority\":\"P1\"}]\n```";
        let records = parse_scenarios(raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "TS001");
    }

    #[test]
    fn priority_labels_are_case_sensitive() {
        let raw = r#"[{"id": "TS001", "category": "Functional", "scenario": "Lowercased priority", "priority": "p0"}]"#;
        assert!(parse_scenarios(raw).is_empty());
    }

    #[test]
    fn unknown_categories_are_kept() {
        let raw = r#"[{"id": "TS001", "category": "Chaos Engineering", "scenario": "Verify resilience", "priority": "P3"}]"#;
        let records = parse_scenarios(raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, "Chaos Engineering");
    }

    #[test]
    fn numeric_fields_are_coerced_to_text() {
        let raw = r#"[{"id": 7, "category": "Functional", "scenario": "Numeric id", "priority": "P2"}]"#;
        let records = parse_scenarios(raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "7");
    }

    #[test]
    fn non_record_array_entry_is_skipped() {
        let raw = r#"[{"id": "TS001", "category": "Functional", "scenario": "Valid", "priority": "P1"}, "stray note"]"#;
        let records = parse_scenarios(raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "TS001");
    }

    #[test]
    fn malformed_json_falls_back_to_text_extraction() {
        let raw = "[ this is malformed output ]\nTest: verify the api call succeeds";
        let records = parse_scenarios(raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "TS001");
        assert_eq!(records[0].category, "Integration");
    }

    #[test]
    fn text_fallback_numbers_records_and_derives_metadata() {
        let raw = "Test: verify the api integration works\nTest: critical user interface flow\nTest: verify database writes complete";
        let records = parse_scenarios(raw);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id, "TS001");
        assert_eq!(records[0].category, "Integration");
        assert_eq!(records[0].priority, "Medium");
        assert_eq!(records[1].id, "TS002");
        assert_eq!(records[1].category, "User Experience");
        assert_eq!(records[1].priority, "High");
        assert_eq!(records[2].id, "TS003");
        assert_eq!(records[2].category, "Data");
    }

    #[test]
    fn text_fallback_appends_continuation_lines() {
        let raw = "Scenario one covers checkout\nwith a saved card\n\nScenario two covers refunds";
        let records = parse_scenarios(raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].scenario, "Scenario one covers checkout with a saved card");
        assert_eq!(records[1].scenario, "Scenario two covers refunds");
    }

    #[test]
    fn bracket_after_closing_bracket_only_uses_fallback() {
        let raw = "] stray close then [ stray open\nTest: verify nothing breaks";
        let records = parse_scenarios(raw);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn empty_and_irrelevant_input_yields_empty_list() {
        assert!(parse_scenarios("").is_empty());
        assert!(parse_scenarios("The model declined to answer.").is_empty());
    }

    #[test]
    fn parsing_is_idempotent() {
        let raw = r#"prefix [{"id": "TS001", "category": "Functional", "scenario": "Stable", "priority": "P1"}] suffix"#;
        let first = parse_scenarios(raw);
        let second = parse_scenarios(raw);
        assert_eq!(first, second);
    }
}
