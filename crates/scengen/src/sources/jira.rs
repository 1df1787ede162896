//! Jira issue loading over the REST API.
//!
//! Accepts either a bare issue key or a URL containing one, resolves it to a
//! canonical upper-cased key, fetches the issue with basic auth, and formats
//! it as plain text for analysis.

use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::LazyLock;

use crate::config::JiraConfig;
use crate::errors::{ScengenError, ScengenResult};

/// Direct issue-key form, anchored: `PROJECT-123`.
static DIRECT_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]+-\d+)$").unwrap());

/// URL patterns an issue key can be embedded in, tried in order.
static URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)/browse/([A-Z]+-\d+)").unwrap(),
        Regex::new(r"(?i)/issue/([A-Z]+-\d+)").unwrap(),
        Regex::new(r"(?i)selectedIssue=([A-Z]+-\d+)").unwrap(),
        Regex::new(r"(?i)([A-Z]+-\d+)(?:\?|$)").unwrap(),
    ]
});

/// Extract a canonical issue key from a key or URL.
///
/// Returns the upper-cased `PROJECT-NUMBER` key, or `None` when no pattern
/// matches.
#[must_use]
pub fn extract_issue_key(input: &str) -> Option<String> {
    let trimmed = input.trim();

    // Bare key first - match against the upper-cased input so `pw-3416`
    // resolves the same as `PW-3416`.
    let upper = trimmed.to_uppercase();
    if let Some(caps) = DIRECT_KEY.captures(&upper) {
        return Some(caps[1].to_string());
    }

    for pattern in URL_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(trimmed) {
            return Some(caps[1].to_uppercase());
        }
    }

    tracing::warn!(input = trimmed, "Could not extract issue key");
    None
}

/// A comment on an issue.
#[derive(Debug, Clone)]
pub struct IssueComment {
    pub author: String,
    pub body: String,
}

/// A loaded Jira issue, flattened for formatting.
#[derive(Debug, Clone)]
pub struct JiraIssue {
    pub key: String,
    pub summary: String,
    pub description: String,
    pub issue_type: String,
    pub status: String,
    pub priority: String,
    pub assignee: String,
    pub reporter: String,
    pub created: String,
    pub updated: String,
    pub labels: Vec<String>,
    pub components: Vec<String>,
    pub fix_versions: Vec<String>,
    pub comments: Vec<IssueComment>,
    /// Fields whose names suggest acceptance criteria or requirements.
    pub custom_fields: Vec<(String, String)>,
}

// Wire types for the Jira REST response.

#[derive(Debug, Deserialize)]
struct Named {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Person {
    #[serde(default)]
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    author: Option<Person>,
    #[serde(default)]
    body: String,
}

#[derive(Debug, Deserialize)]
struct CommentBlock {
    #[serde(default)]
    comments: Vec<RawComment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFields {
    #[serde(default)]
    summary: String,
    description: Option<String>,
    issuetype: Option<Named>,
    status: Option<Named>,
    priority: Option<Named>,
    assignee: Option<Person>,
    reporter: Option<Person>,
    created: Option<String>,
    updated: Option<String>,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    components: Vec<Named>,
    #[serde(default)]
    fix_versions: Vec<Named>,
    comment: Option<CommentBlock>,
    #[serde(flatten)]
    extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    key: String,
    fields: RawFields,
}

/// Field-name fragments that mark requirement/acceptance-criteria fields.
const CRITERIA_KEYWORDS: &[&str] = &["acceptance", "criteria", "requirement", "spec"];

impl From<RawIssue> for JiraIssue {
    fn from(raw: RawIssue) -> Self {
        let fields = raw.fields;

        let custom_fields = fields
            .extra
            .iter()
            .filter(|(name, _)| {
                let lower = name.to_lowercase();
                CRITERIA_KEYWORDS.iter().any(|kw| lower.contains(kw))
            })
            .filter_map(|(name, value)| {
                let text = match value {
                    serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
                    serde_json::Value::Object(map) => map
                        .get("content")
                        .map(|c| c.as_str().map_or_else(|| c.to_string(), ToString::to_string)),
                    _ => None,
                };
                text.map(|t| (name.clone(), t))
            })
            .collect();

        Self {
            key: raw.key,
            summary: fields.summary,
            description: fields.description.unwrap_or_default(),
            issue_type: fields.issuetype.map(|n| n.name).unwrap_or_default(),
            status: fields.status.map(|n| n.name).unwrap_or_default(),
            priority: fields.priority.map(|n| n.name).unwrap_or_default(),
            assignee: fields.assignee.map(|p| p.display_name).unwrap_or_default(),
            reporter: fields.reporter.map(|p| p.display_name).unwrap_or_default(),
            created: fields.created.unwrap_or_default(),
            updated: fields.updated.unwrap_or_default(),
            labels: fields.labels,
            components: fields.components.into_iter().map(|n| n.name).collect(),
            fix_versions: fields.fix_versions.into_iter().map(|n| n.name).collect(),
            comments: fields
                .comment
                .map(|block| {
                    block
                        .comments
                        .into_iter()
                        .map(|c| IssueComment {
                            author: c.author.map(|p| p.display_name).unwrap_or_default(),
                            body: c.body,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            custom_fields,
        }
    }
}

/// Client for the Jira REST API.
pub struct JiraClient {
    client: Client,
    config: JiraConfig,
}

impl JiraClient {
    /// Create a new client from resolved Jira settings.
    #[must_use]
    pub fn new(config: JiraConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Load an issue from user input (key or URL).
    pub async fn load_from_input(&self, input: &str) -> ScengenResult<JiraIssue> {
        let key = extract_issue_key(input).ok_or_else(|| {
            ScengenError::source_load("jira", format!("could not extract issue key from '{input}'"))
        })?;
        self.load_issue(&key).await
    }

    /// Fetch an issue by key.
    pub async fn load_issue(&self, key: &str) -> ScengenResult<JiraIssue> {
        let url = format!(
            "{}/rest/api/2/issue/{key}",
            self.config.url.trim_end_matches('/')
        );
        tracing::info!(key, "Loading Jira issue");

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.username, Some(&self.config.api_token))
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| ScengenError::source_load("jira", format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScengenError::source_load(
                "jira",
                format!("Jira returned {status} for issue {key}"),
            ));
        }

        let raw: RawIssue = response
            .json()
            .await
            .map_err(|e| ScengenError::source_load("jira", format!("invalid issue payload: {e}")))?;

        tracing::info!(key = %raw.key, "Loaded Jira issue");
        Ok(raw.into())
    }
}

/// Comment-body fragments that mark a comment as relevant for testing.
const COMMENT_KEYWORDS: &[&str] = &[
    "acceptance",
    "requirement",
    "spec",
    "test",
    "criteria",
    "should",
    "must",
];

/// Format a loaded issue as plain text for the combination prompt.
#[must_use]
pub fn format_issue(issue: &JiraIssue) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "JIRA ISSUE: {}", issue.key);
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out, "SUMMARY: {}", issue.summary);
    let _ = writeln!(out, "TYPE: {}", issue.issue_type);
    let _ = writeln!(out, "STATUS: {}", issue.status);
    let _ = writeln!(out, "PRIORITY: {}", issue.priority);
    out.push('\n');

    let description = issue.description.trim();
    if !description.is_empty() {
        let _ = writeln!(out, "DESCRIPTION:\n{description}\n");
    }

    if !issue.custom_fields.is_empty() {
        out.push_str("REQUIREMENTS & ACCEPTANCE CRITERIA:\n");
        for (name, value) in &issue.custom_fields {
            let _ = writeln!(out, "{}:\n{value}\n", name.to_uppercase());
        }
    }

    if !issue.components.is_empty() {
        let _ = writeln!(out, "COMPONENTS: {}", issue.components.join(", "));
    }
    if !issue.fix_versions.is_empty() {
        let _ = writeln!(out, "FIX VERSIONS: {}", issue.fix_versions.join(", "));
    }
    if !issue.labels.is_empty() {
        let _ = writeln!(out, "LABELS: {}", issue.labels.join(", "));
    }
    if !issue.components.is_empty() || !issue.fix_versions.is_empty() || !issue.labels.is_empty() {
        out.push('\n');
    }

    let relevant = relevant_comments(&issue.comments);
    if !relevant.is_empty() {
        out.push_str("RELEVANT COMMENTS:\n");
        for (i, comment) in relevant.iter().enumerate() {
            let author = if comment.author.is_empty() {
                "Unknown"
            } else {
                &comment.author
            };
            let _ = writeln!(out, "Comment {} ({author}):\n{}\n", i + 1, comment.body);
        }
    }

    out.push_str("METADATA:\n");
    let or_default = |s: &str, d: &str| if s.is_empty() { d.to_string() } else { s.to_string() };
    let _ = writeln!(out, "Assignee: {}", or_default(&issue.assignee, "Unassigned"));
    let _ = writeln!(out, "Reporter: {}", or_default(&issue.reporter, "Unknown"));
    let _ = writeln!(out, "Created: {}", or_default(&issue.created, "Unknown"));
    let _ = write!(out, "Updated: {}", or_default(&issue.updated, "Unknown"));

    out
}

/// Pick up to three relevant comments from the last five: keyword matches,
/// padded with recent comments while fewer than three have been collected.
fn relevant_comments(comments: &[IssueComment]) -> Vec<&IssueComment> {
    let recent = comments.iter().rev().take(5).rev();
    let mut relevant: Vec<&IssueComment> = Vec::new();

    for comment in recent {
        let body = comment.body.to_lowercase();
        if COMMENT_KEYWORDS.iter().any(|kw| body.contains(kw)) || relevant.len() < 3 {
            relevant.push(comment);
        }
    }

    let skip = relevant.len().saturating_sub(3);
    relevant.into_iter().skip(skip).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_extract_direct_key() {
        assert_eq!(extract_issue_key("PW-3416"), Some("PW-3416".to_string()));
        assert_eq!(extract_issue_key("pw-3416"), Some("PW-3416".to_string()));
        assert_eq!(extract_issue_key("  PW-3416  "), Some("PW-3416".to_string()));
    }

    #[test]
    fn test_extract_from_urls() {
        assert_eq!(
            extract_issue_key("https://x.atlassian.net/browse/PW-3416"),
            Some("PW-3416".to_string())
        );
        assert_eq!(
            extract_issue_key("https://x.atlassian.net/browse/PW-3416?focusedCommentId=9"),
            Some("PW-3416".to_string())
        );
        assert_eq!(
            extract_issue_key("https://x.atlassian.net/issue/PW-3416"),
            Some("PW-3416".to_string())
        );
        assert_eq!(
            extract_issue_key("https://x.atlassian.net/jira?selectedIssue=PW-3416"),
            Some("PW-3416".to_string())
        );
    }

    #[test]
    fn test_extract_no_match() {
        assert_eq!(extract_issue_key("not-a-key"), None);
        assert_eq!(extract_issue_key("https://example.com/nothing"), None);
        assert_eq!(extract_issue_key(""), None);
    }

    #[test]
    fn test_format_issue_sections() {
        let issue = JiraIssue {
            key: "PW-3416".to_string(),
            summary: "Rich text descriptions".to_string(),
            description: "As a recruiter I want rich text.".to_string(),
            issue_type: "Requirement".to_string(),
            status: "Planned".to_string(),
            priority: "Medium".to_string(),
            assignee: String::new(),
            reporter: "Jane".to_string(),
            created: "2024-01-02".to_string(),
            updated: String::new(),
            labels: vec!["editor".to_string()],
            components: vec!["profiles".to_string()],
            fix_versions: Vec::new(),
            comments: vec![IssueComment {
                author: "Lee".to_string(),
                body: "Acceptance criteria attached".to_string(),
            }],
            custom_fields: vec![(
                "acceptance_criteria".to_string(),
                "Editor must support bold".to_string(),
            )],
        };

        let text = format_issue(&issue);
        assert!(text.starts_with("JIRA ISSUE: PW-3416"));
        assert!(text.contains("DESCRIPTION:\nAs a recruiter"));
        assert!(text.contains("REQUIREMENTS & ACCEPTANCE CRITERIA:"));
        assert!(text.contains("ACCEPTANCE_CRITERIA:"));
        assert!(text.contains("COMPONENTS: profiles"));
        assert!(text.contains("LABELS: editor"));
        assert!(text.contains("RELEVANT COMMENTS:"));
        assert!(text.contains("Assignee: Unassigned"));
        assert!(text.contains("Updated: Unknown"));
    }

    #[test]
    fn test_relevant_comments_limit() {
        let comments: Vec<IssueComment> = (0..8)
            .map(|i| IssueComment {
                author: format!("a{i}"),
                body: format!("comment {i} must be tested"),
            })
            .collect();
        // All match keywords; only the last 3 of the last 5 survive.
        let relevant = relevant_comments(&comments);
        assert_eq!(relevant.len(), 3);
        assert_eq!(relevant[0].author, "a5");
        assert_eq!(relevant[2].author, "a7");
    }

    #[tokio::test]
    async fn test_load_issue() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/2/issue/PW-3416"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "key": "PW-3416",
                "fields": {
                    "summary": "Rich text",
                    "description": "Details",
                    "issuetype": {"name": "Story"},
                    "status": {"name": "Open"},
                    "priority": {"name": "P2"},
                    "labels": ["ui"],
                    "components": [{"name": "profiles"}],
                    "fixVersions": [],
                    "comment": {"comments": [
                        {"author": {"displayName": "Lee"}, "body": "spec attached"}
                    ]},
                    "customfield_acceptance": "Must support bold"
                }
            })))
            .mount(&server)
            .await;

        let client = JiraClient::new(JiraConfig {
            url: server.uri(),
            username: "qa@example.com".to_string(),
            api_token: "token".to_string(),
        });

        let issue = client.load_from_input("PW-3416").await.unwrap();
        assert_eq!(issue.key, "PW-3416");
        assert_eq!(issue.issue_type, "Story");
        assert_eq!(issue.components, vec!["profiles".to_string()]);
        assert_eq!(issue.comments.len(), 1);
        assert_eq!(issue.custom_fields.len(), 1);
        assert_eq!(issue.custom_fields[0].1, "Must support bold");
    }

    #[tokio::test]
    async fn test_load_issue_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = JiraClient::new(JiraConfig {
            url: server.uri(),
            username: "qa@example.com".to_string(),
            api_token: "token".to_string(),
        });

        let err = client.load_issue("PW-9999").await.unwrap_err();
        assert!(matches!(err, ScengenError::SourceLoad { .. }));
    }
}
