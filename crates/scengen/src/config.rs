//! Process configuration.
//!
//! Built once at startup from the environment and passed explicitly to every
//! component that needs it - no ambient lookup after this point.

use std::path::PathBuf;

use crate::errors::{ScengenError, ScengenResult};

/// Default generative model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Default output-token cap. Sized for large combined contexts plus the
/// full scenario JSON array.
pub const DEFAULT_MAX_TOKENS: u32 = 32_768;

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Jira connection settings. All three values are required before any
/// network call is attempted.
#[derive(Debug, Clone)]
pub struct JiraConfig {
    /// Instance URL, e.g. `https://company.atlassian.net`
    pub url: String,
    /// Username/email for basic auth
    pub username: String,
    /// API token for basic auth
    pub api_token: String,
}

/// Process-wide configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Google API key for the Gemini endpoints.
    pub google_api_key: String,
    /// Model identity.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Output-token cap.
    pub max_tokens: u32,
    /// Directory for the scenario spreadsheet and report.
    pub output_dir: PathBuf,
    /// Jira settings; absent unless all three variables are set.
    jira_url: Option<String>,
    jira_username: Option<String>,
    jira_api_token: Option<String>,
}

impl Config {
    /// Build configuration from environment variables.
    ///
    /// # Required Environment Variables
    /// - `GOOGLE_API_KEY`: key for the Gemini API
    ///
    /// # Optional Environment Variables
    /// - `JIRA_URL`, `JIRA_USERNAME`, `JIRA_API_TOKEN`: required together
    ///   when a Jira source is requested
    /// - `OUTPUT_DIR`: output directory (default: ./output)
    pub fn from_env() -> ScengenResult<Self> {
        let google_api_key = std::env::var("GOOGLE_API_KEY")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ScengenError::Config {
                reason: "missing required environment variable: GOOGLE_API_KEY".to_string(),
            })?;

        let output_dir = std::env::var("OUTPUT_DIR")
            .ok()
            .filter(|v| !v.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR), PathBuf::from);

        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        Ok(Self {
            google_api_key,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            output_dir,
            jira_url: non_empty("JIRA_URL"),
            jira_username: non_empty("JIRA_USERNAME"),
            jira_api_token: non_empty("JIRA_API_TOKEN"),
        })
    }

    /// Resolve the Jira settings, naming every missing variable.
    ///
    /// Called before any Jira network call; a missing value is a
    /// configuration failure, not a network one.
    pub fn jira(&self) -> ScengenResult<JiraConfig> {
        let mut missing = Vec::new();
        if self.jira_url.is_none() {
            missing.push("JIRA_URL");
        }
        if self.jira_username.is_none() {
            missing.push("JIRA_USERNAME");
        }
        if self.jira_api_token.is_none() {
            missing.push("JIRA_API_TOKEN");
        }

        if !missing.is_empty() {
            return Err(ScengenError::Config {
                reason: format!("missing required environment variables: {}", missing.join(", ")),
            });
        }

        Ok(JiraConfig {
            url: self.jira_url.clone().unwrap_or_default(),
            username: self.jira_username.clone().unwrap_or_default(),
            api_token: self.jira_api_token.clone().unwrap_or_default(),
        })
    }

    /// Construct a config directly (used by tests and CLI overrides).
    #[must_use]
    pub fn new(google_api_key: String) -> Self {
        Self {
            google_api_key,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            jira_url: None,
            jira_username: None,
            jira_api_token: None,
        }
    }

    /// Override the Jira settings (used by tests).
    #[must_use]
    pub fn with_jira(mut self, url: String, username: String, api_token: String) -> Self {
        self.jira_url = Some(url);
        self.jira_username = Some(username);
        self.jira_api_token = Some(api_token);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jira_missing_vars_are_named() {
        let config = Config::new("key".to_string());
        let err = config.jira().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("JIRA_URL"));
        assert!(msg.contains("JIRA_USERNAME"));
        assert!(msg.contains("JIRA_API_TOKEN"));
    }

    #[test]
    fn test_jira_complete() {
        let config = Config::new("key".to_string()).with_jira(
            "https://x.atlassian.net".to_string(),
            "qa@example.com".to_string(),
            "token".to_string(),
        );
        let jira = config.jira().unwrap();
        assert_eq!(jira.url, "https://x.atlassian.net");
        assert_eq!(jira.username, "qa@example.com");
    }
}
