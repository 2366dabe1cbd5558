//! Credential loading for the external runner collaborators.
//!
//! Required environment variables:
//! - `OPENAI_API_KEY` - the chat-completions API key.
//! - `SERPER_API_KEY` - web search key used by search-enabled agents.
//!
//! Both are validated up front so a missing key is reported before any
//! pipeline work starts, not as a late network failure.

use thiserror::Error;

/// Model used when neither the CLI nor the agent config overrides it.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("missing required environment variable: {0}")]
    Missing(String),
}

/// API credentials for the runner collaborators.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Chat-completions API key.
    pub openai_api_key: String,

    /// SerperDev web search key.
    pub serper_api_key: String,
}

impl Credentials {
    /// Load credentials from the environment.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Missing` naming the first absent variable.
    pub fn from_env() -> Result<Self, CredentialError> {
        Ok(Self {
            openai_api_key: require("OPENAI_API_KEY")?,
            serper_api_key: require("SERPER_API_KEY")?,
        })
    }

    /// Per-variable presence report for `check-setup`.
    pub fn status() -> Vec<(&'static str, bool)> {
        ["OPENAI_API_KEY", "SERPER_API_KEY"]
            .into_iter()
            .map(|name| (name, is_set(name)))
            .collect()
    }
}

fn require(name: &str) -> Result<String, CredentialError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| CredentialError::Missing(name.to_string()))
}

fn is_set(name: &str) -> bool {
    std::env::var(name)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false)
}
