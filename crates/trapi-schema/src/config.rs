//! Schema retrieval configuration.
//!
//! Points at the GitHub repository that publishes the TRAPI schema. The
//! defaults are the public Translator repository. Override via environment
//! variables or explicit construction for mirrors and tests.

use url::Url;

/// Default GitHub organization publishing the TRAPI schema.
pub const DEFAULT_ORGANIZATION: &str = "NCATSTranslator";
/// Default GitHub repository publishing the TRAPI schema.
pub const DEFAULT_REPOSITORY: &str = "ReasonerAPI";
/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Where and how schema documents and release lists are retrieved.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// GitHub organization.
    pub organization: String,
    /// GitHub repository.
    pub repository: String,
    /// Base URL for raw file content.
    /// Default: <https://raw.githubusercontent.com>
    pub raw_base_url: Url,
    /// Base URL for the GitHub REST API.
    /// Default: <https://api.github.com>
    pub api_base_url: Url,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl FetchConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `GIT_ORGANIZATION` (default: `NCATSTranslator`)
    /// - `GIT_REPOSITORY` (default: `ReasonerAPI`)
    /// - `TRAPI_RAW_BASE_URL` (default: `https://raw.githubusercontent.com`)
    /// - `TRAPI_API_BASE_URL` (default: `https://api.github.com`)
    /// - `TRAPI_FETCH_TIMEOUT_SECS` (default: 60)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            organization: std::env::var("GIT_ORGANIZATION")
                .unwrap_or_else(|_| DEFAULT_ORGANIZATION.to_string()),
            repository: std::env::var("GIT_REPOSITORY")
                .unwrap_or_else(|_| DEFAULT_REPOSITORY.to_string()),
            raw_base_url: env_url("TRAPI_RAW_BASE_URL", "https://raw.githubusercontent.com")?,
            api_base_url: env_url("TRAPI_API_BASE_URL", "https://api.github.com")?,
            timeout_secs: std::env::var("TRAPI_FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Configuration pointing both base URLs at one local server (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the localhost URL cannot be parsed.
    pub fn local_mock(port: u16) -> Result<Self, ConfigError> {
        let url = Url::parse(&format!("http://127.0.0.1:{port}"))
            .map_err(|e| ConfigError::InvalidUrl("localhost".to_string(), e.to_string()))?;
        Ok(Self {
            organization: DEFAULT_ORGANIZATION.to_string(),
            repository: DEFAULT_REPOSITORY.to_string(),
            raw_base_url: url.clone(),
            api_base_url: url,
            timeout_secs: 5,
        })
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
