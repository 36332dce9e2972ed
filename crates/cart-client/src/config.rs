//! Cart client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MART_API_BASE_URL` - Base URL of the shop serving `/carts` (e.g., <https://mart.example.com>)
//!
//! ## Optional
//! - `MART_LOGIN_PATH` - Where to send shoppers without a token (default: /login)
//! - `MART_STATUS_POLICY` - `settle` or `require-success` (default: settle)
//! - `MART_REQUEST_TIMEOUT_SECS` - Per-request timeout in seconds (default: none)

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_LOGIN_PATH: &str = "/login";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// How the client treats HTTP status codes on mutations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Any response counts as success; only transport failures are errors.
    #[default]
    Settle,
    /// Only 2xx responses count as success.
    RequireSuccess,
}

impl FromStr for StatusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "settle" => Ok(Self::Settle),
            "require-success" => Ok(Self::RequireSuccess),
            other => Err(format!(
                "unknown status policy '{other}' (expected 'settle' or 'require-success')"
            )),
        }
    }
}

/// Cart client configuration.
#[derive(Debug, Clone)]
pub struct CartClientConfig {
    /// Base URL the cart endpoints are resolved against (always ends in `/`)
    pub base_url: Url,
    /// Path of the login view
    pub login_path: String,
    /// Status code handling for mutations
    pub status_policy: StatusPolicy,
    /// Per-request timeout; `None` waits for the transport to give up
    pub request_timeout: Option<Duration>,
}

impl CartClientConfig {
    /// Configuration with defaults for everything but the base URL.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url: with_trailing_slash(base_url),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            status_policy: StatusPolicy::default(),
            request_timeout: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_base_url = lookup("MART_API_BASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("MART_API_BASE_URL".to_string()))?;
        let base_url = Url::parse(&raw_base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("MART_API_BASE_URL".to_string(), e.to_string())
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "MART_API_BASE_URL".to_string(),
                "must be an absolute http(s) URL".to_string(),
            ));
        }

        let mut config = Self::new(base_url);

        if let Some(path) = lookup("MART_LOGIN_PATH") {
            config.login_path = normalize_login_path(&path);
        }

        if let Some(policy) = lookup("MART_STATUS_POLICY") {
            config.status_policy = policy
                .parse()
                .map_err(|e| ConfigError::InvalidEnvVar("MART_STATUS_POLICY".to_string(), e))?;
        }

        if let Some(secs) = lookup("MART_REQUEST_TIMEOUT_SECS") {
            let secs = secs.trim().parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("MART_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
            config.request_timeout = (secs > 0).then_some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Set the login path.
    #[must_use]
    pub fn with_login_path(mut self, path: &str) -> Self {
        self.login_path = normalize_login_path(path);
        self
    }

    /// Set the status policy.
    #[must_use]
    pub const fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    /// Set a per-request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Absolute URL of the login view.
    ///
    /// # Errors
    ///
    /// Returns an error if the login path cannot be joined onto the base URL.
    pub fn login_url(&self) -> Result<Url, url::ParseError> {
        self.base_url.join(&self.login_path)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Make relative joins land under the base path instead of replacing its last segment.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn normalize_login_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        DEFAULT_LOGIN_PATH.to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
