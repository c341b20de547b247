//! Client configuration

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_TRANSPORT_ATTEMPTS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_POLL_MAX_DURATION_MS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TOKEN_TTL_SECS,
};
use crate::errors::{Result, VocalisError};
use crate::types::PollBudget;

/// Top-level client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub token: TokenConfig,
    #[serde(default)]
    pub polling: PollingConfig,
}

/// Remote endpoint and admin credentials
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Versioned API root, e.g. `https://api.example.com/v1`
    pub base_url: String,
    pub developer_id: String,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Attempts per request for connect failures; 1 disables re-sending
    #[serde(default = "default_max_transport_attempts")]
    pub max_transport_attempts: u32,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("developer_id", &self.developer_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_transport_attempts", &self.max_transport_attempts)
            .finish()
    }
}

/// Token cache settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    #[serde(default = "default_token_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self { ttl_secs: DEFAULT_TOKEN_TTL_SECS }
    }
}

/// Convergence polling settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_poll_max_duration_ms")]
    pub max_duration_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_duration_ms: DEFAULT_POLL_MAX_DURATION_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_max_transport_attempts() -> u32 {
    DEFAULT_MAX_TRANSPORT_ATTEMPTS
}

fn default_token_ttl_secs() -> u64 {
    DEFAULT_TOKEN_TTL_SECS
}

fn default_poll_max_duration_ms() -> u64 {
    DEFAULT_POLL_MAX_DURATION_MS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl ApiConfig {
    /// API settings with default timeout and attempts
    pub fn new(
        base_url: impl Into<String>,
        developer_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            developer_id: developer_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_transport_attempts: DEFAULT_MAX_TRANSPORT_ATTEMPTS,
        }
    }

    /// Per-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ClientConfig {
    /// Config with default token and polling sections
    pub fn new(api: ApiConfig) -> Self {
        Self { api, token: TokenConfig::default(), polling: PollingConfig::default() }
    }

    /// Lifetime assumed for renewed tokens
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token.ttl_secs)
    }

    /// Budget for every convergence wait
    pub fn poll_budget(&self) -> PollBudget {
        PollBudget::from_millis(self.polling.max_duration_ms, self.polling.poll_interval_ms)
    }

    /// Reject configurations the client cannot work with.
    ///
    /// # Errors
    /// Returns `VocalisError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.api.base_url).map_err(|e| {
            VocalisError::Config(format!("Invalid base_url '{}': {}", self.api.base_url, e))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(VocalisError::Config(format!(
                "base_url must use http or https, got '{}'",
                base.scheme()
            )));
        }

        for (field, value) in [
            ("developer_id", &self.api.developer_id),
            ("client_id", &self.api.client_id),
            ("client_secret", &self.api.client_secret),
        ] {
            if value.trim().is_empty() {
                return Err(VocalisError::Config(format!("api.{field} must not be empty")));
            }
        }

        if self.api.max_transport_attempts == 0 {
            return Err(VocalisError::Config("api.max_transport_attempts must be at least 1".into()));
        }
        if self.token.ttl_secs == 0 {
            return Err(VocalisError::Config("token.ttl_secs must be greater than zero".into()));
        }
        if self.polling.poll_interval_ms == 0 {
            return Err(VocalisError::Config(
                "polling.poll_interval_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
