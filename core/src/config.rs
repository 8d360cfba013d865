//! Client configuration.
//!
//! Supports environment-based overrides with the library defaults as
//! fallback. The bearer token is deliberately not part of the config; it is
//! handed to `CocClient` separately so configs can be logged and serialized.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Public Clash of Clans API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.clashofclans.com/v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(750);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API root; a trailing `/` is stripped.
    #[serde(deserialize_with = "trimmed_url")]
    pub base_url: String,
    /// Per-attempt timeout. Bounds a single attempt, not the retry sequence.
    #[serde(with = "secs_f64")]
    pub timeout: Duration,
    /// Retries after the first attempt, so `max_retries + 1` attempts total.
    pub max_retries: u32,
    /// Backoff before retry `n` (zero-based) is `backoff_base * 2^n`.
    #[serde(with = "secs_f64")]
    pub backoff_base: Duration,
}

fn trimmed_url<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let url = String::deserialize(deserializer)?;
    Ok(url.trim_end_matches('/').to_string())
}

mod secs_f64 {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables, each optional:
    /// - `COC_API_BASE_URL`: API root (e.g. a proxy such as `https://cocproxy.royaleapi.dev/v1`)
    /// - `COC_TIMEOUT_SECS`: per-attempt timeout in seconds, fractional allowed
    /// - `COC_MAX_RETRIES`: retry count after the first attempt
    /// - `COC_BACKOFF_SECS`: backoff base in seconds, fractional allowed
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = env::var("COC_API_BASE_URL").unwrap_or(defaults.base_url);
        let timeout = env_secs("COC_TIMEOUT_SECS").unwrap_or(defaults.timeout);
        let max_retries = env::var("COC_MAX_RETRIES")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_retries);
        let backoff_base = env_secs("COC_BACKOFF_SECS").unwrap_or(defaults.backoff_base);

        Self::default()
            .with_base_url(base_url)
            .with_timeout(timeout)
            .with_max_retries(max_retries)
            .with_backoff_base(backoff_base)
    }

    /// Builder-style method to set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    /// Total attempts per logical call.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Exponential backoff before retrying after zero-based `attempt`.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.backoff_base.saturating_mul(factor)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::config("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::config("base_url must start with http:// or https://"));
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        Ok(())
    }
}

fn env_secs(var: &str) -> Option<Duration> {
    env::var(var)
        .ok()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}
