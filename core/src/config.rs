//! Client configuration.
//!
//! Values can be given directly or read from the environment:
//!
//! - `WPCLIENT_BASE_URL` (required): site root, e.g. `https://example.com/wp-json`
//! - `WPCLIENT_NAMESPACE`: REST namespace, defaults to `wp/v2`
//! - `WPCLIENT_TIMEOUT_SECS`: overall request timeout in seconds

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_NAMESPACE: &str = "wp/v2";

pub const ENV_BASE_URL: &str = "WPCLIENT_BASE_URL";
pub const ENV_NAMESPACE: &str = "WPCLIENT_NAMESPACE";
pub const ENV_TIMEOUT_SECS: &str = "WPCLIENT_TIMEOUT_SECS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub namespace: String,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            timeout: None,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Empty values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = get(ENV_BASE_URL).ok_or(ConfigError::Missing(ENV_BASE_URL))?;
        let mut config = Self::new(base_url.trim());

        if let Some(namespace) = get(ENV_NAMESPACE) {
            config.namespace = namespace.trim().to_string();
        }

        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid {
                    key: ENV_TIMEOUT_SECS,
                    value: raw.clone(),
                })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}
