//! LDP connection settings

use crate::{LdpError, LdpResult};
use annolink_core::vocab::deployment;
use std::time::Duration;

pub const DEFAULT_LDP_URL: &str = "http://localhost:8080/rest/anno";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_LDP_URL: &str = "ANNOLINK_LDP_URL";
pub const ENV_TIMEOUT_SECS: &str = "ANNOLINK_TIMEOUT_SECS";
pub const ENV_EXTERNAL_REFERENCE: &str = "ANNOLINK_EXTERNAL_REFERENCE";

/// LDP configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdpConfig {
    /// Root container URL, without trailing slash
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Predicate linking a stored target resource to the annotated resource
    pub external_reference: String,
    pub user_agent: String,
}

impl Default for LdpConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LDP_URL)
    }
}

impl LdpConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            external_reference: deployment::EXTERNAL_REFERENCE.to_string(),
            user_agent: format!("annolink/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn with_external_reference(mut self, predicate: &str) -> Self {
        self.external_reference = predicate.to_string();
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Read `ANNOLINK_LDP_URL`, `ANNOLINK_TIMEOUT_SECS` and
    /// `ANNOLINK_EXTERNAL_REFERENCE`; unset variables keep their defaults.
    pub fn from_env() -> LdpResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`LdpConfig::from_env`] with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> LdpResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(ENV_LDP_URL) {
            Some(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        };

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let seconds = raw.trim().parse::<u64>().map_err(|e| {
                LdpError::Config(format!("{} must be a number of seconds, got {:?}: {}", ENV_TIMEOUT_SECS, raw, e))
            })?;
            config = config.with_timeout(seconds);
        }

        if let Some(predicate) = lookup(ENV_EXTERNAL_REFERENCE) {
            config = config.with_external_reference(predicate.trim());
        }

        Ok(config)
    }
}
