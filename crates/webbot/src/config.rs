//! Configuration.
//!
//! ```yaml
//! wait:
//!   timeout_ms: 10000
//!   poll_interval_ms: 250
//! log_filter: "webbot=debug"
//! ```
//!
//! Every field is optional. Environment variables override whatever the
//! file says:
//!
//! | Variable                  | Field                   |
//! |---------------------------|-------------------------|
//! | `WEBBOT_TIMEOUT_MS`       | `wait.timeout_ms`       |
//! | `WEBBOT_POLL_INTERVAL_MS` | `wait.poll_interval_ms` |
//! | `WEBBOT_LOG`              | `log_filter`            |

use crate::result::{BotError, BotResult};
use crate::wait::{WaitOptions, Waiter};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Overrides `wait.timeout_ms`
pub const ENV_TIMEOUT_MS: &str = "WEBBOT_TIMEOUT_MS";
/// Overrides `wait.poll_interval_ms`
pub const ENV_POLL_INTERVAL_MS: &str = "WEBBOT_POLL_INTERVAL_MS";
/// Overrides `log_filter`
pub const ENV_LOG: &str = "WEBBOT_LOG";

/// Default tracing filter
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Library configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Default wait options
    pub wait: WaitOptions,
    /// Tracing filter directive
    pub log_filter: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            wait: WaitOptions::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl BotConfig {
    /// Short waits for fast local pages
    #[must_use]
    pub fn fast() -> Self {
        Self {
            wait: WaitOptions::fast(),
            ..Self::default()
        }
    }

    /// Long waits for slow environments
    #[must_use]
    pub fn slow() -> Self {
        Self {
            wait: WaitOptions::slow(),
            ..Self::default()
        }
    }

    /// Parse YAML
    pub fn from_yaml_str(yaml: &str) -> BotResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Parse JSON
    pub fn from_json_str(json: &str) -> BotResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a file; `.json` is JSON, anything else YAML
    pub fn load(path: &Path) -> BotResult<Self> {
        let contents = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_str(&contents)?
        } else {
            Self::from_yaml_str(&contents)?
        };
        tracing::debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> BotResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Apply `WEBBOT_*` environment overrides
    ///
    /// # Errors
    ///
    /// [`BotError::Config`] when a numeric variable does not parse.
    pub fn with_env_overrides(self) -> BotResult<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// [`BotError::Config`] when a numeric variable does not parse.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> BotResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            self.wait.timeout_ms = parse_millis(ENV_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_POLL_INTERVAL_MS) {
            self.wait.poll_interval_ms = parse_millis(ENV_POLL_INTERVAL_MS, &raw)?;
        }
        if let Some(filter) = lookup(ENV_LOG) {
            let filter = filter.trim();
            if !filter.is_empty() {
                self.log_filter = filter.to_string();
            }
        }
        Ok(self)
    }

    /// Waiter using the configured options
    #[must_use]
    pub fn waiter(&self) -> Waiter {
        Waiter::with_options(self.wait)
    }
}

fn parse_millis(key: &str, raw: &str) -> BotResult<u64> {
    raw.trim().parse().map_err(|_| BotError::Config {
        message: format!("{key} must be a non-negative number of milliseconds, got {raw:?}"),
    })
}
