//! Structured logging setup.
//!
//! Meridian crates log through `tracing`. The `logging` section of the
//! provider configuration selects a target filter and an output format;
//! [`LoggingConfig::init`] installs the matching subscriber once at startup.
//!
//! ```json
//! { "logging": { "filter": "meridian_provider=debug,info", "format": "json" } }
//! ```

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Text,
    /// JSON output for log aggregation.
    Json,
}

/// The `logging` section of the provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directives, e.g. `"meridian_intercept=debug,info"`.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_owned(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.filter).unwrap_or_else(|err| {
            tracing::warn!(filter = %self.filter, error = %err, "invalid log filter");
            EnvFilter::new(DEFAULT_FILTER)
        })
    }

    /// Installs the global subscriber.
    ///
    /// An invalid filter falls back to `info`. Does nothing if a subscriber
    /// is already installed.
    pub fn init(&self) {
        let builder = tracing_subscriber::fmt().with_env_filter(self.env_filter());
        let installed = match self.format {
            LogFormat::Text => builder.try_init(),
            LogFormat::Json => builder.json().try_init(),
        };
        if installed.is_ok() {
            tracing::debug!(filter = %self.filter, format = ?self.format, "logging initialized");
        }
    }
}
