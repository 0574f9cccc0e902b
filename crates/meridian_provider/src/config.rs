//! Provider configuration.
//!
//! [`ProviderConfig`] is deserialized from JSON and turned into the shared
//! [`Client`] once at configuration time. Its `logging` section configures
//! the subscriber.
//!
//! ```json
//! {
//!   "region": "us-west-2",
//!   "account_id": "123456789012",
//!   "default_tags": { "tags": { "team": "platform" } },
//!   "ignore_tags": { "key_prefixes": ["kubernetes.io/"] },
//!   "tag_policy": { "required_tags": ["owner"], "severity": "warning" },
//!   "logging": { "filter": "meridian_provider=debug,info", "format": "json" }
//! }
//! ```

use std::path::Path;

use meridian_resource::Client;
use meridian_resource::tags::{DefaultTagsConfig, IgnoreTagsConfig, TagPolicyConfig};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::logging::LoggingConfig;

/// Provider-level settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// The provider's region.
    pub region: String,
    /// The account the provider is authenticated as.
    pub account_id: String,
    /// Partition override. Derived from `region` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
    /// Tags applied to every taggable resource.
    pub default_tags: DefaultTagsConfig,
    /// Tags the provider never manages.
    pub ignore_tags: IgnoreTagsConfig,
    /// Required tag policy.
    pub tag_policy: TagPolicyConfig,
    /// Log filter and format.
    pub logging: LoggingConfig,
}

impl ProviderConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and the
    /// [`validate`](Self::validate) errors otherwise.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, and the
    /// [`from_json_str`](Self::from_json_str) errors otherwise.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Checks that region and account are set and the account is well formed.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.region.is_empty() {
            return Err(ConfigError::MissingRegion);
        }
        if self.account_id.is_empty() {
            return Err(ConfigError::MissingAccountId);
        }
        if self.account_id.len() != 12 || !self.account_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::InvalidAccountId(self.account_id.clone()));
        }
        Ok(())
    }

    /// Builds the shared client.
    #[must_use]
    pub fn build_client(&self) -> Client {
        let client = Client::new(&self.account_id, &self.region)
            .with_default_tags(self.default_tags.clone())
            .with_ignore_tags(self.ignore_tags.clone())
            .with_tag_policy(self.tag_policy.clone());
        match &self.partition {
            Some(partition) => client.with_partition(partition),
            None => client,
        }
    }
}

impl From<&ProviderConfig> for Client {
    fn from(config: &ProviderConfig) -> Self {
        config.build_client()
    }
}
