//! Key/value tags and tag configuration.
//!
//! [`KeyValueTags`] is the in-memory tag set used by the tagging interceptors.
//! Provider-level tag behavior is configured with [`DefaultTagsConfig`],
//! [`IgnoreTagsConfig`] and [`TagPolicyConfig`]. Listing and updating tags on
//! the remote object goes through a per-service [`TagService`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::Client;
use crate::context::CallContext;
use crate::error::BoxError;
use crate::value::Value;

/// Prefix reserved for tags managed by the cloud itself.
pub const SYSTEM_TAG_PREFIX: &str = "aws:";

// ─────────────────────────────────────────────────────────────────────────────
// KeyValueTags
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered set of string tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyValueTags(BTreeMap<String, String>);

impl KeyValueTags {
    /// Creates an empty tag set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads tags from a map value.
    ///
    /// Entries that are not strings (null or unknown values) are skipped.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        value
            .as_map()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_owned())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Converts the tags into a map value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::string_map(self.0.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Inserts or replaces a tag.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the tags in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the tag keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns `self` overlaid with `other`; values in `other` win.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut merged = self.0.clone();
        merged.extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self(merged)
    }

    /// Removes tags whose key starts with [`SYSTEM_TAG_PREFIX`].
    #[must_use]
    pub fn ignore_system(&self) -> Self {
        self.retain_keys(|k| !k.starts_with(SYSTEM_TAG_PREFIX))
    }

    /// Removes tags named by the ignore configuration, by key or key prefix.
    #[must_use]
    pub fn ignore_config(&self, config: &IgnoreTagsConfig) -> Self {
        self.retain_keys(|k| !config.is_ignored(k))
    }

    /// Removes tags whose key and value both match a provider default tag.
    #[must_use]
    pub fn remove_default_config(&self, config: &DefaultTagsConfig) -> Self {
        self.0
            .iter()
            .filter(|(k, v)| config.tags.get(k) != Some(v.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Computes the user-facing tag set from the full tag set.
    ///
    /// Tags inherited from provider defaults are removed, except those the
    /// practitioner also configured with the same value. The result has the
    /// ignore configuration applied.
    #[must_use]
    pub fn resolve_duplicates(
        &self,
        defaults: &DefaultTagsConfig,
        ignore: &IgnoreTagsConfig,
        configured: &Self,
    ) -> Self {
        let mut result = self.remove_default_config(defaults);
        for (key, value) in &configured.0 {
            if !result.0.contains_key(key) && defaults.tags.get(key) == Some(value.as_str()) {
                result.0.insert(key.clone(), value.clone());
            }
        }
        result.ignore_config(ignore)
    }

    /// Returns the tags of `new` that are added or changed relative to `self`.
    #[must_use]
    pub fn updated(&self, new: &Self) -> Self {
        new.0
            .iter()
            .filter(|(k, v)| self.0.get(k.as_str()) != Some(v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Returns the tags of `self` whose keys are absent from `new`.
    #[must_use]
    pub fn removed(&self, new: &Self) -> Self {
        self.retain_keys(|k| !new.0.contains_key(k))
    }

    fn retain_keys(&self, keep: impl Fn(&str) -> bool) -> Self {
        self.0
            .iter()
            .filter(|(k, _)| keep(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for KeyValueTags
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Tags applied to every taggable resource of the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultTagsConfig {
    /// The default tags.
    pub tags: KeyValueTags,
}

impl DefaultTagsConfig {
    /// Returns the defaults overlaid with `tags`; resource tags win.
    #[must_use]
    pub fn merge_tags(&self, tags: &KeyValueTags) -> KeyValueTags {
        self.tags.merge(tags)
    }
}

/// Tags the provider never manages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreTagsConfig {
    /// Exact keys to ignore.
    pub keys: Vec<String>,
    /// Key prefixes to ignore.
    pub key_prefixes: Vec<String>,
}

impl IgnoreTagsConfig {
    /// Returns `true` if `key` is ignored by exact match or prefix.
    #[must_use]
    pub fn is_ignored(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
            || self.key_prefixes.iter().any(|p| key.starts_with(p.as_str()))
    }
}

/// How a missing required tag is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagPolicySeverity {
    /// The plan fails.
    #[default]
    Error,
    /// A warning is logged and the plan proceeds.
    Warning,
}

/// Tag keys every taggable resource must carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagPolicyConfig {
    /// Required tag keys.
    pub required_tags: Vec<String>,
    /// How violations are reported.
    pub severity: TagPolicySeverity,
}

// ─────────────────────────────────────────────────────────────────────────────
// TagService
// ─────────────────────────────────────────────────────────────────────────────

/// Lists and updates tags of remote objects for one service.
///
/// Objects are addressed by the value of the resource's identifier attribute,
/// usually its ARN. `resource_type` is set for services that tag several kinds
/// of object through one API.
pub trait TagService: Send + Sync {
    /// Returns the tags currently set on the object.
    ///
    /// # Errors
    ///
    /// Returns the service error. Services that cannot tag in the current
    /// partition return [`TaggingUnsupported`].
    fn list_tags(
        &self,
        ctx: &CallContext,
        client: &Client,
        identifier: &str,
        resource_type: Option<&str>,
    ) -> Result<KeyValueTags, BoxError>;

    /// Replaces the object's tags `old` with `new`.
    ///
    /// # Errors
    ///
    /// Same as [`list_tags`](Self::list_tags).
    fn update_tags(
        &self,
        ctx: &CallContext,
        client: &Client,
        identifier: &str,
        resource_type: Option<&str>,
        old: &KeyValueTags,
        new: &KeyValueTags,
    ) -> Result<(), BoxError>;
}

/// The service does not support tagging in this partition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("tagging is not supported in partition {partition}")]
pub struct TaggingUnsupported {
    /// The partition the call was made in.
    pub partition: String,
}
