//! The shared provider client.
//!
//! A [`Client`] is built once at provider configuration time and shared by
//! every call. Interceptors only read from it.

use crate::context::CallContext;
use crate::tags::{DefaultTagsConfig, IgnoreTagsConfig, TagPolicyConfig};

/// Already-configured provider client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Client {
    account_id: String,
    region: String,
    partition: String,
    default_tags: DefaultTagsConfig,
    ignore_tags: IgnoreTagsConfig,
    tag_policy: TagPolicyConfig,
}

impl Client {
    /// Creates a client for `account_id` in `region`.
    ///
    /// The partition is derived from the region.
    ///
    /// # Example
    ///
    /// ```
    /// use meridian_resource::Client;
    ///
    /// let client = Client::new("123456789012", "cn-north-1");
    /// assert_eq!(client.partition(), "aws-cn");
    /// ```
    #[must_use]
    pub fn new(account_id: impl Into<String>, region: impl Into<String>) -> Self {
        let region = region.into();
        Self {
            account_id: account_id.into(),
            partition: partition_for_region(&region).to_owned(),
            region,
            ..Self::default()
        }
    }

    /// Overrides the derived partition.
    #[must_use]
    pub fn with_partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = partition.into();
        self
    }

    /// Sets the provider default tags.
    #[must_use]
    pub fn with_default_tags(mut self, config: DefaultTagsConfig) -> Self {
        self.default_tags = config;
        self
    }

    /// Sets the ignored tags.
    #[must_use]
    pub fn with_ignore_tags(mut self, config: IgnoreTagsConfig) -> Self {
        self.ignore_tags = config;
        self
    }

    /// Sets the required tag policy.
    #[must_use]
    pub fn with_tag_policy(mut self, config: TagPolicyConfig) -> Self {
        self.tag_policy = config;
        self
    }

    /// The account the provider is authenticated as.
    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// The effective region for a call: its override region, if set, otherwise
    /// the provider's configured region.
    #[must_use]
    pub fn region<'a>(&'a self, ctx: &'a CallContext) -> &'a str {
        ctx.override_region().unwrap_or(&self.region)
    }

    /// The provider's configured region.
    #[must_use]
    pub fn default_region(&self) -> &str {
        &self.region
    }

    /// The partition of the configured region, e.g. `"aws"`.
    #[must_use]
    pub fn partition(&self) -> &str {
        &self.partition
    }

    /// Provider default tags.
    #[must_use]
    pub fn default_tags(&self) -> &DefaultTagsConfig {
        &self.default_tags
    }

    /// Tags the provider never manages.
    #[must_use]
    pub fn ignore_tags(&self) -> &IgnoreTagsConfig {
        &self.ignore_tags
    }

    /// Required tag policy.
    #[must_use]
    pub fn tag_policy(&self) -> &TagPolicyConfig {
        &self.tag_policy
    }
}

/// Returns the partition a region belongs to.
///
/// Unrecognized regions belong to the commercial `"aws"` partition.
#[must_use]
pub fn partition_for_region(region: &str) -> &'static str {
    const PREFIXES: &[(&str, &str)] = &[
        ("us-isob-", "aws-iso-b"),
        ("us-isof-", "aws-iso-f"),
        ("us-iso-", "aws-iso"),
        ("eu-isoe-", "aws-iso-e"),
        ("us-gov-", "aws-us-gov"),
        ("cn-", "aws-cn"),
    ];

    PREFIXES
        .iter()
        .find(|(prefix, _)| region.starts_with(prefix))
        .map_or("aws", |(_, partition)| *partition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions() {
        assert_eq!(partition_for_region("us-east-1"), "aws");
        assert_eq!(partition_for_region("us-gov-west-1"), "aws-us-gov");
        assert_eq!(partition_for_region("cn-northwest-1"), "aws-cn");
        assert_eq!(partition_for_region("us-iso-east-1"), "aws-iso");
        assert_eq!(partition_for_region("us-isob-east-1"), "aws-iso-b");
        assert_eq!(partition_for_region("eu-isoe-west-1"), "aws-iso-e");
    }

    #[test]
    fn override_region_wins() {
        let client = Client::new("123456789012", "us-west-2");
        let mut ctx = CallContext::new();
        assert_eq!(client.region(&ctx), "us-west-2");

        ctx.set_override_region("eu-central-1");
        assert_eq!(client.region(&ctx), "eu-central-1");
        assert_eq!(client.default_region(), "us-west-2");
    }
}
