//! Amazon Resource Names.

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

const PREFIX: &str = "arn:";

/// A parsed Amazon Resource Name.
///
/// ```text
/// arn:<partition>:<service>:<region>:<account-id>:<resource>
/// ```
///
/// `region` and `account_id` are empty for global resources. `resource` may
/// itself contain `:` separators.
///
/// # Example
///
/// ```
/// use meridian_identity::arn::Arn;
///
/// let arn: Arn = "arn:aws:sns:us-east-1:123456789012:topic:sub".parse().unwrap();
/// assert_eq!(arn.region, "us-east-1");
/// assert_eq!(arn.resource, "topic:sub");
/// assert_eq!(arn.to_string(), "arn:aws:sns:us-east-1:123456789012:topic:sub");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Arn {
    /// Partition, e.g. `aws`.
    pub partition: String,
    /// Service namespace, e.g. `s3`.
    pub service: String,
    /// Region, empty for global resources.
    pub region: String,
    /// Owning account, empty for some resources.
    pub account_id: String,
    /// Service-specific resource path.
    pub resource: String,
}

/// Errors produced when parsing an [`Arn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArnError {
    /// The string does not start with `arn:`.
    #[error("arn: invalid prefix")]
    InvalidPrefix,
    /// Fewer than six `:`-separated sections.
    #[error("arn: not enough sections")]
    NotEnoughSections,
}

impl FromStr for Arn {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.starts_with(PREFIX) {
            return Err(ArnError::InvalidPrefix);
        }
        let mut sections = s.splitn(6, ':').skip(1);
        let mut next = || sections.next().ok_or(ArnError::NotEnoughSections);
        Ok(Self {
            partition: next()?.to_owned(),
            service: next()?.to_owned(),
            region: next()?.to_owned(),
            account_id: next()?.to_owned(),
            resource: next()?.to_owned(),
        })
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account_id, self.resource
        )
    }
}
