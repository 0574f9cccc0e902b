//! Attribute names with special meaning to interceptors and the import resolver.

/// The resource identifier. Reads and writes route to the state handle's id.
pub const ATTR_ID: &str = "id";

/// The account that owns the remote object.
pub const ATTR_ACCOUNT_ID: &str = "account_id";

/// The region the remote object lives in.
pub const ATTR_REGION: &str = "region";

/// The resource's Amazon Resource Name.
pub const ATTR_ARN: &str = "arn";

/// User-facing tags.
pub const ATTR_TAGS: &str = "tags";

/// All tags on the remote object, including provider default tags.
pub const ATTR_TAGS_ALL: &str = "tags_all";
