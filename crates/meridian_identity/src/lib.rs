//! Resource identity and import resolution for Meridian (Layer 2).
//!
//! - [`spec`] - [`IdentitySpec`] in one of five shapes
//! - [`import`] - [`ImportSpec`] and composite import ID codecs
//! - [`arn`] - ARN parsing
//! - [`resolve`] - [`resolve_import`], the generic import resolver
//! - [`error`] - [`ImportError`]
//!
//! # Example
//!
//! ```
//! use meridian_identity::prelude::*;
//! use meridian_resource::prelude::*;
//!
//! let client = Client::new("123456789012", "us-west-2");
//! let mut data = ResourceData::for_import("arn:aws:sqs:us-east-1:123456789012:jobs");
//!
//! resolve_import(
//!     &CallContext::new(),
//!     &IdentitySpec::regional_arn(),
//!     &ImportSpec::wrapped(),
//!     &mut data,
//!     &client,
//! )
//! .expect("valid ARN");
//!
//! assert_eq!(data.get_string("region"), "us-east-1");
//! ```

/// ARN parsing.
pub mod arn;

/// Import resolution errors.
pub mod error;

/// Import configuration.
pub mod import;

/// Import resolution.
pub mod resolve;

/// Resource identity specifications.
pub mod spec;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::arn::{Arn, ArnError};
    pub use crate::error::ImportError;
    pub use crate::import::{ImportContext, ImportIdCodec, ImportSpec, SeparatorCodec};
    pub use crate::resolve::{identity_from_state, resolve_import};
    pub use crate::spec::{
        IdentityAttribute, IdentityShape, IdentitySpec, InherentRegion, InherentRegionParser,
    };
}

pub use error::ImportError;
pub use import::{ImportContext, ImportSpec};
pub use resolve::resolve_import;
pub use spec::{IdentityShape, IdentitySpec};
