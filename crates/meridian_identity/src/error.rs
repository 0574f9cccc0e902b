//! Import resolution errors.

use meridian_resource::BoxError;
use meridian_resource::error::AttributeError;
use thiserror::Error;

use crate::arn::ArnError;

/// Errors produced while resolving an import.
///
/// Every variant is a hard failure of the import.
#[derive(Debug, Error)]
pub enum ImportError {
    /// An explicit region disagrees with the region the import encodes.
    #[error("the region passed for import {explicit:?} does not match the region {derived:?} in the {source_kind} {value:?}")]
    RegionMismatch {
        /// The region already set on the resource.
        explicit: String,
        /// The region derived from the import value.
        derived: String,
        /// What the region was derived from, e.g. `ARN`.
        source_kind: &'static str,
        /// The import value itself.
        value: String,
    },

    /// The identity names another account than the provider's.
    #[error("identity account ID {actual:?} does not match the provider account ID {expected:?}")]
    AccountIdMismatch {
        /// The provider's account.
        expected: String,
        /// The account in the identity.
        actual: String,
    },

    /// A required identity attribute is missing or empty.
    #[error("identity attribute {name:?} is required")]
    MissingIdentityAttribute {
        /// The identity attribute name.
        name: String,
    },

    /// The import value is not an ARN.
    #[error("could not parse import ID {value:?} as ARN: {source}")]
    InvalidArn {
        /// The value that failed to parse.
        value: String,
        /// Why it failed.
        source: ArnError,
    },

    /// The composite import ID could not be decoded.
    #[error("parsing import ID {id:?}: {source}")]
    InvalidImportId {
        /// The import ID.
        id: String,
        /// The codec's error.
        source: BoxError,
    },

    /// A multiple-parameter resource was registered without an import ID codec.
    #[error("resource with a multiple-parameter identity has no import ID codec")]
    MissingImportIdCodec,

    /// The custom inherent-region parser rejected the value.
    #[error("parsing import value {value:?}: {source}")]
    InherentRegionParse {
        /// The value that failed to parse.
        value: String,
        /// The parser's error.
        source: BoxError,
    },

    /// A resolved value could not be written to the resource.
    #[error(transparent)]
    Attribute(#[from] AttributeError),
}
