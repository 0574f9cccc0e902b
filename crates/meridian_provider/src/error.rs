//! Provider initialization and configuration errors.

use std::path::PathBuf;

use meridian_intercept::RegistrationError;
use meridian_resource::JoinedError;
use thiserror::Error;

/// Errors detected while assembling a [`Provider`](crate::Provider).
///
/// [`Provider::new`](crate::Provider::new) collects one error per offending
/// resource or data source and returns them all as
/// [`ProviderError::Initialization`].
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Two registrations share a resource type name.
    #[error("duplicate resource: {type_name}")]
    DuplicateResource {
        /// The duplicated type name.
        type_name: String,
    },

    /// Two registrations share a data source type name.
    #[error("duplicate data source: {type_name}")]
    DuplicateDataSource {
        /// The duplicated type name.
        type_name: String,
    },

    /// A data source has no Read handler.
    #[error("data source type {type_name}: does not define a read function")]
    MissingDataSourceRead {
        /// The data source type name.
        type_name: String,
    },

    /// Custom import was requested but the resource has no importer.
    #[error("resource type {type_name}: uses custom import but does not define an import function")]
    MissingImporter {
        /// The resource type name.
        type_name: String,
    },

    /// Wrapped import was requested but the resource has its own importer.
    #[error("resource type {type_name}: uses wrapped import but defines an import function")]
    UnexpectedImporter {
        /// The resource type name.
        type_name: String,
    },

    /// Import resolution was requested for a resource without an identity.
    #[error("resource type {type_name}: import resolution requires an identity")]
    MissingIdentity {
        /// The resource type name.
        type_name: String,
    },

    /// The schema declares `region` although the provider injects it.
    #[error("`region` attribute is defined: {type_name} resource")]
    RegionAttributeDefined {
        /// The resource type name.
        type_name: String,
    },

    /// A tagged resource lacks `tags` or `tags_all`.
    #[error("no `{attribute}` attribute defined in schema: {type_name} resource")]
    MissingTagsAttribute {
        /// The resource type name.
        type_name: String,
        /// The missing attribute.
        attribute: &'static str,
    },

    /// `tags` must be practitioner-settable.
    #[error("`tags` attribute cannot be Computed: {type_name} resource")]
    TagsComputed {
        /// The resource type name.
        type_name: String,
    },

    /// `tags_all` must be provider-computed.
    #[error("`tags_all` attribute must be Computed: {type_name} resource")]
    TagsAllNotComputed {
        /// The resource type name.
        type_name: String,
    },

    /// The data source schema declares `region` although the provider injects it.
    #[error("`region` attribute is defined: {type_name} data source")]
    DataSourceRegionAttributeDefined {
        /// The data source type name.
        type_name: String,
    },

    /// A data source reporting tags lacks `tags`.
    #[error("no `tags` attribute defined in schema: {type_name} data source")]
    DataSourceMissingTags {
        /// The data source type name.
        type_name: String,
    },

    /// Data source `tags` are read back, so they must be computed.
    #[error("`tags` attribute must be Computed: {type_name} data source")]
    DataSourceTagsNotComputed {
        /// The data source type name.
        type_name: String,
    },

    /// Global resources cannot derive their region from the identity.
    #[error("custom inherent region is not supported for global resources: {type_name} resource")]
    GlobalInherentRegion {
        /// The resource type name.
        type_name: String,
    },

    /// A built-in interceptor could not be registered.
    #[error("resource type {type_name}: {source}")]
    Registration {
        /// The resource type name.
        type_name: String,
        /// The registration failure.
        #[source]
        source: RegistrationError,
    },

    /// Every failure found during initialization, in discovery order.
    #[error("{0}")]
    Initialization(JoinedError),
}

/// Errors loading a [`ProviderConfig`](crate::ProviderConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("reading provider configuration {}: {source}", .path.display())]
    Io {
        /// The file path.
        path: PathBuf,
        /// The I/O error.
        source: std::io::Error,
    },

    /// The configuration is not valid JSON for this schema.
    #[error("parsing provider configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// `region` is empty.
    #[error("provider configuration: `region` is required")]
    MissingRegion,

    /// `account_id` is empty.
    #[error("provider configuration: `account_id` is required")]
    MissingAccountId,

    /// `account_id` is not a twelve digit number.
    #[error("provider configuration: invalid account ID {0:?}, expected twelve digits")]
    InvalidAccountId(String),
}
