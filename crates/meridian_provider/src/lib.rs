//! Provider assembly for Meridian (Layer 3).
//!
//! This crate turns [`ServicePackage`] registrations into a [`Provider`]
//! whose data sources and resources have every lifecycle handler wrapped by
//! interceptors.
//!
//! - [`builtin`] - region override, transparent tagging and identity interceptors
//! - [`provider`] - [`Provider`], [`WrappedDataSource`] and [`WrappedResource`]
//! - [`resource`] - [`Resource`] and [`DataSource`] definitions and their registrations
//! - [`config`] - [`ProviderConfig`], turned into the shared client
//! - [`logging`] - subscriber setup
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use meridian_provider::prelude::*;
//! use meridian_resource::schema::{AttributeSchema, Schema};
//!
//! struct Logs;
//!
//! impl ServicePackage for Logs {
//!     fn name(&self) -> &str {
//!         "logs"
//!     }
//!
//!     fn resources(&self) -> Vec<ResourceRegistration> {
//!         vec![
//!             ResourceRegistration::new("aws_log_group", "Log Group", || {
//!                 Resource::new(Schema::new().with("name", AttributeSchema::required()))
//!             })
//!             .with_region(RegionSpec::overridable()),
//!         ]
//!     }
//! }
//!
//! let provider = Provider::with_validation_guard(vec![Arc::new(Logs)], &ValidationGuard::new())
//!     .expect("valid resources");
//!
//! let log_group = provider.resource("aws_log_group").expect("registered");
//! assert!(log_group.schema().contains("region"));
//! assert!(log_group.interceptors().contains("default_region"));
//! ```

/// Built-in interceptors.
pub mod builtin;

/// Provider configuration.
pub mod config;

/// Provider errors.
pub mod error;

/// Logging setup.
pub mod logging;

/// Once-per-process guards.
pub mod once;

/// Provider assembly.
pub mod provider;

/// Resource definitions.
pub mod resource;

/// Service packages.
pub mod service_package;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::config::ProviderConfig;
    pub use crate::error::{ConfigError, ProviderError};
    pub use crate::logging::{LogFormat, LoggingConfig};
    pub use crate::once::ValidationGuard;
    pub use crate::provider::{Provider, WrappedDataSource, WrappedResource};
    pub use crate::resource::{
        DataSource, DataSourceFactory, DataSourceRegistration, RegionSpec, Resource,
        ResourceFactory, ResourceRegistration, TagsSpec,
    };
    pub use crate::service_package::ServicePackage;
}

pub use config::ProviderConfig;
pub use error::{ConfigError, ProviderError};
pub use provider::{Provider, WrappedDataSource, WrappedResource};
pub use resource::{
    DataSource, DataSourceRegistration, RegionSpec, Resource, ResourceRegistration, TagsSpec,
};
pub use service_package::ServicePackage;
