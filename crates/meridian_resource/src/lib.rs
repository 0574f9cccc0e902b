//! Resource state primitives for Meridian (Layer 1).
//!
//! `meridian_resource` provides the types every other Meridian crate builds on:
//!
//! - [`value`] - Attribute values, including unknown (not yet computed) values
//! - [`data`] - [`ResourceData`], the state handle for CRUD and import calls
//! - [`diff`] - [`ResourceDiff`], the state handle for plan-time diff calls
//! - [`schema`] - Minimal attribute schema used for provider validation
//! - [`diag`] - Ordered diagnostics returned by CRUD handlers
//! - [`error`] - Boxed and joined errors returned by diff and import handlers
//! - [`client`] - The shared, already-configured provider client
//! - [`context`] - The per-call request object threaded through dispatch
//! - [`tags`] - Key/value tags and tag configuration
//!
//! # Architecture
//!
//! This crate is Layer 1 of the Meridian architecture:
//!
//! - **Layer 1** (`meridian_resource`): state handles, diagnostics, client (this crate)
//! - **Layer 2** (`meridian_intercept`): interceptor masks, registration and dispatch
//! - **Layer 2** (`meridian_identity`): identity specifications and import resolution
//! - **Layer 3** (`meridian_provider`): built-in interceptors and provider assembly

/// The shared provider client.
pub mod client;

/// The per-call request object.
pub mod context;

/// Resource state handle for CRUD and import operations.
pub mod data;

/// Diagnostics returned by CRUD handlers.
pub mod diag;

/// Resource state handle for diff operations.
pub mod diff;

/// Error types shared across the workspace.
pub mod error;

/// Well-known attribute names.
pub mod names;

/// Minimal attribute schema.
pub mod schema;

/// Key/value tags and tag configuration.
pub mod tags;

/// Attribute values.
pub mod value;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::client::{Client, partition_for_region};
    pub use crate::context::{CallContext, CancellationToken, Extensions};
    pub use crate::data::{IdentityData, ResourceData, StateReader};
    pub use crate::diag::{Diagnostic, Diagnostics, Severity};
    pub use crate::diff::ResourceDiff;
    pub use crate::error::{AttributeError, BoxError, Cancelled, JoinedError, join_errors};
    pub use crate::schema::{AttributeSchema, Schema};
    pub use crate::tags::{
        DefaultTagsConfig, IgnoreTagsConfig, KeyValueTags, TagPolicyConfig, TagPolicySeverity,
        TagService, TaggingUnsupported,
    };
    pub use crate::value::{Attributes, Value};
}

pub use client::Client;
pub use context::CallContext;
pub use data::{IdentityData, ResourceData, StateReader};
pub use diag::{Diagnostic, Diagnostics, Severity};
pub use diff::ResourceDiff;
pub use error::{BoxError, JoinedError, join_errors};
pub use value::{Attributes, Value};
