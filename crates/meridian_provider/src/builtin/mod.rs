//! Built-in interceptors.
//!
//! The provider registers these for every resource that opts in to the
//! corresponding behavior; see [`Provider::new`](crate::Provider::new) for the
//! order.
//!
//! - [`region`] - region defaulting, replacement, state write-back and import suffixes
//! - [`tags`] - transparent tagging and the required tag policy
//! - [`identity`] - identity population

/// Identity population.
pub mod identity;

/// Per-resource region override.
pub mod region;

/// Transparent tagging.
pub mod tags;
