//! Error types shared across the workspace.
//!
//! Diff and import handlers return a single error. When several interceptors
//! fail after the handler has run, their errors are combined with
//! [`join_errors`] into a [`JoinedError`] that preserves every message in
//! order.

use core::fmt;

use thiserror::Error;

/// Boxed, thread-safe error used at handler and interceptor boundaries.
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// Several errors combined into one, rendered one per line.
#[derive(Debug)]
pub struct JoinedError {
    errors: Vec<BoxError>,
}

impl JoinedError {
    /// Combines `errors`, keeping their order.
    #[must_use]
    pub fn new(errors: Vec<BoxError>) -> Self {
        Self { errors }
    }

    /// Returns the combined errors in the order they occurred.
    #[must_use]
    pub fn errors(&self) -> &[BoxError] {
        &self.errors
    }
}

impl fmt::Display for JoinedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl core::error::Error for JoinedError {}

/// Combines errors into one.
///
/// Returns `None` for an empty list, the error itself for a single error, and
/// a [`JoinedError`] otherwise.
#[must_use]
pub fn join_errors(mut errors: Vec<BoxError>) -> Option<BoxError> {
    match errors.len() {
        0 => None,
        1 => errors.pop(),
        _ => Some(Box::new(JoinedError { errors })),
    }
}

/// Errors raised by state handle writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    /// State can only hold known values.
    #[error("setting {name:?}: value is unknown")]
    UnknownValue {
        /// The attribute being written.
        name: String,
    },

    /// The resource id is always a string.
    #[error("setting {name:?}: expected a string value")]
    NotAString {
        /// The attribute being written.
        name: String,
    },

    /// The attribute cannot be written through this handle.
    #[error("setting {name:?}: attribute is read-only here")]
    ReadOnly {
        /// The attribute being written.
        name: String,
    },

    /// Replacement can only be forced for attributes with a planned change.
    #[error("ForceNew: no changes for {name:?}")]
    NoChange {
        /// The attribute being forced.
        name: String,
    },
}

/// The call's context was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;
