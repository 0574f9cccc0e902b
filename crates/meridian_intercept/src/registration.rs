//! Interceptor registration.
//!
//! [`Interceptors`] is the ordered, append-only registration list of one
//! resource type. It is built during provider initialization and shared
//! read-only (behind an [`Arc`](std::sync::Arc)) by every dispatch for that
//! resource type afterwards.
//!
//! Registration order matters: Before interceptors run in registration order,
//! every other stage runs in reverse.
//!
//! # Example
//!
//! ```
//! use meridian_intercept::prelude::*;
//! use meridian_resource::Diagnostics;
//!
//! let mut interceptors = Interceptors::new();
//! interceptors
//!     .register(
//!         "audit",
//!         StageMask::AFTER,
//!         OperationMask::ALL_CRUD,
//!         Interceptor::crud_fn(|_params| Diagnostics::new()),
//!     )
//!     .expect("unique name");
//!
//! assert_eq!(interceptors.for_operation(Operation::Read).count(), 1);
//! assert_eq!(interceptors.for_operation(Operation::Import).count(), 0);
//! ```

use thiserror::Error;

use crate::interceptor::Interceptor;
use crate::mask::{Operation, OperationMask, Stage, StageMask};

// ─────────────────────────────────────────────────────────────────────────────
// RegistrationError
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during interceptor registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// An interceptor with this name is already registered.
    #[error("interceptor '{name}' already registered")]
    DuplicateName {
        /// The duplicate interceptor name.
        name: String,
    },

    /// The interceptor's family cannot run for some of the requested operations.
    #[error("{kind} interceptor '{name}' cannot be registered for {operations:?}")]
    UnsupportedOperations {
        /// The interceptor name.
        name: String,
        /// The interceptor's family.
        kind: &'static str,
        /// The operations it cannot run for.
        operations: OperationMask,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// InterceptorRegistration
// ─────────────────────────────────────────────────────────────────────────────

/// One entry of the registration list.
#[derive(Debug, Clone)]
pub struct InterceptorRegistration {
    name: String,
    stages: StageMask,
    operations: OperationMask,
    interceptor: Interceptor,
}

impl InterceptorRegistration {
    /// Human-readable name for logging and duplicate detection.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stages this interceptor runs in.
    #[must_use]
    pub fn stages(&self) -> StageMask {
        self.stages
    }

    /// Operations this interceptor runs for.
    #[must_use]
    pub fn operations(&self) -> OperationMask {
        self.operations
    }

    /// The interceptor itself.
    #[must_use]
    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }

    /// Returns `true` if this registration runs in `stage` of `operation`.
    #[must_use]
    pub fn matches(&self, stage: Stage, operation: Operation) -> bool {
        self.stages.contains(stage.as_mask()) && self.operations.contains(operation.as_mask())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Interceptors
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered registration list of one resource type.
#[derive(Debug, Clone, Default)]
pub struct Interceptors {
    entries: Vec<InterceptorRegistration>,
}

impl Interceptors {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an interceptor.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateName`] if `name` is taken and
    /// [`RegistrationError::UnsupportedOperations`] if the interceptor's family
    /// cannot run for every operation in `operations`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        stages: StageMask,
        operations: OperationMask,
        interceptor: Interceptor,
    ) -> Result<(), RegistrationError> {
        let name = name.into();

        if self.entries.iter().any(|e| e.name == name) {
            return Err(RegistrationError::DuplicateName { name });
        }

        let unsupported = operations.difference(interceptor.supported_operations());
        if !unsupported.is_empty() {
            return Err(RegistrationError::UnsupportedOperations {
                name,
                kind: interceptor.kind(),
                operations: unsupported,
            });
        }

        tracing::trace!(
            interceptor = %name,
            kind = interceptor.kind(),
            ?stages,
            ?operations,
            "registered interceptor"
        );

        self.entries.push(InterceptorRegistration {
            name,
            stages,
            operations,
            interceptor,
        });
        Ok(())
    }

    /// Returns the registrations that run for `operation`, in registration
    /// order, regardless of stage.
    pub fn for_operation(
        &self,
        operation: Operation,
    ) -> impl DoubleEndedIterator<Item = &InterceptorRegistration> {
        self.entries
            .iter()
            .filter(move |e| e.operations.contains(operation.as_mask()))
    }

    /// Returns `true` if an interceptor with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Returns the registered names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Iterates over all registrations in order.
    pub fn iter(&self) -> core::slice::Iter<'_, InterceptorRegistration> {
        self.entries.iter()
    }

    /// Returns the number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Interceptors {
    type Item = &'a InterceptorRegistration;
    type IntoIter = core::slice::Iter<'a, InterceptorRegistration>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use meridian_resource::Diagnostics;

    use super::*;

    fn noop() -> Interceptor {
        Interceptor::crud_fn(|_| Diagnostics::new())
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut interceptors = Interceptors::new();
        interceptors
            .register("a", StageMask::BEFORE, OperationMask::CREATE, noop())
            .expect("first registration");

        let err = interceptors
            .register("a", StageMask::AFTER, OperationMask::READ, noop())
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateName {
                name: "a".to_owned()
            }
        );
        assert_eq!(interceptors.len(), 1);
    }

    #[test]
    fn family_must_support_operations() {
        let mut interceptors = Interceptors::new();
        let err = interceptors
            .register(
                "bad",
                StageMask::BEFORE,
                OperationMask::CREATE | OperationMask::IMPORT,
                noop(),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            RegistrationError::UnsupportedOperations { operations, .. } if operations == OperationMask::IMPORT
        ));
        assert!(interceptors.is_empty());
    }

    #[test]
    fn matches_requires_both_masks() {
        let mut interceptors = Interceptors::new();
        interceptors
            .register(
                "tags",
                StageMask::BEFORE | StageMask::AFTER,
                OperationMask::CREATE | OperationMask::UPDATE,
                noop(),
            )
            .expect("registration");

        let entry = interceptors.iter().next().expect("entry");
        assert!(entry.matches(Stage::Before, Operation::Update));
        assert!(!entry.matches(Stage::Finally, Operation::Update));
        assert!(!entry.matches(Stage::Before, Operation::Read));
    }
}
