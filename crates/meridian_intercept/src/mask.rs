//! Lifecycle stage and operation masks.
//!
//! A registration names the stages ([`StageMask`]) and operations
//! ([`OperationMask`]) it participates in. A single dispatch step is always
//! one [`Stage`] of one [`Operation`]; use [`Stage::as_mask`] and
//! [`Operation::as_mask`] to test membership.
//!
//! `bitflags` provides combination (`|`) and both containment checks:
//! [`intersects`](StageMask::intersects) is "has any" and
//! [`contains`](StageMask::contains) is "has all".

use core::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Stage
// ─────────────────────────────────────────────────────────────────────────────

/// A single lifecycle stage of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Runs before the handler; any error aborts the call.
    Before,
    /// Runs after the handler succeeded.
    After,
    /// Runs after the handler failed.
    OnError,
    /// Always runs last.
    Finally,
}

bitflags::bitflags! {
    /// A set of lifecycle stages.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StageMask: u8 {
        /// Before the handler.
        const BEFORE = 1 << 0;
        /// After a successful handler.
        const AFTER = 1 << 1;
        /// After a failed handler.
        const ON_ERROR = 1 << 2;
        /// After everything else.
        const FINALLY = 1 << 3;
    }
}

impl Stage {
    /// Returns the mask bit for this stage.
    #[must_use]
    pub const fn as_mask(self) -> StageMask {
        match self {
            Self::Before => StageMask::BEFORE,
            Self::After => StageMask::AFTER,
            Self::OnError => StageMask::ON_ERROR,
            Self::Finally => StageMask::FINALLY,
        }
    }
}

impl From<Stage> for StageMask {
    fn from(stage: Stage) -> Self {
        stage.as_mask()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Before => "Before",
            Self::After => "After",
            Self::OnError => "OnError",
            Self::Finally => "Finally",
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Operation
// ─────────────────────────────────────────────────────────────────────────────

/// A host operation on one resource instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Create the remote object.
    Create,
    /// Refresh state from the remote object.
    Read,
    /// Update the remote object in place.
    Update,
    /// Delete the remote object.
    Delete,
    /// Adjust the plan before apply.
    CustomizeDiff,
    /// Adopt an existing remote object.
    Import,
}

bitflags::bitflags! {
    /// A set of host operations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OperationMask: u8 {
        /// Create.
        const CREATE = 1 << 0;
        /// Read.
        const READ = 1 << 1;
        /// Update.
        const UPDATE = 1 << 2;
        /// Delete.
        const DELETE = 1 << 3;
        /// Plan-time diff customization.
        const CUSTOMIZE_DIFF = 1 << 4;
        /// Import.
        const IMPORT = 1 << 5;

        /// Every CRUD operation.
        const ALL_CRUD = Self::CREATE.bits() | Self::READ.bits() | Self::UPDATE.bits() | Self::DELETE.bits();
    }
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Create,
        Self::Read,
        Self::Update,
        Self::Delete,
        Self::CustomizeDiff,
        Self::Import,
    ];

    /// Returns the mask bit for this operation.
    #[must_use]
    pub const fn as_mask(self) -> OperationMask {
        match self {
            Self::Create => OperationMask::CREATE,
            Self::Read => OperationMask::READ,
            Self::Update => OperationMask::UPDATE,
            Self::Delete => OperationMask::DELETE,
            Self::CustomizeDiff => OperationMask::CUSTOMIZE_DIFF,
            Self::Import => OperationMask::IMPORT,
        }
    }
}

impl From<Operation> for OperationMask {
    fn from(operation: Operation) -> Self {
        operation.as_mask()
    }
}

impl FromIterator<Operation> for OperationMask {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |mask, op| mask | op.as_mask())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "Create",
            Self::Read => "Read",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::CustomizeDiff => "CustomizeDiff",
            Self::Import => "Import",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_crud_excludes_diff_and_import() {
        let crud = OperationMask::ALL_CRUD;
        for op in [Operation::Create, Operation::Read, Operation::Update, Operation::Delete] {
            assert!(crud.contains(op.as_mask()));
        }
        assert!(!crud.intersects(OperationMask::CUSTOMIZE_DIFF | OperationMask::IMPORT));
    }

    #[test]
    fn has_any_versus_has_all() {
        let stages = StageMask::BEFORE | StageMask::AFTER | StageMask::FINALLY;
        assert!(stages.intersects(StageMask::AFTER | StageMask::ON_ERROR));
        assert!(!stages.contains(StageMask::AFTER | StageMask::ON_ERROR));
        assert!(stages.contains(Stage::Finally.as_mask()));
    }

    #[test]
    fn collect_operations() {
        let mask: OperationMask = [Operation::Create, Operation::Update].into_iter().collect();
        assert_eq!(mask, OperationMask::CREATE | OperationMask::UPDATE);
    }
}
