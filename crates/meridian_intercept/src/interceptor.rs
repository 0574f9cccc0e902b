//! The interceptor contract.
//!
//! An [`Interceptor`] is one of three kinds, chosen when it is registered:
//!
//! | Kind | Operations | Result |
//! |------|-----------|--------|
//! | [`CrudInterceptor`] | Create, Read, Update, Delete | [`Diagnostics`] |
//! | [`DiffInterceptor`] | `CustomizeDiff` | `Result<(), BoxError>` |
//! | [`ImportInterceptor`] | Import | `Result<(), BoxError>` |
//!
//! Every kind receives [`InterceptorParams`]: the per-call context, the state
//! handle for its family, the shared client, and which stage of which
//! operation is running.
//!
//! Closures with the right signature implement the traits directly; use
//! [`Interceptor::crud_fn`] and friends so their argument types are inferred.

use core::fmt;
use std::sync::Arc;

use meridian_resource::{BoxError, CallContext, Client, Diagnostics, ResourceData, ResourceDiff};

use crate::mask::{Operation, OperationMask, Stage};

/// Arguments passed to an interceptor invocation.
pub struct InterceptorParams<'a, D> {
    /// Request-scoped data for this call.
    pub ctx: &'a mut CallContext,
    /// The state handle of the resource instance.
    pub data: &'a mut D,
    /// The shared provider client.
    pub client: &'a Client,
    /// The stage being run.
    pub stage: Stage,
    /// The operation being run.
    pub operation: Operation,
}

/// Arguments for CRUD interceptors.
pub type CrudParams<'a> = InterceptorParams<'a, ResourceData>;

/// Arguments for diff interceptors.
pub type DiffParams<'a> = InterceptorParams<'a, ResourceDiff>;

/// Arguments for import interceptors.
pub type ImportParams<'a> = InterceptorParams<'a, ResourceData>;

/// Interceptor for Create, Read, Update and Delete.
pub trait CrudInterceptor: Send + Sync {
    /// Runs the interceptor. Error diagnostics in a Before stage abort the call.
    fn run(&self, params: CrudParams<'_>) -> Diagnostics;
}

/// Interceptor for plan-time diff customization.
pub trait DiffInterceptor: Send + Sync {
    /// Runs the interceptor.
    ///
    /// # Errors
    ///
    /// An error in the Before stage aborts the call; later errors are joined.
    fn run(&self, params: DiffParams<'_>) -> Result<(), BoxError>;
}

/// Interceptor for Import.
pub trait ImportInterceptor: Send + Sync {
    /// Runs the interceptor.
    ///
    /// # Errors
    ///
    /// An error in the Before stage aborts the call; later errors are joined.
    fn run(&self, params: ImportParams<'_>) -> Result<(), BoxError>;
}

impl<F> CrudInterceptor for F
where
    F: Fn(CrudParams<'_>) -> Diagnostics + Send + Sync,
{
    fn run(&self, params: CrudParams<'_>) -> Diagnostics {
        self(params)
    }
}

impl<F> DiffInterceptor for F
where
    F: Fn(DiffParams<'_>) -> Result<(), BoxError> + Send + Sync,
{
    fn run(&self, params: DiffParams<'_>) -> Result<(), BoxError> {
        self(params)
    }
}

impl<F> ImportInterceptor for F
where
    F: Fn(ImportParams<'_>) -> Result<(), BoxError> + Send + Sync,
{
    fn run(&self, params: ImportParams<'_>) -> Result<(), BoxError> {
        self(params)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Interceptor
// ─────────────────────────────────────────────────────────────────────────────

/// An interceptor of one of the three dispatch families.
#[derive(Clone)]
pub enum Interceptor {
    /// Runs around CRUD handlers.
    Crud(Arc<dyn CrudInterceptor>),
    /// Runs around the diff customization handler.
    Diff(Arc<dyn DiffInterceptor>),
    /// Runs around the import handler.
    Import(Arc<dyn ImportInterceptor>),
}

impl Interceptor {
    /// Wraps a CRUD interceptor.
    #[must_use]
    pub fn crud(interceptor: impl CrudInterceptor + 'static) -> Self {
        Self::Crud(Arc::new(interceptor))
    }

    /// Wraps a CRUD interceptor closure.
    #[must_use]
    pub fn crud_fn<F>(f: F) -> Self
    where
        F: Fn(CrudParams<'_>) -> Diagnostics + Send + Sync + 'static,
    {
        Self::Crud(Arc::new(f))
    }

    /// Wraps a diff interceptor.
    #[must_use]
    pub fn diff(interceptor: impl DiffInterceptor + 'static) -> Self {
        Self::Diff(Arc::new(interceptor))
    }

    /// Wraps a diff interceptor closure.
    #[must_use]
    pub fn diff_fn<F>(f: F) -> Self
    where
        F: Fn(DiffParams<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self::Diff(Arc::new(f))
    }

    /// Wraps an import interceptor.
    #[must_use]
    pub fn import(interceptor: impl ImportInterceptor + 'static) -> Self {
        Self::Import(Arc::new(interceptor))
    }

    /// Wraps an import interceptor closure.
    #[must_use]
    pub fn import_fn<F>(f: F) -> Self
    where
        F: Fn(ImportParams<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self::Import(Arc::new(f))
    }

    /// Name of the interceptor's family.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Crud(_) => "crud",
            Self::Diff(_) => "diff",
            Self::Import(_) => "import",
        }
    }

    /// Operations an interceptor of this family can be registered for.
    #[must_use]
    pub fn supported_operations(&self) -> OperationMask {
        match self {
            Self::Crud(_) => OperationMask::ALL_CRUD,
            Self::Diff(_) => OperationMask::CUSTOMIZE_DIFF,
            Self::Import(_) => OperationMask::IMPORT,
        }
    }

    /// Returns the CRUD interceptor, if this is one.
    #[must_use]
    pub fn as_crud(&self) -> Option<&dyn CrudInterceptor> {
        match self {
            Self::Crud(i) => Some(i.as_ref()),
            _ => None,
        }
    }

    /// Returns the diff interceptor, if this is one.
    #[must_use]
    pub fn as_diff(&self) -> Option<&dyn DiffInterceptor> {
        match self {
            Self::Diff(i) => Some(i.as_ref()),
            _ => None,
        }
    }

    /// Returns the import interceptor, if this is one.
    #[must_use]
    pub fn as_import(&self) -> Option<&dyn ImportInterceptor> {
        match self {
            Self::Import(i) => Some(i.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Interceptor").field(&self.kind()).finish()
    }
}
