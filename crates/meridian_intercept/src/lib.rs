//! Interceptor masks, registration and dispatch for Meridian (Layer 2).
//!
//! `meridian_intercept` wraps resource handlers with cross-cutting behavior
//! the handler does not know about:
//!
//! - [`mask`] - [`StageMask`] and [`OperationMask`] flag sets
//! - [`interceptor`] - The [`Interceptor`] sum type over the three families
//! - [`registration`] - The ordered [`Interceptors`] registration list
//! - [`dispatch`] - The phase engine and handler wrapping
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use meridian_intercept::prelude::*;
//! use meridian_resource::prelude::*;
//!
//! let mut interceptors = Interceptors::new();
//! interceptors
//!     .register(
//!         "name-check",
//!         StageMask::BEFORE,
//!         OperationMask::CREATE,
//!         Interceptor::crud_fn(|params| {
//!             let mut diags = Diagnostics::new();
//!             if params.data.get_string("name").is_empty() {
//!                 diags.append_error("name is required");
//!             }
//!             diags
//!         }),
//!     )
//!     .expect("unique name");
//!
//! let create = intercept_crud(
//!     &Arc::new(interceptors),
//!     Operation::Create,
//!     Some(crud_handler(|_, data, _| {
//!         data.set_id("r-1");
//!         Diagnostics::new()
//!     })),
//! )
//! .expect("handler present");
//!
//! let mut data = ResourceData::new();
//! let diags = create(&mut CallContext::new(), &mut data, &Client::default());
//! assert!(diags.has_error());
//! assert_eq!(data.id(), "");
//! ```
//!
//! # Architecture
//!
//! This crate is Layer 2 of the Meridian architecture. It depends only on
//! `meridian_resource` and knows nothing about tags, regions or identities;
//! those are built-in interceptors registered by `meridian_provider`.

/// The phase engine and handler wrapping.
pub mod dispatch;

/// The interceptor contract.
pub mod interceptor;

/// Lifecycle stage and operation masks.
pub mod mask;

/// Interceptor registration.
pub mod registration;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::dispatch::{
        CrudFn, CrudHandler, DiffFn, DiffHandler, ImportFn, ImportHandler, crud_handler,
        diff_handler, dispatch_crud, dispatch_diff, dispatch_import, import_handler,
        intercept_crud, intercept_diff, intercept_import,
    };
    pub use crate::interceptor::{
        CrudInterceptor, CrudParams, DiffInterceptor, DiffParams, ImportInterceptor,
        ImportParams, Interceptor, InterceptorParams,
    };
    pub use crate::mask::{Operation, OperationMask, Stage, StageMask};
    pub use crate::registration::{InterceptorRegistration, Interceptors, RegistrationError};
}

pub use interceptor::Interceptor;
pub use mask::{Operation, OperationMask, Stage, StageMask};
pub use registration::{Interceptors, RegistrationError};
