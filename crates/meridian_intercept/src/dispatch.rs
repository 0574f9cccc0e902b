//! Interceptor dispatch.
//!
//! Every dispatch runs the same phase sequence around a handler:
//!
//! 1. **Before**, in registration order. The first error aborts the call:
//!    the handler is not invoked and no later phase runs.
//! 2. **Handler**, exactly once.
//! 3. **After** if the handler succeeded, **OnError** if it failed, in reverse
//!    registration order. Errors accumulate.
//! 4. **Finally**, in reverse registration order. Errors accumulate.
//!
//! The three families differ only in how results accumulate:
//!
//! - [`dispatch_crud`] collects [`Diagnostics`], warnings included.
//! - [`dispatch_diff`] and [`dispatch_import`] join errors with
//!   [`join_errors`].
//!
//! The `intercept_*` functions wrap a handler once at provider startup.
//! CRUD and import handlers that are absent stay absent; the diff handler is
//! always produced so that `CustomizeDiff` interceptors run even for resources
//! without their own diff function.

use std::sync::Arc;

use meridian_resource::{
    BoxError, CallContext, Client, Diagnostics, ResourceData, ResourceDiff, join_errors,
};

use crate::interceptor::{Interceptor, InterceptorParams};
use crate::mask::{Operation, Stage};
use crate::registration::{InterceptorRegistration, Interceptors};

/// Signature of a CRUD handler.
pub type CrudFn = dyn Fn(&mut CallContext, &mut ResourceData, &Client) -> Diagnostics + Send + Sync;

/// Signature of a diff customization handler.
pub type DiffFn =
    dyn Fn(&mut CallContext, &mut ResourceDiff, &Client) -> Result<(), BoxError> + Send + Sync;

/// Signature of an import handler, returning the states to adopt.
pub type ImportFn = dyn Fn(&mut CallContext, &mut ResourceData, &Client) -> Result<Vec<ResourceData>, BoxError>
    + Send
    + Sync;

/// A shared CRUD handler.
pub type CrudHandler = Arc<CrudFn>;

/// A shared diff customization handler.
pub type DiffHandler = Arc<DiffFn>;

/// A shared import handler.
pub type ImportHandler = Arc<ImportFn>;

/// Boxes a CRUD handler closure.
pub fn crud_handler<F>(f: F) -> CrudHandler
where
    F: Fn(&mut CallContext, &mut ResourceData, &Client) -> Diagnostics + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Boxes a diff handler closure.
pub fn diff_handler<F>(f: F) -> DiffHandler
where
    F: Fn(&mut CallContext, &mut ResourceDiff, &Client) -> Result<(), BoxError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// Boxes an import handler closure.
pub fn import_handler<F>(f: F) -> ImportHandler
where
    F: Fn(&mut CallContext, &mut ResourceData, &Client) -> Result<Vec<ResourceData>, BoxError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

// ─────────────────────────────────────────────────────────────────────────────
// Phase engine
// ─────────────────────────────────────────────────────────────────────────────

/// Accumulated result of one dispatch.
trait Outcome: Default {
    fn failed(&self) -> bool;
    fn record(&mut self, err: BoxError);
}

impl Outcome for Diagnostics {
    fn failed(&self) -> bool {
        self.has_error()
    }

    fn record(&mut self, err: BoxError) {
        self.append_error(err.to_string());
    }
}

impl Outcome for Vec<BoxError> {
    fn failed(&self) -> bool {
        !self.is_empty()
    }

    fn record(&mut self, err: BoxError) {
        self.push(err);
    }
}

fn params<'a, D>(
    ctx: &'a mut CallContext,
    data: &'a mut D,
    client: &'a Client,
    stage: Stage,
    operation: Operation,
) -> InterceptorParams<'a, D> {
    InterceptorParams {
        ctx,
        data,
        client,
        stage,
        operation,
    }
}

/// Runs the phase sequence for `operation`.
///
/// Returns the handler's value, `None` when the call was aborted before the
/// handler or the handler produced nothing, and the accumulated outcome.
fn run_phases<D, O, T>(
    interceptors: &Interceptors,
    operation: Operation,
    ctx: &mut CallContext,
    data: &mut D,
    client: &Client,
    invoke: impl Fn(&Interceptor, InterceptorParams<'_, D>, &mut O),
    handler: impl FnOnce(&mut CallContext, &mut D, &Client, &mut O) -> Option<T>,
) -> (Option<T>, O)
where
    O: Outcome,
{
    let mut outcome = O::default();

    if let Err(err) = ctx.check_cancelled() {
        outcome.record(err.into());
        return (None, outcome);
    }

    let registrations: Vec<&InterceptorRegistration> =
        interceptors.for_operation(operation).collect();

    let before = registrations
        .iter()
        .filter(|r| r.stages().contains(Stage::Before.as_mask()));
    for registration in before {
        tracing::debug!(
            interceptor = registration.name(),
            %operation,
            stage = %Stage::Before,
            "running interceptor"
        );
        invoke(
            registration.interceptor(),
            params(ctx, data, client, Stage::Before, operation),
            &mut outcome,
        );
        if outcome.failed() {
            tracing::warn!(
                interceptor = registration.name(),
                %operation,
                "Before interceptor failed, aborting call"
            );
            return (None, outcome);
        }
    }

    let value = handler(ctx, data, client, &mut outcome);

    let outcome_stage = if outcome.failed() {
        Stage::OnError
    } else {
        Stage::After
    };

    for stage in [outcome_stage, Stage::Finally] {
        let matching = registrations
            .iter()
            .rev()
            .filter(|r| r.stages().contains(stage.as_mask()));
        for registration in matching {
            tracing::debug!(
                interceptor = registration.name(),
                %operation,
                %stage,
                "running interceptor"
            );
            invoke(
                registration.interceptor(),
                params(ctx, data, client, stage, operation),
                &mut outcome,
            );
        }
    }

    (value, outcome)
}

// ─────────────────────────────────────────────────────────────────────────────
// Families
// ─────────────────────────────────────────────────────────────────────────────

/// Runs a CRUD handler for `operation` with its interceptors.
pub fn dispatch_crud(
    interceptors: &Interceptors,
    operation: Operation,
    handler: &CrudFn,
    ctx: &mut CallContext,
    data: &mut ResourceData,
    client: &Client,
) -> Diagnostics {
    let (_, diags) = run_phases(
        interceptors,
        operation,
        ctx,
        data,
        client,
        |interceptor, params, diags: &mut Diagnostics| {
            if let Some(interceptor) = interceptor.as_crud() {
                diags.extend(interceptor.run(params));
            }
        },
        |ctx, data, client, diags| {
            diags.extend(handler(ctx, data, client));
            Some(())
        },
    );
    diags
}

/// Runs the diff customization for a resource with its interceptors.
///
/// `handler` is optional; interceptors run either way.
///
/// # Errors
///
/// Returns the Before error that aborted the call, or every error from the
/// handler and later phases joined into one.
pub fn dispatch_diff(
    interceptors: &Interceptors,
    handler: Option<&DiffFn>,
    ctx: &mut CallContext,
    diff: &mut ResourceDiff,
    client: &Client,
) -> Result<(), BoxError> {
    let (_, errors) = run_phases(
        interceptors,
        Operation::CustomizeDiff,
        ctx,
        diff,
        client,
        |interceptor, params, errors: &mut Vec<BoxError>| {
            if let Some(interceptor) = interceptor.as_diff()
                && let Err(err) = interceptor.run(params)
            {
                errors.push(err);
            }
        },
        |ctx, diff, client, errors| {
            if let Some(handler) = handler
                && let Err(err) = handler(ctx, diff, client)
            {
                errors.push(err);
            }
            Some(())
        },
    );
    join_errors(errors).map_or(Ok(()), Err)
}

/// Runs an import handler with its interceptors.
///
/// # Errors
///
/// Returns the Before error that aborted the call, or every error from the
/// handler and later phases joined into one.
pub fn dispatch_import(
    interceptors: &Interceptors,
    handler: &ImportFn,
    ctx: &mut CallContext,
    data: &mut ResourceData,
    client: &Client,
) -> Result<Vec<ResourceData>, BoxError> {
    let (states, errors) = run_phases(
        interceptors,
        Operation::Import,
        ctx,
        data,
        client,
        |interceptor, params, errors: &mut Vec<BoxError>| {
            if let Some(interceptor) = interceptor.as_import()
                && let Err(err) = interceptor.run(params)
            {
                errors.push(err);
            }
        },
        |ctx, data, client, errors| match handler(ctx, data, client) {
            Ok(states) => Some(states),
            Err(err) => {
                errors.push(err);
                None
            }
        },
    );
    match join_errors(errors) {
        Some(err) => Err(err),
        None => Ok(states.unwrap_or_default()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wrapping
// ─────────────────────────────────────────────────────────────────────────────

/// Wraps a CRUD handler with the interceptors registered for `operation`.
///
/// Returns `None` when there is no handler to wrap.
#[must_use]
pub fn intercept_crud(
    interceptors: &Arc<Interceptors>,
    operation: Operation,
    handler: Option<CrudHandler>,
) -> Option<CrudHandler> {
    let handler = handler?;
    let interceptors = Arc::clone(interceptors);
    Some(Arc::new(
        move |ctx: &mut CallContext, data: &mut ResourceData, client: &Client| {
            dispatch_crud(&interceptors, operation, handler.as_ref(), ctx, data, client)
        },
    ))
}

/// Wraps the diff customization handler, which may be absent.
#[must_use]
pub fn intercept_diff(interceptors: &Arc<Interceptors>, handler: Option<DiffHandler>) -> DiffHandler {
    let interceptors = Arc::clone(interceptors);
    Arc::new(
        move |ctx: &mut CallContext, diff: &mut ResourceDiff, client: &Client| {
            dispatch_diff(&interceptors, handler.as_deref(), ctx, diff, client)
        },
    )
}

/// Wraps an import handler.
///
/// Returns `None` when there is no handler to wrap.
#[must_use]
pub fn intercept_import(
    interceptors: &Arc<Interceptors>,
    handler: Option<ImportHandler>,
) -> Option<ImportHandler> {
    let handler = handler?;
    let interceptors = Arc::clone(interceptors);
    Some(Arc::new(
        move |ctx: &mut CallContext, data: &mut ResourceData, client: &Client| {
            dispatch_import(&interceptors, handler.as_ref(), ctx, data, client)
        },
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use meridian_resource::StateReader;
    use meridian_resource::context::CancellationToken;

    use super::*;
    use crate::mask::{OperationMask, StageMask};

    fn recorder(log: &Arc<Mutex<Vec<String>>>, label: &'static str) -> Interceptor {
        let log = Arc::clone(log);
        Interceptor::crud_fn(move |params| {
            log.lock()
                .unwrap()
                .push(format!("{label}:{}", params.stage));
            Diagnostics::new()
        })
    }

    #[test]
    fn warnings_from_before_do_not_abort() {
        let mut interceptors = Interceptors::new();
        interceptors
            .register(
                "warn",
                StageMask::BEFORE,
                OperationMask::CREATE,
                Interceptor::crud_fn(|_| {
                    let mut diags = Diagnostics::new();
                    diags.append_warning("heads up");
                    diags
                }),
            )
            .unwrap();

        let handler = crud_handler(|_, data, _| {
            data.set_id("r-1");
            Diagnostics::new()
        });
        let mut data = ResourceData::new();
        let diags = dispatch_crud(
            &interceptors,
            Operation::Create,
            handler.as_ref(),
            &mut CallContext::new(),
            &mut data,
            &Client::default(),
        );

        assert!(!diags.has_error());
        assert_eq!(diags.warnings().count(), 1);
        assert_eq!(data.id(), "r-1");
    }

    #[test]
    fn cancelled_call_runs_nothing() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut interceptors = Interceptors::new();
        interceptors
            .register(
                "a",
                StageMask::all(),
                OperationMask::READ,
                recorder(&log, "a"),
            )
            .unwrap();

        let token = CancellationToken::new();
        token.cancel();
        let mut ctx = CallContext::new().with_cancellation(token);

        let handler = crud_handler(|_, _, _| panic!("handler must not run"));
        let diags = dispatch_crud(
            &interceptors,
            Operation::Read,
            handler.as_ref(),
            &mut ctx,
            &mut ResourceData::new(),
            &Client::default(),
        );

        assert!(diags.has_error());
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn absent_crud_handler_is_not_wrapped() {
        let interceptors = Arc::new(Interceptors::new());
        assert!(intercept_crud(&interceptors, Operation::Delete, None).is_none());
        assert!(intercept_import(&interceptors, None).is_none());
    }
}
