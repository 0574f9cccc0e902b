//! Phase ordering and error propagation tests for the three dispatch families.


use std::sync::Arc;

use meridian_intercept::prelude::*;
use meridian_resource::prelude::*;
use test_utils::{
    CallLog, Counter, all_stages, counting_handler, crud_recorder, diff_recorder,
    import_recorder, test_client,
};

fn crud_list(log: &CallLog, fail: Option<(&'static str, Stage)>) -> Interceptors {
    let mut interceptors = Interceptors::new();
    for label in ["first", "second", "third"] {
        let fail_in = fail.and_then(|(l, s)| (l == label).then_some(s));
        interceptors
            .register(
                label,
                all_stages(),
                OperationMask::ALL_CRUD,
                crud_recorder(log, label, fail_in),
            )
            .expect("unique name");
    }
    interceptors
}

// ═══════════════════════════════════════════════════════════════════════════════
// CRUD
// ═══════════════════════════════════════════════════════════════════════════════

/// A failing Before interceptor stops everything after it.
#[test]
fn before_failure_skips_handler_and_later_phases() {
    let log = CallLog::default();
    let counter = Counter::default();
    let interceptors = crud_list(&log, Some(("second", Stage::Before)));
    let handler = counting_handler(&log, &counter, false);

    let mut data = ResourceData::new();
    let diags = dispatch_crud(
        &interceptors,
        Operation::Create,
        handler.as_ref(),
        &mut CallContext::new(),
        &mut data,
        &test_client(),
    );

    assert!(diags.has_error());
    assert_eq!(counter.get(), 0, "handler must not be called");
    assert_eq!(log.entries(), vec!["first:Before", "second:Before"]);
    assert_eq!(data.id(), "");
}

/// After runs in reverse registration order, then Finally; OnError never runs.
#[test]
fn success_runs_after_in_reverse_then_finally() {
    let log = CallLog::default();
    let counter = Counter::default();
    let interceptors = crud_list(&log, None);
    let handler = counting_handler(&log, &counter, false);

    let diags = dispatch_crud(
        &interceptors,
        Operation::Read,
        handler.as_ref(),
        &mut CallContext::new(),
        &mut ResourceData::new(),
        &test_client(),
    );

    assert!(diags.is_empty());
    assert_eq!(counter.get(), 1);
    assert_eq!(
        log.entries(),
        vec![
            "first:Before",
            "second:Before",
            "third:Before",
            "handler",
            "third:After",
            "second:After",
            "first:After",
            "third:Finally",
            "second:Finally",
            "first:Finally",
        ]
    );
    assert!(log.for_stage(Stage::OnError).is_empty());
}

/// A failing handler selects OnError instead of After; errors accumulate.
#[test]
fn handler_failure_runs_on_error_and_accumulates() {
    let log = CallLog::default();
    let counter = Counter::default();
    let interceptors = crud_list(&log, Some(("first", Stage::OnError)));
    let handler = counting_handler(&log, &counter, true);

    let diags = dispatch_crud(
        &interceptors,
        Operation::Update,
        handler.as_ref(),
        &mut CallContext::new(),
        &mut ResourceData::new(),
        &test_client(),
    );

    let summaries: Vec<_> = diags.errors().map(|d| d.summary.clone()).collect();
    assert_eq!(summaries, vec!["handler failed", "first failed"]);
    assert!(log.for_stage(Stage::After).is_empty());
    assert_eq!(
        log.for_stage(Stage::OnError),
        vec!["third:OnError", "second:OnError", "first:OnError"]
    );
    assert_eq!(log.for_stage(Stage::Finally).len(), 3);
}

/// Interceptors registered for other operations never run.
#[test]
fn other_operations_are_filtered_out() {
    let log = CallLog::default();
    let counter = Counter::default();
    let mut interceptors = Interceptors::new();
    interceptors
        .register(
            "create-only",
            all_stages(),
            OperationMask::CREATE,
            crud_recorder(&log, "create-only", None),
        )
        .expect("registration");
    let handler = counting_handler(&log, &counter, false);

    dispatch_crud(
        &interceptors,
        Operation::Delete,
        handler.as_ref(),
        &mut CallContext::new(),
        &mut ResourceData::new(),
        &test_client(),
    );

    assert_eq!(log.entries(), vec!["handler"]);
}

/// Interceptors see the stage and operation they run in and share the context.
#[test]
fn interceptors_share_the_call_context() {
    let mut interceptors = Interceptors::new();
    interceptors
        .register(
            "stash",
            StageMask::BEFORE,
            OperationMask::CREATE,
            Interceptor::crud_fn(|params| {
                assert_eq!(params.operation, Operation::Create);
                params
                    .ctx
                    .set_tags_in([("Name", "web")].into_iter().collect());
                Diagnostics::new()
            }),
        )
        .expect("registration");

    let handler = crud_handler(|ctx, data, _| {
        let name = ctx.tags_in().and_then(|t| t.get("Name")).unwrap_or_default();
        data.set_id(format!("i-{name}"));
        Diagnostics::new()
    });

    let mut data = ResourceData::new();
    dispatch_crud(
        &interceptors,
        Operation::Create,
        handler.as_ref(),
        &mut CallContext::new(),
        &mut data,
        &test_client(),
    );
    assert_eq!(data.id(), "i-web");
}

// ═══════════════════════════════════════════════════════════════════════════════
// DIFF
// ═══════════════════════════════════════════════════════════════════════════════

/// Diff wrapping exists without a user diff function and still runs interceptors.
#[test]
fn diff_without_handler_runs_interceptors() {
    let mut interceptors = Interceptors::new();
    interceptors
        .register(
            "default-region",
            StageMask::BEFORE,
            OperationMask::CUSTOMIZE_DIFF,
            Interceptor::diff_fn(|params| {
                let region = params.client.default_region().to_owned();
                params.data.set_new("region", region)?;
                Ok(())
            }),
        )
        .expect("registration");

    let customize = intercept_diff(&Arc::new(interceptors), None);
    let mut diff = ResourceDiff::new("", Attributes::new(), Attributes::new(), Attributes::new());
    customize(&mut CallContext::new(), &mut diff, &test_client()).expect("diff succeeds");

    assert_eq!(diff.get("region"), Value::from("us-west-2"));
}

/// Errors after the handler are joined, in the order they occurred.
#[test]
fn diff_errors_are_joined() {
    let log = CallLog::default();
    let mut interceptors = Interceptors::new();
    interceptors
        .register(
            "a",
            all_stages(),
            OperationMask::CUSTOMIZE_DIFF,
            diff_recorder(&log, "a", Some(Stage::Finally)),
        )
        .expect("registration");
    interceptors
        .register(
            "b",
            all_stages(),
            OperationMask::CUSTOMIZE_DIFF,
            diff_recorder(&log, "b", Some(Stage::OnError)),
        )
        .expect("registration");

    let handler = diff_handler(|_, _, _| Err("handler failed".into()));
    let mut diff = ResourceDiff::default();
    let err = dispatch_diff(
        &interceptors,
        Some(handler.as_ref()),
        &mut CallContext::new(),
        &mut diff,
        &test_client(),
    )
    .unwrap_err();

    assert_eq!(err.to_string(), "handler failed\nb failed\na failed");
    assert_eq!(err.downcast_ref::<JoinedError>().map(|j| j.errors().len()), Some(3));
}

/// A Before error is returned as is.
#[test]
fn diff_before_error_aborts() {
    let log = CallLog::default();
    let mut interceptors = Interceptors::new();
    interceptors
        .register(
            "a",
            all_stages(),
            OperationMask::CUSTOMIZE_DIFF,
            diff_recorder(&log, "a", Some(Stage::Before)),
        )
        .expect("registration");

    let err = dispatch_diff(
        &interceptors,
        None,
        &mut CallContext::new(),
        &mut ResourceDiff::default(),
        &test_client(),
    )
    .unwrap_err();

    assert_eq!(err.to_string(), "a failed");
    assert_eq!(log.entries(), vec!["a:Before"]);
}

// ═══════════════════════════════════════════════════════════════════════════════
// IMPORT
// ═══════════════════════════════════════════════════════════════════════════════

/// Import returns the handler's states when nothing fails.
#[test]
fn import_returns_handler_states() {
    let log = CallLog::default();
    let mut interceptors = Interceptors::new();
    interceptors
        .register(
            "parse",
            StageMask::BEFORE | StageMask::FINALLY,
            OperationMask::IMPORT,
            import_recorder(&log, "parse", None),
        )
        .expect("registration");

    let import = intercept_import(
        &Arc::new(interceptors),
        Some(import_handler(|_, data, _| Ok(vec![data.clone()]))),
    )
    .expect("handler present");

    let mut data = ResourceData::for_import("vpc-123");
    let states = import(&mut CallContext::new(), &mut data, &test_client()).expect("import");

    assert_eq!(states.len(), 1);
    assert_eq!(states[0].id(), "vpc-123");
    assert_eq!(log.entries(), vec!["parse:Before", "parse:Finally"]);
}

/// An After error on import fails the call even though the handler succeeded.
#[test]
fn import_after_error_fails() {
    let log = CallLog::default();
    let mut interceptors = Interceptors::new();
    interceptors
        .register(
            "check",
            StageMask::AFTER,
            OperationMask::IMPORT,
            import_recorder(&log, "check", Some(Stage::After)),
        )
        .expect("registration");

    let handler = import_handler(|_, data, _| Ok(vec![data.clone()]));
    let err = dispatch_import(
        &interceptors,
        handler.as_ref(),
        &mut CallContext::new(),
        &mut ResourceData::for_import("x"),
        &test_client(),
    )
    .unwrap_err();

    assert_eq!(err.to_string(), "check failed");
}
