//! Provider assembly: registration order, schema rules and import wiring.

mod test_utils;

use std::sync::Arc;

use meridian_identity::prelude::*;
use meridian_provider::prelude::*;
use meridian_resource::prelude::*;
use parking_lot::Mutex;
use test_utils::*;

fn plain(type_name: &str) -> ResourceRegistration {
    ResourceRegistration::new(type_name, "Thing", || {
        Resource::new(Schema::new().with("name", AttributeSchema::required()))
    })
}

fn tagged(type_name: &str) -> ResourceRegistration {
    ResourceRegistration::new(type_name, "Thing", || Resource::new(tagged_schema()))
        .with_tags(TagsSpec::new("arn"))
}

fn initialization_message(result: Result<Provider, ProviderError>) -> String {
    match result {
        Err(err @ ProviderError::Initialization(_)) => err.to_string(),
        Err(other) => panic!("expected an initialization error, got {other:?}"),
        Ok(provider) => panic!("expected an error, got {provider:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registration
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn builtins_registered_in_order() {
    let provider = provider(vec![
        tagged("aws_thing")
            .with_region(RegionSpec::overridable())
            .with_identity(IdentitySpec::regional_arn()),
    ]);

    let thing = provider.resource("aws_thing").expect("registered");
    let names: Vec<&str> = thing.interceptors().names().collect();
    assert_eq!(
        names,
        [
            "validate_region",
            "default_region",
            "set_region_in_state",
            "force_new_if_region_changes",
            "import_region_no_default",
            "transparent_tagging",
            "set_tags_all",
            "validate_required_tags",
            "identity",
        ]
    );
}

#[test]
fn region_import_falls_back_without_inherent_region() {
    let provider = provider(vec![
        plain("aws_thing")
            .with_region(RegionSpec {
                is_override_enabled: true,
                is_validate_override_in_partition: false,
            })
            .with_identity(IdentitySpec::regional_single_parameter("name")),
    ]);

    let interceptors = provider.resource("aws_thing").expect("registered").interceptors();
    assert!(interceptors.contains("import_region"));
    assert!(!interceptors.contains("import_region_no_default"));
    assert!(!interceptors.contains("validate_region"));
}

#[test]
fn plain_resource_gets_no_builtins() {
    let provider = provider(vec![plain("aws_thing")]);

    let thing = provider.resource("aws_thing").expect("registered");
    assert!(thing.interceptors().is_empty());
    assert!(!thing.schema().contains("region"));
    assert!(thing.create().is_none());
    assert!(thing.importer().is_none());
}

#[test]
fn region_override_injects_attribute_and_update() {
    let provider = provider(vec![plain("aws_thing").with_region(RegionSpec::overridable())]);

    let thing = provider.resource("aws_thing").expect("registered");
    let region = thing.schema().get("region").expect("injected");
    assert!(region.optional && region.computed);
    assert!(thing.update().is_some());
}

#[test]
fn resources_keep_registration_order() {
    let first = TestPackage::new("alpha", vec![plain("aws_b"), plain("aws_a")]).shared();
    let second = TestPackage::new("beta", vec![plain("aws_c")]).shared();
    let provider = build(vec![first, second]).expect("valid provider");

    let names: Vec<&str> = provider.resources().map(WrappedResource::type_name).collect();
    assert_eq!(names, ["aws_b", "aws_a", "aws_c"]);
    assert_eq!(provider.len(), 3);
    assert_eq!(
        provider.resource("aws_c").map(WrappedResource::service_package),
        Some("beta")
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Initialization errors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn duplicate_resource_rejected() {
    let first = TestPackage::new("alpha", vec![plain("aws_thing")]).shared();
    let second = TestPackage::new("beta", vec![plain("aws_thing")]).shared();

    let message = initialization_message(build(vec![first, second]));
    assert_eq!(message, "duplicate resource: aws_thing");
}

#[test]
fn custom_import_requires_importer() {
    let result = build(vec![
        TestPackage::new(
            PACKAGE,
            vec![
                plain("aws_thing")
                    .with_identity(IdentitySpec::regional_arn())
                    .with_import(ImportSpec::custom()),
            ],
        )
        .shared(),
    ]);

    assert_eq!(
        initialization_message(result),
        "resource type aws_thing: uses custom import but does not define an import function"
    );
}

#[test]
fn wrapped_import_rejects_importer() {
    let registration = ResourceRegistration::new("aws_thing", "Thing", || {
        Resource::new(Schema::new()).with_importer(|_, data, _| Ok(vec![data.clone()]))
    })
    .with_identity(IdentitySpec::regional_arn())
    .with_import(ImportSpec::wrapped());

    let result = build(vec![TestPackage::new(PACKAGE, vec![registration]).shared()]);
    assert_eq!(
        initialization_message(result),
        "resource type aws_thing: uses wrapped import but defines an import function"
    );
}

#[test]
fn import_resolution_requires_identity() {
    let registration = plain("aws_thing").with_import(ImportSpec::wrapped());

    let result = build(vec![TestPackage::new(PACKAGE, vec![registration]).shared()]);
    assert_eq!(
        initialization_message(result),
        "resource type aws_thing: import resolution requires an identity"
    );
}

#[test]
fn schema_errors_are_joined() {
    let region_defined = ResourceRegistration::new("aws_regional", "Regional", || {
        Resource::new(Schema::new().with("region", AttributeSchema::optional()))
    })
    .with_region(RegionSpec::overridable());

    let tags_computed = ResourceRegistration::new("aws_tagged", "Tagged", || {
        Resource::new(
            Schema::new()
                .with("tags", AttributeSchema::optional_computed())
                .with("tags_all", AttributeSchema::computed()),
        )
    })
    .with_tags(TagsSpec::new("id"));

    let no_tags_all = ResourceRegistration::new("aws_partial", "Partial", || {
        Resource::new(Schema::new().with("tags", AttributeSchema::optional()))
    })
    .with_tags(TagsSpec::new("id"));

    let result = build(vec![
        TestPackage::new(PACKAGE, vec![region_defined, tags_computed, no_tags_all]).shared(),
    ]);

    assert_eq!(
        initialization_message(result),
        "`region` attribute is defined: aws_regional resource\n\
         `tags` attribute cannot be Computed: aws_tagged resource\n\
         no `tags_all` attribute defined in schema: aws_partial resource"
    );
}

#[test]
fn tags_all_must_be_computed() {
    let registration = ResourceRegistration::new("aws_tagged", "Tagged", || {
        Resource::new(
            Schema::new()
                .with("tags", AttributeSchema::optional())
                .with("tags_all", AttributeSchema::optional()),
        )
    })
    .with_tags(TagsSpec::new("id"));

    let result = build(vec![TestPackage::new(PACKAGE, vec![registration]).shared()]);
    assert_eq!(
        initialization_message(result),
        "`tags_all` attribute must be Computed: aws_tagged resource"
    );
}

#[test]
fn global_custom_inherent_region_rejected() {
    let identity = IdentitySpec::custom_inherent_region("url", |_| {
        Ok(InherentRegion {
            account_id: ACCOUNT_ID.to_owned(),
            region: REGION.to_owned(),
        })
    })
    .global();
    let registration = plain("aws_queue").with_identity(identity);

    let result = build(vec![TestPackage::new(PACKAGE, vec![registration]).shared()]);
    assert_eq!(
        initialization_message(result),
        "custom inherent region is not supported for global resources: aws_queue resource"
    );
}

#[test]
fn schemas_validated_once_per_guard() {
    let guard = ValidationGuard::new();
    let valid = || vec![TestPackage::new(PACKAGE, vec![plain("aws_thing")]).shared()];

    Provider::with_validation_guard(valid(), &guard).expect("valid provider");
    assert!(guard.is_validated());

    // A validated guard no longer checks schemas.
    let region_defined = ResourceRegistration::new("aws_regional", "Regional", || {
        Resource::new(Schema::new().with("region", AttributeSchema::optional()))
    })
    .with_region(RegionSpec::overridable());
    let provider = Provider::with_validation_guard(
        vec![TestPackage::new(PACKAGE, vec![region_defined]).shared()],
        &guard,
    )
    .expect("validation skipped");
    assert!(provider.resource("aws_regional").is_some());
}

#[test]
fn failed_validation_is_retried() {
    let guard = ValidationGuard::new();
    let invalid = ResourceRegistration::new("aws_partial", "Partial", || {
        Resource::new(Schema::new().with("tags", AttributeSchema::optional()))
    })
    .with_tags(TagsSpec::new("id"));

    let result = Provider::with_validation_guard(
        vec![TestPackage::new(PACKAGE, vec![invalid]).shared()],
        &guard,
    );
    assert!(result.is_err());
    assert!(!guard.is_validated());
}

// ─────────────────────────────────────────────────────────────────────────────
// Wrapped handlers
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn handlers_see_resource_context() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let registration = ResourceRegistration::new("aws_thing", "Thing", move || {
        let recorder = Arc::clone(&recorder);
        Resource::new(Schema::new()).with_read(move |ctx, _, client| {
            recorder.lock().push((
                ctx.service_package().to_owned(),
                ctx.resource_name().to_owned(),
                ctx.type_name().to_owned(),
                client.region(ctx).to_owned(),
            ));
            Diagnostics::new()
        })
    })
    .with_region(RegionSpec::overridable());

    let provider = provider(vec![registration]);
    let read = provider
        .resource("aws_thing")
        .and_then(WrappedResource::read)
        .expect("read handler");

    let mut data = ResourceData::from_state("t-1", attrs(&[("region", "eu-west-1".into())]));
    let diags = read(&mut CallContext::new(), &mut data, &client());
    assert!(diags.is_empty(), "{diags:?}");

    let mut data = ResourceData::from_state("t-2", attrs(&[]));
    assert!(read(&mut CallContext::new(), &mut data, &client()).is_empty());

    assert_eq!(
        *seen.lock(),
        [
            (
                PACKAGE.to_owned(),
                "Thing".to_owned(),
                "aws_thing".to_owned(),
                "eu-west-1".to_owned()
            ),
            (
                PACKAGE.to_owned(),
                "Thing".to_owned(),
                "aws_thing".to_owned(),
                REGION.to_owned()
            ),
        ]
    );
}

#[test]
fn identity_written_after_create() {
    let registration = ResourceRegistration::new("aws_thing", "Thing", || {
        Resource::new(Schema::new().with("name", AttributeSchema::required())).with_create(
            |_, data, _| {
                let name = data.get_string("name");
                data.set_id(name);
                Diagnostics::new()
            },
        )
    })
    .with_region(RegionSpec::overridable())
    .with_identity(IdentitySpec::regional_single_parameter("name"));

    let provider = provider(vec![registration]);
    let create = provider
        .resource("aws_thing")
        .and_then(WrappedResource::create)
        .expect("create handler");

    let config = attrs(&[("name", "widget".into()), ("region", "eu-central-1".into())]);
    let mut data = ResourceData::for_create(config.clone(), config);
    let diags = create(&mut CallContext::new(), &mut data, &client());
    assert!(!diags.has_error(), "{diags:?}");

    let identity = data.identity().expect("identity written");
    assert_eq!(identity.get("account_id"), Some(ACCOUNT_ID));
    assert_eq!(identity.get("region"), Some("eu-central-1"));
    assert_eq!(identity.get("name"), Some("widget"));
}

#[test]
fn injected_update_leaves_identity_alone() {
    let registration = plain("aws_thing")
        .with_region(RegionSpec::overridable())
        .with_identity(IdentitySpec::regional_single_parameter("name"));

    let provider = provider(vec![registration]);
    let update = provider
        .resource("aws_thing")
        .and_then(WrappedResource::update)
        .expect("injected update");

    let prior = attrs(&[("name", "widget".into()), ("region", REGION.into())]);
    let identity: IdentityData = [("account_id", ACCOUNT_ID), ("region", REGION), ("name", "widget")]
        .into_iter()
        .collect();
    let mut data =
        ResourceData::for_update("widget", prior.clone(), prior.clone(), prior).with_identity(identity.clone());

    let diags = update(&mut CallContext::new(), &mut data, &client());
    assert!(diags.is_empty(), "{diags:?}");
    assert_eq!(data.identity(), Some(&identity));
}

#[test]
fn wrapped_import_resolves_arn() {
    let registration = ResourceRegistration::new("aws_queue", "Queue", || {
        Resource::new(Schema::new().with("arn", AttributeSchema::computed()))
    })
    .with_region(RegionSpec::overridable())
    .with_identity(IdentitySpec::regional_arn())
    .with_import(ImportSpec::wrapped());

    let provider = provider(vec![registration]);
    let import = provider
        .resource("aws_queue")
        .and_then(WrappedResource::importer)
        .expect("wrapped importer");

    let arn = "arn:aws:sqs:eu-west-1:123456789012:jobs";
    let mut data = ResourceData::for_import(arn);
    let imported = import(&mut CallContext::new(), &mut data, &client()).expect("import");

    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].id(), arn);
    assert_eq!(imported[0].get_string("arn"), arn);
    assert_eq!(imported[0].get_string("region"), "eu-west-1");
}

fn named_widget(identity: IdentitySpec) -> ResourceRegistration {
    ResourceRegistration::new("aws_widget", "Widget", || {
        Resource::new(Schema::new().with("name", AttributeSchema::required()))
    })
    .with_region(RegionSpec::overridable())
    .with_identity(identity)
    .with_import(ImportSpec::wrapped())
}

#[test]
fn wrapped_import_by_id_writes_identity() {
    let provider = provider(vec![named_widget(IdentitySpec::regional_single_parameter("name"))]);
    let import = provider
        .resource("aws_widget")
        .and_then(WrappedResource::importer)
        .expect("wrapped importer");

    let mut data = ResourceData::for_import("widget");
    let imported = import(&mut CallContext::new(), &mut data, &client()).expect("import");

    assert_eq!(imported[0].get_string("name"), "widget");
    assert_eq!(imported[0].get_string("region"), REGION);
    let identity = imported[0].identity().expect("identity written");
    assert_eq!(identity.get("account_id"), Some(ACCOUNT_ID));
    assert_eq!(identity.get("region"), Some(REGION));
    assert_eq!(identity.get("name"), Some("widget"));
}

#[test]
fn wrapped_import_by_identity_writes_identity() {
    let provider = provider(vec![named_widget(IdentitySpec::regional_single_parameter("name"))]);
    let import = provider
        .resource("aws_widget")
        .and_then(WrappedResource::importer)
        .expect("wrapped importer");

    let mut data = ResourceData::new().with_identity(
        [("region", "eu-west-1"), ("name", "widget")]
            .into_iter()
            .collect(),
    );
    let imported = import(&mut CallContext::new(), &mut data, &client()).expect("import");

    assert_eq!(imported[0].id(), "widget");
    let identity = imported[0].identity().expect("identity written");
    assert_eq!(identity.get("account_id"), Some(ACCOUNT_ID));
    assert_eq!(identity.get("region"), Some("eu-west-1"));
    assert_eq!(identity.get("name"), Some("widget"));
}

#[test]
fn import_without_identity_schema_writes_no_identity() {
    let provider = provider(vec![named_widget(
        IdentitySpec::regional_single_parameter("name").without_identity_schema(),
    )]);
    let resource = provider.resource("aws_widget").expect("registered");
    assert!(!resource.interceptors().contains("identity"));

    let import = resource.importer().expect("wrapped importer");
    let mut data = ResourceData::for_import("widget");
    let imported = import(&mut CallContext::new(), &mut data, &client()).expect("import");

    assert_eq!(imported[0].get_string("name"), "widget");
    assert!(imported[0].identity().is_none());
}

#[test]
fn custom_importer_receives_specs_and_legacy_ids() {
    let registration = ResourceRegistration::new("aws_queue", "Queue", || {
        Resource::new(Schema::new().with("arn", AttributeSchema::computed())).with_importer(
            |ctx, data, client| {
                // Queue names are accepted alongside ARNs.
                if !data.id().starts_with("arn:") {
                    let arn = format!(
                        "arn:aws:sqs:{}:{}:{}",
                        client.region(ctx),
                        client.account_id(),
                        data.id()
                    );
                    data.set_id(arn);
                }
                let (Some(identity), Some(import)) = (ctx.identity_spec(), ctx.import_spec())
                else {
                    return Err("import specs missing from context".into());
                };
                resolve_import(ctx, identity, import, data, client)?;
                Ok(vec![data.clone()])
            },
        )
    })
    .with_identity(IdentitySpec::regional_arn())
    .with_import(ImportSpec::custom());

    let provider = provider(vec![registration]);
    let import = provider
        .resource("aws_queue")
        .and_then(WrappedResource::importer)
        .expect("custom importer");

    let mut data = ResourceData::for_import("jobs");
    let imported = import(&mut CallContext::new(), &mut data, &client()).expect("import");
    let arn = "arn:aws:sqs:us-west-2:123456789012:jobs";
    assert_eq!(imported[0].id(), arn);
    assert_eq!(imported[0].get_string("region"), REGION);
    assert_eq!(
        imported[0].identity().and_then(|i| i.get("arn")),
        Some(arn)
    );

    let mut data = ResourceData::for_import("arn:aws:sqs:ap-south-1:123456789012:jobs");
    let imported = import(&mut CallContext::new(), &mut data, &client()).expect("import");
    assert_eq!(imported[0].get_string("region"), "ap-south-1");
}

#[test]
fn custom_import_without_identity_runs_importer_alone() {
    let registration = ResourceRegistration::new("aws_thing", "Thing", || {
        Resource::new(Schema::new()).with_importer(|ctx, data, _| {
            assert!(ctx.identity_spec().is_none());
            assert!(ctx.import_spec().is_some());
            let id = data.id().to_uppercase();
            data.set_id(id);
            Ok(vec![data.clone()])
        })
    })
    .with_import(ImportSpec::custom());

    let provider = provider(vec![registration]);
    let import = provider
        .resource("aws_thing")
        .and_then(WrappedResource::importer)
        .expect("custom importer");

    let mut data = ResourceData::for_import("t-1");
    let imported = import(&mut CallContext::new(), &mut data, &client()).expect("import");
    assert_eq!(imported[0].id(), "T-1");
    assert!(imported[0].identity().is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Data sources
// ─────────────────────────────────────────────────────────────────────────────

fn tagged_data_source(type_name: &str) -> DataSourceRegistration {
    DataSourceRegistration::new(type_name, "Thing", || {
        DataSource::new(
            Schema::new()
                .with("name", AttributeSchema::required())
                .with("arn", AttributeSchema::computed())
                .with("tags", AttributeSchema::optional_computed()),
        )
        .with_read(|_, data, _| {
            let name = data.get_string("name");
            data.set_id(name);
            let mut diags = Diagnostics::new();
            if let Err(err) = data.set("arn", "arn:aws:things:us-west-2:123456789012:thing/t-1") {
                diags.append_error(err.to_string());
            }
            diags
        })
    })
    .with_tags(TagsSpec::new("arn"))
}

fn data_source_provider(
    data_sources: Vec<DataSourceRegistration>,
    tag_service: Arc<RecordingTagService>,
) -> Provider {
    build(vec![
        TestPackage::new(PACKAGE, vec![])
            .with_data_sources(data_sources)
            .with_tag_service(tag_service)
            .shared(),
    ])
    .expect("valid provider")
}

#[test]
fn data_source_builtins_registered_in_order() {
    let provider = data_source_provider(
        vec![tagged_data_source("aws_thing").with_region(RegionSpec::overridable())],
        RecordingTagService::new(),
    );

    let data_source = provider.data_source("aws_thing").expect("registered");
    assert_eq!(
        data_source.interceptors().names().collect::<Vec<_>>(),
        ["validate_region", "set_region_in_state", "transparent_tagging"]
    );
    assert!(data_source.schema().contains("region"));
    assert!(provider.resource("aws_thing").is_none());
    assert!(provider.is_empty());
}

#[test]
fn data_source_and_resource_may_share_a_type_name() {
    let provider = build(vec![
        TestPackage::new(PACKAGE, vec![plain("aws_thing")])
            .with_data_sources(vec![tagged_data_source("aws_thing")])
            .shared(),
    ])
    .expect("valid provider");

    assert!(provider.data_source("aws_thing").is_some());
    assert!(provider.resource("aws_thing").is_some());
}

#[test]
fn duplicate_data_source_rejected() {
    let result = build(vec![
        TestPackage::new(PACKAGE, vec![])
            .with_data_sources(vec![tagged_data_source("aws_thing")])
            .shared(),
        TestPackage::new("other", vec![])
            .with_data_sources(vec![tagged_data_source("aws_thing")])
            .shared(),
    ]);

    assert_eq!(
        initialization_message(result),
        "duplicate data source: aws_thing"
    );
}

#[test]
fn data_source_requires_read() {
    let registration = DataSourceRegistration::new("aws_thing", "Thing", || {
        DataSource::new(Schema::new())
    });
    let result = build(vec![
        TestPackage::new(PACKAGE, vec![])
            .with_data_sources(vec![registration])
            .shared(),
    ]);

    assert_eq!(
        initialization_message(result),
        "data source type aws_thing: does not define a read function"
    );
}

#[test]
fn data_source_schema_errors_are_joined() {
    let region_defined = DataSourceRegistration::new("aws_regional", "Regional", || {
        DataSource::new(Schema::new().with("region", AttributeSchema::optional()))
            .with_read(|_, _, _| Diagnostics::new())
    })
    .with_region(RegionSpec::overridable());

    let tags_settable = DataSourceRegistration::new("aws_tagged", "Tagged", || {
        DataSource::new(Schema::new().with("tags", AttributeSchema::optional()))
            .with_read(|_, _, _| Diagnostics::new())
    })
    .with_tags(TagsSpec::new("id"));

    let no_tags = DataSourceRegistration::new("aws_untagged", "Untagged", || {
        DataSource::new(Schema::new()).with_read(|_, _, _| Diagnostics::new())
    })
    .with_tags(TagsSpec::new("id"));

    let result = build(vec![
        TestPackage::new(PACKAGE, vec![plain("aws_thing")])
            .with_data_sources(vec![region_defined, tags_settable, no_tags])
            .shared(),
    ]);

    assert_eq!(
        initialization_message(result),
        "`region` attribute is defined: aws_regional data source\n\
         `tags` attribute must be Computed: aws_tagged data source\n\
         no `tags` attribute defined in schema: aws_untagged data source"
    );
}

#[test]
fn data_source_read_uses_override_region_and_lists_tags() {
    let service = RecordingTagService::new();
    let arn = "arn:aws:things:us-west-2:123456789012:thing/t-1";
    service.seed(arn, tags(&[("Name", "t-1"), ("aws:cloudformation:stack", "s")]));

    let seen = Arc::new(Mutex::new(None));
    let recorder = Arc::clone(&seen);
    let registration = DataSourceRegistration::new("aws_thing", "Thing", move || {
        let recorder = Arc::clone(&recorder);
        DataSource::new(
            Schema::new()
                .with("name", AttributeSchema::required())
                .with("arn", AttributeSchema::computed())
                .with("tags", AttributeSchema::computed()),
        )
        .with_read(move |ctx, data, client| {
            *recorder.lock() = Some(client.region(ctx).to_owned());
            data.set_id("t-1");
            match data.set("arn", arn) {
                Ok(()) => Diagnostics::new(),
                Err(err) => Diagnostics::from_error(err),
            }
        })
    })
    .with_region(RegionSpec::overridable())
    .with_tags(TagsSpec::new("arn"));

    let provider = data_source_provider(vec![registration], service.clone());
    let read = provider.data_source("aws_thing").expect("registered").read();

    let config = attrs(&[("name", "t-1".into()), ("region", "eu-west-1".into())]);
    let mut data = ResourceData::for_create(config.clone(), config);
    let diags = read(&mut CallContext::new(), &mut data, &client());
    assert!(diags.is_empty(), "{diags:?}");

    assert_eq!(seen.lock().as_deref(), Some("eu-west-1"));
    assert_eq!(data.get_string("region"), "eu-west-1");
    assert_eq!(
        KeyValueTags::from_value(&data.get("tags")),
        tags(&[("Name", "t-1")])
    );
    assert_eq!(
        service.calls(),
        [TagCall::List {
            identifier: arn.to_owned()
        }]
    );
}

#[test]
fn data_source_handler_reported_tags_skip_listing() {
    let service = RecordingTagService::new();
    let registration = DataSourceRegistration::new("aws_thing", "Thing", || {
        DataSource::new(Schema::new().with("tags", AttributeSchema::computed())).with_read(
            |ctx, data, _| {
                data.set_id("t-1");
                ctx.set_tags_out(tags(&[("env", "prod")]));
                Diagnostics::new()
            },
        )
    })
    .with_tags(TagsSpec::new("id"));

    let provider = data_source_provider(vec![registration], service.clone());
    let read = provider.data_source("aws_thing").expect("registered").read();

    let mut data = ResourceData::for_create(Attributes::new(), Attributes::new());
    let diags = read(&mut CallContext::new(), &mut data, &client());
    assert!(diags.is_empty(), "{diags:?}");

    assert_eq!(KeyValueTags::from_value(&data.get("tags")), tags(&[("env", "prod")]));
    assert!(service.calls().is_empty());
}

#[test]
fn data_source_region_outside_partition_rejected() {
    let provider = data_source_provider(
        vec![tagged_data_source("aws_thing").with_region(RegionSpec::overridable())],
        RecordingTagService::new(),
    );
    let read = provider.data_source("aws_thing").expect("registered").read();

    let config = attrs(&[("name", "t-1".into()), ("region", "cn-north-1".into())]);
    let mut data = ResourceData::for_create(config.clone(), config);
    let diags = read(&mut CallContext::new(), &mut data, &client());

    let errors: Vec<&str> = diags.errors().map(|d| d.summary.as_str()).collect();
    assert_eq!(
        errors,
        ["partition (aws-cn) for per-resource region (cn-north-1) is not the provider's configured partition (aws)"]
    );
    assert!(data.id().is_empty());
}
