//! Provider assembly.
//!
//! [`Provider::new`] turns the registrations of every [`ServicePackage`] into
//! [`WrappedDataSource`]s and [`WrappedResource`]s: it validates schemas once
//! per process, injects the `region` attribute where region override is
//! enabled, registers the built-in interceptors each type opted in to,
//! installs import resolution, and wraps every handler with its interceptors.
//!
//! Data source built-ins, in order:
//!
//! | Interceptor | Stages | Operations | When |
//! |-------------|--------|------------|------|
//! | `validate_region` | Before | Read | region override, partition validation |
//! | `set_region_in_state` | After | Read | region override |
//! | `transparent_tagging` | Before, After | Read | tags |
//!
//! Resource built-ins, in order:
//!
//! | Interceptor | Stages | Operations | When |
//! |-------------|--------|------------|------|
//! | `validate_region` | Before | CustomizeDiff | region override, partition validation |
//! | `default_region` | Before | CustomizeDiff | region override |
//! | `set_region_in_state` | After | Read | region override |
//! | `force_new_if_region_changes` | Before | CustomizeDiff | region override |
//! | `import_region_no_default` / `import_region` | Before | Import | region override |
//! | `transparent_tagging` | Before, After, Finally | Create, Read, Update | tags |
//! | `set_tags_all` | Before | CustomizeDiff | tags |
//! | `validate_required_tags` | Before | CustomizeDiff | tags |
//! | `identity` | After, OnError | Create, Read, Update | identity data |

use core::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use meridian_identity::spec::IdentityShape;
use meridian_identity::{IdentitySpec, ImportContext, ImportSpec, resolve_import};
use meridian_intercept::dispatch::{
    CrudHandler, DiffHandler, ImportHandler, crud_handler, diff_handler, import_handler,
    intercept_crud, intercept_diff, intercept_import,
};
use meridian_intercept::{Interceptors, Operation, OperationMask, RegistrationError, StageMask};
use meridian_resource::names::{ATTR_REGION, ATTR_TAGS, ATTR_TAGS_ALL};
use meridian_resource::schema::{AttributeSchema, Schema};
use meridian_resource::tags::TagService;
use meridian_resource::{CallContext, Diagnostics, JoinedError, StateReader};

use crate::builtin::{identity, region, tags};
use crate::error::ProviderError;
use crate::once::ValidationGuard;
use crate::resource::{DataSource, DataSourceRegistration, Resource, ResourceRegistration};
use crate::service_package::ServicePackage;

/// Schemas are validated by the first provider built in a process.
static RESOURCE_SCHEMAS: ValidationGuard = ValidationGuard::new();

// ─────────────────────────────────────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────────────────────────────────────

/// The assembled set of data source and resource types.
pub struct Provider {
    data_sources: IndexMap<String, WrappedDataSource>,
    resources: IndexMap<String, WrappedResource>,
}

impl Provider {
    /// Assembles the data sources and resources of `packages`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Initialization`] holding every problem found:
    /// schema rule violations, duplicate type names, data sources without a
    /// Read handler and import misconfiguration.
    pub fn new(packages: Vec<Arc<dyn ServicePackage>>) -> Result<Self, ProviderError> {
        Self::with_validation_guard(packages, &RESOURCE_SCHEMAS)
    }

    /// Like [`new`](Self::new), validating schemas through `guard` instead of
    /// the process-wide guard.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_validation_guard(
        packages: Vec<Arc<dyn ServicePackage>>,
        guard: &ValidationGuard,
    ) -> Result<Self, ProviderError> {
        tracing::info!(packages = packages.len(), "initializing provider");

        guard.run_once(|| validate_schemas(&packages))?;

        let mut errors = Vec::new();
        let mut data_sources = IndexMap::new();
        let mut resources = IndexMap::new();

        for package in &packages {
            let tag_service = package.tag_service();

            for registration in package.data_sources() {
                if data_sources.contains_key(&registration.type_name) {
                    errors.push(ProviderError::DuplicateDataSource {
                        type_name: registration.type_name,
                    });
                    continue;
                }

                match wrap_data_source(package.name(), registration, tag_service.clone()) {
                    Ok(data_source) => {
                        tracing::debug!(
                            data_source = data_source.type_name(),
                            interceptors = data_source.interceptors().len(),
                            "wrapped data source"
                        );
                        data_sources.insert(data_source.type_name.clone(), data_source);
                    }
                    Err(err) => errors.push(err),
                }
            }

            for registration in package.resources() {
                if resources.contains_key(&registration.type_name) {
                    errors.push(ProviderError::DuplicateResource {
                        type_name: registration.type_name,
                    });
                    continue;
                }

                match wrap_resource(package.name(), registration, tag_service.clone()) {
                    Ok(resource) => {
                        tracing::debug!(
                            resource = resource.type_name(),
                            interceptors = resource.interceptors().len(),
                            "wrapped resource"
                        );
                        resources.insert(resource.type_name.clone(), resource);
                    }
                    Err(err) => errors.push(err),
                }
            }
        }

        if !errors.is_empty() {
            return Err(initialization_error(errors));
        }

        tracing::info!(
            data_sources = data_sources.len(),
            resources = resources.len(),
            "provider initialized"
        );
        Ok(Self {
            data_sources,
            resources,
        })
    }

    /// Returns the data source registered as `type_name`.
    #[must_use]
    pub fn data_source(&self, type_name: &str) -> Option<&WrappedDataSource> {
        self.data_sources.get(type_name)
    }

    /// Iterates over the data sources in registration order.
    pub fn data_sources(&self) -> impl Iterator<Item = &WrappedDataSource> {
        self.data_sources.values()
    }

    /// Returns the resource registered as `type_name`.
    #[must_use]
    pub fn resource(&self, type_name: &str) -> Option<&WrappedResource> {
        self.resources.get(type_name)
    }

    /// Iterates over the resources in registration order.
    pub fn resources(&self) -> impl Iterator<Item = &WrappedResource> {
        self.resources.values()
    }

    /// Returns the number of resource types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns `true` if no resource types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("data_sources", &self.data_sources.keys().collect::<Vec<_>>())
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn initialization_error(errors: Vec<ProviderError>) -> ProviderError {
    ProviderError::Initialization(JoinedError::new(
        errors.into_iter().map(Into::into).collect(),
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Schema validation
// ─────────────────────────────────────────────────────────────────────────────

fn validate_schemas(packages: &[Arc<dyn ServicePackage>]) -> Result<(), ProviderError> {
    let mut errors = Vec::new();
    for package in packages {
        errors.extend(
            package
                .data_sources()
                .iter()
                .filter_map(|registration| validate_data_source_schema(registration).err()),
        );
        errors.extend(
            package
                .resources()
                .iter()
                .filter_map(|registration| validate_resource_schema(registration).err()),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(initialization_error(errors))
    }
}

/// Reports the first schema rule a data source violates.
fn validate_data_source_schema(registration: &DataSourceRegistration) -> Result<(), ProviderError> {
    let type_name = || registration.type_name.clone();
    let data_source = (registration.factory)();
    let schema = &data_source.schema;

    if registration.is_region_override_enabled() && schema.contains(ATTR_REGION) {
        return Err(ProviderError::DataSourceRegionAttributeDefined {
            type_name: type_name(),
        });
    }

    if registration.tags.is_some() {
        match schema.get(ATTR_TAGS) {
            Some(tags) if !tags.computed => {
                return Err(ProviderError::DataSourceTagsNotComputed {
                    type_name: type_name(),
                });
            }
            Some(_) => {}
            None => {
                return Err(ProviderError::DataSourceMissingTags {
                    type_name: type_name(),
                });
            }
        }
    }

    Ok(())
}

/// Reports the first schema rule a resource violates.
fn validate_resource_schema(registration: &ResourceRegistration) -> Result<(), ProviderError> {
    let type_name = || registration.type_name.clone();
    let resource = (registration.factory)();
    let schema = &resource.schema;

    if registration.is_region_override_enabled() && schema.contains(ATTR_REGION) {
        return Err(ProviderError::RegionAttributeDefined {
            type_name: type_name(),
        });
    }

    if registration.tags.is_some() {
        match schema.get(ATTR_TAGS) {
            Some(tags) if tags.computed => {
                return Err(ProviderError::TagsComputed {
                    type_name: type_name(),
                });
            }
            Some(_) => {}
            None => {
                return Err(ProviderError::MissingTagsAttribute {
                    type_name: type_name(),
                    attribute: ATTR_TAGS,
                });
            }
        }
        match schema.get(ATTR_TAGS_ALL) {
            Some(tags_all) if !tags_all.computed => {
                return Err(ProviderError::TagsAllNotComputed {
                    type_name: type_name(),
                });
            }
            Some(_) => {}
            None => {
                return Err(ProviderError::MissingTagsAttribute {
                    type_name: type_name(),
                    attribute: ATTR_TAGS_ALL,
                });
            }
        }
    }

    if let Some(identity) = &registration.identity
        && identity.shape() == IdentityShape::CustomInherentRegion
        && identity.is_global()
    {
        return Err(ProviderError::GlobalInherentRegion {
            type_name: type_name(),
        });
    }

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Wrapping
// ─────────────────────────────────────────────────────────────────────────────

fn wrap_data_source(
    service_package: &str,
    registration: DataSourceRegistration,
    tag_service: Option<Arc<dyn TagService>>,
) -> Result<WrappedDataSource, ProviderError> {
    let region_override = registration.is_region_override_enabled();
    let interceptors =
        data_source_interceptors(&registration, tag_service).map_err(|source| {
            ProviderError::Registration {
                type_name: registration.type_name.clone(),
                source,
            }
        })?;

    let DataSourceRegistration {
        type_name,
        name,
        factory,
        ..
    } = registration;

    let DataSource { mut schema, read } = factory();
    if region_override && !schema.contains(ATTR_REGION) {
        schema.insert(ATTR_REGION, AttributeSchema::optional_computed());
    }

    let interceptors = Arc::new(interceptors);
    let bootstrap = Arc::new(Bootstrap {
        service_package: service_package.to_owned(),
        name: name.clone(),
        type_name: type_name.clone(),
        region_override,
    });

    let Some(read) = intercept_crud(&interceptors, Operation::Read, read) else {
        return Err(ProviderError::MissingDataSourceRead { type_name });
    };

    Ok(WrappedDataSource {
        read: bootstrap.crud(read),
        type_name,
        name,
        service_package: service_package.to_owned(),
        schema,
        interceptors,
    })
}

fn data_source_interceptors(
    registration: &DataSourceRegistration,
    tag_service: Option<Arc<dyn TagService>>,
) -> Result<Interceptors, RegistrationError> {
    let mut interceptors = Interceptors::new();

    if let Some(spec) = registration.region.filter(|r| r.is_override_enabled) {
        if spec.is_validate_override_in_partition {
            interceptors.register(
                "validate_region",
                StageMask::BEFORE,
                OperationMask::READ,
                region::validate_data_source_region(),
            )?;
        }
        interceptors.register(
            "set_region_in_state",
            StageMask::AFTER,
            OperationMask::READ,
            region::set_region_in_state(),
        )?;
    }

    if let Some(spec) = &registration.tags {
        interceptors.register(
            "transparent_tagging",
            StageMask::BEFORE | StageMask::AFTER,
            OperationMask::READ,
            tags::data_source_tagging(spec.clone(), tag_service),
        )?;
    }

    Ok(interceptors)
}

fn wrap_resource(
    service_package: &str,
    registration: ResourceRegistration,
    tag_service: Option<Arc<dyn TagService>>,
) -> Result<WrappedResource, ProviderError> {
    let region_override = registration.is_region_override_enabled();
    let interceptors = builtin_interceptors(&registration, tag_service).map_err(|source| {
        ProviderError::Registration {
            type_name: registration.type_name.clone(),
            source,
        }
    })?;

    let ResourceRegistration {
        type_name,
        name,
        factory,
        identity,
        import,
        ..
    } = registration;

    let mut resource = factory();

    if region_override && !resource.schema.contains(ATTR_REGION) {
        resource
            .schema
            .insert(ATTR_REGION, AttributeSchema::optional_computed());
        // The injected attribute must be updatable in place.
        if resource.update.is_none() {
            resource.update = Some(crud_handler(|_, _, _| Diagnostics::new()));
        }
    }

    let importer = resolve_importer(&type_name, &mut resource, identity.as_ref(), &import)?;

    let interceptors = Arc::new(interceptors);
    let bootstrap = Arc::new(Bootstrap {
        service_package: service_package.to_owned(),
        name: name.clone(),
        type_name: type_name.clone(),
        region_override,
    });

    let Resource {
        schema,
        create,
        read,
        update,
        delete,
        customize_diff,
        importer: _,
    } = resource;

    let crud = |operation, handler| {
        intercept_crud(&interceptors, operation, handler).map(|h| bootstrap.crud(h))
    };

    Ok(WrappedResource {
        create: crud(Operation::Create, create),
        read: crud(Operation::Read, read),
        update: crud(Operation::Update, update),
        delete: crud(Operation::Delete, delete),
        customize_diff: bootstrap.diff(intercept_diff(&interceptors, customize_diff)),
        importer: intercept_import(&interceptors, importer).map(|h| bootstrap.import(h)),
        type_name,
        name,
        service_package: service_package.to_owned(),
        schema,
        identity,
        interceptors,
    })
}

fn builtin_interceptors(
    registration: &ResourceRegistration,
    tag_service: Option<Arc<dyn TagService>>,
) -> Result<Interceptors, RegistrationError> {
    let mut interceptors = Interceptors::new();

    if let Some(spec) = registration.region.filter(|r| r.is_override_enabled) {
        if spec.is_validate_override_in_partition {
            interceptors.register(
                "validate_region",
                StageMask::BEFORE,
                OperationMask::CUSTOMIZE_DIFF,
                region::validate_region(),
            )?;
        }
        interceptors.register(
            "default_region",
            StageMask::BEFORE,
            OperationMask::CUSTOMIZE_DIFF,
            region::default_region(),
        )?;
        interceptors.register(
            "set_region_in_state",
            StageMask::AFTER,
            OperationMask::READ,
            region::set_region_in_state(),
        )?;
        interceptors.register(
            "force_new_if_region_changes",
            StageMask::BEFORE,
            OperationMask::CUSTOMIZE_DIFF,
            region::force_new_if_region_changes(),
        )?;
        if registration
            .identity
            .as_ref()
            .is_some_and(IdentitySpec::has_inherent_region)
        {
            interceptors.register(
                "import_region_no_default",
                StageMask::BEFORE,
                OperationMask::IMPORT,
                region::import_region_no_default(),
            )?;
        } else {
            interceptors.register(
                "import_region",
                StageMask::BEFORE,
                OperationMask::IMPORT,
                region::import_region(),
            )?;
        }
    }

    if let Some(spec) = &registration.tags {
        interceptors.register(
            "transparent_tagging",
            StageMask::BEFORE | StageMask::AFTER | StageMask::FINALLY,
            OperationMask::CREATE | OperationMask::READ | OperationMask::UPDATE,
            tags::transparent_tagging(spec.clone(), tag_service),
        )?;
        interceptors.register(
            "set_tags_all",
            StageMask::BEFORE,
            OperationMask::CUSTOMIZE_DIFF,
            tags::set_tags_all(),
        )?;
        interceptors.register(
            "validate_required_tags",
            StageMask::BEFORE,
            OperationMask::CUSTOMIZE_DIFF,
            tags::validate_required_tags(),
        )?;
    }

    if let Some(spec) = registration
        .identity
        .as_ref()
        .filter(|s| s.has_identity_schema())
    {
        interceptors.register(
            "identity",
            StageMask::AFTER | StageMask::ON_ERROR,
            OperationMask::CREATE | OperationMask::READ | OperationMask::UPDATE,
            identity::identity(spec.clone()),
        )?;
    }

    Ok(interceptors)
}

/// Installs import resolution according to `import`.
///
/// Custom import keeps the resource's own importer and hands it the specs
/// through the call context; wrapped import makes the resolver the importer.
fn resolve_importer(
    type_name: &str,
    resource: &mut Resource,
    identity: Option<&IdentitySpec>,
    import: &ImportSpec,
) -> Result<Option<ImportHandler>, ProviderError> {
    let mut importer = resource.importer.take();

    if import.custom_import {
        let Some(custom) = importer.take() else {
            return Err(ProviderError::MissingImporter {
                type_name: type_name.to_owned(),
            });
        };
        importer = Some(custom_importer(identity.cloned(), import.clone(), custom));
    }

    if import.wrapped_import {
        if importer.is_some() {
            return Err(ProviderError::UnexpectedImporter {
                type_name: type_name.to_owned(),
            });
        }
        let identity = identity.ok_or_else(|| ProviderError::MissingIdentity {
            type_name: type_name.to_owned(),
        })?;
        importer = Some(wrapped_importer(identity.clone(), import.clone()));
    }

    Ok(importer)
}

fn custom_importer(
    identity: Option<IdentitySpec>,
    import: ImportSpec,
    custom: ImportHandler,
) -> ImportHandler {
    import_handler(move |ctx, data, client| {
        ctx.set_import_specs(identity.clone(), import.clone());
        custom(ctx, data, client)
    })
}

fn wrapped_importer(identity: IdentitySpec, import: ImportSpec) -> ImportHandler {
    import_handler(move |ctx, data, client| {
        resolve_import(ctx, &identity, &import, data, client)?;
        Ok(vec![data.clone()])
    })
}

/// Fills the call context before any interceptor runs.
#[derive(Debug)]
struct Bootstrap {
    service_package: String,
    name: String,
    type_name: String,
    region_override: bool,
}

impl Bootstrap {
    fn apply(&self, ctx: &mut CallContext, data: &impl StateReader) {
        ctx.set_resource(&self.service_package, &self.name, &self.type_name);
        if self.region_override {
            ctx.set_override_region(data.get_string(ATTR_REGION));
        }
    }

    fn crud(self: &Arc<Self>, handler: CrudHandler) -> CrudHandler {
        let bootstrap = Arc::clone(self);
        crud_handler(move |ctx, data, client| {
            bootstrap.apply(ctx, &*data);
            handler(ctx, data, client)
        })
    }

    fn diff(self: &Arc<Self>, handler: DiffHandler) -> DiffHandler {
        let bootstrap = Arc::clone(self);
        diff_handler(move |ctx, diff, client| {
            bootstrap.apply(ctx, &*diff);
            handler(ctx, diff, client)
        })
    }

    fn import(self: &Arc<Self>, handler: ImportHandler) -> ImportHandler {
        let bootstrap = Arc::clone(self);
        import_handler(move |ctx, data, client| {
            bootstrap.apply(ctx, &*data);
            handler(ctx, data, client)
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// WrappedDataSource
// ─────────────────────────────────────────────────────────────────────────────

/// A data source type with its Read handler wrapped by interceptors.
pub struct WrappedDataSource {
    type_name: String,
    name: String,
    service_package: String,
    schema: Schema,
    interceptors: Arc<Interceptors>,
    read: CrudHandler,
}

impl WrappedDataSource {
    /// Data source type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning service package.
    #[must_use]
    pub fn service_package(&self) -> &str {
        &self.service_package
    }

    /// Schema, including injected attributes.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Registered interceptors.
    #[must_use]
    pub fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }

    /// Wrapped Read handler.
    #[must_use]
    pub fn read(&self) -> &CrudHandler {
        &self.read
    }
}

impl fmt::Debug for WrappedDataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrappedDataSource")
            .field("type_name", &self.type_name)
            .field("service_package", &self.service_package)
            .field("interceptors", &self.interceptors.names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// WrappedResource
// ─────────────────────────────────────────────────────────────────────────────

/// A resource type with its handlers wrapped by interceptors.
///
/// Every handler fills the [`CallContext`] with the resource naming and
/// region override before running interceptors. CRUD handlers and the
/// importer are absent when the resource defines none; diff customization is
/// always present so plan-time interceptors run.
pub struct WrappedResource {
    type_name: String,
    name: String,
    service_package: String,
    schema: Schema,
    identity: Option<IdentitySpec>,
    interceptors: Arc<Interceptors>,
    create: Option<CrudHandler>,
    read: Option<CrudHandler>,
    update: Option<CrudHandler>,
    delete: Option<CrudHandler>,
    customize_diff: DiffHandler,
    importer: Option<ImportHandler>,
}

impl WrappedResource {
    /// Resource type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning service package.
    #[must_use]
    pub fn service_package(&self) -> &str {
        &self.service_package
    }

    /// Schema, including injected attributes.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Resource identity.
    #[must_use]
    pub fn identity(&self) -> Option<&IdentitySpec> {
        self.identity.as_ref()
    }

    /// Registered interceptors.
    #[must_use]
    pub fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }

    /// Wrapped Create handler.
    #[must_use]
    pub fn create(&self) -> Option<&CrudHandler> {
        self.create.as_ref()
    }

    /// Wrapped Read handler.
    #[must_use]
    pub fn read(&self) -> Option<&CrudHandler> {
        self.read.as_ref()
    }

    /// Wrapped Update handler.
    #[must_use]
    pub fn update(&self) -> Option<&CrudHandler> {
        self.update.as_ref()
    }

    /// Wrapped Delete handler.
    #[must_use]
    pub fn delete(&self) -> Option<&CrudHandler> {
        self.delete.as_ref()
    }

    /// Wrapped diff customization.
    #[must_use]
    pub fn customize_diff(&self) -> &DiffHandler {
        &self.customize_diff
    }

    /// Wrapped importer.
    #[must_use]
    pub fn importer(&self) -> Option<&ImportHandler> {
        self.importer.as_ref()
    }
}

impl fmt::Debug for WrappedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrappedResource")
            .field("type_name", &self.type_name)
            .field("service_package", &self.service_package)
            .field("interceptors", &self.interceptors.names().collect::<Vec<_>>())
            .field("importer", &self.importer.is_some())
            .finish_non_exhaustive()
    }
}
