//! Resource and data source registrations.
//!
//! A service package describes each resource type it implements with a
//! [`ResourceRegistration`]: how to build the [`Resource`] (schema and
//! handlers), and which cross-cutting behavior the provider wraps it with.
//! Read-only data sources are described the same way with a
//! [`DataSourceRegistration`].

use core::fmt;
use std::sync::Arc;

use meridian_identity::{IdentitySpec, ImportSpec};
use meridian_intercept::dispatch::{
    CrudHandler, DiffHandler, ImportHandler, crud_handler, diff_handler, import_handler,
};
use meridian_resource::schema::Schema;
use meridian_resource::{
    BoxError, CallContext, Client, Diagnostics, ResourceData, ResourceDiff,
};

/// Schema and handlers of one resource type, before wrapping.
#[derive(Clone, Default)]
pub struct Resource {
    /// Attribute schemas.
    pub schema: Schema,
    /// Creates the remote object.
    pub create: Option<CrudHandler>,
    /// Refreshes state from the remote object.
    pub read: Option<CrudHandler>,
    /// Updates the remote object in place.
    pub update: Option<CrudHandler>,
    /// Deletes the remote object.
    pub delete: Option<CrudHandler>,
    /// Adjusts the plan.
    pub customize_diff: Option<DiffHandler>,
    /// Adopts an existing remote object.
    pub importer: Option<ImportHandler>,
}

impl Resource {
    /// Creates a resource with `schema` and no handlers.
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            ..Self::default()
        }
    }

    /// Sets the Create handler.
    #[must_use]
    pub fn with_create<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut CallContext, &mut ResourceData, &Client) -> Diagnostics + Send + Sync + 'static,
    {
        self.create = Some(crud_handler(f));
        self
    }

    /// Sets the Read handler.
    #[must_use]
    pub fn with_read<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut CallContext, &mut ResourceData, &Client) -> Diagnostics + Send + Sync + 'static,
    {
        self.read = Some(crud_handler(f));
        self
    }

    /// Sets the Update handler.
    #[must_use]
    pub fn with_update<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut CallContext, &mut ResourceData, &Client) -> Diagnostics + Send + Sync + 'static,
    {
        self.update = Some(crud_handler(f));
        self
    }

    /// Sets the Delete handler.
    #[must_use]
    pub fn with_delete<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut CallContext, &mut ResourceData, &Client) -> Diagnostics + Send + Sync + 'static,
    {
        self.delete = Some(crud_handler(f));
        self
    }

    /// Sets the diff customization handler.
    #[must_use]
    pub fn with_customize_diff<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut CallContext, &mut ResourceDiff, &Client) -> Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.customize_diff = Some(diff_handler(f));
        self
    }

    /// Sets the importer.
    #[must_use]
    pub fn with_importer<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut CallContext, &mut ResourceData, &Client) -> Result<Vec<ResourceData>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.importer = Some(import_handler(f));
        self
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("schema", &self.schema)
            .field("create", &self.create.is_some())
            .field("read", &self.read.is_some())
            .field("update", &self.update.is_some())
            .field("delete", &self.delete.is_some())
            .field("customize_diff", &self.customize_diff.is_some())
            .field("importer", &self.importer.is_some())
            .finish()
    }
}

/// Builds a fresh [`Resource`].
pub type ResourceFactory = Arc<dyn Fn() -> Resource + Send + Sync>;

/// Transparent tagging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagsSpec {
    /// Attribute whose value addresses the object in the tagging API.
    /// `"id"` means the resource id.
    pub identifier_attribute: String,
    /// Object kind, for services that tag several kinds through one API.
    pub resource_type: Option<String>,
}

impl TagsSpec {
    /// Tags addressed by `identifier_attribute`.
    #[must_use]
    pub fn new(identifier_attribute: impl Into<String>) -> Self {
        Self {
            identifier_attribute: identifier_attribute.into(),
            resource_type: None,
        }
    }

    /// Sets the object kind.
    #[must_use]
    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }
}

/// Per-resource region override settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionSpec {
    /// Injects a `region` attribute that overrides the provider region.
    pub is_override_enabled: bool,
    /// Rejects override regions outside the provider's partition.
    pub is_validate_override_in_partition: bool,
}

impl RegionSpec {
    /// Override enabled, validated against the provider's partition.
    #[must_use]
    pub const fn overridable() -> Self {
        Self {
            is_override_enabled: true,
            is_validate_override_in_partition: true,
        }
    }
}

/// Everything the provider needs to know about one resource type.
#[derive(Clone)]
pub struct ResourceRegistration {
    /// Resource type name, e.g. `aws_sqs_queue`.
    pub type_name: String,
    /// Human-readable name, e.g. `Queue`.
    pub name: String,
    /// Builds the unwrapped resource.
    pub factory: ResourceFactory,
    /// Transparent tagging, if the resource is taggable.
    pub tags: Option<TagsSpec>,
    /// Region override, if supported.
    pub region: Option<RegionSpec>,
    /// Resource identity.
    pub identity: Option<IdentitySpec>,
    /// Import behavior.
    pub import: ImportSpec,
}

impl ResourceRegistration {
    /// Registers `type_name` built by `factory`, with no optional behavior.
    #[must_use]
    pub fn new<F>(type_name: impl Into<String>, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Resource + Send + Sync + 'static,
    {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            factory: Arc::new(factory),
            tags: None,
            region: None,
            identity: None,
            import: ImportSpec::default(),
        }
    }

    /// Enables transparent tagging.
    #[must_use]
    pub fn with_tags(mut self, tags: TagsSpec) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Enables region override.
    #[must_use]
    pub fn with_region(mut self, region: RegionSpec) -> Self {
        self.region = Some(region);
        self
    }

    /// Sets the identity.
    #[must_use]
    pub fn with_identity(mut self, identity: IdentitySpec) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Sets the import behavior.
    #[must_use]
    pub fn with_import(mut self, import: ImportSpec) -> Self {
        self.import = import;
        self
    }

    pub(crate) fn is_region_override_enabled(&self) -> bool {
        self.region.is_some_and(|r| r.is_override_enabled)
    }
}

impl fmt::Debug for ResourceRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRegistration")
            .field("type_name", &self.type_name)
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("region", &self.region)
            .field("identity", &self.identity)
            .field("import", &self.import)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Data sources
// ─────────────────────────────────────────────────────────────────────────────

/// Schema and Read handler of one data source type, before wrapping.
#[derive(Clone, Default)]
pub struct DataSource {
    /// Attribute schemas.
    pub schema: Schema,
    /// Reads the remote object into state.
    pub read: Option<CrudHandler>,
}

impl DataSource {
    /// Creates a data source with `schema` and no Read handler.
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self { schema, read: None }
    }

    /// Sets the Read handler.
    #[must_use]
    pub fn with_read<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut CallContext, &mut ResourceData, &Client) -> Diagnostics + Send + Sync + 'static,
    {
        self.read = Some(crud_handler(f));
        self
    }
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSource")
            .field("schema", &self.schema)
            .field("read", &self.read.is_some())
            .finish()
    }
}

/// Builds a fresh [`DataSource`].
pub type DataSourceFactory = Arc<dyn Fn() -> DataSource + Send + Sync>;

/// Everything the provider needs to know about one data source type.
///
/// Data sources have no identity or import; tagging only reads tags back.
#[derive(Clone)]
pub struct DataSourceRegistration {
    /// Data source type name, e.g. `aws_sqs_queue`.
    pub type_name: String,
    /// Human-readable name.
    pub name: String,
    /// Builds the unwrapped data source.
    pub factory: DataSourceFactory,
    /// Tag read-back, if the data source reports tags.
    pub tags: Option<TagsSpec>,
    /// Region override, if supported.
    pub region: Option<RegionSpec>,
}

impl DataSourceRegistration {
    /// Registers `type_name` built by `factory`, with no optional behavior.
    #[must_use]
    pub fn new<F>(type_name: impl Into<String>, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> DataSource + Send + Sync + 'static,
    {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            factory: Arc::new(factory),
            tags: None,
            region: None,
        }
    }

    /// Enables tag read-back.
    #[must_use]
    pub fn with_tags(mut self, tags: TagsSpec) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Enables region override.
    #[must_use]
    pub fn with_region(mut self, region: RegionSpec) -> Self {
        self.region = Some(region);
        self
    }

    pub(crate) fn is_region_override_enabled(&self) -> bool {
        self.region.is_some_and(|r| r.is_override_enabled)
    }
}

impl fmt::Debug for DataSourceRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSourceRegistration")
            .field("type_name", &self.type_name)
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}
