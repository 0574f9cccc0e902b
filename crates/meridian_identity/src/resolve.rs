//! Import resolution.
//!
//! [`resolve_import`] turns either a legacy import ID or a set of identity
//! attribute values into the resource attributes needed to manage an existing
//! remote object. The legacy path is taken whenever the resource ID is set;
//! otherwise the identity attached to the [`ResourceData`] is used.
//!
//! Rules shared by all shapes:
//!
//! - An identity `account_id` must match the provider's account. An absent
//!   one is accepted.
//! - A region already set on the resource must match the region the import
//!   value encodes. When none is set the derived region is written.
//! - The primary value is mirrored into every duplicate attribute, the
//!   resource ID included.
//! - A successful import stores the identity read back from the resolved
//!   attributes, unless the resource type carries no identity data.

use meridian_resource::error::AttributeError;
use meridian_resource::names::{ATTR_ACCOUNT_ID, ATTR_ID, ATTR_REGION};
use meridian_resource::{CallContext, Client, IdentityData, ResourceData, StateReader};

use crate::arn::Arn;
use crate::error::ImportError;
use crate::import::ImportSpec;
use crate::spec::{IdentityAttribute, IdentityShape, IdentitySpec};

/// Resolves an import into resource attributes.
///
/// # Errors
///
/// Returns an [`ImportError`] describing the first rule the import violates.
pub fn resolve_import(
    ctx: &CallContext,
    identity: &IdentitySpec,
    import: &ImportSpec,
    data: &mut ResourceData,
    client: &Client,
) -> Result<(), ImportError> {
    let source = if data.id().is_empty() {
        let values = data.identity().cloned().unwrap_or_default();
        validate_account_id(&values, client)?;
        Source::Identity(values)
    } else {
        Source::ImportId(data.id().to_owned())
    };

    tracing::debug!(
        shape = %identity.shape(),
        global = identity.is_global(),
        path = source.kind(),
        "resolving import"
    );

    match identity.shape() {
        IdentityShape::Arn => resolve_arn(identity, &source, data)?,
        IdentityShape::CustomInherentRegion => {
            resolve_custom_inherent_region(identity, &source, data, client)?;
        }
        IdentityShape::Singleton => resolve_singleton(ctx, identity, &source, data, client)?,
        IdentityShape::SingleParameter => {
            resolve_single_parameter(ctx, identity, &source, data, client)?;
        }
        IdentityShape::MultipleParameter => {
            resolve_parameterized(ctx, identity, import, &source, data, client)?;
        }
    }

    if identity.has_identity_schema() {
        let values = identity_from_state(ctx, identity, data, client);
        data.set_identity(values);
    }
    Ok(())
}

/// Reads the identity of a resource from its state.
///
/// `account_id` comes from the client and `region` from the resource's
/// `region` attribute, falling back to the call's effective region. Every
/// other attribute is read from its resource attribute, `"id"` meaning the
/// resource ID.
#[must_use]
pub fn identity_from_state(
    ctx: &CallContext,
    spec: &IdentitySpec,
    data: &ResourceData,
    client: &Client,
) -> IdentityData {
    spec.attributes()
        .iter()
        .map(|attribute| {
            let value = match attribute.name() {
                ATTR_ACCOUNT_ID => client.account_id().to_owned(),
                ATTR_REGION => match data.get_string(ATTR_REGION) {
                    region if region.is_empty() => client.region(ctx).to_owned(),
                    region => region,
                },
                _ => match attribute.resource_attribute() {
                    ATTR_ID => data.id().to_owned(),
                    name => data.get_string(name),
                },
            };
            (attribute.name().to_owned(), value)
        })
        .collect()
}

/// Where the import value comes from.
enum Source {
    ImportId(String),
    Identity(IdentityData),
}

impl Source {
    fn kind(&self) -> &'static str {
        match self {
            Self::ImportId(_) => "import-id",
            Self::Identity(_) => "identity",
        }
    }

    /// The primary value: the import ID, or the named identity attribute.
    fn primary(&self, name: &str) -> Result<String, ImportError> {
        match self {
            Self::ImportId(id) => Ok(id.clone()),
            Self::Identity(values) => required(values, name),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shapes
// ─────────────────────────────────────────────────────────────────────────────

fn resolve_arn(
    spec: &IdentitySpec,
    source: &Source,
    data: &mut ResourceData,
) -> Result<(), ImportError> {
    let value = source.primary(spec.primary_attribute())?;
    let arn: Arn = value.parse().map_err(|source| ImportError::InvalidArn {
        value: value.clone(),
        source,
    })?;

    set_primary(spec, data, &value)?;

    if !spec.is_global() {
        reconcile_region(data, &arn.region, "ARN", &value)?;
    }
    Ok(())
}

fn resolve_custom_inherent_region(
    spec: &IdentitySpec,
    source: &Source,
    data: &mut ResourceData,
    client: &Client,
) -> Result<(), ImportError> {
    let value = source.primary(spec.primary_attribute())?;

    let inherent = match spec.inherent_region_parser() {
        Some(parser) => parser(&value).map_err(|source| ImportError::InherentRegionParse {
            value: value.clone(),
            source,
        })?,
        None => {
            return Err(ImportError::InherentRegionParse {
                value,
                source: "no inherent region parser configured".into(),
            });
        }
    };

    if !inherent.account_id.is_empty() && inherent.account_id != client.account_id() {
        return Err(ImportError::AccountIdMismatch {
            expected: client.account_id().to_owned(),
            actual: inherent.account_id,
        });
    }

    set_primary(spec, data, &value)?;
    reconcile_region(data, &inherent.region, "import ID", &value)
}

fn resolve_singleton(
    ctx: &CallContext,
    spec: &IdentitySpec,
    source: &Source,
    data: &mut ResourceData,
    client: &Client,
) -> Result<(), ImportError> {
    match source {
        // Global singletons accept any legacy ID.
        Source::ImportId(_) if spec.is_global() => {
            data.set_id(client.account_id());
            Ok(())
        }
        Source::ImportId(id) => reconcile_region(data, id, "ID", id),
        Source::Identity(_) if spec.is_global() => {
            data.set_id(client.account_id());
            Ok(())
        }
        Source::Identity(values) => {
            let region = identity_region(ctx, values, data, client);
            data.set(ATTR_REGION, region.as_str())?;
            data.set_id(region);
            Ok(())
        }
    }
}

fn resolve_single_parameter(
    ctx: &CallContext,
    spec: &IdentitySpec,
    source: &Source,
    data: &mut ResourceData,
    client: &Client,
) -> Result<(), ImportError> {
    let primary = spec.primary_attribute();
    let value = source.primary(primary)?;

    let resource_attribute = spec
        .attributes()
        .iter()
        .find(|a| a.name() == primary)
        .map_or(primary, IdentityAttribute::resource_attribute);

    if resource_attribute != ATTR_ID {
        data.set(resource_attribute, value.as_str())?;
    }
    data.set_id(value);

    if !spec.is_global() {
        resolve_region(ctx, source, data, client)?;
    }
    Ok(())
}

fn resolve_parameterized(
    ctx: &CallContext,
    spec: &IdentitySpec,
    import: &ImportSpec,
    source: &Source,
    data: &mut ResourceData,
    client: &Client,
) -> Result<(), ImportError> {
    let codec = import.import_id().ok_or(ImportError::MissingImportIdCodec)?;

    match source {
        Source::ImportId(import_id) => {
            let (id, values) =
                codec
                    .parse(import_id)
                    .map_err(|source| ImportError::InvalidImportId {
                        id: import_id.clone(),
                        source,
                    })?;
            for (name, value) in values {
                data.set(&name, value)?;
            }
            if import.set_id_attribute {
                data.set_id(id);
            }
        }
        Source::Identity(values) => {
            let parameters = spec
                .attributes()
                .iter()
                .filter(|a| a.name() != ATTR_ACCOUNT_ID && a.name() != ATTR_REGION);
            for attribute in parameters {
                match values.get(attribute.name()) {
                    Some(value) => data.set(attribute.resource_attribute(), value)?,
                    None if attribute.is_required() => {
                        return Err(ImportError::MissingIdentityAttribute {
                            name: attribute.name().to_owned(),
                        });
                    }
                    None => {}
                }
            }
        }
    }

    if !spec.is_global() {
        resolve_region(ctx, source, data, client)?;
    }

    if matches!(source, Source::Identity(_)) && import.set_id_attribute {
        data.set_id(codec.create(data));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared rules
// ─────────────────────────────────────────────────────────────────────────────

fn required(values: &IdentityData, name: &str) -> Result<String, ImportError> {
    values
        .get(name)
        .map(str::to_owned)
        .ok_or_else(|| ImportError::MissingIdentityAttribute {
            name: name.to_owned(),
        })
}

fn validate_account_id(values: &IdentityData, client: &Client) -> Result<(), ImportError> {
    match values.get(ATTR_ACCOUNT_ID) {
        Some(actual) if actual != client.account_id() => Err(ImportError::AccountIdMismatch {
            expected: client.account_id().to_owned(),
            actual: actual.to_owned(),
        }),
        _ => Ok(()),
    }
}

/// Writes the primary value to its attribute and every duplicate.
///
/// Resources always end up with an ID; when neither attribute is `"id"` the
/// primary value becomes the ID.
fn set_primary(
    spec: &IdentitySpec,
    data: &mut ResourceData,
    value: &str,
) -> Result<(), AttributeError> {
    data.set(spec.primary_attribute(), value)?;
    for name in spec.duplicate_attributes() {
        data.set(name, value)?;
    }
    if data.id().is_empty() {
        data.set_id(value);
    }
    Ok(())
}

/// Checks a derived region against the region already set on the resource.
fn reconcile_region(
    data: &mut ResourceData,
    derived: &str,
    source_kind: &'static str,
    value: &str,
) -> Result<(), ImportError> {
    let explicit = data.get_string(ATTR_REGION);
    if explicit.is_empty() {
        data.set(ATTR_REGION, derived)?;
        return Ok(());
    }
    if explicit != derived {
        return Err(ImportError::RegionMismatch {
            explicit,
            derived: derived.to_owned(),
            source_kind,
            value: value.to_owned(),
        });
    }
    Ok(())
}

/// Sets the region of a resource whose identity does not encode one.
fn resolve_region(
    ctx: &CallContext,
    source: &Source,
    data: &mut ResourceData,
    client: &Client,
) -> Result<(), ImportError> {
    let region = match source {
        Source::Identity(values) => identity_region(ctx, values, data, client),
        Source::ImportId(_) => match data.get_string(ATTR_REGION) {
            region if region.is_empty() => client.region(ctx).to_owned(),
            region => region,
        },
    };
    data.set(ATTR_REGION, region)?;
    Ok(())
}

/// The identity's region, else the resource's explicit region, else the
/// call's effective region.
fn identity_region(
    ctx: &CallContext,
    values: &IdentityData,
    data: &ResourceData,
    client: &Client,
) -> String {
    if let Some(region) = values.get(ATTR_REGION) {
        return region.to_owned();
    }
    match data.get_string(ATTR_REGION) {
        region if region.is_empty() => client.region(ctx).to_owned(),
        region => region,
    }
}
