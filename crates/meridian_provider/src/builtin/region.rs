//! Per-resource region override.
//!
//! Resources and data sources with region override enabled get a `region`
//! attribute. These interceptors validate and default it, keep it in state,
//! force replacement when it changes and accept `<id>@<region>` import IDs.

use std::sync::LazyLock;

use meridian_identity::ImportError;
use meridian_intercept::Interceptor;
use meridian_intercept::interceptor::{CrudParams, DiffParams, ImportParams};
use meridian_resource::client::partition_for_region;
use meridian_resource::names::ATTR_REGION;
use meridian_resource::{BoxError, Client, Diagnostics, StateReader, Value};
use regex::Regex;
use thiserror::Error;

/// Import IDs may carry the region as an `@<region>` suffix.
static IMPORT_ID_REGION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+)@([a-z]{2}(?:-[a-z]+)+-\d{1,2})$").expect("import ID region pattern is valid")
});

/// Errors raised by the region interceptors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    /// The override region lies in another partition than the provider.
    #[error(
        "partition ({partition}) for per-resource region ({region}) is not the provider's configured partition ({provider_partition})"
    )]
    PartitionMismatch {
        /// The override region.
        region: String,
        /// Its partition.
        partition: String,
        /// The provider's partition.
        provider_partition: String,
    },
}

/// Splits `<id>@<region>` into its parts.
#[must_use]
pub fn split_import_id(import_id: &str) -> Option<(&str, &str)> {
    let captures = IMPORT_ID_REGION.captures(import_id)?;
    Some((captures.get(1)?.as_str(), captures.get(2)?.as_str()))
}

fn check_partition(region: String, client: &Client) -> Result<(), RegionError> {
    if region.is_empty() {
        return Ok(());
    }
    let partition = partition_for_region(&region);
    if partition != client.partition() {
        return Err(RegionError::PartitionMismatch {
            region,
            partition: partition.to_owned(),
            provider_partition: client.partition().to_owned(),
        });
    }
    Ok(())
}

/// Rejects planned regions outside the provider's partition.
///
/// Before CustomizeDiff.
#[must_use]
pub fn validate_region() -> Interceptor {
    Interceptor::diff_fn(|params: DiffParams<'_>| -> Result<(), BoxError> {
        check_partition(params.data.get_string(ATTR_REGION), params.client)?;
        Ok(())
    })
}

/// Rejects data source regions outside the provider's partition.
///
/// Before Read.
#[must_use]
pub fn validate_data_source_region() -> Interceptor {
    Interceptor::crud_fn(|params: CrudParams<'_>| {
        match check_partition(params.data.get_string(ATTR_REGION), params.client) {
            Ok(()) => Diagnostics::new(),
            Err(err) => Diagnostics::from_error(err),
        }
    })
}

/// Plans the call's region when `region` is unset or empty.
///
/// Before CustomizeDiff.
#[must_use]
pub fn default_region() -> Interceptor {
    Interceptor::diff_fn(|params: DiffParams<'_>| -> Result<(), BoxError> {
        let unset = match params.data.get(ATTR_REGION) {
            Value::Null => true,
            Value::String(region) => region.is_empty(),
            _ => false,
        };
        if unset {
            let region = params.client.region(params.ctx).to_owned();
            params.data.set_new(ATTR_REGION, region)?;
        }
        Ok(())
    })
}

/// Writes the call's region into state.
///
/// After Read.
#[must_use]
pub fn set_region_in_state() -> Interceptor {
    Interceptor::crud_fn(|params: CrudParams<'_>| {
        let region = params.client.region(params.ctx).to_owned();
        match params.data.set(ATTR_REGION, region) {
            Ok(()) => Diagnostics::new(),
            Err(err) => Diagnostics::from_error(err),
        }
    })
}

/// Forces replacement when the region of an existing resource changes.
///
/// Moving from no region in state to the provider's region is not a change:
/// state written before the attribute existed has no region.
///
/// Before CustomizeDiff.
#[must_use]
pub fn force_new_if_region_changes() -> Interceptor {
    Interceptor::diff_fn(|params: DiffParams<'_>| -> Result<(), BoxError> {
        if params.data.id().is_empty() || !params.data.has_change(ATTR_REGION) {
            return Ok(());
        }
        let (old, new) = params.data.get_change(ATTR_REGION);
        let old = old.as_str().unwrap_or_default();
        if old.is_empty() && new.as_str() == Some(params.client.default_region()) {
            return Ok(());
        }
        params.data.force_new(ATTR_REGION)?;
        Ok(())
    })
}

/// Strips an `@<region>` suffix from the import ID into `region`, falling
/// back to the call's region.
///
/// Before Import.
#[must_use]
pub fn import_region() -> Interceptor {
    Interceptor::import_fn(|mut params: ImportParams<'_>| -> Result<(), BoxError> {
        if apply_import_id_region(&mut params)? {
            return Ok(());
        }
        if params.data.get_string(ATTR_REGION).is_empty() {
            let region = params.client.region(params.ctx).to_owned();
            params.data.set(ATTR_REGION, region)?;
        }
        Ok(())
    })
}

/// Like [`import_region`] without the fallback, for identities that
/// determine the region themselves.
///
/// Before Import.
#[must_use]
pub fn import_region_no_default() -> Interceptor {
    Interceptor::import_fn(|mut params: ImportParams<'_>| -> Result<(), BoxError> {
        apply_import_id_region(&mut params)?;
        Ok(())
    })
}

/// Returns `true` if the import ID carried a region.
fn apply_import_id_region(params: &mut ImportParams<'_>) -> Result<bool, ImportError> {
    let import_id = params.data.id().to_owned();
    let Some((id, region)) = split_import_id(&import_id) else {
        return Ok(false);
    };

    let explicit = params.data.get_string(ATTR_REGION);
    if !explicit.is_empty() && explicit != region {
        return Err(ImportError::RegionMismatch {
            explicit,
            derived: region.to_owned(),
            source_kind: "import ID",
            value: import_id.clone(),
        });
    }

    params.data.set_id(id);
    params.data.set(ATTR_REGION, region)?;
    params.ctx.set_override_region(region);
    Ok(true)
}
