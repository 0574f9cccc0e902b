//! Import configuration.
//!
//! An [`ImportSpec`] says how a resource type is imported: through the
//! generic resolver only ([`wrapped_import`](ImportSpec::wrapped_import)) or
//! through its own importer ([`custom_import`](ImportSpec::custom_import)),
//! and, for the multiple-parameter shape, which [`ImportIdCodec`] converts
//! between the composite import ID and the individual attributes.
//!
//! Custom importers find the specs of the type being imported on the call
//! context through [`ImportContext`], and may hand them to
//! [`resolve_import`](crate::resolve_import) themselves.

use core::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use meridian_resource::{BoxError, CallContext, ResourceData, StateReader};

use crate::spec::IdentitySpec;

/// Converts between a composite import ID and its attribute values.
///
/// Implementations must round-trip: parsing the ID created from a state
/// recovers that ID and the state's attribute values.
pub trait ImportIdCodec: Send + Sync {
    /// Builds the composite ID from the resource's attributes.
    fn create(&self, data: &ResourceData) -> String;

    /// Splits a composite ID into the canonical ID and the attribute values,
    /// keyed by resource attribute name.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is malformed.
    fn parse(&self, id: &str) -> Result<(String, IndexMap<String, String>), BoxError>;
}

/// Codec joining attribute values with a fixed separator.
///
/// # Example
///
/// ```
/// use meridian_identity::import::{ImportIdCodec, SeparatorCodec};
///
/// let codec = SeparatorCodec::new(",", ["bucket", "key"]);
/// let (id, parts) = codec.parse("my-bucket,path/to/object").unwrap();
/// assert_eq!(id, "my-bucket,path/to/object");
/// assert_eq!(parts["key"], "path/to/object");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeparatorCodec {
    separator: String,
    attributes: Vec<String>,
}

impl SeparatorCodec {
    /// Creates a codec for `attributes`, in ID order.
    #[must_use]
    pub fn new<I, S>(separator: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            separator: separator.into(),
            attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }
}

impl ImportIdCodec for SeparatorCodec {
    fn create(&self, data: &ResourceData) -> String {
        self.attributes
            .iter()
            .map(|name| data.get_string(name))
            .collect::<Vec<_>>()
            .join(self.separator.as_str())
    }

    fn parse(&self, id: &str) -> Result<(String, IndexMap<String, String>), BoxError> {
        let parts: Vec<&str> = id.split(self.separator.as_str()).collect();
        if parts.len() != self.attributes.len() || parts.iter().any(|p| p.is_empty()) {
            return Err(format!(
                "unexpected format for ID ({id}), expected {}",
                self.attributes
                    .iter()
                    .map(|a| a.to_uppercase())
                    .collect::<Vec<_>>()
                    .join(self.separator.as_str())
            )
            .into());
        }
        let values = self
            .attributes
            .iter()
            .cloned()
            .zip(parts.into_iter().map(str::to_owned))
            .collect();
        Ok((id.to_owned(), values))
    }
}

/// How a resource type is imported.
#[derive(Clone)]
pub struct ImportSpec {
    /// The resource supplies its own importer.
    pub custom_import: bool,
    /// The resource has no importer; the generic resolver is the importer.
    pub wrapped_import: bool,
    /// Whether the multiple-parameter resolver writes the resource ID.
    pub set_id_attribute: bool,
    import_id: Option<Arc<dyn ImportIdCodec>>,
}

impl Default for ImportSpec {
    fn default() -> Self {
        Self {
            custom_import: false,
            wrapped_import: false,
            set_id_attribute: true,
            import_id: None,
        }
    }
}

impl ImportSpec {
    /// Import handled entirely by the generic resolver.
    #[must_use]
    pub fn wrapped() -> Self {
        Self {
            wrapped_import: true,
            ..Self::default()
        }
    }

    /// Import handled by the resource's own importer.
    #[must_use]
    pub fn custom() -> Self {
        Self {
            custom_import: true,
            ..Self::default()
        }
    }

    /// Sets the composite import ID codec.
    #[must_use]
    pub fn with_import_id(mut self, codec: impl ImportIdCodec + 'static) -> Self {
        self.import_id = Some(Arc::new(codec));
        self
    }

    /// Leaves the resource ID to the importer on the multiple-parameter path.
    #[must_use]
    pub fn without_id_attribute(mut self) -> Self {
        self.set_id_attribute = false;
        self
    }

    /// The composite import ID codec, if any.
    #[must_use]
    pub fn import_id(&self) -> Option<&dyn ImportIdCodec> {
        self.import_id.as_deref()
    }
}

impl fmt::Debug for ImportSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportSpec")
            .field("custom_import", &self.custom_import)
            .field("wrapped_import", &self.wrapped_import)
            .field("set_id_attribute", &self.set_id_attribute)
            .field("import_id", &self.import_id.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Access to the import configuration of the resource type being imported.
pub trait ImportContext {
    /// Records the specs of the type being imported.
    fn set_import_specs(&mut self, identity: Option<IdentitySpec>, import: ImportSpec);

    /// The identity of the type being imported, if it has one.
    fn identity_spec(&self) -> Option<&IdentitySpec>;

    /// The import configuration of the type being imported.
    fn import_spec(&self) -> Option<&ImportSpec>;
}

impl ImportContext for CallContext {
    fn set_import_specs(&mut self, identity: Option<IdentitySpec>, import: ImportSpec) {
        let extensions = self.extensions_mut();
        if let Some(identity) = identity {
            extensions.insert(identity);
        }
        extensions.insert(import);
    }

    fn identity_spec(&self) -> Option<&IdentitySpec> {
        self.extensions().get()
    }

    fn import_spec(&self) -> Option<&ImportSpec> {
        self.extensions().get()
    }
}
