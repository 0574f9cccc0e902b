//! Resource identity specifications.
//!
//! An [`IdentitySpec`] describes how one resource type is identified across
//! the account and region boundary. It is built once per resource type with
//! one of the shape constructors and never changes afterwards.
//!
//! | Shape | Regional constructor | Global constructor |
//! |-------|----------------------|--------------------|
//! | ARN | [`regional_arn`](IdentitySpec::regional_arn) | [`global_arn`](IdentitySpec::global_arn) |
//! | Custom inherent region | [`custom_inherent_region`](IdentitySpec::custom_inherent_region) | - |
//! | Singleton | [`regional_singleton`](IdentitySpec::regional_singleton) | [`global_singleton`](IdentitySpec::global_singleton) |
//! | Single parameter | [`regional_single_parameter`](IdentitySpec::regional_single_parameter) | [`global_single_parameter`](IdentitySpec::global_single_parameter) |
//! | Multiple parameters | [`regional_parameterized`](IdentitySpec::regional_parameterized) | [`global_parameterized`](IdentitySpec::global_parameterized) |

use core::fmt;
use std::sync::Arc;

use meridian_resource::BoxError;
use meridian_resource::names::{ATTR_ACCOUNT_ID, ATTR_ARN, ATTR_REGION};

/// The five mutually exclusive identity shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityShape {
    /// Identified by its ARN.
    Arn,
    /// Identified by one value whose region a resource-supplied parser extracts.
    CustomInherentRegion,
    /// At most one instance per account (and region).
    Singleton,
    /// Identified by one parameter.
    SingleParameter,
    /// Identified by a tuple of parameters.
    MultipleParameter,
}

impl fmt::Display for IdentityShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Arn => "arn",
            Self::CustomInherentRegion => "custom-inherent-region",
            Self::Singleton => "singleton",
            Self::SingleParameter => "single-parameter",
            Self::MultipleParameter => "multiple-parameter",
        })
    }
}

/// One attribute of a resource identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityAttribute {
    name: String,
    resource_attribute: String,
    required: bool,
}

impl IdentityAttribute {
    /// A required identity attribute stored under the same resource attribute name.
    #[must_use]
    pub fn required(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            resource_attribute: name.clone(),
            name,
            required: true,
        }
    }

    /// An optional identity attribute stored under the same resource attribute name.
    #[must_use]
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name)
        }
    }

    /// Maps the identity attribute onto a differently named resource attribute.
    #[must_use]
    pub fn with_resource_attribute(mut self, name: impl Into<String>) -> Self {
        self.resource_attribute = name.into();
        self
    }

    /// Name in the identity.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the resource attribute the value is read from and written to.
    #[must_use]
    pub fn resource_attribute(&self) -> &str {
        &self.resource_attribute
    }

    /// Whether imports must supply the attribute.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// Account and region extracted from a custom inherent-region value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InherentRegion {
    /// Owning account, if the value encodes one.
    pub account_id: String,
    /// Region the value belongs to.
    pub region: String,
}

/// Parses the account and region out of a custom inherent-region value.
pub type InherentRegionParser =
    Arc<dyn Fn(&str) -> Result<InherentRegion, BoxError> + Send + Sync>;

/// Identity description of one resource type.
#[derive(Clone)]
pub struct IdentitySpec {
    shape: IdentityShape,
    global: bool,
    mutable: bool,
    set_on_update: bool,
    attributes: Vec<IdentityAttribute>,
    primary_attribute: String,
    duplicate_attributes: Vec<String>,
    inherent_region_parser: Option<InherentRegionParser>,
    identity_schema: bool,
}

impl IdentitySpec {
    fn new(shape: IdentityShape, global: bool, attributes: Vec<IdentityAttribute>) -> Self {
        Self {
            shape,
            global,
            mutable: false,
            set_on_update: false,
            attributes,
            primary_attribute: String::new(),
            duplicate_attributes: Vec::new(),
            inherent_region_parser: None,
            identity_schema: true,
        }
    }

    fn with_primary(mut self, name: impl Into<String>) -> Self {
        self.primary_attribute = name.into();
        self
    }

    fn account_and_region(global: bool) -> Vec<IdentityAttribute> {
        let mut attributes = vec![IdentityAttribute::optional(ATTR_ACCOUNT_ID)];
        if !global {
            attributes.push(IdentityAttribute::optional(ATTR_REGION));
        }
        attributes
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Shapes
    // ─────────────────────────────────────────────────────────────────────────

    /// A regional resource identified by its `arn` attribute.
    #[must_use]
    pub fn regional_arn() -> Self {
        Self::regional_arn_with(ATTR_ARN)
    }

    /// A regional resource identified by the ARN stored in `attribute`.
    #[must_use]
    pub fn regional_arn_with(attribute: impl Into<String>) -> Self {
        let attribute = attribute.into();
        Self::new(
            IdentityShape::Arn,
            false,
            vec![IdentityAttribute::required(attribute.clone())],
        )
        .with_primary(attribute)
    }

    /// A global resource identified by its `arn` attribute.
    #[must_use]
    pub fn global_arn() -> Self {
        Self::global_arn_with(ATTR_ARN)
    }

    /// A global resource identified by the ARN stored in `attribute`.
    #[must_use]
    pub fn global_arn_with(attribute: impl Into<String>) -> Self {
        Self::regional_arn_with(attribute).global()
    }

    /// A regional resource identified by `attribute`, whose region `parser`
    /// extracts from the value.
    #[must_use]
    pub fn custom_inherent_region(
        attribute: impl Into<String>,
        parser: impl Fn(&str) -> Result<InherentRegion, BoxError> + Send + Sync + 'static,
    ) -> Self {
        let attribute = attribute.into();
        let mut spec = Self::new(
            IdentityShape::CustomInherentRegion,
            false,
            vec![IdentityAttribute::required(attribute.clone())],
        )
        .with_primary(attribute);
        spec.inherent_region_parser = Some(Arc::new(parser));
        spec
    }

    /// At most one instance per account and region.
    #[must_use]
    pub fn regional_singleton() -> Self {
        Self::new(IdentityShape::Singleton, false, Self::account_and_region(false))
    }

    /// At most one instance per account.
    #[must_use]
    pub fn global_singleton() -> Self {
        Self::new(IdentityShape::Singleton, true, Self::account_and_region(true))
    }

    /// A regional resource identified by one attribute, possibly `"id"`.
    #[must_use]
    pub fn regional_single_parameter(attribute: impl Into<String>) -> Self {
        Self::single_parameter(attribute.into(), false)
    }

    /// A global resource identified by one attribute, possibly `"id"`.
    #[must_use]
    pub fn global_single_parameter(attribute: impl Into<String>) -> Self {
        Self::single_parameter(attribute.into(), true)
    }

    fn single_parameter(attribute: String, global: bool) -> Self {
        let mut attributes = Self::account_and_region(global);
        attributes.push(IdentityAttribute::required(attribute.clone()));
        Self::new(IdentityShape::SingleParameter, global, attributes).with_primary(attribute)
    }

    /// A regional resource identified by a tuple of attributes.
    #[must_use]
    pub fn regional_parameterized(attributes: impl IntoIterator<Item = IdentityAttribute>) -> Self {
        Self::parameterized(attributes, false)
    }

    /// A global resource identified by a tuple of attributes.
    #[must_use]
    pub fn global_parameterized(attributes: impl IntoIterator<Item = IdentityAttribute>) -> Self {
        Self::parameterized(attributes, true)
    }

    fn parameterized(attributes: impl IntoIterator<Item = IdentityAttribute>, global: bool) -> Self {
        let mut all = Self::account_and_region(global);
        all.extend(attributes);
        Self::new(IdentityShape::MultipleParameter, global, all)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Options
    // ─────────────────────────────────────────────────────────────────────────

    /// Mirrors the primary value into further resource attributes, `"id"` included.
    #[must_use]
    pub fn with_duplicate_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.duplicate_attributes
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Marks the resource as living outside any region.
    ///
    /// The custom inherent-region shape cannot be global; providers reject it
    /// at startup.
    #[must_use]
    pub fn global(mut self) -> Self {
        self.global = true;
        self.attributes.retain(|a| a.name() != ATTR_REGION);
        self
    }

    /// Allows identity values to change over the resource's lifetime.
    #[must_use]
    pub fn mutable(mut self) -> Self {
        self.mutable = true;
        self
    }

    /// Refreshes the identity after every update. Only meaningful with
    /// [`mutable`](Self::mutable).
    #[must_use]
    pub fn set_on_update(mut self) -> Self {
        self.set_on_update = true;
        self
    }

    /// Resolves imports through the identity without storing identity data
    /// on the resource.
    #[must_use]
    pub fn without_identity_schema(mut self) -> Self {
        self.identity_schema = false;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// The identity shape.
    #[must_use]
    pub fn shape(&self) -> IdentityShape {
        self.shape
    }

    /// Whether the resource lives outside any region.
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.global
    }

    /// Whether identity values may change.
    #[must_use]
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Whether the identity is refreshed after updates.
    #[must_use]
    pub fn is_set_on_update(&self) -> bool {
        self.set_on_update
    }

    /// The identity attributes in order.
    #[must_use]
    pub fn attributes(&self) -> &[IdentityAttribute] {
        &self.attributes
    }

    /// Returns `true` if the identity has any attributes.
    #[must_use]
    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Returns `true` if resources of this type carry identity data.
    #[must_use]
    pub fn has_identity_schema(&self) -> bool {
        self.identity_schema && self.has_attributes()
    }

    /// The attribute holding the primary value for the ARN, custom
    /// inherent-region and single-parameter shapes; empty otherwise.
    #[must_use]
    pub fn primary_attribute(&self) -> &str {
        &self.primary_attribute
    }

    /// Resource attributes that mirror the primary value.
    #[must_use]
    pub fn duplicate_attributes(&self) -> &[String] {
        &self.duplicate_attributes
    }

    /// The parser of the custom inherent-region shape.
    #[must_use]
    pub fn inherent_region_parser(&self) -> Option<&InherentRegionParser> {
        self.inherent_region_parser.as_ref()
    }

    /// Returns `true` if the identity itself determines the resource's region,
    /// so an import must not fall back to the provider default.
    #[must_use]
    pub fn has_inherent_region(&self) -> bool {
        !self.global
            && matches!(
                self.shape,
                IdentityShape::Arn | IdentityShape::Singleton | IdentityShape::CustomInherentRegion
            )
    }

    /// Names of the identity attributes.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(IdentityAttribute::name)
    }
}

impl fmt::Debug for IdentitySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentitySpec")
            .field("shape", &self.shape)
            .field("global", &self.global)
            .field("mutable", &self.mutable)
            .field("set_on_update", &self.set_on_update)
            .field("attributes", &self.attributes)
            .field("primary_attribute", &self.primary_attribute)
            .field("duplicate_attributes", &self.duplicate_attributes)
            .field("identity_schema", &self.identity_schema)
            .field(
                "inherent_region_parser",
                &self.inherent_region_parser.as_ref().map(|_| ".."),
            )
            .finish()
    }
}
