//! Minimal attribute schema.
//!
//! Only the properties provider validation inspects are modeled: whether an
//! attribute is required, optional or computed, and whether a change forces
//! replacement.

use indexmap::IndexMap;

/// Properties of a single attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeSchema {
    /// The practitioner must set the attribute.
    pub required: bool,
    /// The practitioner may set the attribute.
    pub optional: bool,
    /// The provider may set the attribute.
    pub computed: bool,
    /// Changing the attribute replaces the resource.
    pub force_new: bool,
}

impl AttributeSchema {
    /// A required attribute.
    #[must_use]
    pub const fn required() -> Self {
        Self {
            required: true,
            optional: false,
            computed: false,
            force_new: false,
        }
    }

    /// An optional attribute.
    #[must_use]
    pub const fn optional() -> Self {
        Self {
            required: false,
            optional: true,
            computed: false,
            force_new: false,
        }
    }

    /// A computed attribute.
    #[must_use]
    pub const fn computed() -> Self {
        Self {
            required: false,
            optional: false,
            computed: true,
            force_new: false,
        }
    }

    /// An optional attribute the provider fills in when unset.
    #[must_use]
    pub const fn optional_computed() -> Self {
        Self {
            required: false,
            optional: true,
            computed: true,
            force_new: false,
        }
    }
}

/// Attribute schemas of a resource, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    attributes: IndexMap<String, AttributeSchema>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, attribute: AttributeSchema) -> Self {
        self.insert(name, attribute);
        self
    }

    /// Adds or replaces an attribute.
    pub fn insert(&mut self, name: impl Into<String>, attribute: AttributeSchema) {
        self.attributes.insert(name.into(), attribute);
    }

    /// Returns an attribute's schema.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.get(name)
    }

    /// Returns `true` if the attribute is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Iterates over the attributes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeSchema)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }
}
