//! Resource state handle for CRUD and import operations.
//!
//! [`ResourceData`] is exclusively owned by one host call. Handlers and
//! interceptors read and write attributes, the resource id and the identity
//! through it. Plan-time calls use [`ResourceDiff`](crate::diff::ResourceDiff)
//! instead, which cannot change the id.
//!
//! # Attribute Views
//!
//! - **raw state**: the prior state the host sent (empty on create/import)
//! - **raw config**: the practitioner's configuration
//! - **raw plan**: the planned new state, which may hold unknown values
//! - **working attributes**: what [`get`](ResourceData::get) returns and
//!   [`set`](ResourceData::set) writes; these become the new state
//!
//! [`has_change`](StateReader::has_change) compares raw state with the working
//! attributes.

use indexmap::IndexMap;

use crate::error::AttributeError;
use crate::names::ATTR_ID;
use crate::value::{Attributes, NULL, Value};

// ─────────────────────────────────────────────────────────────────────────────
// StateReader
// ─────────────────────────────────────────────────────────────────────────────

/// Read capabilities shared by every state handle.
pub trait StateReader {
    /// Returns the resource id, empty if the remote object does not exist yet.
    fn id(&self) -> &str;

    /// Returns the current value of an attribute, [`Value::Null`] if absent.
    ///
    /// The name `"id"` reads the resource id.
    fn get(&self, name: &str) -> Value;

    /// Returns `true` if the attribute changes in this operation.
    fn has_change(&self, name: &str) -> bool;

    /// Returns the prior state as sent by the host.
    fn raw_state(&self) -> &Attributes;

    /// Returns the practitioner's configuration.
    fn raw_config(&self) -> &Attributes;

    /// Returns the planned new state.
    fn raw_plan(&self) -> &Attributes;

    /// Returns the attribute value if it is set to a non-zero value.
    fn get_ok(&self, name: &str) -> Option<Value> {
        let value = self.get(name);
        (!value.is_zero()).then_some(value)
    }

    /// Returns the attribute as a string, or an empty string.
    fn get_string(&self, name: &str) -> String {
        match self.get(name) {
            Value::String(s) => s,
            _ => String::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// IdentityData
// ─────────────────────────────────────────────────────────────────────────────

/// Identity attribute values of one resource instance.
///
/// Values are strings. An absent value and an empty string are both null.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityData {
    values: IndexMap<String, String>,
}

impl IdentityData {
    /// Creates an identity with no values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of an identity attribute if it is set and non-empty.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Sets an identity attribute.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Returns `true` if every listed attribute is null.
    #[must_use]
    pub fn is_null_for<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> bool {
        names.into_iter().all(|name| self.get(name).is_none())
    }

    /// Iterates over all stored values, including empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for IdentityData
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ResourceData
// ─────────────────────────────────────────────────────────────────────────────

/// Mutable state handle for CRUD and import operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    id: String,
    prior: Attributes,
    config: Attributes,
    plan: Attributes,
    attrs: Attributes,
    identity: Option<IdentityData>,
}

impl ResourceData {
    /// Creates an empty handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a handle for a Read or Delete call from existing state.
    #[must_use]
    pub fn from_state(id: impl Into<String>, state: Attributes) -> Self {
        Self {
            id: id.into(),
            prior: state.clone(),
            attrs: state,
            ..Self::default()
        }
    }

    /// Creates a handle for a Create call.
    ///
    /// Working attributes start from the plan with unknown values dropped.
    #[must_use]
    pub fn for_create(config: Attributes, plan: Attributes) -> Self {
        Self {
            attrs: known_only(&plan),
            config,
            plan,
            ..Self::default()
        }
    }

    /// Creates a handle for an Update call.
    ///
    /// Working attributes start from the plan; unknown planned values keep
    /// their prior state value until the handler sets them.
    #[must_use]
    pub fn for_update(
        id: impl Into<String>,
        prior: Attributes,
        config: Attributes,
        plan: Attributes,
    ) -> Self {
        let mut attrs = prior.clone();
        for (name, value) in &plan {
            if value.is_known() {
                attrs.insert(name.clone(), value.clone());
            }
        }
        Self {
            id: id.into(),
            prior,
            config,
            plan,
            attrs,
            identity: None,
        }
    }

    /// Creates a handle for an Import call.
    ///
    /// `id` is the legacy import identifier and may be empty when importing by
    /// identity.
    #[must_use]
    pub fn for_import(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Attaches identity values.
    #[must_use]
    pub fn with_identity(mut self, identity: IdentityData) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Seeds a working attribute, as if it were part of the prior state too.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        self.prior.insert(name.clone(), value.clone());
        self.attrs.insert(name, value);
        self
    }

    /// Sets the resource id. An empty id marks the resource as gone.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Writes an attribute. The name `"id"` writes the resource id.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::UnknownValue`] for unknown values, and
    /// [`AttributeError::NotAString`] when setting `"id"` to a non-string.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), AttributeError> {
        let value = value.into();
        if !value.is_wholly_known() {
            return Err(AttributeError::UnknownValue {
                name: name.to_owned(),
            });
        }
        if name == ATTR_ID {
            return match value {
                Value::String(id) => {
                    self.id = id;
                    Ok(())
                }
                Value::Null => {
                    self.id.clear();
                    Ok(())
                }
                _ => Err(AttributeError::NotAString {
                    name: name.to_owned(),
                }),
            };
        }
        self.attrs.insert(name.to_owned(), value);
        Ok(())
    }

    /// Returns the prior and current value of an attribute.
    #[must_use]
    pub fn get_change(&self, name: &str) -> (Value, Value) {
        (
            self.prior.get(name).cloned().unwrap_or_default(),
            self.get(name),
        )
    }

    /// Returns the identity values, if the resource has an identity.
    #[must_use]
    pub fn identity(&self) -> Option<&IdentityData> {
        self.identity.as_ref()
    }

    /// Replaces the identity values.
    pub fn set_identity(&mut self, identity: IdentityData) {
        self.identity = Some(identity);
    }

    /// Returns the identity values for writing, if the resource has an identity.
    pub fn identity_mut(&mut self) -> Option<&mut IdentityData> {
        self.identity.as_mut()
    }

    /// Returns the working attributes, which become the new state.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attrs
    }
}

impl StateReader for ResourceData {
    fn id(&self) -> &str {
        &self.id
    }

    fn get(&self, name: &str) -> Value {
        if name == ATTR_ID {
            return Value::String(self.id.clone());
        }
        self.attrs.get(name).unwrap_or(&NULL).clone()
    }

    fn has_change(&self, name: &str) -> bool {
        if name == ATTR_ID {
            return false;
        }
        self.prior.get(name).unwrap_or(&NULL) != self.attrs.get(name).unwrap_or(&NULL)
    }

    fn raw_state(&self) -> &Attributes {
        &self.prior
    }

    fn raw_config(&self) -> &Attributes {
        &self.config
    }

    fn raw_plan(&self) -> &Attributes {
        &self.plan
    }
}

fn known_only(attrs: &Attributes) -> Attributes {
    attrs
        .iter()
        .filter(|(_, v)| v.is_wholly_known())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
