//! Resource state handle for plan-time diff operations.
//!
//! [`ResourceDiff`] lets diff interceptors and handlers adjust the planned new
//! state and force replacement. It deliberately has no way to change the
//! resource id.

use std::collections::BTreeSet;

use crate::data::StateReader;
use crate::error::AttributeError;
use crate::names::ATTR_ID;
use crate::value::{Attributes, NULL, Value};

/// Mutable plan handle for diff operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceDiff {
    id: String,
    state: Attributes,
    config: Attributes,
    plan: Attributes,
    raw_plan: Attributes,
    force_new: BTreeSet<String>,
}

impl ResourceDiff {
    /// Creates a diff handle.
    ///
    /// `id` is empty when the resource is being planned for creation.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        state: Attributes,
        config: Attributes,
        plan: Attributes,
    ) -> Self {
        Self {
            id: id.into(),
            state,
            config,
            raw_plan: plan.clone(),
            plan,
            force_new: BTreeSet::new(),
        }
    }

    /// Returns the prior and planned value of an attribute.
    #[must_use]
    pub fn get_change(&self, name: &str) -> (Value, Value) {
        (
            self.state.get(name).cloned().unwrap_or_default(),
            self.get(name),
        )
    }

    /// Overrides the planned value of an attribute.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::ReadOnly`] if `name` is `"id"`, which the
    /// diff handle cannot change.
    pub fn set_new(&mut self, name: &str, value: impl Into<Value>) -> Result<(), AttributeError> {
        if name == ATTR_ID {
            return Err(AttributeError::ReadOnly {
                name: name.to_owned(),
            });
        }
        self.plan.insert(name.to_owned(), value.into());
        Ok(())
    }

    /// Marks the planned value of an attribute as unknown until apply.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`set_new`](Self::set_new).
    pub fn set_new_computed(&mut self, name: &str) -> Result<(), AttributeError> {
        self.set_new(name, Value::Unknown)
    }

    /// Requires replacement of the resource because `name` changes.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::NoChange`] if the attribute has no planned change.
    pub fn force_new(&mut self, name: &str) -> Result<(), AttributeError> {
        if !self.has_change(name) {
            return Err(AttributeError::NoChange {
                name: name.to_owned(),
            });
        }
        self.force_new.insert(name.to_owned());
        Ok(())
    }

    /// Returns `true` if any attribute forces replacement.
    #[must_use]
    pub fn requires_replace(&self) -> bool {
        !self.force_new.is_empty()
    }

    /// Returns the attributes that force replacement.
    pub fn replace_paths(&self) -> impl Iterator<Item = &str> {
        self.force_new.iter().map(String::as_str)
    }

    /// Returns the adjusted plan.
    #[must_use]
    pub fn plan(&self) -> &Attributes {
        &self.plan
    }
}

impl StateReader for ResourceDiff {
    fn id(&self) -> &str {
        &self.id
    }

    fn get(&self, name: &str) -> Value {
        if name == ATTR_ID {
            return Value::String(self.id.clone());
        }
        self.plan.get(name).unwrap_or(&NULL).clone()
    }

    fn has_change(&self, name: &str) -> bool {
        if name == ATTR_ID {
            return false;
        }
        self.state.get(name).unwrap_or(&NULL) != self.plan.get(name).unwrap_or(&NULL)
    }

    fn raw_state(&self) -> &Attributes {
        &self.state
    }

    fn raw_config(&self) -> &Attributes {
        &self.config
    }

    fn raw_plan(&self) -> &Attributes {
        &self.raw_plan
    }
}
