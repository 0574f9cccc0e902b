//! Transparent tagging.
//!
//! Taggable resources declare `tags` (practitioner-set) and `tags_all`
//! (computed: `tags` merged with provider default tags). Handlers only ever
//! see the merged set through [`CallContext::tags_in`] and may report what
//! they read through [`CallContext::set_tags_out`]; the interceptors here do
//! the rest.
//!
//! | Stage | Operations | Behavior |
//! |-------|-----------|----------|
//! | Before | Create, Update | stash merged tags; on Update apply a known `tags_all` change |
//! | After | Create, Read, Update | read tags back into `tags` and `tags_all` |
//! | Finally | Update | apply and read back a `tags_all` that was unknown at plan time |
//!
//! Data sources only read: [`data_source_tagging`] stashes configured tags
//! before Read and writes the object's tags into `tags` after it.

use std::sync::Arc;

use meridian_intercept::interceptor::{CrudInterceptor, CrudParams, DiffParams};
use meridian_intercept::{Interceptor, Operation, Stage};
use meridian_resource::names::{ATTR_ID, ATTR_TAGS, ATTR_TAGS_ALL};
use meridian_resource::tags::{KeyValueTags, TagPolicySeverity, TagService, TaggingUnsupported};
use meridian_resource::{
    BoxError, CallContext, Client, Diagnostics, ResourceData, StateReader, Value,
};
use thiserror::Error;

use crate::resource::TagsSpec;

/// Partition in which every service supports tagging.
const COMMERCIAL_PARTITION: &str = "aws";

/// A planned tag set lacks keys the tag policy requires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{type_name} is missing required tags: {}", .missing.join(", "))]
pub struct MissingRequiredTags {
    /// The resource type.
    pub type_name: String,
    /// The missing keys, in policy order.
    pub missing: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// TransparentTagging
// ─────────────────────────────────────────────────────────────────────────────

/// CRUD interceptor keeping `tags` and `tags_all` in sync with the remote
/// object.
pub struct TransparentTagging {
    spec: TagsSpec,
    service: Option<Arc<dyn TagService>>,
}

impl TransparentTagging {
    /// Tags objects through `service`. Without a service only handler-reported
    /// tags are read back.
    #[must_use]
    pub fn new(spec: TagsSpec, service: Option<Arc<dyn TagService>>) -> Self {
        Self { spec, service }
    }

    fn identifier(&self, data: &ResourceData) -> String {
        if self.spec.identifier_attribute == ATTR_ID {
            data.id().to_owned()
        } else {
            data.get_string(&self.spec.identifier_attribute)
        }
    }

    fn before(&self, params: CrudParams<'_>) -> Diagnostics {
        let configured = KeyValueTags::from_value(&params.data.get(ATTR_TAGS));
        let tags_in = params
            .client
            .default_tags()
            .merge_tags(&configured)
            .ignore_system();
        params.ctx.set_tags_in(tags_in);

        if params.operation != Operation::Update
            || !planned_tags_all_known(params.data)
            || !params.data.has_change(ATTR_TAGS_ALL)
        {
            return Diagnostics::new();
        }

        let (old, new) = params.data.get_change(ATTR_TAGS_ALL);
        self.update_tags(
            params.ctx,
            params.client,
            params.data,
            &KeyValueTags::from_value(&old),
            &KeyValueTags::from_value(&new),
        )
    }

    fn finally(&self, params: CrudParams<'_>) -> Diagnostics {
        if planned_tags_all_known(params.data) {
            return Diagnostics::new();
        }

        // tags_all was only computed during apply
        let new = match params.ctx.tags_in() {
            Some(tags) => tags.clone(),
            None => params
                .client
                .default_tags()
                .merge_tags(&KeyValueTags::from_value(&params.data.get(ATTR_TAGS)))
                .ignore_system(),
        };
        let old = params
            .data
            .raw_state()
            .get(ATTR_TAGS_ALL)
            .map(KeyValueTags::from_value)
            .unwrap_or_default();

        let mut diags = self.update_tags(params.ctx, params.client, params.data, &old, &new);
        if !diags.has_error() {
            diags.extend(self.read_back(params.ctx, params.client, params.data));
        }
        diags
    }

    fn update_tags(
        &self,
        ctx: &CallContext,
        client: &Client,
        data: &ResourceData,
        old: &KeyValueTags,
        new: &KeyValueTags,
    ) -> Diagnostics {
        let Some(service) = &self.service else {
            return Diagnostics::new();
        };
        let identifier = self.identifier(data);
        if identifier.is_empty() {
            return Diagnostics::new();
        }

        let (updated, removed) = (old.updated(new), old.removed(new));
        if updated.is_empty() && removed.is_empty() {
            return Diagnostics::new();
        }
        tracing::debug!(
            resource = ctx.type_name(),
            identifier,
            updated = updated.len(),
            removed = removed.len(),
            "updating tags"
        );

        let result = service.update_tags(
            ctx,
            client,
            &identifier,
            self.spec.resource_type.as_deref(),
            old,
            new,
        );
        match result {
            Ok(()) => Diagnostics::new(),
            Err(err) => self.service_failure("updating", ctx, client, &identifier, &err),
        }
    }

    /// Reads the object's tags into `tags` and `tags_all`.
    fn read_back(&self, ctx: &CallContext, client: &Client, data: &mut ResourceData) -> Diagnostics {
        if data.id().is_empty() {
            return Diagnostics::new();
        }

        let tags = match (ctx.tags_out(), &self.service) {
            (Some(tags), _) => tags.clone(),
            (None, Some(service)) => {
                let identifier = self.identifier(data);
                let listed = service.list_tags(
                    ctx,
                    client,
                    &identifier,
                    self.spec.resource_type.as_deref(),
                );
                match listed {
                    Ok(tags) => tags,
                    Err(err) => {
                        return self.service_failure("listing", ctx, client, &identifier, &err);
                    }
                }
            }
            (None, None) => return Diagnostics::new(),
        };

        let tags = tags.ignore_system().ignore_config(client.ignore_tags());
        let configured = data
            .raw_config()
            .get(ATTR_TAGS)
            .map(KeyValueTags::from_value)
            .unwrap_or_default();
        let user_tags = tags.resolve_duplicates(client.default_tags(), client.ignore_tags(), &configured);

        let mut diags = Diagnostics::new();
        for (name, value) in [(ATTR_TAGS, user_tags), (ATTR_TAGS_ALL, tags)] {
            if let Err(err) = data.set(name, value.to_value()) {
                diags.append_error(err.to_string());
            }
        }
        diags
    }

    fn service_failure(
        &self,
        action: &str,
        ctx: &CallContext,
        client: &Client,
        identifier: &str,
        err: &BoxError,
    ) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let message = format!(
            "{action} tags for {} {} ({identifier}): {err}",
            ctx.service_package(),
            ctx.resource_name()
        );

        if client.partition() != COMMERCIAL_PARTITION
            && err.downcast_ref::<TaggingUnsupported>().is_some()
        {
            tracing::warn!(
                resource = ctx.type_name(),
                partition = client.partition(),
                "tagging not supported in partition"
            );
            diags.append_warning(message);
        } else {
            diags.append_error(message);
        }
        diags
    }
}

impl CrudInterceptor for TransparentTagging {
    fn run(&self, params: CrudParams<'_>) -> Diagnostics {
        match (params.stage, params.operation) {
            (Stage::Before, Operation::Create | Operation::Update) => self.before(params),
            (Stage::After, Operation::Create | Operation::Read | Operation::Update) => {
                self.read_back(params.ctx, params.client, params.data)
            }
            (Stage::Finally, Operation::Update) => self.finally(params),
            _ => Diagnostics::new(),
        }
    }
}

fn planned_tags_all_known(data: &ResourceData) -> bool {
    data.raw_plan()
        .get(ATTR_TAGS_ALL)
        .is_none_or(Value::is_wholly_known)
}

/// The transparent tagging interceptor.
///
/// Before|After|Finally × Create|Read|Update.
#[must_use]
pub fn transparent_tagging(spec: TagsSpec, service: Option<Arc<dyn TagService>>) -> Interceptor {
    Interceptor::crud(TransparentTagging::new(spec, service))
}

// ─────────────────────────────────────────────────────────────────────────────
// Data sources
// ─────────────────────────────────────────────────────────────────────────────

/// CRUD interceptor reading a data source's tags into `tags`.
pub struct DataSourceTagging {
    spec: TagsSpec,
    service: Option<Arc<dyn TagService>>,
}

impl DataSourceTagging {
    /// Lists tags through `service` when the handler reports none.
    #[must_use]
    pub fn new(spec: TagsSpec, service: Option<Arc<dyn TagService>>) -> Self {
        Self { spec, service }
    }

    fn read_back(&self, ctx: &CallContext, client: &Client, data: &mut ResourceData) -> Diagnostics {
        let tags = match (ctx.tags_out(), &self.service) {
            (Some(tags), _) => tags.clone(),
            (None, Some(service)) => {
                let identifier = if self.spec.identifier_attribute == ATTR_ID {
                    data.id().to_owned()
                } else {
                    data.get_string(&self.spec.identifier_attribute)
                };
                if identifier.is_empty() {
                    return Diagnostics::new();
                }
                match service.list_tags(ctx, client, &identifier, self.spec.resource_type.as_deref()) {
                    Ok(tags) => tags,
                    Err(err) => {
                        return Diagnostics::from_error(format!(
                            "listing tags for {} {} ({identifier}): {err}",
                            ctx.service_package(),
                            ctx.resource_name()
                        ));
                    }
                }
            }
            (None, None) => return Diagnostics::new(),
        };

        let tags = tags.ignore_system().ignore_config(client.ignore_tags());
        match data.set(ATTR_TAGS, tags.to_value()) {
            Ok(()) => Diagnostics::new(),
            Err(err) => Diagnostics::from_error(err),
        }
    }
}

impl CrudInterceptor for DataSourceTagging {
    fn run(&self, params: CrudParams<'_>) -> Diagnostics {
        match (params.stage, params.operation) {
            (Stage::Before, Operation::Read) => {
                let configured = KeyValueTags::from_value(&params.data.get(ATTR_TAGS));
                params.ctx.set_tags_in(configured);
                Diagnostics::new()
            }
            (Stage::After, Operation::Read) => {
                self.read_back(params.ctx, params.client, params.data)
            }
            _ => Diagnostics::new(),
        }
    }
}

/// The data source tagging interceptor.
///
/// Before|After × Read.
#[must_use]
pub fn data_source_tagging(spec: TagsSpec, service: Option<Arc<dyn TagService>>) -> Interceptor {
    Interceptor::crud(DataSourceTagging::new(spec, service))
}

// ─────────────────────────────────────────────────────────────────────────────
// Plan-time
// ─────────────────────────────────────────────────────────────────────────────

/// Plans `tags_all` as configured tags over default tags, minus ignored tags.
///
/// `tags_all` is planned unknown while any configured tag is.
///
/// Before CustomizeDiff.
#[must_use]
pub fn set_tags_all() -> Interceptor {
    Interceptor::diff_fn(|params: DiffParams<'_>| -> Result<(), BoxError> {
        let tags_known = params
            .data
            .raw_plan()
            .get(ATTR_TAGS)
            .is_none_or(Value::is_wholly_known);
        if !tags_known {
            params.data.set_new_computed(ATTR_TAGS_ALL)?;
            return Ok(());
        }

        let configured = KeyValueTags::from_value(&params.data.get(ATTR_TAGS));
        let all = params
            .client
            .default_tags()
            .merge_tags(&configured)
            .ignore_config(params.client.ignore_tags());

        let value = if all.is_empty() {
            Value::Null
        } else {
            all.to_value()
        };
        params.data.set_new(ATTR_TAGS_ALL, value)?;
        Ok(())
    })
}

/// Enforces the provider's required tag policy on new or retagged resources.
///
/// Before CustomizeDiff, after [`set_tags_all`].
#[must_use]
pub fn validate_required_tags() -> Interceptor {
    Interceptor::diff_fn(|params: DiffParams<'_>| -> Result<(), BoxError> {
        let policy = params.client.tag_policy();
        if policy.required_tags.is_empty() {
            return Ok(());
        }
        if !params.data.id().is_empty() && !params.data.has_change(ATTR_TAGS_ALL) {
            return Ok(());
        }

        let planned = params.data.get(ATTR_TAGS_ALL);
        if !planned.is_wholly_known() {
            return Ok(());
        }
        let all = KeyValueTags::from_value(&planned);
        let missing: Vec<String> = policy
            .required_tags
            .iter()
            .filter(|key| !all.contains_key(key))
            .cloned()
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        let violation = MissingRequiredTags {
            type_name: params.ctx.type_name().to_owned(),
            missing,
        };
        match policy.severity {
            TagPolicySeverity::Error => Err(violation.into()),
            TagPolicySeverity::Warning => {
                tracing::warn!(error = %violation, "tag policy violation");
                Ok(())
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_tags_message() {
        let err = MissingRequiredTags {
            type_name: "aws_sqs_queue".to_owned(),
            missing: vec!["owner".to_owned(), "cost-center".to_owned()],
        };
        assert_eq!(
            err.to_string(),
            "aws_sqs_queue is missing required tags: owner, cost-center"
        );
    }

    #[test]
    fn unknown_planned_tags_all() {
        let mut plan = meridian_resource::Attributes::new();
        plan.insert(ATTR_TAGS_ALL.to_owned(), Value::Unknown);
        let data = ResourceData::for_update("q-1", Default::default(), Default::default(), plan);
        assert!(!planned_tags_all_known(&data));
        assert!(planned_tags_all_known(&ResourceData::new()));
    }
}
