//! Shared test utilities for `meridian_provider` integration tests.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities, not all items used in every test binary"
)]

use std::collections::BTreeMap;
use std::sync::Arc;

use meridian_provider::prelude::*;
use meridian_resource::prelude::*;
use meridian_resource::tags::{KeyValueTags, TagService, TaggingUnsupported};
use parking_lot::Mutex;

pub const ACCOUNT_ID: &str = "123456789012";
pub const REGION: &str = "us-west-2";
pub const PACKAGE: &str = "things";

pub fn client() -> Client {
    Client::new(ACCOUNT_ID, REGION)
}

pub fn tags(pairs: &[(&str, &str)]) -> KeyValueTags {
    pairs.iter().copied().collect()
}

pub fn attrs(pairs: &[(&str, Value)]) -> Attributes {
    pairs
        .iter()
        .map(|(name, value)| ((*name).to_owned(), value.clone()))
        .collect()
}

/// `tags` and `tags_all` as a taggable resource declares them.
pub fn tagged_schema() -> Schema {
    Schema::new()
        .with("name", AttributeSchema::required())
        .with("arn", AttributeSchema::computed())
        .with("tags", AttributeSchema::optional())
        .with("tags_all", AttributeSchema::computed())
}

// ─────────────────────────────────────────────────────────────────────────────
// TestPackage
// ─────────────────────────────────────────────────────────────────────────────

/// A service package serving a fixed list of registrations.
pub struct TestPackage {
    name: String,
    resources: Vec<ResourceRegistration>,
    data_sources: Vec<DataSourceRegistration>,
    tag_service: Option<Arc<dyn TagService>>,
}

impl TestPackage {
    pub fn new(name: &str, resources: Vec<ResourceRegistration>) -> Self {
        Self {
            name: name.to_owned(),
            resources,
            data_sources: Vec::new(),
            tag_service: None,
        }
    }

    pub fn with_data_sources(mut self, data_sources: Vec<DataSourceRegistration>) -> Self {
        self.data_sources = data_sources;
        self
    }

    pub fn with_tag_service(mut self, service: Arc<dyn TagService>) -> Self {
        self.tag_service = Some(service);
        self
    }

    pub fn shared(self) -> Arc<dyn ServicePackage> {
        Arc::new(self)
    }
}

impl ServicePackage for TestPackage {
    fn name(&self) -> &str {
        &self.name
    }

    fn resources(&self) -> Vec<ResourceRegistration> {
        self.resources.clone()
    }

    fn data_sources(&self) -> Vec<DataSourceRegistration> {
        self.data_sources.clone()
    }

    fn tag_service(&self) -> Option<Arc<dyn TagService>> {
        self.tag_service.clone()
    }
}

/// Builds a provider with its own validation guard.
pub fn build(packages: Vec<Arc<dyn ServicePackage>>) -> Result<Provider, ProviderError> {
    Provider::with_validation_guard(packages, &ValidationGuard::new())
}

/// Builds a provider from a single package of `resources`.
pub fn provider(resources: Vec<ResourceRegistration>) -> Provider {
    build(vec![TestPackage::new(PACKAGE, resources).shared()]).expect("valid provider")
}

// ─────────────────────────────────────────────────────────────────────────────
// RecordingTagService
// ─────────────────────────────────────────────────────────────────────────────

/// One call made to the tagging API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagCall {
    List {
        identifier: String,
    },
    Update {
        identifier: String,
        old: KeyValueTags,
        new: KeyValueTags,
    },
}

/// In-memory tagging API that records every call.
#[derive(Default)]
pub struct RecordingTagService {
    remote: Mutex<BTreeMap<String, KeyValueTags>>,
    calls: Mutex<Vec<TagCall>>,
    unsupported: bool,
}

impl RecordingTagService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A service that cannot tag in any partition.
    pub fn unsupported() -> Arc<Self> {
        Arc::new(Self {
            unsupported: true,
            ..Self::default()
        })
    }

    pub fn seed(&self, identifier: &str, tags: KeyValueTags) {
        self.remote.lock().insert(identifier.to_owned(), tags);
    }

    pub fn remote(&self, identifier: &str) -> KeyValueTags {
        self.remote.lock().get(identifier).cloned().unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<TagCall> {
        self.calls.lock().clone()
    }

    pub fn updates(&self) -> Vec<TagCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, TagCall::Update { .. }))
            .collect()
    }

    fn check_supported(&self, client: &Client) -> Result<(), BoxError> {
        if self.unsupported {
            return Err(TaggingUnsupported {
                partition: client.partition().to_owned(),
            }
            .into());
        }
        Ok(())
    }
}

impl TagService for RecordingTagService {
    fn list_tags(
        &self,
        _ctx: &CallContext,
        client: &Client,
        identifier: &str,
        _resource_type: Option<&str>,
    ) -> Result<KeyValueTags, BoxError> {
        self.calls.lock().push(TagCall::List {
            identifier: identifier.to_owned(),
        });
        self.check_supported(client)?;
        Ok(self.remote(identifier))
    }

    fn update_tags(
        &self,
        _ctx: &CallContext,
        client: &Client,
        identifier: &str,
        _resource_type: Option<&str>,
        old: &KeyValueTags,
        new: &KeyValueTags,
    ) -> Result<(), BoxError> {
        self.calls.lock().push(TagCall::Update {
            identifier: identifier.to_owned(),
            old: old.clone(),
            new: new.clone(),
        });
        self.check_supported(client)?;
        self.seed(identifier, new.clone());
        Ok(())
    }
}
