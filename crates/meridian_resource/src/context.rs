//! The per-call request object.
//!
//! A [`CallContext`] is created for every host operation and passed by
//! mutable reference through the whole interceptor pipeline and the handler.
//! It carries the resource naming, the effective region override, the tag
//! slots shared between the tagging interceptors and the handler, typed
//! [`Extensions`] set by higher layers, and a cooperative cancellation token.

use core::any::{Any, TypeId};
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hashbrown::HashMap;

use crate::error::Cancelled;
use crate::tags::KeyValueTags;

/// Cooperative cancellation flag shared between a caller and a running call.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Values attached to a call, at most one per type.
///
/// Layers above this crate use extensions to hand their own request data to
/// handlers without this crate knowing the types.
#[derive(Clone, Default)]
pub struct Extensions {
    storage: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Extensions {
    /// Creates an empty set of extensions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value`, replacing any value of the same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) {
        self.storage.insert(TypeId::of::<T>(), Arc::new(value));
    }

    /// Returns the value of type `T`, if one was stored.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.storage
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Returns `true` if a value of type `T` was stored.
    #[must_use]
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.storage.contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Returns `true` if nothing was stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extensions")
            .field("len", &self.storage.len())
            .finish()
    }
}

/// Request-scoped data for one resource operation.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    service_package: String,
    resource_name: String,
    type_name: String,
    override_region: Option<String>,
    tags_in: Option<KeyValueTags>,
    tags_out: Option<KeyValueTags>,
    extensions: Extensions,
    cancellation: CancellationToken,
}

impl CallContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `token` for cancellation, builder style.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Records which resource this call is for.
    pub fn set_resource(
        &mut self,
        service_package: impl Into<String>,
        resource_name: impl Into<String>,
        type_name: impl Into<String>,
    ) {
        self.service_package = service_package.into();
        self.resource_name = resource_name.into();
        self.type_name = type_name.into();
    }

    /// The owning service package, e.g. `"ec2"`.
    #[must_use]
    pub fn service_package(&self) -> &str {
        &self.service_package
    }

    /// The human-readable resource name, e.g. `"VPC"`.
    #[must_use]
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    /// The resource type name, e.g. `"aws_vpc"`.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Sets the per-resource region override. Empty strings clear it.
    pub fn set_override_region(&mut self, region: impl Into<String>) {
        let region = region.into();
        self.override_region = (!region.is_empty()).then_some(region);
    }

    /// Returns the per-resource region override.
    #[must_use]
    pub fn override_region(&self) -> Option<&str> {
        self.override_region.as_deref()
    }

    /// Tags the handler should apply, computed before Create and Update.
    #[must_use]
    pub fn tags_in(&self) -> Option<&KeyValueTags> {
        self.tags_in.as_ref()
    }

    /// Stores the tags the handler should apply.
    pub fn set_tags_in(&mut self, tags: KeyValueTags) {
        self.tags_in = Some(tags);
    }

    /// Tags the handler observed on the remote object.
    #[must_use]
    pub fn tags_out(&self) -> Option<&KeyValueTags> {
        self.tags_out.as_ref()
    }

    /// Stores the tags observed on the remote object.
    ///
    /// Handlers that receive tags as part of their read response set this to
    /// save the tagging interceptor a list call.
    pub fn set_tags_out(&mut self, tags: KeyValueTags) {
        self.tags_out = Some(tags);
    }

    /// Typed values attached to this call.
    #[must_use]
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Mutable access to the typed values attached to this call.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Returns `true` if the call has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Fails fast if the call has been cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] once the token has been cancelled.
    pub fn check_cancelled(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}
