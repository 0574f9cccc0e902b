//! Service packages.

use std::sync::Arc;

use meridian_resource::tags::TagService;

use crate::resource::{DataSourceRegistration, ResourceRegistration};

/// A group of resource types backed by one cloud service.
///
/// # Example
///
/// ```
/// use meridian_provider::prelude::*;
/// use meridian_resource::schema::Schema;
///
/// struct Sqs;
///
/// impl ServicePackage for Sqs {
///     fn name(&self) -> &str {
///         "sqs"
///     }
///
///     fn resources(&self) -> Vec<ResourceRegistration> {
///         vec![ResourceRegistration::new("aws_sqs_queue", "Queue", || {
///             Resource::new(Schema::new())
///         })]
///     }
/// }
///
/// assert_eq!(Sqs.resources().len(), 1);
/// assert!(Sqs.data_sources().is_empty());
/// assert!(Sqs.tag_service().is_none());
/// ```
pub trait ServicePackage: Send + Sync {
    /// Package name, e.g. `"sqs"`.
    fn name(&self) -> &str;

    /// The resource types this package implements.
    fn resources(&self) -> Vec<ResourceRegistration>;

    /// The data source types this package implements.
    fn data_sources(&self) -> Vec<DataSourceRegistration> {
        Vec::new()
    }

    /// Lists and updates tags for this package's taggable resources and
    /// data sources.
    fn tag_service(&self) -> Option<Arc<dyn TagService>> {
        None
    }
}
