//! Identity population.

use meridian_identity::IdentitySpec;
use meridian_identity::resolve::identity_from_state;
use meridian_intercept::interceptor::{CrudInterceptor, CrudParams};
use meridian_intercept::{Interceptor, Operation, Stage};
use meridian_resource::{Diagnostics, ResourceData, StateReader};

/// CRUD interceptor writing identity values from resource state.
///
/// Runs After Create, Read and Update, and OnError Update. On Update an
/// identity that is already populated is only rewritten when it is both
/// mutable and set on update; a failed Update only fills an empty identity.
#[derive(Debug, Clone)]
pub struct IdentityInterceptor {
    spec: IdentitySpec,
}

impl IdentityInterceptor {
    /// Populates the identity described by `spec`.
    #[must_use]
    pub fn new(spec: IdentitySpec) -> Self {
        Self { spec }
    }

    fn is_fully_null(&self, data: &ResourceData) -> bool {
        data.identity()
            .is_none_or(|identity| identity.is_null_for(self.spec.attribute_names()))
    }

    /// Whether this stage of this operation writes the identity.
    fn should_write(&self, stage: Stage, operation: Operation, data: &ResourceData) -> bool {
        match (stage, operation) {
            (Stage::After, Operation::Create | Operation::Read) => true,
            (Stage::After, Operation::Update) => {
                (self.spec.is_mutable() && self.spec.is_set_on_update()) || self.is_fully_null(data)
            }
            (Stage::OnError, Operation::Update) => self.is_fully_null(data),
            _ => false,
        }
    }
}

impl CrudInterceptor for IdentityInterceptor {
    fn run(&self, params: CrudParams<'_>) -> Diagnostics {
        let data = params.data;
        if data.id().is_empty() || !self.should_write(params.stage, params.operation, data) {
            return Diagnostics::new();
        }

        let identity = identity_from_state(params.ctx, &self.spec, data, params.client);

        tracing::trace!(
            resource = params.ctx.type_name(),
            operation = %params.operation,
            "populated identity"
        );
        data.set_identity(identity);
        Diagnostics::new()
    }
}

/// The identity population interceptor.
///
/// After × Create|Read|Update, OnError × Update.
#[must_use]
pub fn identity(spec: IdentitySpec) -> Interceptor {
    Interceptor::crud(IdentityInterceptor::new(spec))
}
