//! # Meridian Internal Library
//!
//! Re-exports the core Meridian crates for convenience.

/// Layer 1: resource state, diagnostics, client and tags.
pub use meridian_resource;

/// Layer 2: interceptor masks, registration and dispatch.
pub use meridian_intercept;

/// Layer 2: resource identity and import resolution.
pub use meridian_identity;

/// Layer 3: built-in interceptors and provider assembly.
pub use meridian_provider;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use meridian_identity::prelude::*;
    pub use meridian_intercept::prelude::*;
    pub use meridian_provider::prelude::*;
    pub use meridian_resource::prelude::*;
}
