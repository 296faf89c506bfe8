//! Middleware for `axum::Router` and HTTP request processing.
//!
//! - Request gates: [`require_authentication`] and [`require_min_version`].
//! - Router extension traits layering recovery, observability, security and
//!   OpenAPI documentation.
//!
//! ```rust,no_run
//! use aiser_server::middleware::{
//!     CorsConfig, RecoveryConfig, RouterObservabilityExt, RouterRecoveryExt,
//!     RouterSecurityExt, SecurityHeadersConfig,
//! };
//! use axum::Router;
//!
//! let app: Router = Router::new()
//!     .with_recovery(&RecoveryConfig::default())
//!     .with_observability()
//!     .with_security(&CorsConfig::default(), &SecurityHeadersConfig::default());
//! ```

mod auth;
mod observability;
mod recovery;
mod security;
mod specification;
mod version;

pub use auth::require_authentication;
pub use observability::RouterObservabilityExt;
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{
    CorsConfig, FrameOptions, ReferrerPolicy, RouterSecurityExt, SecurityHeadersConfig,
};
pub use specification::{OpenApiConfig, RouterOpenApiExt};
pub use version::require_min_version;
