//! Centralized tracing target constants for structured logging.
//!
//! Using consistent targets enables fine-grained control over log output
//! via tracing subscriber filters, e.g. `RUST_LOG=aiser_server::stream=debug`.

/// Authentication including bearer token and JWT validation.
pub const AUTHENTICATION: &str = "aiser_server::authentication";

/// Minimum client-requested server version checks.
pub const VERSION_GATE: &str = "aiser_server::version_gate";

/// Reply stream lifecycle: started, completed, closed early, failed.
pub const STREAM: &str = "aiser_server::stream";

/// Error recovery including middleware errors and request failures.
pub const RECOVERY_ERROR: &str = "aiser_server::recovery::error";

/// Panic recovery including handler panics.
pub const RECOVERY_PANIC: &str = "aiser_server::recovery::panic";

/// Loading of authentication keys.
pub const AUTH_KEYS: &str = "aiser_server::auth_keys";
