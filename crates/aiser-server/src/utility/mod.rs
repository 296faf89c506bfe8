//! Shared helpers.

pub mod tracing_targets;

/// Default maximum request body size in bytes (2MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Version of the running server.
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the current unix time in seconds.
pub(crate) fn unix_seconds() -> i64 {
    jiff::Timestamp::now().as_second()
}
