//! Application state, configuration and services.

pub mod auth;
mod chat;
mod config;
mod paths;
mod state;

pub use crate::service::auth::{
    AuthError, AuthGate, Authenticator, JwtAlgorithm, JwtAuthenticator, NoopAuthenticator,
};
pub use crate::service::chat::{ChatService, CompletionStream, NativeStream, encode_record};
pub use crate::service::config::{ServerEnvironment, ServiceConfig, ServiceConfigBuilder};
pub use crate::service::paths::ApiPaths;
pub use crate::service::state::ServiceState;
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};
