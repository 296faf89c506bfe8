//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── server: ServerConfig         # Host, port, shutdown
//! ├── middleware: MiddlewareConfig # CORS, OpenAPI, recovery/timeouts
//! ├── service: ServiceConfig       # Environment, JWT, API path prefixes
//! └── demo: DemoConfig             # Ids of the demo agent and knowledge base
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! # Serve on all interfaces in production mode
//! aiser --host 0.0.0.0 --port 8080 --server-environment production \
//!     --complete-url https://agents.example.com --consumer example \
//!     --auth-public-key ./public.pem
//!
//! # Or via environment variables
//! HOST=0.0.0.0 PORT=8080 SERVER_ENVIRONMENT=production aiser
//! ```

mod demo;
mod middleware;
mod server;

use std::process;

use aiser_server::service::ServiceConfig;
use anyhow::Context;
use clap::Parser;
pub use demo::DemoConfig;
pub use middleware::MiddlewareConfig;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
///
/// Combines all configuration groups for the aiser server:
/// - [`ServerConfig`]: Network binding and shutdown
/// - [`MiddlewareConfig`]: HTTP middleware (CORS, OpenAPI, recovery)
/// - [`ServiceConfig`]: Environment, authentication and API paths
/// - [`DemoConfig`]: Demo agent and knowledge base ids
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "aiser")]
#[command(about = "Agent server with native and OpenAI-compatible chat endpoints")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (CORS, OpenAPI, timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Environment, authentication and API path configuration.
    #[clap(flatten)]
    pub service: ServiceConfig,

    /// Demo agent and knowledge base configuration.
    #[clap(flatten)]
    pub demo: DemoConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// This is the preferred way to initialize the CLI configuration as it ensures
    /// .env files are loaded before clap parses arguments, allowing environment
    /// variables from .env to be used as defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.service
            .validate()
            .context("invalid service configuration")?;
        self.demo.validate().context("invalid demo configuration")?;
        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            "starting aiser server"
        );

        Self::log_build_info();
        self.server.log();
        self.middleware.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            environment = %self.service.server_environment,
            jwt_algorithm = ?self.service.jwt_algorithm,
            complete_url = ?self.service.complete_url,
            classic_agent_api_path = %self.service.classic_agent_api_path,
            openai_compatible_api_path = %self.service.openai_compatible_api_path,
            "Service configuration"
        );

        self.demo.log();
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_are_valid() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["aiser"])?;

        assert_eq!(cli.server.port, 5000);
        assert_eq!(cli.service.classic_agent_api_path, "/agent");
        assert_eq!(
            cli.service.openai_compatible_api_path,
            "/openai-compatible/v1"
        );
        cli.validate()?;
        Ok(())
    }

    #[test]
    fn production_without_credentials_is_rejected() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["aiser", "--server-environment", "production"])?;
        assert!(cli.validate().is_err());
        Ok(())
    }
}
