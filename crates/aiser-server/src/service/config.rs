use std::path::{Path, PathBuf};

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::service::auth::{AuthGate, JwtAlgorithm, JwtAuthenticator, NoopAuthenticator};
use crate::{Error, Result};

/// Default values for configuration options.
mod defaults {
    /// Default path prefix of the native chat API.
    pub const CLASSIC_AGENT_API_PATH: &str = "/agent";

    /// Default path prefix of the OpenAI-compatible API.
    pub const OPENAI_COMPATIBLE_API_PATH: &str = "/openai-compatible/v1";
}

/// Deployment environment the server runs in.
///
/// Selects the authenticator: development lets every request through,
/// production verifies bearer tokens.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumString)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ServerEnvironment {
    /// Local development, no authentication.
    #[default]
    Development,
    /// Production deployment, JWT authentication.
    Production,
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
#[builder(
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct ServiceConfig {
    /// Environment the server runs in.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "SERVER_ENVIRONMENT", value_enum, default_value = "development")
    )]
    #[builder(default)]
    pub server_environment: ServerEnvironment,

    /// Public URL of this server, the expected JWT audience.
    #[cfg_attr(feature = "config", arg(long, env = "COMPLETE_URL"))]
    #[builder(default)]
    pub complete_url: Option<String>,

    /// Expected JWT issuer.
    #[cfg_attr(feature = "config", arg(long, env = "CONSUMER"))]
    #[builder(default)]
    pub consumer: Option<String>,

    /// File path to the PEM encoded public key verifying JWTs.
    #[cfg_attr(feature = "config", arg(long, env = "AUTH_PUBLIC_KEY"))]
    #[builder(default)]
    pub auth_public_key: Option<PathBuf>,

    /// Signature algorithm of the JWTs.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "JWT_ALGORITHM", value_enum, default_value = "EdDSA")
    )]
    #[builder(default = "JwtAlgorithm::EdDsa")]
    pub jwt_algorithm: JwtAlgorithm,

    /// Path prefix of the native chat API.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CLASSIC_AGENT_API_PATH", default_value = defaults::CLASSIC_AGENT_API_PATH)
    )]
    #[builder(default = "defaults::CLASSIC_AGENT_API_PATH.to_owned()")]
    pub classic_agent_api_path: String,

    /// Path prefix of the OpenAI-compatible API.
    #[cfg_attr(
        feature = "config",
        arg(
            long,
            env = "OPENAI_COMPATIBLE_API_PATH",
            default_value = defaults::OPENAI_COMPATIBLE_API_PATH
        )
    )]
    #[builder(default = "defaults::OPENAI_COMPATIBLE_API_PATH.to_owned()")]
    pub openai_compatible_api_path: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server_environment: ServerEnvironment::Development,
            complete_url: None,
            consumer: None,
            auth_public_key: None,
            jwt_algorithm: JwtAlgorithm::EdDsa,
            classic_agent_api_path: defaults::CLASSIC_AGENT_API_PATH.to_owned(),
            openai_compatible_api_path: defaults::OPENAI_COMPATIBLE_API_PATH.to_owned(),
        }
    }
}

impl ServiceConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Validates all configuration values.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if:
    /// - the production environment lacks the complete URL, consumer or public key
    /// - an API path prefix does not start with `/` or ends with `/`
    pub fn validate(&self) -> Result<()> {
        check_fields(&Fields {
            server_environment: self.server_environment,
            complete_url: self.complete_url.as_deref(),
            consumer: self.consumer.as_deref(),
            auth_public_key: self.auth_public_key.as_deref(),
            classic_agent_api_path: &self.classic_agent_api_path,
            openai_compatible_api_path: &self.openai_compatible_api_path,
        })
        .map_err(Error::config)
    }

    /// Creates the authentication gate matching the server environment.
    ///
    /// Development lets every request through. Production reads the public
    /// key and verifies bearer tokens whose subject is one of
    /// `acceptable_subjects`.
    pub async fn create_auth_gate<I, S>(&self, acceptable_subjects: I) -> Result<AuthGate>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.server_environment {
            ServerEnvironment::Development => {
                Ok(AuthGate::new(NoopAuthenticator, acceptable_subjects))
            }
            ServerEnvironment::Production => {
                let (Some(complete_url), Some(consumer), Some(public_key)) = (
                    self.complete_url.as_deref(),
                    self.consumer.as_deref(),
                    self.auth_public_key.as_deref(),
                ) else {
                    return Err(Error::config(
                        "production requires a complete URL, a consumer and a public key",
                    ));
                };

                let authenticator = JwtAuthenticator::from_pem_file(
                    public_key,
                    self.jwt_algorithm,
                    complete_url,
                    consumer,
                )
                .await?;

                Ok(AuthGate::new(authenticator, acceptable_subjects))
            }
        }
    }
}

struct Fields<'a> {
    server_environment: ServerEnvironment,
    complete_url: Option<&'a str>,
    consumer: Option<&'a str>,
    auth_public_key: Option<&'a Path>,
    classic_agent_api_path: &'a str,
    openai_compatible_api_path: &'a str,
}

fn check_fields(fields: &Fields<'_>) -> Result<(), String> {
    if fields.server_environment == ServerEnvironment::Production {
        if fields.complete_url.is_none_or(str::is_empty) {
            return Err("COMPLETE_URL is required in production".to_owned());
        }

        if fields.consumer.is_none_or(str::is_empty) {
            return Err("CONSUMER is required in production".to_owned());
        }

        if fields.auth_public_key.is_none() {
            return Err("AUTH_PUBLIC_KEY is required in production".to_owned());
        }
    }

    for (name, path) in [
        ("classic agent API path", fields.classic_agent_api_path),
        ("OpenAI-compatible API path", fields.openai_compatible_api_path),
    ] {
        if !path.starts_with('/') {
            return Err(format!("{name} must start with '/'"));
        }

        if path.len() > 1 && path.ends_with('/') {
            return Err(format!("{name} must not end with '/'"));
        }
    }

    Ok(())
}

impl ServiceConfigBuilder {
    /// Wrapper for builder validation that returns String errors.
    fn validate(builder: &ServiceConfigBuilder) -> Result<(), String> {
        let classic = builder.classic_agent_api_path.as_deref();
        let openai = builder.openai_compatible_api_path.as_deref();

        check_fields(&Fields {
            server_environment: builder.server_environment.unwrap_or_default(),
            complete_url: builder.complete_url.as_ref().and_then(Option::as_deref),
            consumer: builder.consumer.as_ref().and_then(Option::as_deref),
            auth_public_key: builder.auth_public_key.as_ref().and_then(Option::as_deref),
            classic_agent_api_path: classic.unwrap_or(defaults::CLASSIC_AGENT_API_PATH),
            openai_compatible_api_path: openai.unwrap_or(defaults::OPENAI_COMPATIBLE_API_PATH),
        })
    }
}
