//! Minimum server version requested by the client.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use semver::Version;

use crate::handler::{Error, ErrorKind, Result};
use crate::utility::tracing_targets::VERSION_GATE as TRACING_TARGET;

/// Name of the header carrying the client's minimum server version.
pub const MIN_VERSION_HEADER: &str = "min-aiser-version";

/// Minimum server version named by the `Min-Aiser-Version` header.
///
/// `None` when the header is absent. Missing minor and patch components
/// are read as zero, so `1.2` means `1.2.0`.
#[must_use]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinVersion(pub Option<Version>);

impl MinVersion {
    /// Parses a version string, padding missing components with zeros.
    pub fn parse(value: &str) -> Result<Version, semver::Error> {
        let value = value.trim();
        let value = value.strip_prefix('v').unwrap_or(value);

        let (core, suffix) = match value.find(['-', '+']) {
            Some(index) => value.split_at(index),
            None => (value, ""),
        };

        let components = core.split('.').count();
        let padded = match components {
            1 => format!("{core}.0.0{suffix}"),
            2 => format!("{core}.0{suffix}"),
            _ => value.to_owned(),
        };

        Version::parse(&padded)
    }

    /// Returns `true` if `current` satisfies this minimum.
    pub fn is_met_by(&self, current: &Version) -> bool {
        self.0.as_ref().is_none_or(|min| current >= min)
    }
}

impl<S> FromRequestParts<S> for MinVersion
where
    S: Sync + Send,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(MIN_VERSION_HEADER) else {
            return Ok(Self(None));
        };

        let invalid = || {
            ErrorKind::BadRequest
                .with_message("Invalid Min-Aiser-Version header")
                .with_resource("version")
                .with_suggestion("Use a semantic version such as 1.2.0")
        };

        let value = header.to_str().map_err(|_| invalid())?;
        let version = Self::parse(value).map_err(|error| {
            tracing::warn!(
                target: TRACING_TARGET,
                header = value,
                error = %error,
                "Unparseable minimum version header"
            );
            invalid().with_context(format!("'{value}' is not a semantic version: {error}"))
        })?;

        Ok(Self(Some(version)))
    }
}

impl aide::OperationInput for MinVersion {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pads_missing_components() -> anyhow::Result<()> {
        assert_eq!(MinVersion::parse("1")?, Version::new(1, 0, 0));
        assert_eq!(MinVersion::parse("1.2")?, Version::new(1, 2, 0));
        assert_eq!(MinVersion::parse("1.2.3")?, Version::new(1, 2, 3));
        assert_eq!(MinVersion::parse(" v0.4 ")?, Version::new(0, 4, 0));
        assert_eq!(MinVersion::parse("2.0-rc.1")?, Version::parse("2.0.0-rc.1")?);
        Ok(())
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(MinVersion::parse("latest").is_err());
        assert!(MinVersion::parse("1.x").is_err());
        assert!(MinVersion::parse("").is_err());
    }

    #[test]
    fn comparison() -> anyhow::Result<()> {
        let current = Version::new(0, 3, 1);

        assert!(MinVersion(None).is_met_by(&current));
        assert!(MinVersion(Some(MinVersion::parse("0.3")?)).is_met_by(&current));
        assert!(MinVersion(Some(MinVersion::parse("0.3.1")?)).is_met_by(&current));
        assert!(!MinVersion(Some(MinVersion::parse("0.4")?)).is_met_by(&current));
        assert!(!MinVersion(Some(MinVersion::parse("1")?)).is_met_by(&current));
        Ok(())
    }
}
