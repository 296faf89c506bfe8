use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use semver::Version;

use crate::extract::MinVersion;
use crate::handler::{ErrorKind, Result};
use crate::utility::SERVER_VERSION;
use crate::utility::tracing_targets::VERSION_GATE as TRACING_TARGET;

/// Rejects requests whose `Min-Aiser-Version` exceeds the running version.
///
/// Requests without the header pass through. An unmet minimum is answered
/// with 426 Upgrade Required before any handler runs.
pub async fn require_min_version(
    min_version: MinVersion,
    request: Request,
    next: Next,
) -> Result<Response> {
    let current = Version::parse(SERVER_VERSION).map_err(|error| {
        ErrorKind::InternalServerError
            .with_message("Server version is not a semantic version")
            .with_context(error.to_string())
    })?;

    if let MinVersion(Some(min)) = &min_version
        && !min_version.is_met_by(&current)
    {
        let message = format!("Minimum version required: {min}. Current version: {current}");
        tracing::error!(
            target: TRACING_TARGET,
            min_version = %min,
            current_version = %current,
            "Client requires a newer server"
        );

        return Err(ErrorKind::UpgradeRequired
            .with_message(message)
            .with_resource("version"));
    }

    Ok(next.run(request).await)
}
