//! Core error to HTTP error conversion implementation.

use super::http_error::{Error as HttpError, ErrorKind};

/// Tracing target for core error conversions.
const TRACING_TARGET: &str = "aiser_server::handler::core";

impl From<aiser_core::Error> for HttpError<'static> {
    fn from(error: aiser_core::Error) -> Self {
        use aiser_core::ErrorKind as CoreErrorKind;

        match error.kind() {
            CoreErrorKind::NotFound => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Registry lookup missed"
                );

                ErrorKind::NotFound
                    .with_message(error.message().to_owned())
                    .with_resource(resource_of(&error))
            }
            CoreErrorKind::Agent | CoreErrorKind::KnowledgeBase => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    error_kind = %error.kind(),
                    "Collaborator failed"
                );

                ErrorKind::InternalServerError.with_context(error.to_string())
            }
            CoreErrorKind::DuplicateId | CoreErrorKind::Internal => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    error_kind = %error.kind(),
                    "Internal core error"
                );

                ErrorKind::InternalServerError.with_context(error.to_string())
            }
        }
    }
}

/// Returns the resource name of the entity a core error refers to, e.g. `knowledge_base`.
fn resource_of(error: &aiser_core::Error) -> String {
    error
        .entity()
        .map(|entity| entity.replace(' ', "_"))
        .unwrap_or_else(|| "resource".to_owned())
}
