use std::borrow::Cow;
use std::collections::HashMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

/// Validation error details for field-specific errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationErrorDetail {
    /// Field name that failed validation
    pub field: String,
    /// Error code for the validation failure
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional parameters related to the validation error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<HashMap<String, serde_json::Value>>,
}

/// HTTP error response representation.
///
/// Only the name, message, resource, suggestion and validation details are
/// serialized. The context and status stay on the server side.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse<'a> {
    /// The error name/type identifier
    pub name: Cow<'a, str>,
    /// User-friendly error message safe for client display
    pub message: Cow<'a, str>,
    /// The resource that the error relates to (optional, set by handler)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Cow<'a, str>>,
    /// Helpful suggestion for resolving the error (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Cow<'a, str>>,
    /// Validation error details for field-specific errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<Vec<ValidationErrorDetail>>,

    /// Internal context for debugging (optional, not exposed to client)
    #[serde(skip)]
    pub context: Option<Cow<'a, str>>,
    /// HTTP status code (not serialized in JSON)
    #[serde(skip)]
    pub status: StatusCode,
}

impl<'a> ErrorResponse<'a> {
    // 4xx Client Errors
    pub const BAD_REQUEST: Self = Self::new(
        "bad_request",
        "Invalid request data.",
        StatusCode::BAD_REQUEST,
    );
    pub const FORBIDDEN: Self = Self::new("forbidden", "Access denied.", StatusCode::FORBIDDEN);
    // 5xx Server Errors
    pub const INTERNAL_SERVER_ERROR: Self = Self::new(
        "internal_server_error",
        "Internal server error.",
        StatusCode::INTERNAL_SERVER_ERROR,
    );
    // Authentication Errors
    pub const MALFORMED_AUTH_TOKEN: Self = Self::new(
        "malformed_auth_token",
        "Malformed auth token.",
        StatusCode::UNAUTHORIZED,
    );
    pub const MISSING_AUTH_TOKEN: Self = Self::new(
        "missing_auth_token",
        "Missing auth token.",
        StatusCode::UNAUTHORIZED,
    );
    pub const MISSING_PATH_PARAM: Self = Self::new(
        "missing_path_param",
        "Missing path parameter.",
        StatusCode::BAD_REQUEST,
    );
    pub const NOT_FOUND: Self =
        Self::new("not_found", "Resource not found.", StatusCode::NOT_FOUND);
    pub const UNAUTHORIZED: Self = Self::new(
        "unauthorized",
        "Invalid credentials.",
        StatusCode::UNAUTHORIZED,
    );
    pub const UPGRADE_REQUIRED: Self = Self::new(
        "upgrade_required",
        "Upgrade required.",
        StatusCode::UPGRADE_REQUIRED,
    );
    pub const VALIDATION_ERROR: Self = Self::new(
        "validation_error",
        "Validation failed.",
        StatusCode::UNPROCESSABLE_ENTITY,
    );

    /// Creates a new error response.
    #[inline]
    pub const fn new(name: &'a str, message: &'a str, status: StatusCode) -> Self {
        Self {
            name: Cow::Borrowed(name),
            message: Cow::Borrowed(message),
            resource: None,
            context: None,
            suggestion: None,
            validation: None,
            status,
        }
    }

    /// Sets the resource, merging with an existing one.
    pub fn with_resource(mut self, resource: impl Into<Cow<'a, str>>) -> Self {
        let new_resource = resource.into();
        self.resource = Some(match self.resource {
            Some(existing) => Cow::Owned(format!("{}/{}", existing, new_resource)),
            None => new_resource,
        });
        self
    }

    /// Appends the given message to the existing message.
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        let new_message = message.into();
        let base = self.message.trim_end_matches('.');
        self.message = Cow::Owned(format!("{}. {}", base, new_message));
        self
    }

    /// Attaches context, merging with existing context.
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        let new_context = context.into();
        self.context = Some(match self.context {
            Some(existing) => Cow::Owned(format!("{}; {}", existing, new_context)),
            None => new_context,
        });
        self
    }

    /// Attaches a suggestion, merging with an existing one.
    pub fn with_suggestion(mut self, suggestion: impl Into<Cow<'a, str>>) -> Self {
        let new_suggestion = suggestion.into();
        self.suggestion = Some(match self.suggestion {
            Some(existing) => Cow::Owned(format!("{}; {}", existing, new_suggestion)),
            None => new_suggestion,
        });
        self
    }

    /// Adds validation errors to the error response.
    pub fn with_validation_errors(mut self, errors: Vec<ValidationErrorDetail>) -> Self {
        self.validation = Some(errors);
        self
    }
}

impl ValidationErrorDetail {
    /// Flattens validator errors into one detail per violated rule.
    ///
    /// Nested structs and list items are reported with dotted and indexed
    /// field paths, e.g. `messages[0].role`.
    pub fn collect(errors: &ValidationErrors) -> Vec<Self> {
        let mut details = Vec::new();
        collect_into(&mut details, String::new(), errors);
        details
    }
}

fn collect_into(details: &mut Vec<ValidationErrorDetail>, prefix: String, errors: &ValidationErrors) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let params: HashMap<_, _> = error
                        .params
                        .iter()
                        .filter(|(key, _)| key.as_ref() != "value")
                        .map(|(key, value)| (key.to_string(), value.clone()))
                        .collect();

                    details.push(ValidationErrorDetail {
                        message: format_validation_error(&path, error),
                        field: path.clone(),
                        code: error.code.to_string(),
                        params: (!params.is_empty()).then_some(params),
                    });
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                collect_into(details, path, nested);
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_into(details, format!("{path}[{index}]"), nested);
                }
            }
        }
    }
}

/// Formats a validation error with a user-friendly message.
fn format_validation_error(field: &str, error: &validator::ValidationError) -> String {
    if let Some(custom_message) = &error.message {
        return format!("Field '{}': {}", field, custom_message);
    }

    let bound = |key: &str| error.params.get(key).and_then(serde_json::Value::as_f64);

    match error.code.as_ref() {
        "required" => format!("Field '{}' is required", field),
        "length" => match (bound("min"), bound("max")) {
            (Some(min), Some(max)) => {
                format!("Field '{}' length must be between {} and {}", field, min, max)
            }
            (Some(min), None) => format!("Field '{}' length must be at least {}", field, min),
            (None, Some(max)) => format!("Field '{}' length must be at most {}", field, max),
            (None, None) => format!("Field '{}' has invalid length", field),
        },
        "range" => match (bound("min"), bound("max")) {
            (Some(min), Some(max)) => {
                format!("Field '{}' must be between {} and {}", field, min, max)
            }
            (Some(min), None) => format!("Field '{}' must be at least {}", field, min),
            (None, Some(max)) => format!("Field '{}' must be at most {}", field, max),
            (None, None) => format!("Field '{}' is out of valid range", field),
        },
        code => format!("Field '{}' failed validation: {}", field, code),
    }
}

impl Default for ErrorResponse<'_> {
    #[inline]
    fn default() -> Self {
        Self::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ErrorResponse<'_> {
    fn into_response(self) -> Response {
        tracing::warn!(
            status = %self.status,
            name = %self.name,
            message = %self.message,
            resource = ?self.resource,
            context = ?self.context,
            "HTTP error response"
        );
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[test]
    fn error_response_merging_resource() {
        let response = ErrorResponse::NOT_FOUND
            .with_resource("agent")
            .with_resource("chat");

        assert_eq!(response.resource.as_deref(), Some("agent/chat"));
    }

    #[test]
    fn error_response_merging_message() {
        let response = ErrorResponse::UPGRADE_REQUIRED
            .with_message("Minimum version required: 9.0.0. Current version: 0.1.0");

        assert_eq!(
            &response.message,
            "Upgrade required. Minimum version required: 9.0.0. Current version: 0.1.0"
        );
    }

    #[test]
    fn error_response_serialization() -> anyhow::Result<()> {
        let response = ErrorResponse::BAD_REQUEST
            .with_resource("request")
            .with_message("Test message")
            .with_context("Test context")
            .with_suggestion("Try fixing the data");

        let json = serde_json::to_string(&response)?;

        assert!(json.contains("name"));
        assert!(json.contains("message"));
        assert!(json.contains("resource"));
        assert!(json.contains("suggestion"));

        assert!(!json.contains("context"));
        assert!(!json.contains("status"));
        assert!(!json.contains("validation"));
        Ok(())
    }

    #[derive(Validate)]
    struct Inner {
        #[validate(length(min = 1))]
        text: String,
    }

    #[derive(Validate)]
    struct Outer {
        #[validate(range(min = 0.0, max = 2.0))]
        temperature: f64,
        #[validate(nested)]
        items: Vec<Inner>,
    }

    #[test]
    fn validation_errors_are_flattened() {
        let outer = Outer {
            temperature: 3.0,
            items: vec![
                Inner {
                    text: "ok".to_owned(),
                },
                Inner {
                    text: String::new(),
                },
            ],
        };

        let errors = outer.validate().err().expect("validation should fail");
        let response = ErrorResponse::VALIDATION_ERROR
            .with_validation_errors(ValidationErrorDetail::collect(&errors));
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

        let mut fields: Vec<_> = response
            .validation
            .unwrap_or_default()
            .into_iter()
            .map(|detail| (detail.field, detail.code))
            .collect();
        fields.sort();

        assert_eq!(
            fields,
            [
                ("items[1].text".to_owned(), "length".to_owned()),
                ("temperature".to_owned(), "range".to_owned()),
            ]
        );
    }
}
