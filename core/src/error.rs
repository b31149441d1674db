//! Error types for the posts client.
//!
//! # Design
//! Callers branch on three outcomes: the post does not exist (`NotFound`),
//! the server rejected submitted fields (`Validation`), or anything else
//! went wrong (`Http` for unexpected statuses, `Transport` for failures
//! surfaced by the transport). The remaining variants cover local
//! (de)serialization problems.

use std::fmt;

use thiserror::Error;

/// Errors returned by `PostApi` parse methods and `PostClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404 for the requested resource.
    #[error("resource not found: {resource}")]
    NotFound {
        /// Requested path, e.g. `/wp/v2/posts/888888`.
        resource: String,
        /// Server-provided message, if the body carried one.
        message: Option<String>,
    },

    /// The server rejected one or more submitted fields.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Any other non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The transport could not complete the exchange.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }

    /// Field-level detail when this is a validation failure.
    pub fn validation(&self) -> Option<&ValidationErrors> {
        match self {
            ApiError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Failure reported by a `Transport` before any HTTP status was received.
#[derive(Debug, Clone, Error)]
#[error("transport error: {message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One rejected field and the server's reason for rejecting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

/// Structured detail of a validation failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    /// Machine-readable error code, e.g. `rest_invalid_param`.
    pub code: Option<String>,
    pub message: String,
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.field.as_str())
    }
}

// Field names must always show up in the rendered message.
impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            f.write_str("invalid request")?;
        } else {
            f.write_str(&self.message)?;
        }
        for (i, field) in self.fields.iter().enumerate() {
            let sep = if i == 0 { " (" } else { "; " };
            write!(f, "{sep}{}: {}", field.field, field.reason)?;
        }
        if !self.fields.is_empty() {
            f.write_str(")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_lists_every_field() {
        let err = ApiError::Validation(ValidationErrors {
            code: Some("rest_invalid_param".to_string()),
            message: "Invalid parameter(s): status, per_page".to_string(),
            fields: vec![
                FieldError {
                    field: "status".to_string(),
                    reason: "status is not one of publish, draft.".to_string(),
                },
                FieldError {
                    field: "per_page".to_string(),
                    reason: "out of range".to_string(),
                },
            ],
        });
        let text = err.to_string();
        assert!(text.starts_with("validation failed: Invalid parameter(s)"));
        assert!(text.contains("status: status is not one of"));
        assert!(text.contains("; per_page: out of range)"));
    }

    #[test]
    fn validation_without_message_still_names_fields() {
        let errors = ValidationErrors {
            code: None,
            message: String::new(),
            fields: vec![FieldError {
                field: "title".to_string(),
                reason: "required".to_string(),
            }],
        };
        assert_eq!(errors.to_string(), "invalid request (title: required)");
        assert!(errors.has_field("title"));
        assert!(!errors.has_field("status"));
    }

    #[test]
    fn not_found_mentions_resource() {
        let err = ApiError::NotFound {
            resource: "/wp/v2/posts/888888".to_string(),
            message: None,
        };
        assert!(err.is_not_found());
        assert!(!err.is_validation());
        assert!(err.to_string().contains("888888"));
    }

    #[test]
    fn transport_error_converts_into_api_error() {
        let err: ApiError = TransportError::new("connection refused").into();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(err.to_string(), "transport error: connection refused");
    }
}
