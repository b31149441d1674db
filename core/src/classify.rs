//! Classification of non-success responses.
//!
//! # Design
//! `classify` is a pure function of `(status, body)`. The status code alone
//! decides the kind of failure; the body is only read afterwards to pull out
//! detail (the validation field list, or a message for diagnostics). A 404
//! whose body looks like a validation error is still a 404.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, FieldError, ValidationErrors};
use crate::http::HttpResponse;

/// Outcome of classifying a non-success response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    NotFound { message: Option<String> },
    Validation(ValidationErrors),
    /// Not further classified; surfaced as `ApiError::Http`.
    Other,
}

/// Error envelope used by the REST API:
/// `{"code": .., "message": .., "data": {"status": .., "params": ..}}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<ErrorData>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorData {
    #[serde(default)]
    params: Option<Value>,
}

/// Classify a non-success response by status code.
pub fn classify(status: u16, body: &str) -> Classification {
    match status {
        404 => Classification::NotFound {
            message: parse_error_body(body).and_then(|b| b.message),
        },
        400 | 422 => Classification::Validation(validation_errors(body)),
        _ => Classification::Other,
    }
}

/// Turn a non-success response for `resource` into the matching `ApiError`.
pub fn error_for(resource: &str, response: &HttpResponse) -> ApiError {
    let error = match classify(response.status, &response.body) {
        Classification::NotFound { message } => ApiError::NotFound {
            resource: resource.to_string(),
            message,
        },
        Classification::Validation(errors) => ApiError::Validation(errors),
        Classification::Other => ApiError::Http {
            status: response.status,
            body: response.body.clone(),
        },
    };
    tracing::warn!(status = response.status, resource, error = %error, "request failed");
    error
}

fn parse_error_body(body: &str) -> Option<ErrorBody> {
    serde_json::from_str(body).ok()
}

fn validation_errors(body: &str) -> ValidationErrors {
    let Some(parsed) = parse_error_body(body) else {
        return ValidationErrors {
            code: None,
            message: body.trim().to_string(),
            fields: Vec::new(),
        };
    };

    let message = parsed.message.unwrap_or_default();
    let fields = match parsed.data.and_then(|d| d.params) {
        Some(Value::Object(params)) => params
            .into_iter()
            .map(|(field, reason)| FieldError {
                field,
                reason: match reason {
                    Value::String(s) => s,
                    other => other.to_string(),
                },
            })
            .collect(),
        // Missing-parameter errors list bare field names.
        Some(Value::Array(names)) => names
            .into_iter()
            .filter_map(|name| match name {
                Value::String(field) => Some(FieldError {
                    field,
                    reason: message.clone(),
                }),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    ValidationErrors {
        code: parsed.code,
        message,
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVALID_STATUS: &str = r#"{
        "code": "rest_invalid_param",
        "message": "Invalid parameter(s): status",
        "data": {
            "status": 400,
            "params": {"status": "status is not one of publish, future, draft, pending, private."}
        }
    }"#;

    #[test]
    fn status_400_extracts_field_params() {
        let Classification::Validation(errors) = classify(400, INVALID_STATUS) else {
            panic!("expected validation");
        };
        assert_eq!(errors.code.as_deref(), Some("rest_invalid_param"));
        assert!(errors.has_field("status"));
        assert!(errors.fields[0].reason.contains("not one of"));
        assert!(errors.to_string().contains("status"));
    }

    #[test]
    fn missing_params_array_uses_message_as_reason() {
        let body = r#"{"code":"rest_missing_callback_param","message":"Missing parameter(s): title","data":{"status":400,"params":["title"]}}"#;
        let Classification::Validation(errors) = classify(400, body) else {
            panic!("expected validation");
        };
        assert_eq!(errors.field_names().collect::<Vec<_>>(), vec!["title"]);
        assert_eq!(errors.fields[0].reason, "Missing parameter(s): title");
    }

    #[test]
    fn validation_without_params_keeps_message() {
        let body = r#"{"code":"rest_invalid_json","message":"Invalid JSON body passed.","data":{"status":400}}"#;
        let Classification::Validation(errors) = classify(400, body) else {
            panic!("expected validation");
        };
        assert!(errors.fields.is_empty());
        assert_eq!(errors.message, "Invalid JSON body passed.");
    }

    #[test]
    fn non_json_validation_body_becomes_message() {
        let Classification::Validation(errors) = classify(422, "  missing field `title`\n") else {
            panic!("expected validation");
        };
        assert_eq!(errors.code, None);
        assert_eq!(errors.message, "missing field `title`");
    }

    #[test]
    fn status_404_wins_over_validation_shaped_body() {
        assert_eq!(
            classify(404, INVALID_STATUS),
            Classification::NotFound {
                message: Some("Invalid parameter(s): status".to_string())
            }
        );
    }

    #[test]
    fn status_404_tolerates_empty_body() {
        assert_eq!(classify(404, ""), Classification::NotFound { message: None });
    }

    #[test]
    fn other_statuses_are_not_classified() {
        assert_eq!(classify(500, INVALID_STATUS), Classification::Other);
        assert_eq!(classify(410, "{}"), Classification::Other);
        assert_eq!(classify(401, ""), Classification::Other);
    }

    #[test]
    fn error_for_carries_resource_and_raw_body() {
        let err = error_for("/wp/v2/posts/7", &HttpResponse::new(404, ""));
        assert!(matches!(err, ApiError::NotFound { ref resource, .. } if resource == "/wp/v2/posts/7"));

        let err = error_for("/wp/v2/posts", &HttpResponse::new(503, "down"));
        assert!(matches!(err, ApiError::Http { status: 503, ref body } if body == "down"));
    }
}
