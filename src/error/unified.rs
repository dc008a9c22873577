//! Unified error classification and backend error bodies.

use serde::{Deserialize, Serialize};

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    Validation,
    NotFound,
    Conflict,
    Network,
    Timeout,
    Server,
    Api,
    Configuration,
    Serialization,
    Unknown,
}

/// Error payload returned by the store API.
///
/// The backend answers either with a plain message or, for request
/// validation failures, with a list of per-field errors:
///
/// ```
/// use authgate::error::ApiErrorBody;
///
/// let body = ApiErrorBody::parse(br#"{"detail":"Product not found"}"#).unwrap();
/// assert_eq!(body.message().as_deref(), Some("Product not found"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub detail: ErrorDetail,
}

/// The `detail` member of an [`ApiErrorBody`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Validation(Vec<ValidationItem>),
}

/// One entry of a validation `detail` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationItem {
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    pub msg: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// A validation error flattened for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl ApiErrorBody {
    /// Parse a response body, returning `None` for anything without a `detail` member.
    pub fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }

    /// Human-readable message: the plain detail, or the validation messages joined.
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            ErrorDetail::Message(msg) => Some(msg.clone()),
            ErrorDetail::Validation(items) if items.is_empty() => None,
            ErrorDetail::Validation(_) => Some(
                self.validation_errors()
                    .iter()
                    .map(|field| format!("{}: {}", field.field, field.message))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
        }
    }

    /// Validation errors keyed by the last element of each `loc` path.
    pub fn validation_errors(&self) -> Vec<FieldError> {
        let ErrorDetail::Validation(items) = &self.detail else {
            return Vec::new();
        };
        items
            .iter()
            .map(|item| FieldError {
                field: item
                    .loc
                    .last()
                    .map(|last| match last {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .unwrap_or_else(|| "unknown".to_string()),
                message: item.msg.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn validation_list_uses_last_loc_element() {
        let body = ApiErrorBody::parse(
            br#"{"detail":[
                {"loc":["body","email"],"msg":"value is not a valid email address","type":"value_error"},
                {"loc":["body","items",2],"msg":"field required","type":"missing"},
                {"loc":[],"msg":"bad","type":"x"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            body.validation_errors(),
            vec![
                FieldError {
                    field: "email".into(),
                    message: "value is not a valid email address".into()
                },
                FieldError {
                    field: "2".into(),
                    message: "field required".into()
                },
                FieldError {
                    field: "unknown".into(),
                    message: "bad".into()
                },
            ]
        );
        assert_eq!(
            body.message().as_deref(),
            Some("email: value is not a valid email address; 2: field required; unknown: bad")
        );
    }

    #[test]
    fn body_without_detail_does_not_parse() {
        assert!(ApiErrorBody::parse(br#"{"error":"nope"}"#).is_none());
        assert!(ApiErrorBody::parse(b"<html>").is_none());
    }
}
