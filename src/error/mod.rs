//! Error types for authgate.

pub mod unified;

pub use unified::{ApiErrorBody, ErrorCategory, ErrorDetail, FieldError};

use thiserror::Error;

use crate::auth::RefreshError;
use crate::transport::TransportError;

/// Primary error type for typed gateway calls, session operations and config loading.
///
/// [`crate::gateway::Gateway::execute`] itself never produces this type: it hands
/// back the raw response so callers see exactly what the server said.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        details: Option<ApiErrorBody>,
    },

    #[error("Authentication error (status {status}): {message}")]
    Authentication { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Token refresh failed: {0}")]
    Refresh(#[from] RefreshError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl GatewayError {
    /// Build the error for a non-success response.
    ///
    /// 401 and 403 become [`GatewayError::Authentication`]; every other status is
    /// an [`GatewayError::Api`] carrying the backend's `detail` payload when it parses.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let details = ApiErrorBody::parse(body);
        let message = details
            .as_ref()
            .and_then(ApiErrorBody::message)
            .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());
        match status {
            401 | 403 => Self::Authentication { status, message },
            _ => Self::Api {
                status,
                message,
                details,
            },
        }
    }

    /// HTTP status carried by the error, if it came from a server response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Authentication { status, .. } => Some(*status),
            Self::Refresh(RefreshError::Status(status)) => Some(*status),
            _ => None,
        }
    }

    /// Field-level validation errors, empty unless the server returned a 422-style list.
    pub fn validation_errors(&self) -> Vec<FieldError> {
        match self {
            Self::Api {
                details: Some(body),
                ..
            } => body.validation_errors(),
            _ => Vec::new(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication { .. } | Self::Refresh(_) => ErrorCategory::Authentication,
            Self::Transport(TransportError::Timeout(_)) => ErrorCategory::Timeout,
            Self::Transport(_) => ErrorCategory::Network,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                404 => ErrorCategory::NotFound,
                409 => ErrorCategory::Conflict,
                422 => ErrorCategory::Validation,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            _ => ErrorCategory::Unknown,
        }
    }

    /// Whether this error is potentially retryable by the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Timeout | ErrorCategory::Server
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_status_maps_to_authentication() {
        let err = GatewayError::from_status(401, br#"{"detail":"Could not validate credentials"}"#);
        match &err {
            GatewayError::Authentication { status, message } => {
                assert_eq!(*status, 401);
                assert_eq!(message, "Could not validate credentials");
            }
            other => panic!("expected Authentication, got {other:?}"),
        }
        assert_eq!(err.category(), ErrorCategory::Authentication);
        assert!(!err.is_retryable());
    }

    #[test]
    fn validation_body_is_kept_on_api_error() {
        let body = br#"{"detail":[{"loc":["body","quantity"],"msg":"must be positive","type":"value_error"}]}"#;
        let err = GatewayError::from_status(422, body);
        assert_eq!(err.category(), ErrorCategory::Validation);
        let fields = err.validation_errors();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field, "quantity");
        assert_eq!(fields[0].message, "must be positive");
    }

    #[test]
    fn non_json_body_falls_back_to_raw_text() {
        let err = GatewayError::from_status(502, b"Bad Gateway\n");
        assert_eq!(err.to_string(), "API error (status 502): Bad Gateway");
        assert!(err.is_retryable());
        assert_eq!(err.status(), Some(502));
    }
}
