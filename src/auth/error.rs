use thiserror::Error;

use crate::transport::TransportError;

/// Why a refresh call did not yield a new access token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefreshError {
    #[error("refresh request failed: {0}")]
    Transport(#[from] TransportError),
    #[error("refresh endpoint returned status {0}")]
    Status(u16),
    #[error("refresh response has no string field `{0}`")]
    MissingToken(String),
    #[error("refresh response is not valid JSON: {0}")]
    InvalidBody(String),
    #[error("session was ended by a concurrent refresh")]
    SessionEnded,
}
