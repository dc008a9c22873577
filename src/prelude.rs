//! Convenience re-exports for common use.

pub use crate::auth::{Credential, CredentialStore, MemoryCredentialStore, SessionClient};
pub use crate::cart::{CartApi, CartQuery};
pub use crate::config::{GatewayConfig, Profile};
pub use crate::error::{GatewayError, Result};
pub use crate::gateway::Gateway;
pub use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
