//! Credentials, the credential store, and session operations.

pub mod error;
pub mod session;
pub mod store;
pub mod token;

pub use error::RefreshError;
pub use session::{AuthStatus, SessionClient, TokenResponse};
pub use store::{CredentialStore, MemoryCredentialStore, SessionState};
pub use token::Credential;
