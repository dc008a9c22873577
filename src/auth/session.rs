//! Login, logout and session checks against the `/auth` namespace.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::token::Credential;
use crate::error::{GatewayError, Result};
use crate::gateway::{decode_json, Gateway};
use crate::transport::ApiRequest;

/// Token payload returned by `/auth/login` and `/auth/refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Answer of `GET /auth/checkauth`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthStatus {
    pub status: String,
    #[serde(default)]
    pub user: serde_json::Value,
}

impl AuthStatus {
    pub fn is_authenticated(&self) -> bool {
        self.status == "authenticated"
    }
}

/// Session operations for one front end.
///
/// All I/O decisions (prompting, redirecting) belong to the caller; this only
/// talks to the server and keeps the credential store in step.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use authgate::auth::{MemoryCredentialStore, SessionClient};
/// use authgate::config::GatewayConfig;
/// use authgate::gateway::Gateway;
/// use authgate::transport::HttpTransport;
///
/// # async fn example() -> authgate::error::Result<()> {
/// let config = GatewayConfig::admin("http://localhost:8000");
/// let transport = Arc::new(HttpTransport::new(&config.base_url)?);
/// let gateway = Gateway::new(config, transport, Arc::new(MemoryCredentialStore::new()));
/// let session = SessionClient::new(gateway);
/// session.login("admin", "secret").await?;
/// assert!(session.check_auth().await?.is_authenticated());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SessionClient {
    gateway: Gateway,
}

impl SessionClient {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Password login; stores the returned access token.
    ///
    /// The server also sets the refresh cookie on this response. Login never
    /// goes through the refresh cycle: a 401 here means bad credentials.
    pub async fn login(&self, username: &str, password: &str) -> Result<Credential> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(GatewayError::InvalidArgument(
                "username and password are required".to_string(),
            ));
        }
        let request = ApiRequest::post("/auth/login")
            .with_form(&[("username", username), ("password", password)]);
        let resp = self.gateway.transport().send(&request).await?;
        let token: TokenResponse = decode_json(&resp)?;

        let credential = Credential::new(token.access_token).with_token_type(token.token_type);
        self.gateway.store().set(credential.clone());
        info!(username, "logged in");
        Ok(credential)
    }

    /// End this session on the server. The local credential is cleared even if the call fails.
    pub async fn logout(&self) -> Result<()> {
        self.end_session("/auth/logout").await
    }

    /// Revoke every refresh token of the user. The local credential is cleared regardless.
    pub async fn logout_all(&self) -> Result<()> {
        self.end_session("/auth/logoutall").await
    }

    pub async fn check_auth(&self) -> Result<AuthStatus> {
        self.gateway.get_json("/auth/checkauth").await
    }

    /// Explicit refresh, e.g. on app start when only the cookie survives.
    pub async fn refresh(&self) -> Result<Credential> {
        Ok(self.gateway.renew().await?)
    }

    pub fn is_logged_in(&self) -> bool {
        self.gateway.store().get().is_some()
    }

    async fn end_session(&self, path: &str) -> Result<()> {
        let result = self.gateway.send_empty(ApiRequest::post(path)).await;
        self.gateway.store().clear();
        match &result {
            Ok(()) => info!(path, "logged out"),
            Err(e) => warn!(path, error = %e, "logout request failed; local session cleared anyway"),
        }
        result
    }
}
