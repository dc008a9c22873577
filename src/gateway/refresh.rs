//! Refresh endpoint call and store update.

use tracing::{debug, info, warn};

use super::Gateway;
use crate::auth::{Credential, RefreshError};
use crate::transport::ApiRequest;

impl Gateway {
    /// Exchange the ambient session cookie for a new access token.
    ///
    /// Sends `POST {refresh_path}` with no body and no bearer header. Does not
    /// touch the credential store.
    pub async fn refresh_credential(&self) -> Result<Credential, RefreshError> {
        let request = ApiRequest::post(self.config.refresh_path.clone());
        let resp = self.transport.send(&request).await?;
        if !resp.is_success() {
            return Err(RefreshError::Status(resp.status));
        }
        let payload: serde_json::Value =
            serde_json::from_slice(&resp.body).map_err(|e| RefreshError::InvalidBody(e.to_string()))?;
        let field = self.config.token_field.as_str();
        let token = payload
            .get(field)
            .and_then(|v| v.as_str())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RefreshError::MissingToken(field.to_string()))?;

        let mut credential = Credential::new(token);
        if let Some(token_type) = payload.get("token_type").and_then(|v| v.as_str()) {
            credential = credential.with_token_type(token_type);
        }
        Ok(credential)
    }

    /// Refresh on behalf of a request that was sent with `sent_with`.
    ///
    /// With coalescing on, refreshes run one at a time. A caller whose token
    /// was already replaced by another caller's refresh reuses that result; one
    /// whose session was ended by another caller's failed refresh fails too.
    pub(super) async fn renew_after(
        &self,
        sent_with: Option<&str>,
    ) -> Result<Credential, RefreshError> {
        if !self.config.coalesce_refresh {
            return self.refresh_and_store().await;
        }

        let _guard = self.refresh_lock.lock().await;
        let state = self.store.state();
        match (state.credential, sent_with) {
            (Some(current), _) if Some(current.access_token.as_str()) != sent_with => {
                debug!("token already replaced by a concurrent refresh");
                return Ok(current);
            }
            (None, Some(_)) if state.logged_out => {
                debug!("session already ended by a concurrent refresh");
                return Err(RefreshError::SessionEnded);
            }
            _ => {}
        }
        self.refresh_and_store().await
    }

    async fn refresh_and_store(&self) -> Result<Credential, RefreshError> {
        match self.refresh_credential().await {
            Ok(credential) => {
                info!(expires_at = ?credential.expires_at, "access token refreshed");
                self.store.set(credential.clone());
                Ok(credential)
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed; clearing session");
                self.store.clear();
                Err(err)
            }
        }
    }
}
