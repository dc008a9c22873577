//! Authenticated request gateway.
//!
//! Every API call goes through [`Gateway::execute`], which attaches the
//! current bearer token and, on an authorization failure, performs one
//! cookie-backed refresh followed by one replay of the original request.

mod refresh;


use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use strum::Display;
use tracing::{debug, warn};

use crate::auth::{Credential, CredentialStore, RefreshError};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::transport::{ApiRequest, ApiResponse, Transport, TransportError};

/// Progress of a single `execute` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
enum Phase {
    Initial,
    Attempted,
    RefreshPending,
    Done,
}

/// Wraps a [`Transport`] with bearer attachment and one-shot session renewal.
///
/// Cloning is cheap; clones share the transport, the store and the refresh lock.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use authgate::auth::MemoryCredentialStore;
/// use authgate::config::GatewayConfig;
/// use authgate::gateway::Gateway;
/// use authgate::transport::{ApiRequest, HttpTransport};
///
/// # async fn example() -> authgate::error::Result<()> {
/// let config = GatewayConfig::storefront("http://localhost:8000");
/// let transport = Arc::new(HttpTransport::new(&config.base_url)?);
/// let gateway = Gateway::new(config, transport, Arc::new(MemoryCredentialStore::new()));
/// let resp = gateway.execute(ApiRequest::get("/orders/")).await?;
/// println!("{}", resp.status);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Gateway {
    config: Arc<GatewayConfig>,
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    refresh_lock: Arc<tokio::sync::Mutex<()>>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("config", &self.config)
            .field("session", &self.store.state())
            .finish()
    }
}

impl Gateway {
    pub fn new(
        config: GatewayConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            store,
            refresh_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Send `request`, renewing the session once if the server rejects the token.
    ///
    /// Returns the first response unchanged unless its status is a configured
    /// authorization failure. In that case the refresh endpoint is called; on
    /// success the request is replayed with the new token and that result is
    /// returned, on failure the store is cleared and the first response is
    /// returned. Transport errors are never retried.
    pub async fn execute(&self, request: ApiRequest) -> std::result::Result<ApiResponse, TransportError> {
        let mut phase = Phase::Initial;

        if self.config.is_bypassed(&request.path) {
            debug!(path = %request.path, "bypassing refresh handling");
            let (outgoing, _) = self.authorize(&request);
            return self.transport.send(&outgoing).await;
        }

        let mut refresh_spent = false;
        if self.config.preemptive_refresh {
            if let Some(current) = self.store.get() {
                if current.is_expired_at(chrono::Utc::now(), self.config.expiry_leeway()) {
                    debug!(path = %request.path, "stored token expired; refreshing before send");
                    refresh_spent = true;
                    // A failure clears the store and the request goes out without a token.
                    let _ = self.renew_after(Some(&current.access_token)).await;
                }
            }
        }

        let (outgoing, sent_with) = self.authorize(&request);
        phase = self.advance(&request, phase, Phase::Attempted);
        let first = self.transport.send(&outgoing).await;

        let status = match &first {
            Ok(resp) if self.config.is_auth_failure(resp.status) => resp.status,
            _ => {
                self.advance(&request, phase, Phase::Done);
                return first;
            }
        };
        if refresh_spent {
            debug!(path = %request.path, status, "authorization failure after preemptive refresh");
            self.advance(&request, phase, Phase::Done);
            return first;
        }

        phase = self.advance(&request, phase, Phase::RefreshPending);
        match self.renew_after(sent_with.as_deref()).await {
            Ok(_) => {
                let (retry, _) = self.authorize(&request);
                phase = self.advance(&request, phase, Phase::Attempted);
                let second = self.transport.send(&retry).await;
                self.advance(&request, phase, Phase::Done);
                second
            }
            Err(_) => {
                self.advance(&request, phase, Phase::Done);
                first
            }
        }
    }

    /// Refresh the session and update the store: set on success, clear on failure.
    pub async fn renew(&self) -> std::result::Result<Credential, RefreshError> {
        let current = self.store.get().map(|c| c.access_token);
        self.renew_after(current.as_deref()).await
    }

    /// Execute and decode a JSON success body; non-2xx becomes a [`GatewayError`].
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let resp = self.execute(request).await?;
        decode_json(&resp)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(ApiRequest::get(path)).await
    }

    /// Serialize `body` as JSON, execute, and decode the JSON reply.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send_json(ApiRequest::post(path).with_json(body)?).await
    }

    /// POST a url-encoded form and decode the JSON reply.
    pub async fn send_form<T: DeserializeOwned>(&self, path: &str, pairs: &[(&str, &str)]) -> Result<T> {
        self.send_json(ApiRequest::post(path).with_form(pairs)).await
    }

    /// DELETE `path` and decode the JSON reply.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(ApiRequest::delete(path)).await
    }

    /// Execute and only check the status; the body is discarded.
    pub async fn send_empty(&self, request: ApiRequest) -> Result<()> {
        let resp = self.execute(request).await?;
        if resp.is_success() {
            Ok(())
        } else {
            Err(GatewayError::from_status(resp.status, &resp.body))
        }
    }

    /// Copy of `request` carrying the current bearer token, if any.
    fn authorize(&self, request: &ApiRequest) -> (ApiRequest, Option<String>) {
        let mut outgoing = request.clone();
        let credential = self.store.get();
        outgoing.set_header("Authorization", credential.as_ref().map(Credential::bearer));
        (outgoing, credential.map(|c| c.access_token))
    }

    fn advance(&self, request: &ApiRequest, from: Phase, to: Phase) -> Phase {
        debug!(method = %request.method, path = %request.path, %from, %to, "gateway phase");
        to
    }
}

/// Decode a success body as JSON or turn a failure status into an error.
pub fn decode_json<T: DeserializeOwned>(resp: &ApiResponse) -> Result<T> {
    if !resp.is_success() {
        return Err(GatewayError::from_status(resp.status, &resp.body));
    }
    resp.parse_json().map_err(|e| {
        warn!(status = resp.status, error = %e, "response body did not match expected shape");
        GatewayError::Serialization(e)
    })
}
