//! reqwest-backed transport with a cookie jar for the refresh session cookie.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use super::{ApiRequest, ApiResponse, Method, Transport, TransportError};

/// HTTP transport rooted at a base URL such as `http://localhost:8000/api`.
///
/// The client keeps cookies across calls, so the http-only refresh cookie set
/// by `/auth/login` is sent back on `/auth/refresh` without the caller seeing it.
///
/// # Example
/// ```no_run
/// use authgate::transport::HttpTransport;
///
/// let transport = HttpTransport::new("http://localhost:8000/api")?;
/// # Ok::<(), authgate::transport::TransportError>(())
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let base_url =
            Url::parse(base_url).map_err(|e| TransportError::InvalidUrl(format!("{base_url}: {e}")))?;
        let mut builder = reqwest::Client::builder()
            .cookie_store(true)
            .pool_max_idle_per_host(10);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join `path` onto the base URL, keeping the base path prefix.
    fn url_for(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        if !request.path.starts_with('/') {
            return Err(TransportError::InvalidUrl(format!(
                "request path must start with '/': {}",
                request.path
            )));
        }
        let joined = format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            request.path
        );
        let mut url =
            Url::parse(&joined).map_err(|e| TransportError::InvalidUrl(format!("{joined}: {e}")))?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in &request.query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    fn map_error(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(self.timeout.unwrap_or_default())
        } else {
            TransportError::Network(error.to_string())
        }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(request)?;
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, body.content_type())
                .body(body.as_bytes().to_vec());
        }

        let resp = builder.send().await.map_err(|e| self.map_error(e))?;
        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = resp.bytes().await.map_err(|e| self.map_error(e))?.to_vec();

        tracing::debug!(method = %request.method, path = %request.path, status, "transport round-trip");
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
