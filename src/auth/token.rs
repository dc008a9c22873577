use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Bearer credential held for the lifetime of a session.
///
/// The expiry is decoded from the token's `exp` claim when the token is a JWT.
/// It is only a hint for preemptive refresh; the server decides validity.
///
/// # Example
/// ```
/// use authgate::auth::Credential;
///
/// let credential = Credential::new("opaque-token");
/// assert_eq!(credential.access_token, "opaque-token");
/// assert!(credential.expires_at.is_none());
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub issued_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>) -> Self {
        let access_token = access_token.into();
        let expires_at = decode_expiry(&access_token);
        Self {
            access_token,
            token_type: None,
            expires_at,
            issued_at: Utc::now(),
        }
    }

    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = Some(token_type.into());
        self
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// Whether the decoded expiry lies at or before `now + leeway`.
    ///
    /// Tokens without a readable expiry are never locally expired. A leeway
    /// that pushes `now` past the representable range counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>, leeway: Duration) -> bool {
        self.expires_at
            .map(|exp| now.checked_add_signed(leeway).map_or(true, |limit| exp <= limit))
            .unwrap_or(false)
    }
}

// Token values stay out of logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

/// Read the `exp` claim from a JWT payload without verifying the signature.
pub fn decode_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut parts = token.split('.');
    let (_header, payload, _sig) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?;
    let secs = exp.as_i64().or_else(|| exp.as_f64().map(|f| f as i64))?;
    DateTime::<Utc>::from_timestamp(secs, 0)
}

#[cfg(test)]
pub(crate) fn jwt_with_exp(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"user-1","exp":{exp}}}"#));
    format!("{header}.{payload}.signature")
}
