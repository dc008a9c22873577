//! Configuration system (layered: code > env > config file).

use std::path::Path;
use std::time::Duration;

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::GatewayError;

pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";
pub const DEFAULT_TOKEN_FIELD: &str = "access_token";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
/// Upper bound for `expiry_leeway_secs` (one day).
pub const MAX_EXPIRY_LEEWAY_SECS: u64 = 86_400;

/// Which front end a gateway is serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Profile {
    #[default]
    Storefront,
    Admin,
}

/// Gateway behavior shared by the storefront and admin clients.
///
/// # Example
/// ```
/// use authgate::config::GatewayConfig;
///
/// let config = GatewayConfig::builder()
///     .base_url("http://localhost:8000/api")
///     .auth_failure_statuses(vec![401, 403])
///     .coalesce_refresh(true)
///     .build();
/// assert_eq!(config.refresh_path, "/auth/refresh");
/// assert!(config.is_auth_failure(403));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// API root that request paths are joined onto.
    #[builder(into)]
    pub base_url: String,
    #[builder(into, default = DEFAULT_REFRESH_PATH.to_string())]
    pub refresh_path: String,
    /// Response statuses that trigger the refresh-and-retry cycle.
    #[builder(default = vec![401])]
    pub auth_failure_statuses: Vec<u16>,
    /// JSON field of the refresh response holding the new token.
    #[builder(into, default = DEFAULT_TOKEN_FIELD.to_string())]
    pub token_field: String,
    /// Path fragments sent once, without refresh handling.
    #[builder(default)]
    pub bypass_paths: Vec<String>,
    /// Refresh before sending when the stored token's `exp` has passed.
    #[builder(default)]
    pub preemptive_refresh: bool,
    #[builder(default)]
    pub expiry_leeway_secs: u64,
    /// Serialize concurrent refreshes so one expiry causes one refresh.
    #[builder(default)]
    pub coalesce_refresh: bool,
    /// Transport-level timeout; the gateway itself never times out.
    pub request_timeout_secs: Option<u64>,
}

// Fields missing from a config file take the builder defaults.
impl Default for GatewayConfig {
    fn default() -> Self {
        Self::builder().base_url(DEFAULT_BASE_URL).build()
    }
}

impl GatewayConfig {
    /// Storefront client: API under `/api`, 401 and 403 both mean "refresh".
    pub fn storefront(origin: &str) -> Self {
        Self::builder()
            .base_url(format!("{}/api", origin.trim_end_matches('/')))
            .auth_failure_statuses(vec![401, 403])
            .build()
    }

    /// Admin console: API under `/api/admin`, only 401 refreshes, login bypasses refresh.
    pub fn admin(origin: &str) -> Self {
        Self::builder()
            .base_url(format!("{}/api/admin", origin.trim_end_matches('/')))
            .auth_failure_statuses(vec![401])
            .bypass_paths(vec!["/auth/login".to_string()])
            .build()
    }

    pub fn for_profile(profile: Profile, origin: &str) -> Self {
        match profile {
            Profile::Storefront => Self::storefront(origin),
            Profile::Admin => Self::admin(origin),
        }
    }

    pub fn is_auth_failure(&self, status: u16) -> bool {
        self.auth_failure_statuses.contains(&status)
    }

    /// Requests that go out once, untouched by the refresh cycle.
    pub fn is_bypassed(&self, path: &str) -> bool {
        path == self.refresh_path || self.bypass_paths.iter().any(|p| path.contains(p.as_str()))
    }

    /// Leeway as a signed duration, saturating at [`chrono::Duration::MAX`].
    pub fn expiry_leeway(&self) -> chrono::Duration {
        i64::try_from(self.expiry_leeway_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Load a TOML config file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, GatewayError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw).map_err(|e| {
            GatewayError::Configuration(format!("invalid config file {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Layered load: `AUTHGATE_CONFIG` file (or the profile preset), then `AUTHGATE_*` overrides.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn from_env() -> Result<Self, GatewayError> {
        let _ = dotenvy::dotenv();
        let base = match std::env::var("AUTHGATE_CONFIG") {
            Ok(path) => Self::from_toml_file(path)?,
            Err(_) => {
                let profile = match std::env::var("AUTHGATE_PROFILE") {
                    Ok(raw) => raw.parse::<Profile>().map_err(|_| {
                        GatewayError::Configuration(format!("unknown AUTHGATE_PROFILE: {raw}"))
                    })?,
                    Err(_) => Profile::default(),
                };
                let origin = std::env::var("AUTHGATE_ORIGIN")
                    .unwrap_or_else(|_| "http://localhost:8000".to_string());
                Self::for_profile(profile, &origin)
            }
        };
        base.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `AUTHGATE_*` overrides read through `lookup`.
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, GatewayError> {
        if let Some(v) = lookup("AUTHGATE_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("AUTHGATE_REFRESH_PATH") {
            self.refresh_path = v;
        }
        if let Some(v) = lookup("AUTHGATE_AUTH_FAILURE_STATUSES") {
            self.auth_failure_statuses = parse_list(&v, "AUTHGATE_AUTH_FAILURE_STATUSES")?;
        }
        if let Some(v) = lookup("AUTHGATE_TOKEN_FIELD") {
            self.token_field = v;
        }
        if let Some(v) = lookup("AUTHGATE_BYPASS_PATHS") {
            self.bypass_paths = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(v) = lookup("AUTHGATE_PREEMPTIVE_REFRESH") {
            self.preemptive_refresh = parse_bool(&v, "AUTHGATE_PREEMPTIVE_REFRESH")?;
        }
        if let Some(v) = lookup("AUTHGATE_EXPIRY_LEEWAY_SECS") {
            self.expiry_leeway_secs = parse_num(&v, "AUTHGATE_EXPIRY_LEEWAY_SECS")?;
        }
        if let Some(v) = lookup("AUTHGATE_COALESCE_REFRESH") {
            self.coalesce_refresh = parse_bool(&v, "AUTHGATE_COALESCE_REFRESH")?;
        }
        if let Some(v) = lookup("AUTHGATE_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = Some(parse_num(&v, "AUTHGATE_REQUEST_TIMEOUT_SECS")?);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.base_url.trim().is_empty() {
            return Err(GatewayError::Configuration("base_url is empty".to_string()));
        }
        if !self.refresh_path.starts_with('/') {
            return Err(GatewayError::Configuration(format!(
                "refresh_path must start with '/': {}",
                self.refresh_path
            )));
        }
        if self.auth_failure_statuses.is_empty() {
            return Err(GatewayError::Configuration(
                "auth_failure_statuses must not be empty".to_string(),
            ));
        }
        if let Some(bad) = self
            .auth_failure_statuses
            .iter()
            .find(|s| !(400..500).contains(*s))
        {
            return Err(GatewayError::Configuration(format!(
                "auth failure status {bad} is not a 4xx status"
            )));
        }
        if self.expiry_leeway_secs > MAX_EXPIRY_LEEWAY_SECS {
            return Err(GatewayError::Configuration(format!(
                "expiry_leeway_secs {} exceeds {MAX_EXPIRY_LEEWAY_SECS}",
                self.expiry_leeway_secs
            )));
        }
        if self.token_field.trim().is_empty() {
            return Err(GatewayError::Configuration("token_field is empty".to_string()));
        }
        Ok(())
    }
}

fn parse_bool(raw: &str, key: &str) -> Result<bool, GatewayError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(GatewayError::Configuration(format!(
            "{key}: expected a boolean, got {other:?}"
        ))),
    }
}

fn parse_num<T: std::str::FromStr>(raw: &str, key: &str) -> Result<T, GatewayError> {
    raw.trim().parse().map_err(|_| {
        GatewayError::Configuration(format!("{key}: expected a number, got {raw:?}"))
    })
}

fn parse_list(raw: &str, key: &str) -> Result<Vec<u16>, GatewayError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_num(s, key))
        .collect()
}
