//! CLI command handlers.

use std::sync::Arc;

use super::{CallArgs, Cli, LoginArgs};
use crate::auth::{MemoryCredentialStore, SessionClient};
use crate::config::{GatewayConfig, Profile};
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::transport::{ApiRequest, HttpTransport};

/// Resolve config: `--admin`/`--origin` pick a preset, otherwise the env/file layers.
pub fn resolve_config(cli: &Cli) -> Result<GatewayConfig, GatewayError> {
    if cli.origin.is_none() && !cli.admin {
        return GatewayConfig::from_env();
    }
    let profile = if cli.admin {
        Profile::Admin
    } else {
        Profile::Storefront
    };
    let origin = cli
        .origin
        .clone()
        .unwrap_or_else(|| "http://localhost:8000".to_string());
    GatewayConfig::for_profile(profile, &origin).with_env_overrides(|key| std::env::var(key).ok())
}

fn session_for(config: GatewayConfig) -> Result<SessionClient, GatewayError> {
    let transport = Arc::new(HttpTransport::with_timeout(
        &config.base_url,
        config.request_timeout(),
    )?);
    let store = Arc::new(MemoryCredentialStore::new());
    Ok(SessionClient::new(Gateway::new(config, transport, store)))
}

/// Handle `authgate check-auth`.
pub async fn handle_check_auth(
    config: GatewayConfig,
    args: &LoginArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = session_for(config)?;
    session.login(&args.username, &args.password).await?;
    let status = session.check_auth().await?;
    println!("status: {}", status.status);
    println!("{}", serde_json::to_string_pretty(&status.user)?);
    Ok(())
}

/// Handle `authgate call`.
pub async fn handle_call(
    config: GatewayConfig,
    args: &CallArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = session_for(config)?;
    if let (Some(username), Some(password)) = (&args.username, &args.password) {
        session.login(username, password).await?;
    }

    let mut request = ApiRequest::new(args.method, args.path.clone());
    if let Some(raw) = &args.body {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| GatewayError::InvalidArgument(format!("--body is not JSON: {e}")))?;
        request = request.with_json(&value)?;
    }

    let resp = session.gateway().execute(request).await?;
    println!("HTTP {}", resp.status);
    match resp.parse_json::<serde_json::Value>() {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", resp.text()),
    }
    if !session.is_logged_in() && session.gateway().store().state().logged_out {
        eprintln!("session ended: refresh was rejected");
    }
    Ok(())
}
