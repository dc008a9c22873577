#![allow(dead_code)]

use std::sync::Arc;

use authgate::auth::{Credential, CredentialStore, MemoryCredentialStore};
use authgate::config::GatewayConfig;
use authgate::gateway::Gateway;
use authgate::transport::HttpTransport;
use serde_json::json;
use wiremock::{Match, Request, ResponseTemplate};

/// Matches requests that carry no `Authorization` header.
pub struct NoAuthorization;

impl Match for NoAuthorization {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

pub fn storefront_gateway(origin: &str, token: Option<&str>) -> (Gateway, Arc<MemoryCredentialStore>) {
    gateway_for(GatewayConfig::storefront(origin), token)
}

pub fn gateway_for(config: GatewayConfig, token: Option<&str>) -> (Gateway, Arc<MemoryCredentialStore>) {
    let transport = Arc::new(HttpTransport::new(&config.base_url).expect("transport"));
    let store = Arc::new(MemoryCredentialStore::new());
    if let Some(token) = token {
        store.set(Credential::new(token));
    }
    (Gateway::new(config, transport, store.clone()), store)
}

pub fn token_response(token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": token,
        "token_type": "bearer"
    }))
}

/// Login response that also plants the http-only refresh cookie.
pub fn login_response(token: &str, refresh_cookie: &str) -> ResponseTemplate {
    token_response(token).insert_header(
        "set-cookie",
        format!("refresh_token={refresh_cookie}; HttpOnly; Path=/; SameSite=Lax").as_str(),
    )
}

pub fn detail(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({ "detail": message }))
}

pub fn stored(store: &MemoryCredentialStore) -> Option<String> {
    store.get().map(|c| c.access_token)
}

pub fn cart_item(id: &str, price: f64, quantity: i64) -> serde_json::Value {
    json!({
        "id": id,
        "user_id": "u1",
        "product_id": format!("p-{id}"),
        "title": format!("Runner {id}"),
        "price": price,
        "size": 42,
        "quantity": quantity,
        "image_url": null,
        "created_at": "2025-03-01T10:00:00",
        "updated_at": "2025-03-01T10:00:00"
    })
}
