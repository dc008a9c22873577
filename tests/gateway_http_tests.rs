mod common;

use authgate::config::GatewayConfig;
use authgate::transport::{ApiRequest, TransportError};
use serde_json::json;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{detail, gateway_for, login_response, storefront_gateway, stored, token_response, NoAuthorization};

#[tokio::test]
async fn bearer_is_attached_and_success_passes_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/orders/"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "o1"}])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(token_response("unused"))
        .expect(0)
        .mount(&server)
        .await;

    let (gateway, store) = storefront_gateway(&server.uri(), Some("T1"));
    let resp = gateway.execute(ApiRequest::get("/orders/")).await.unwrap();

    assert_eq!(resp.status, 200);
    assert_eq!(resp.parse_json::<serde_json::Value>().unwrap(), json!([{"id": "o1"}]));
    assert_eq!(stored(&store).as_deref(), Some("T1"));
}

#[tokio::test]
async fn expired_token_is_renewed_with_the_login_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_string("username=jane&password=secret"))
        .respond_with(login_response("T1", "r1"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(header("cookie", "refresh_token=r1"))
        .and(NoAuthorization)
        .respond_with(token_response("T2"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cart/"))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [], "total_price": 0.0, "total_count": 0
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cart/"))
        .respond_with(detail(401, "Token has expired"))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, store) = storefront_gateway(&server.uri(), None);
    let session = authgate::auth::SessionClient::new(gateway.clone());
    session.login("jane", "secret").await.unwrap();
    assert_eq!(stored(&store).as_deref(), Some("T1"));

    let resp = gateway.execute(ApiRequest::get("/cart/")).await.unwrap();

    assert_eq!(resp.status, 200);
    assert_eq!(stored(&store).as_deref(), Some("T2"));
}

#[tokio::test]
async fn rejected_refresh_ends_session_and_returns_original_401() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/orders/"))
        .respond_with(detail(401, "Token has expired"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(detail(401, "Refresh token not found"))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, store) = storefront_gateway(&server.uri(), Some("T1"));
    let mut session_events = store.subscribe();

    let resp = gateway.execute(ApiRequest::get("/orders/")).await.unwrap();

    assert_eq!(resp.status, 401);
    assert_eq!(
        resp.parse_json::<serde_json::Value>().unwrap(),
        json!({"detail": "Token has expired"})
    );
    assert!(stored(&store).is_none());
    assert!(session_events.has_changed().unwrap());
    assert!(session_events.borrow_and_update().logged_out);
}

#[tokio::test]
async fn second_unauthorized_is_returned_without_another_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/admins/"))
        .respond_with(detail(401, "Not enough permissions"))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/admin/auth/refresh"))
        .respond_with(token_response("T2"))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, store) = gateway_for(GatewayConfig::admin(&server.uri()), Some("T1"));
    let resp = gateway.execute(ApiRequest::get("/admins/")).await.unwrap();

    assert_eq!(resp.status, 401);
    assert_eq!(stored(&store).as_deref(), Some("T2"));
}

#[tokio::test]
async fn validation_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/cart/add"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{"loc": ["body", "size"], "msg": "field required", "type": "missing"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, _store) = storefront_gateway(&server.uri(), Some("T1"));
    let err = gateway
        .post_json::<_, serde_json::Value>("/cart/add", &json!({"product_id": "p1", "quantity": 1}))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(422));
    assert_eq!(err.validation_errors()[0].field, "size");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let (gateway, store) = storefront_gateway(&format!("http://127.0.0.1:{port}"), Some("T1"));
    let result = gateway.execute(ApiRequest::get("/orders/")).await;

    assert!(matches!(result, Err(TransportError::Network(_))));
    assert_eq!(stored(&store).as_deref(), Some("T1"));
}
