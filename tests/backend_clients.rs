//! Wire-level tests for the backend service clients.

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ember_core::config::{BackendConfig, ClientOptions};
use ember_core::error::Error;
use ember_core::models::PurchaseOutcome;
use ember_core::services::identity::IdentityError;
use ember_core::services::{CommerceGateway, DocumentStore, IdentityService};
use ember_core::Ember;

fn ember_for(server: &MockServer) -> Ember {
    let config = BackendConfig::new(&server.uri(), "test-api-key").unwrap();
    Ember::new_with_options(config, ClientOptions::default()).unwrap()
}

fn session_body(user_id: &str, email: &str) -> serde_json::Value {
    json!({
        "access_token": "test_access_token",
        "refresh_token": "test_refresh_token",
        "expires_in": 3600,
        "token_type": "bearer",
        "user": { "id": user_id, "email": email }
    })
}

#[tokio::test]
async fn sign_up_stores_the_session_and_returns_the_user() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body("user-1", "a@b.c")))
        .mount(&server)
        .await;

    let identity = ember_for(&server).identity();
    let user = identity.sign_up("a@b.c", "password123").await.unwrap();

    assert_eq!(user.id, "user-1");
    assert_eq!(user.email, Some("a@b.c".to_string()));
    assert_eq!(identity.session().unwrap().access_token, "test_access_token");
}

#[tokio::test]
async fn sign_in_uses_the_password_grant() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body("user-1", "a@b.c")))
        .mount(&server)
        .await;

    let identity = ember_for(&server).identity();
    let user = identity.sign_in("a@b.c", "password123").await.unwrap();

    assert_eq!(user.id, "user-1");
}

#[tokio::test]
async fn bad_credentials_map_to_invalid_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_grant"
        })))
        .mount(&server)
        .await;

    let identity = ember_for(&server).identity();
    let result = identity.sign_in("a@b.c", "wrong").await;

    assert!(matches!(result, Err(IdentityError::InvalidCredentials)));
}

#[tokio::test]
async fn sign_out_clears_the_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body("user-1", "a@b.c")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let identity = ember_for(&server).identity();
    identity.sign_in("a@b.c", "password123").await.unwrap();

    identity.sign_out().await.unwrap();
    assert!(identity.session().is_none());
}

#[tokio::test]
async fn sign_out_without_a_session_fails_locally() {
    let server = MockServer::start().await;
    let identity = ember_for(&server).identity();

    let result = identity.sign_out().await;

    assert!(matches!(result, Err(IdentityError::MissingSession)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn collections_round_trip_through_the_store() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/store/v1/users/user-1/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "title": "first" },
            { "title": "second" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/store/v1/users/user-1/events/ev-1"))
        .and(body_json(json!({ "title": "first" })))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/store/v1/users/user-1/events/ev-1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let store = ember_for(&server).store();

    store
        .put("user-1", "events", "ev-1", json!({ "title": "first" }))
        .await
        .unwrap();
    let docs = store.fetch_all("user-1", "events").await.unwrap();
    assert_eq!(docs.len(), 2);
    store.delete("user-1", "events", "ev-1").await.unwrap();
}

#[tokio::test]
async fn flags_read_from_the_root_document() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/store/v1/users/user-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "onboarding_complete": true
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/store/v1/users/user-2"))
        .and(body_json(json!({ "onboarding_complete": true })))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/store/v1/users/user-3"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = ember_for(&server).store();

    assert_eq!(
        store.read_flag("user-1", "onboarding_complete").await.unwrap(),
        Some(true)
    );
    store
        .write_flag("user-2", "onboarding_complete", true)
        .await
        .unwrap();

    // users without a root document simply have no flags yet
    assert_eq!(
        store.read_flag("user-3", "onboarding_complete").await.unwrap(),
        None
    );
}

#[tokio::test]
async fn products_are_requested_by_id_set() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/commerce/v1/products"))
        .and(query_param("ids", "ember.plus.yearly,ember.plus.monthly"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "ember.plus.yearly",
                "title": "Ember Plus",
                "description": "Every chapter, every idea",
                "display_price": "$29.99"
            }
        ])))
        .mount(&server)
        .await;

    let commerce = ember_for(&server).commerce();
    let products = commerce
        .products(&[
            "ember.plus.yearly".to_string(),
            "ember.plus.monthly".to_string(),
        ])
        .await
        .unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].display_price, "$29.99");
}

#[tokio::test]
async fn purchase_outcomes_deserialize() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/commerce/v1/purchase"))
        .and(body_json(json!({ "product_id": "ember.plus.yearly" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "outcome": "pending",
            "transaction_id": null
        })))
        .mount(&server)
        .await;

    let commerce = ember_for(&server).commerce();
    let outcome = commerce.purchase("ember.plus.yearly").await.unwrap();

    assert_eq!(outcome, PurchaseOutcome::Pending);
}

#[tokio::test]
async fn entitlements_enumerate() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/commerce/v1/entitlements"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "product_id": "ember.plus.yearly", "expires_at": null }
        ])))
        .mount(&server)
        .await;

    let commerce = ember_for(&server).commerce();
    let entitlements = commerce.current_entitlements().await.unwrap();

    assert_eq!(entitlements.len(), 1);
    assert_eq!(entitlements[0].product_id, "ember.plus.yearly");
}

#[tokio::test]
async fn store_failures_carry_the_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/store/v1/users/user-1/events"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let store = ember_for(&server).store();
    let err = store.fetch_all("user-1", "events").await.unwrap_err();
    let message = err.to_string();

    assert!(message.contains("500"));
    assert!(message.contains("boom"));

    // the unified error keeps the collaborator message verbatim
    let unified: Error = err.into();
    assert!(unified.to_string().contains("boom"));
}
