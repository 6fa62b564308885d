mod common;

use cart_api::entities::cart::{self, Entity as CartEntity};
use cart_api::middleware::auth::{generate_token, AuthMode};
use chrono::Duration;
use common::{json_body, session, spawn_app, spawn_jwt_app, token_for, JWT_SECRET};
use reqwest::{header, Method, StatusCode};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::json;

const ROUTES: [(Method, &str); 4] = [
    (Method::GET, "/api/cart"),
    (Method::POST, "/api/cart"),
    (Method::DELETE, "/api/cart/bagel"),
    (Method::POST, "/api/cart/checkout"),
];

async fn assert_rejected(app: &common::TestApp, authorization: Option<&str>) {
    for (method, path) in ROUTES {
        let mut request = app
            .client
            .request(method.clone(), app.url(path))
            .json(&json!({ "productId": "bagel", "quantity": 1, "items": [] }));
        if let Some(value) = authorization {
            request = request.header(header::AUTHORIZATION, value);
        }
        let response = request.send().await.expect("Failed to send request");

        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{method} {path} with {authorization:?}"
        );
        assert_eq!(json_body(response).await, json!({ "error": "Unauthorized" }));
    }
}

#[tokio::test]
async fn test_missing_header_is_unauthorized() {
    let app = spawn_jwt_app().await;
    assert_rejected(&app, None).await;
}

#[tokio::test]
async fn test_malformed_header_is_unauthorized() {
    let app = spawn_jwt_app().await;
    let token = token_for("alice");

    assert_rejected(&app, Some(token.as_str())).await;
    assert_rejected(&app, Some(format!("Token {token}").as_str())).await;
    assert_rejected(&app, Some("Bearer ")).await;
    assert_rejected(&app, Some("Bearer not-a-jwt")).await;
}

#[tokio::test]
async fn test_foreign_signature_is_unauthorized() {
    let app = spawn_jwt_app().await;
    let forged = generate_token(&session("alice"), "some-other-secret", None).unwrap();

    assert_rejected(&app, Some(format!("Bearer {forged}").as_str())).await;
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let app = spawn_jwt_app().await;
    let expired =
        generate_token(&session("alice"), JWT_SECRET, Some(Duration::hours(-2))).unwrap();

    assert_rejected(&app, Some(format!("Bearer {expired}").as_str())).await;
}

#[tokio::test]
async fn test_valid_token_resolves_user() {
    let app = spawn_jwt_app().await;
    app.seed_product("bagel", "Sesame bagel", 1.5, "bakery").await;

    let response = app.add_item(&token_for("alice"), "bagel", 1).await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored = CartEntity::find()
        .filter(cart::Column::UserId.eq("alice"))
        .one(&*app.db)
        .await
        .unwrap();
    assert!(stored.is_some());
}

#[tokio::test]
async fn test_development_mode_uses_fixed_identity() {
    let app = spawn_app(AuthMode::Development(session("dev-user"))).await;
    app.seed_product("bagel", "Sesame bagel", 1.5, "bakery").await;

    let response = app
        .client
        .post(app.url("/api/cart"))
        .json(&json!({ "productId": "bagel", "quantity": 2 }))
        .send()
        .await
        .expect("Failed to send add item request");
    assert_eq!(response.status(), StatusCode::OK);

    // Whatever the caller sends, the configured identity is used.
    let response = app
        .client
        .get(app.url("/api/cart"))
        .bearer_auth("garbage")
        .send()
        .await
        .expect("Failed to send get cart request");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let stored = CartEntity::find()
        .filter(cart::Column::UserId.eq("dev-user"))
        .one(&*app.db)
        .await
        .unwrap();
    assert!(stored.is_some());
}
