#![allow(dead_code)]

use std::sync::Arc;

use cart_api::create_app;
use cart_api::entities::{product, setup_schema};
use cart_api::middleware::auth::{generate_token, AuthMode, AuthState, Session};
use chrono::Duration;
use reqwest::{Client, Response};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use serde_json::{json, Value};
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub address: String,
    pub db: Arc<DatabaseConnection>,
    pub client: Client,
}

/// Starts the full router on an ephemeral port over a fresh SQLite file.
pub async fn spawn_app(mode: AuthMode) -> TestApp {
    let path = std::env::temp_dir().join(format!("cart-api-test-{}.db", Uuid::new_v4()));
    let database_url = format!("sqlite://{}?mode=rwc", path.display());
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to open test database");
    setup_schema(&db).await.expect("Failed to create schema");
    let db = Arc::new(db);

    let app = create_app(db.clone(), AuthState { mode });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let address = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });

    TestApp {
        address,
        db,
        client: Client::new(),
    }
}

pub async fn spawn_jwt_app() -> TestApp {
    spawn_app(AuthMode::Jwt {
        secret: Arc::from(JWT_SECRET),
    })
    .await
}

pub fn session(user_id: &str) -> Session {
    Session {
        user_id: user_id.to_owned(),
        role: "CUSTOMER".to_owned(),
    }
}

pub fn token_for(user_id: &str) -> String {
    generate_token(&session(user_id), JWT_SECRET, Some(Duration::hours(1)))
        .expect("Failed to generate token")
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn seed_product(&self, id: &str, name: &str, price: f64, business_id: &str) {
        product::ActiveModel {
            id: Set(id.to_owned()),
            name: Set(name.to_owned()),
            price: Set(price),
            business_id: Set(business_id.to_owned()),
        }
        .insert(&*self.db)
        .await
        .expect("Failed to seed product");
    }

    pub async fn get_cart(&self, token: &str) -> Response {
        self.client
            .get(self.url("/api/cart"))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to send get cart request")
    }

    pub async fn add_item(&self, token: &str, product_id: &str, quantity: i64) -> Response {
        self.client
            .post(self.url("/api/cart"))
            .bearer_auth(token)
            .json(&json!({ "productId": product_id, "quantity": quantity }))
            .send()
            .await
            .expect("Failed to send add item request")
    }

    pub async fn remove_item(&self, token: &str, product_id: &str) -> Response {
        self.client
            .delete(self.url(&format!("/api/cart/{product_id}")))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to send remove item request")
    }

    pub async fn checkout(&self, token: &str, body: Value) -> Response {
        self.client
            .post(self.url("/api/cart/checkout"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to send checkout request")
    }
}

pub async fn json_body(response: Response) -> Value {
    response
        .json::<Value>()
        .await
        .expect("Failed to parse response JSON")
}

/// `(productId, quantity)` pairs of an `{items}` response, in order.
pub fn item_quantities(body: &Value) -> Vec<(String, i64)> {
    body["items"]
        .as_array()
        .expect("items should be an array")
        .iter()
        .map(|item| {
            (
                item["productId"].as_str().unwrap().to_owned(),
                item["quantity"].as_i64().unwrap(),
            )
        })
        .collect()
}
