use axum::{
    extract::Extension, http::StatusCode, response::Response, routing::post, Json, Router,
};
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, EntityTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::api::extract::{whole_number, RequestBody, ValidatedJson};
use crate::api::user::cart::{cart_lines, find_cart};
use crate::entities::{
    order::{self, Entity as OrderEntity, Status},
    order_item::{self, Entity as OrderItemEntity},
    product::Entity as ProductEntity,
};
use crate::error::ApiError;
use crate::middleware::auth::Session;
use crate::middleware::logging::to_response;

pub fn checkout_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/cart/checkout", post(checkout))
        .layer(Extension(db))
}

/// Prices the requested lines against the live catalog and records one
/// `PENDING` order. Everything happens in a single transaction, so a missing
/// product leaves no order behind. The stored cart is read but not modified.
async fn checkout(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(session): Extension<Session>,
    ValidatedJson(payload): ValidatedJson<Checkout>,
) -> Result<Response, ApiError> {
    debug!(user_id = %session.user_id, lines = payload.items.len(), "Checking out");
    let txn = db.begin().await?;

    let cart = find_cart(&txn, &session.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Cart not found".into()))?;
    let stored = cart_lines(&txn, &cart.id).await?;

    let mut total = 0.0;
    let mut lines = Vec::with_capacity(payload.items.len());
    for line in payload.items {
        let product = ProductEntity::find_by_id(line.product_id.as_str())
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Product {} not found", line.product_id)))?;
        total += product.price * f64::from(line.quantity);
        lines.push((line, product.price));
    }

    // Attributed to the business behind the oldest stored cart item.
    let business_id = stored
        .first()
        .map(|(_, product)| product.business_id.clone())
        .unwrap_or_default();

    let order_id = Uuid::new_v4().to_string();
    let created_at = Utc::now();
    let new_order = order::ActiveModel {
        id: Set(order_id.clone()),
        user_id: Set(session.user_id.clone()),
        business_id: Set(business_id),
        total: Set(total),
        status: Set(Status::Pending),
        created_at: Set(created_at),
    };
    OrderEntity::insert(new_order)
        .exec_without_returning(&txn)
        .await?;

    if !lines.is_empty() {
        let order_items = lines.into_iter().map(|(line, price)| order_item::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            order_id: Set(order_id.clone()),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            price: Set(price),
        });
        OrderItemEntity::insert_many(order_items)
            .exec_without_returning(&txn)
            .await?;
    }

    txn.commit().await?;
    info!(user_id = %session.user_id, order_id = %order_id, total, "Order placed");

    Ok(to_response(
        (
            StatusCode::CREATED,
            Json(CheckoutResponse {
                order_id,
                total,
                status: Status::Pending,
                created_at,
            }),
        ),
        Ok(()),
    ))
}

//Structs
#[derive(Deserialize, Validate, Debug)]
struct Checkout {
    #[validate(nested)]
    items: Vec<CheckoutLine>,
}

#[derive(Deserialize, Validate, Debug)]
#[serde(rename_all = "camelCase")]
struct CheckoutLine {
    product_id: String,
    #[serde(deserialize_with = "whole_number")]
    #[validate(range(min = 1))]
    quantity: i32,
}

impl RequestBody for Checkout {
    const REJECTION: &'static str = "Invalid checkout data";
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order_id: String,
    pub total: f64,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}
