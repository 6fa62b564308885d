use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::{delete, get},
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Select, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::api::extract::{whole_number, RequestBody, ValidatedJson};
use crate::entities::{
    cart::{self, Entity as CartEntity},
    cart_item::{self, Entity as CartItemEntity},
    product::{self, Entity as ProductEntity},
};
use crate::error::ApiError;
use crate::middleware::auth::Session;
use crate::middleware::logging::to_response;

//ROUTERS
pub fn cart_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/cart", get(get_cart).post(add_item))
        .route("/cart/:product_id", delete(remove_item))
        .layer(Extension(db))
}

//ROUTES
async fn get_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(session): Extension<Session>,
) -> Result<Response, ApiError> {
    let select = CartItemEntity::find()
        .inner_join(CartEntity)
        .filter(cart::Column::UserId.eq(session.user_id.as_str()));
    let items = with_products(&*db, select).await?;

    Ok(items_response(items))
}

async fn add_item(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(session): Extension<Session>,
    ValidatedJson(payload): ValidatedJson<AddItem>,
) -> Result<Response, ApiError> {
    debug!(user_id = %session.user_id, ?payload, "Adding cart item");
    let txn = db.begin().await?;

    let cart = ensure_cart(&txn, &session.user_id).await?;

    let entry = cart_item::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        cart_id: Set(cart.id.clone()),
        product_id: Set(payload.product_id),
        quantity: Set(payload.quantity),
        // Not synchronised with the catalog; checkout always reads live prices.
        price: Set(0.0),
        created_at: Set(Utc::now()),
    };
    CartItemEntity::insert(entry)
        .on_conflict(
            OnConflict::columns([cart_item::Column::CartId, cart_item::Column::ProductId])
                .update_column(cart_item::Column::Quantity)
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    let items = cart_lines(&txn, &cart.id).await?;
    txn.commit().await?;

    Ok(items_response(items))
}

async fn remove_item(
    Path(product_id): Path<String>,
    Extension(session): Extension<Session>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;

    let cart = find_cart(&txn, &session.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Cart not found".into()))?;

    let deleted = CartItemEntity::delete_many()
        .filter(cart_item::Column::CartId.eq(cart.id.as_str()))
        .filter(cart_item::Column::ProductId.eq(product_id.as_str()))
        .exec(&txn)
        .await?;
    if deleted.rows_affected == 0 {
        return Err(ApiError::NotFound("Item not in cart".into()));
    }

    let items = cart_lines(&txn, &cart.id).await?;
    txn.commit().await?;

    Ok(items_response(items))
}

//QUERIES
pub(crate) async fn find_cart<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
) -> Result<Option<cart::Model>, DbErr> {
    CartEntity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .one(db)
        .await
}

async fn ensure_cart<C: ConnectionTrait>(db: &C, user_id: &str) -> Result<cart::Model, DbErr> {
    let new_cart = cart::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        user_id: Set(user_id.to_owned()),
    };
    CartEntity::insert(new_cart)
        .on_conflict(
            OnConflict::column(cart::Column::UserId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    find_cart(db, user_id)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("cart for user {user_id}")))
}

/// Items of one cart that still point at an existing product, oldest first.
pub(crate) async fn cart_lines<C: ConnectionTrait>(
    db: &C,
    cart_id: &str,
) -> Result<Vec<(cart_item::Model, product::Model)>, DbErr> {
    let select = CartItemEntity::find().filter(cart_item::Column::CartId.eq(cart_id));
    with_products(db, select).await
}

async fn with_products<C: ConnectionTrait>(
    db: &C,
    select: Select<CartItemEntity>,
) -> Result<Vec<(cart_item::Model, product::Model)>, DbErr> {
    let rows = select
        .order_by_asc(cart_item::Column::CreatedAt)
        .order_by_asc(cart_item::Column::Id)
        .find_also_related(ProductEntity)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(item, product)| product.map(|product| (item, product)))
        .collect())
}

fn items_response(items: Vec<(cart_item::Model, product::Model)>) -> Response {
    let items = items.into_iter().map(CartLine::from).collect();
    to_response((StatusCode::OK, Json(CartItems { items })), Ok(()))
}

//Structs
#[derive(Deserialize, Validate, Debug)]
#[serde(rename_all = "camelCase")]
struct AddItem {
    product_id: String,
    #[serde(deserialize_with = "whole_number")]
    #[validate(range(min = 1))]
    quantity: i32,
}

impl RequestBody for AddItem {
    const REJECTION: &'static str = "Invalid input data";
}

#[derive(Serialize, Debug)]
pub struct CartItems {
    pub items: Vec<CartLine>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: String,
    pub cart_id: String,
    pub product_id: String,
    pub quantity: i32,
    pub price: f64,
    pub created_at: chrono::DateTime<Utc>,
    pub product: ProductSummary,
}

#[derive(Serialize, Debug)]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub price: f64,
}

impl From<(cart_item::Model, product::Model)> for CartLine {
    fn from((item, product): (cart_item::Model, product::Model)) -> Self {
        Self {
            id: item.id,
            cart_id: item.cart_id,
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
            created_at: item.created_at,
            product: ProductSummary {
                id: product.id,
                name: product.name,
                price: product.price,
            },
        }
    }
}
