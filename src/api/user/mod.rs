pub mod cart;
pub mod checkout;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::middleware::auth::{auth_middleware, AuthState};
use cart::cart_router;
use checkout::checkout_router;

pub fn user_api_router(db: Arc<DatabaseConnection>, auth: AuthState) -> Router {
    Router::new()
        .merge(cart_router(db.clone()))
        .merge(checkout_router(db))
        .route_layer(from_fn_with_state(auth, auth_middleware))
}
