pub mod api;
pub mod config;
pub mod entities;
pub mod error;
pub mod middleware;

use axum::{middleware::from_fn, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::create_api_router;
use crate::middleware::{auth::AuthState, logging::logging_middleware};

pub fn create_app(shared_db: Arc<DatabaseConnection>, auth: AuthState) -> Router {
    create_api_router(shared_db, auth)
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
