pub mod extract;
pub mod user;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::middleware::auth::AuthState;
use user::user_api_router;

pub fn create_api_router(shared_db: Arc<DatabaseConnection>, auth: AuthState) -> Router {
    Router::new().nest("/api", user_api_router(shared_db, auth))
}
