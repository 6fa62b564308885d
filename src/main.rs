use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cart_api::config::Config;
use cart_api::create_app;
use cart_api::entities::{seed_demo_catalog, setup_schema};
use cart_api::middleware::auth::AuthState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(err) = run().await {
        error!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let db: DatabaseConnection = Database::connect(&config.database_url).await?;
    setup_schema(&db).await?;
    if config.seed_demo_catalog {
        seed_demo_catalog(&db).await?;
    }

    let shared_db = Arc::new(db);
    let app = create_app(
        shared_db,
        AuthState {
            mode: config.auth_mode,
        },
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Running at {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
