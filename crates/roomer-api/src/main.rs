//! Roomer API Server
//!
//! REST API server for the Roomer rental marketplace.

use roomer_api::create_router;
use roomer_api::gateways::{HttpMediaGateway, SmtpMailer};
use roomer_api::state::AppState;
use roomer_api::stores::postgres::{self, PgAccountStore, PgListingStore};
use roomer_core::config::AppConfig;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "roomer_api={},tower_http=info",
                    config.logging.level
                ))
            }),
        )
        .init();

    // Open the datastore and make sure the schema exists
    let pool = postgres::connect(&config.database).await?;
    postgres::init_schema(&pool).await?;

    // Wire stores and gateways
    let accounts = Arc::new(PgAccountStore::new(pool.clone()));
    let listings = Arc::new(PgListingStore::new(pool));
    let media = Arc::new(HttpMediaGateway::new(&config.media));
    let mailer = Arc::new(SmtpMailer::new(&config.mail)?);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, accounts, listings, media, mailer));
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Roomer API server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
