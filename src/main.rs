//! authgate - JWT authentication service over a SQLite identity store
//!
//! Verifies credentials against the identity store and issues HS256 tokens
//! carrying the identity's role claims; protected probes are gated on the
//! verified claims.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use authgate::{
    auth::{AuthState, SqliteUserStore, TokenIssuer},
    config::{load_env, AppConfig},
    routes::create_router,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    load_env();
    init_tracing();

    info!("🚀 authgate starting");

    let config = AppConfig::from_env();

    let store = Arc::new(SqliteUserStore::new(&config.db_path)?);
    info!("🔐 Identity store initialized at: {}", config.db_path);

    let issuer = Arc::new(TokenIssuer::new(config.token.clone()));
    let state = AuthState::new(store, issuer, &config);

    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("🎯 API server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "authgate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
