use anyhow::Result;
use std::sync::Arc;
use tracing::info;

mod api;
mod config;
mod error;
mod gateway;
mod identity;

use config::Config;
use gateway::ConnectionGateway;
use identity::TokenProvider;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub identity: TokenProvider,
    pub gateway: ConnectionGateway,
}

pub type SharedState = Arc<AppState>;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tokengate=info".into()),
        )
        .init();

    // Load config
    let config = Config::from_env()?;
    info!("tokengate v{}", env!("CARGO_PKG_VERSION"));
    info!("Listening on {}:{}", config.host, config.port);

    // Initialize components
    let identity = TokenProvider::new(&config);
    let gateway = ConnectionGateway::new(&config, TokenProvider::new(&config));

    match gateway.migrate().await {
        Ok(()) => info!("Database reachable, schema ensured ✓"),
        Err(e) => {
            tracing::warn!(
                "⚠️  Could not reach database at startup: {e}. \
                 Connections will be attempted per request."
            );
        }
    }

    // Build shared state
    let state: SharedState = Arc::new(AppState {
        config: config.clone(),
        identity,
        gateway,
    });

    // Build router
    let app = api::router(state);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server ready ✓");
    axum::serve(listener, app).await?;

    Ok(())
}
