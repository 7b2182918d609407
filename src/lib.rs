pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod identity;

pub use config::Config;
pub use error::ApiError;

use std::sync::Arc;

/// Shared application state passed to all API handlers.
pub struct AppState {
    pub config: Config,
    pub identity: identity::TokenProvider,
    pub gateway: gateway::ConnectionGateway,
}

pub type SharedState = Arc<AppState>;
