//! API router for the gateway service.
//!
//! Mounts all endpoint groups under /v1/:
//! - /v1/status — health check
//! - /v1/hello  — greeting
//! - /v1/token  — credential-for-token exchange
//! - /v1/scores — read/write the scores table through the gateway

pub mod routes;

use crate::SharedState;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/v1", routes::v1_router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
