//! API route handlers.
//!
//! All handlers receive `SharedState` via Axum state extraction. Each
//! handler is stateless: one gateway call, one response. The database
//! connection lives and dies inside the gateway call.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::gateway::CustomerScore;
use crate::SharedState;

pub fn v1_router(state: SharedState) -> Router {
    Router::new()
        // ── Health ───────────────────────────────────────────────────────
        .route("/status", get(status))
        .route("/hello", get(hello))
        // ── Token ────────────────────────────────────────────────────────
        .route("/token", get(token))
        // ── Scores ───────────────────────────────────────────────────────
        .route("/scores", get(scores_list))
        .route("/scores", post(scores_create))
        .route("/scores/{store_code}", patch(score_update))
        .route("/scores/{store_code}", delete(score_delete))
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

async fn status() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "tokengate",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn hello() -> impl IntoResponse {
    Json(json!({ "greeting": "Hello world" }))
}

// =============================================================================
// Token
// =============================================================================

/// GET /v1/token — Exchange service credentials for a bearer access token.
async fn token(State(state): State<SharedState>) -> Result<Json<serde_json::Value>, ApiError> {
    let token = state.identity.acquire_token().await?;

    let expires_at = token
        .expires_in
        .map(|secs| chrono::Utc::now() + chrono::Duration::seconds(secs as i64));

    Ok(Json(json!({
        "data": {
            "access_token": token.access_token,
            "token_type": token.token_type,
            "expires_at": expires_at,
        }
    })))
}

// =============================================================================
// Scores
// =============================================================================

/// GET /v1/scores — Fetch all rows of the scores table.
async fn scores_list(
    State(state): State<SharedState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let scores = state.gateway.fetch_scores().await?;

    Ok(Json(json!({ "data": scores })))
}

/// POST /v1/scores — Insert rows into the scores table.
async fn scores_create(
    State(state): State<SharedState>,
    Json(body): Json<Vec<CustomerScore>>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("no rows to insert".into()));
    }

    let inserted = state.gateway.insert_scores(&body).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "data": { "inserted": inserted } })),
    ))
}

#[derive(Deserialize)]
struct UpdateScoreBody {
    score: i32,
}

/// PATCH /v1/scores/:store_code — Update the score for a store.
async fn score_update(
    State(state): State<SharedState>,
    Path(store_code): Path<String>,
    Json(body): Json<UpdateScoreBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.gateway.update_score(&store_code, body.score).await?;

    Ok(Json(json!({ "data": { "success": true } })))
}

/// DELETE /v1/scores/:store_code — Delete all rows for a store.
async fn score_delete(
    State(state): State<SharedState>,
    Path(store_code): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.gateway.delete_scores(&store_code).await?;

    Ok(Json(json!({ "data": { "success": true } })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::gateway::ConnectionGateway;
    use crate::identity::TokenProvider;
    use crate::AppState;
    use axum::body::to_bytes;
    use std::sync::Arc;

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // Constructing the state performs no I/O; handlers that fail before
    // their gateway call can be exercised without a database.
    fn test_state() -> SharedState {
        let config = test_config();
        Arc::new(AppState {
            identity: TokenProvider::new(&config),
            gateway: ConnectionGateway::new(&config, TokenProvider::new(&config)),
            config,
        })
    }

    #[tokio::test]
    async fn test_status_reports_service_name() {
        let resp = status().await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "tokengate");
    }

    #[tokio::test]
    async fn test_hello_greets() {
        let resp = hello().await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body["greeting"], "Hello world");
    }

    #[tokio::test]
    async fn test_scores_create_rejects_empty_body() {
        let state = test_state();

        let err = scores_create(State(state), Json(vec![]))
            .await
            .unwrap_err();

        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = body_json(resp).await;
        assert_eq!(body["error"]["code"], "bad_request");
    }

    #[test]
    fn test_update_body_requires_score() {
        assert!(serde_json::from_str::<UpdateScoreBody>("{}").is_err());

        let body: UpdateScoreBody = serde_json::from_str(r#"{"score": 85}"#).unwrap();
        assert_eq!(body.score, 85);
    }
}
