use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Unified error type for the gateway service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // ── Credential exchange ─────────────────────────────────────────────
    #[error("Could not obtain access token: {0}")]
    TokenExchange(String),

    // ── Database ────────────────────────────────────────────────────────
    #[error("Could not establish database connection: {0}")]
    Connection(String),

    #[error("Database error: {0}")]
    Database(String),

    // ── Resource ────────────────────────────────────────────────────────
    #[error("{0} not found")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    // ── Internal ────────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!("Database error: {e}");
        ApiError::Database(e.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            // Connection auth rides on the token, so both failures are 401.
            ApiError::TokenExchange(_) => (StatusCode::UNAUTHORIZED, "token_exchange_failed"),
            ApiError::Connection(_) => (StatusCode::UNAUTHORIZED, "connection_failed"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_failures_map_to_401() {
        let resp = ApiError::TokenExchange("provider said no".into()).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = ApiError::Connection("refused".into()).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_query_failures_map_to_500() {
        let resp = ApiError::Database("relation missing".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let resp = ApiError::NotFound("store".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
