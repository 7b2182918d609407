//! Token-authenticated connection gateway for the scores table.
//!
//! Every operation opens its own connection: a fresh access token is
//! acquired, placed in the password field of the connection options, and
//! the connection is dropped when the operation returns. No pooling, no
//! token caching.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::{Connection, PgConnection, Row};

use crate::config::Config;
use crate::error::ApiError;
use crate::identity::TokenProvider;

/// One row of the `happy_customer_score` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerScore {
    pub metric: String,
    pub channel: String,
    pub store_code: String,
    pub country: String,
    pub score: i32,
}

/// Builds per-request database connections authenticated with bearer
/// tokens instead of a static password.
pub struct ConnectionGateway {
    host: String,
    port: u16,
    database: String,
    username: String,
    connect_timeout: Duration,
    identity: TokenProvider,
}

impl ConnectionGateway {
    pub fn new(config: &Config, identity: TokenProvider) -> Self {
        Self {
            host: config.database_host.clone(),
            port: config.database_port,
            database: config.database_name.clone(),
            username: config.database_user.clone(),
            connect_timeout: Duration::from_secs(config.database_connect_timeout_secs),
            identity,
        }
    }

    /// Connection options with the access token in place of a password.
    /// TLS is required; the server will not accept token auth in the clear.
    fn connect_options(&self, token: &str) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.username)
            .password(token)
            .ssl_mode(PgSslMode::Require)
    }

    /// Open a single connection: acquire a token, then connect with it.
    pub async fn connect(&self) -> Result<PgConnection, ApiError> {
        let token = self.identity.acquire_token().await?;

        let conn = tokio::time::timeout(
            self.connect_timeout,
            PgConnection::connect_with(&self.connect_options(&token.access_token)),
        )
        .await
        .map_err(|_| ApiError::Connection("connection attempt timed out".into()))?
        .map_err(|e| ApiError::Connection(e.to_string()))?;

        Ok(conn)
    }

    /// Ensure the scores table exists. Run once at startup.
    pub async fn migrate(&self) -> Result<(), ApiError> {
        let mut conn = self.connect().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS happy_customer_score (
                metric      TEXT NOT NULL,
                channel     TEXT NOT NULL,
                store_code  TEXT NOT NULL,
                country     TEXT NOT NULL,
                score       INT  NOT NULL
            )
            "#,
        )
        .execute(&mut conn)
        .await?;

        Ok(())
    }

    /// Fetch all rows of the scores table.
    pub async fn fetch_scores(&self) -> Result<Vec<CustomerScore>, ApiError> {
        let mut conn = self.connect().await?;

        let rows = sqlx::query(
            "SELECT metric, channel, store_code, country, score FROM happy_customer_score",
        )
        .fetch_all(&mut conn)
        .await?;

        let scores = rows
            .iter()
            .map(|row| CustomerScore {
                metric: row.get(0),
                channel: row.get(1),
                store_code: row.get(2),
                country: row.get(3),
                score: row.get(4),
            })
            .collect();

        Ok(scores)
    }

    /// Insert rows into the scores table as one transaction. Returns the
    /// number inserted; on a mid-batch failure nothing persists.
    pub async fn insert_scores(&self, scores: &[CustomerScore]) -> Result<u64, ApiError> {
        let mut conn = self.connect().await?;
        let mut tx = conn.begin().await?;

        let mut inserted = 0u64;
        for score in scores {
            let result = sqlx::query(
                r#"
                INSERT INTO happy_customer_score (metric, channel, store_code, country, score)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(&score.metric)
            .bind(&score.channel)
            .bind(&score.store_code)
            .bind(&score.country)
            .bind(score.score)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;

        Ok(inserted)
    }

    /// Update the score for a store.
    pub async fn update_score(&self, store_code: &str, score: i32) -> Result<(), ApiError> {
        let mut conn = self.connect().await?;

        let affected = sqlx::query(
            "UPDATE happy_customer_score SET score = $1 WHERE store_code = $2",
        )
        .bind(score)
        .bind(store_code)
        .execute(&mut conn)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(ApiError::NotFound("store".into()));
        }

        Ok(())
    }

    /// Delete all rows for a store.
    pub async fn delete_scores(&self, store_code: &str) -> Result<(), ApiError> {
        let mut conn = self.connect().await?;

        let affected = sqlx::query("DELETE FROM happy_customer_score WHERE store_code = $1")
            .bind(store_code)
            .execute(&mut conn)
            .await?
            .rows_affected();

        if affected == 0 {
            return Err(ApiError::NotFound("store".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    fn test_gateway() -> ConnectionGateway {
        let config = test_config();
        let identity = TokenProvider::new(&config);
        ConnectionGateway::new(&config, identity)
    }

    #[test]
    fn test_connect_options_carry_database_coordinates() {
        let gateway = test_gateway();
        let opts = gateway.connect_options("eyJ-access-token");

        assert_eq!(opts.get_host(), "db.example.net");
        assert_eq!(opts.get_port(), 5432);
        assert_eq!(opts.get_username(), "endpoint-admin");
        assert_eq!(opts.get_database(), Some("endpoint_db"));
    }

    #[test]
    fn test_score_row_json_shape() {
        let score = CustomerScore {
            metric: "hcs_physical".into(),
            channel: "physical".into(),
            store_code: "STO090".into(),
            country: "Denmark".into(),
            score: 90,
        };

        let value = serde_json::to_value(&score).unwrap();
        assert_eq!(value["store_code"], "STO090");
        assert_eq!(value["score"], 90);
    }

    #[test]
    fn test_score_row_deserializes_from_request_body() {
        let body = r#"{
            "metric": "hcs_physical",
            "channel": "physical",
            "store_code": "STO088",
            "country": "India",
            "score": 90
        }"#;

        let score: CustomerScore = serde_json::from_str(body).unwrap();
        assert_eq!(score.country, "India");
    }
}
