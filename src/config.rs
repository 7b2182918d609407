use anyhow::{Context, Result};

/// Application configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // ── Server ──────────────────────────────────────────────────────────
    pub host: String,
    pub port: u16,

    // ── Identity provider (client-credentials flow) ─────────────────────
    /// Authority base URL, e.g. `https://login.microsoftonline.com`.
    pub authority_url: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    /// Resource scope the token is requested for (the database resource).
    pub token_scope: String,

    // ── Database (PostgreSQL, token-authenticated) ──────────────────────
    pub database_host: String,
    pub database_port: u16,
    pub database_name: String,
    pub database_user: String,
    pub database_connect_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .context("Invalid PORT")?,

            authority_url: std::env::var("AUTHORITY_URL")
                .unwrap_or_else(|_| "https://login.microsoftonline.com".into()),
            tenant_id: std::env::var("TENANT_ID")
                .context("TENANT_ID is required (identity provider tenant)")?,
            client_id: std::env::var("CLIENT_ID")
                .context("CLIENT_ID is required (service principal app id)")?,
            client_secret: std::env::var("CLIENT_SECRET")
                .context("CLIENT_SECRET is required (service principal secret)")?,
            token_scope: std::env::var("TOKEN_SCOPE")
                .unwrap_or_else(|_| "https://ossrdbms-aad.database.windows.net/.default".into()),

            database_host: std::env::var("DATABASE_HOST")
                .context("DATABASE_HOST is required (database server hostname)")?,
            database_port: std::env::var("DATABASE_PORT")
                .unwrap_or_else(|_| "5432".into())
                .parse()
                .context("Invalid DATABASE_PORT")?,
            database_name: std::env::var("DATABASE_NAME")
                .unwrap_or_else(|_| "endpoint_db".into()),
            database_user: std::env::var("DATABASE_USER")
                .unwrap_or_else(|_| "endpoint-admin".into()),
            database_connect_timeout_secs: std::env::var("DATABASE_CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .context("Invalid DATABASE_CONNECT_TIMEOUT_SECS")?,
        })
    }

    /// Token endpoint for the configured tenant (OAuth 2.0 v2 shape).
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_url.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        host: "0.0.0.0".into(),
        port: 8080,
        authority_url: "https://login.microsoftonline.com".into(),
        tenant_id: "11111111-2222-3333-4444-555555555555".into(),
        client_id: "app-id".into(),
        client_secret: "app-secret".into(),
        token_scope: "https://ossrdbms-aad.database.windows.net/.default".into(),
        database_host: "db.example.net".into(),
        database_port: 5432,
        database_name: "endpoint_db".into(),
        database_user: "endpoint-admin".into(),
        database_connect_timeout_secs: 30,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_url_includes_tenant() {
        let config = test_config();
        assert_eq!(
            config.token_url(),
            "https://login.microsoftonline.com/11111111-2222-3333-4444-555555555555/oauth2/v2.0/token"
        );
    }

    #[test]
    fn test_token_url_trims_trailing_slash() {
        let mut config = test_config();
        config.authority_url = "https://login.microsoftonline.com/".into();
        assert_eq!(
            config.token_url(),
            "https://login.microsoftonline.com/11111111-2222-3333-4444-555555555555/oauth2/v2.0/token"
        );
    }
}
