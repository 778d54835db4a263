use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use crate::domains::auth::password::MIN_PASSWORD_LEN;
use crate::domains::users::AdminAccount;
use crate::server::graphql::SKIP_AUTH;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub auth_cookie_name: String,
    pub token_ttl_hours: i64,
    pub cookie_secure: bool,
    /// Directive names that let a root field skip authentication
    pub skip_auth_directives: Vec<String>,
    /// Origins allowed to send credentialed requests; empty allows any
    /// origin without credentials
    pub allowed_origins: Vec<String>,
    /// Account ensured on startup so a fresh database can be logged into
    pub bootstrap_admin: Option<AdminAccount>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        let skip_auth_directives = split_list(&or("SKIP_AUTH_DIRECTIVES", SKIP_AUTH));
        let bootstrap_admin = bootstrap_admin(
            lookup("BOOTSTRAP_ADMIN_NAME"),
            lookup("BOOTSTRAP_ADMIN_PASSWORD"),
        )?;

        Ok(Self {
            database_url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: or("PORT", "8080")
                .parse()
                .context("PORT must be a valid number")?,
            db_max_connections: or("DB_MAX_CONNECTIONS", "10")
                .parse()
                .context("DB_MAX_CONNECTIONS must be a valid number")?,
            jwt_secret,
            jwt_issuer: or("JWT_ISSUER", "cas"),
            auth_cookie_name: or("AUTH_COOKIE_NAME", "token"),
            token_ttl_hours: or("TOKEN_TTL_HOURS", "24")
                .parse()
                .context("TOKEN_TTL_HOURS must be a valid number")?,
            cookie_secure: parse_bool(&or("COOKIE_SECURE", "false"))
                .context("COOKIE_SECURE must be true or false")?,
            skip_auth_directives,
            allowed_origins: split_list(&or("ALLOWED_ORIGINS", "")),
            bootstrap_admin,
        })
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours)
    }
}

fn bootstrap_admin(name: Option<String>, password: Option<String>) -> Result<Option<AdminAccount>> {
    let name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    match (name, password) {
        (None, None) => Ok(None),
        (Some(name), Some(password)) => {
            if password.chars().count() < MIN_PASSWORD_LEN {
                anyhow::bail!(
                    "BOOTSTRAP_ADMIN_PASSWORD must be at least {} characters",
                    MIN_PASSWORD_LEN
                );
            }
            Ok(Some(AdminAccount { name, password }))
        }
        _ => anyhow::bail!(
            "BOOTSTRAP_ADMIN_NAME and BOOTSTRAP_ADMIN_PASSWORD must be set together"
        ),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
