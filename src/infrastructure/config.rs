use anyhow::{Context, Result};
use tracing::{info, warn};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TOKEN_TTL_SECONDS: i64 = 3600;
const DEV_JWT_SECRET: &str = "dev-only-insecure-jwt-secret";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_seconds: i64,
    /// `None` means permissive CORS.
    pub cors_allowed_origin: Option<String>,
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenv::dotenv() {
            info!(path = %path.display(), "Loaded environment file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("APP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match var("APP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("APP_PORT must be a port number, got {raw:?}"))?,
            None => DEFAULT_PORT,
        };

        let token_ttl_seconds = match var("JWT_TTL_SECONDS") {
            Some(raw) => {
                let ttl = raw
                    .trim()
                    .parse::<i64>()
                    .with_context(|| format!("JWT_TTL_SECONDS must be an integer, got {raw:?}"))?;
                anyhow::ensure!(ttl > 0, "JWT_TTL_SECONDS must be positive, got {ttl}");
                ttl
            }
            None => DEFAULT_TOKEN_TTL_SECONDS,
        };

        let jwt_secret = match var("JWT_SECRET") {
            Some(secret) => secret,
            None if cfg!(debug_assertions) => {
                warn!("JWT_SECRET is not set; using the development secret");
                DEV_JWT_SECRET.to_string()
            }
            None => anyhow::bail!("JWT_SECRET must be set"),
        };

        Ok(Self {
            host,
            port,
            jwt_secret,
            token_ttl_seconds,
            cors_allowed_origin: var("CORS_ALLOWED_ORIGIN"),
        })
    }
}
