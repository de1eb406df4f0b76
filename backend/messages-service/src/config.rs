use dotenvy::dotenv;
use std::env;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Config("DATABASE_URL missing".into()))?;
        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| AppError::Config("JWT_SECRET missing".into()))?;

        let host = env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);
        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(20);
        let run_migrations = env::var("RUN_MIGRATIONS")
            .unwrap_or_else(|_| "true".into())
            .eq_ignore_ascii_case("true");

        Ok(Self {
            host,
            port,
            database_url,
            database_max_connections,
            jwt_secret,
            run_migrations,
        })
    }

    #[cfg(test)]
    pub fn test_defaults() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            database_url: "postgres://localhost/test".into(),
            database_max_connections: 5,
            jwt_secret: "test-secret".into(),
            run_migrations: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_complete() {
        let cfg = Config::test_defaults();
        assert!(!cfg.database_url.is_empty());
        assert!(!cfg.jwt_secret.is_empty());
        assert_eq!(cfg.port, 8080);
    }
}
