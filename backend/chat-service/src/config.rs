use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Max invite attempts per user within the invite window.
    pub invite_rate_max: u32,
    pub invite_rate_window_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, crate::error::AppError> {
        dotenv().ok();
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| crate::error::AppError::Config("DATABASE_URL missing".into()))?;
        let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into());
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| crate::error::AppError::Config("JWT_SECRET missing".into()))?;
        let invite_rate_max = env::var("INVITE_RATE_MAX")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);
        let invite_rate_window_secs = env::var("INVITE_RATE_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        Ok(Self {
            database_url,
            redis_url,
            port,
            jwt_secret,
            invite_rate_max,
            invite_rate_window_secs,
        })
    }

    #[cfg(test)]
    pub fn test_defaults() -> Self {
        Self {
            database_url: "postgres://localhost/huddle_test".into(),
            redis_url: "redis://127.0.0.1:6379/0".into(),
            port: 8080,
            jwt_secret: "test-secret".into(),
            invite_rate_max: 5,
            invite_rate_window_secs: 60,
        }
    }
}
