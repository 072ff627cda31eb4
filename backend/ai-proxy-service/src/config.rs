use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Hosted model gateway (chat completions, image generation).
    pub gateway_base_url: String,
    pub gateway_api_key: String,
    pub chat_model: String,
    pub image_model: String,
    /// Speech transcription endpoint; the transcribe route is disabled
    /// without a key.
    pub speech_api_key: Option<String>,
    pub speech_model: String,
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
            .unwrap_or(8081);
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| crate::error::AppError::Config("JWT_SECRET missing".into()))?;
        let gateway_base_url = env::var("MODEL_GATEWAY_URL")
            .map_err(|_| crate::error::AppError::Config("MODEL_GATEWAY_URL missing".into()))?;
        let gateway_api_key = env::var("MODEL_GATEWAY_API_KEY")
            .map_err(|_| crate::error::AppError::Config("MODEL_GATEWAY_API_KEY missing".into()))?;
        let chat_model =
            env::var("MODEL_GATEWAY_CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        let image_model =
            env::var("MODEL_GATEWAY_IMAGE_MODEL").unwrap_or_else(|_| "gpt-image-1".into());
        let speech_api_key = env::var("SPEECH_API_KEY").ok().filter(|k| !k.trim().is_empty());
        let speech_model = env::var("SPEECH_MODEL").unwrap_or_else(|_| "whisper-1".into());

        Ok(Self {
            database_url,
            redis_url,
            port,
            jwt_secret,
            gateway_base_url,
            gateway_api_key,
            chat_model,
            image_model,
            speech_api_key,
            speech_model,
        })
    }

    #[cfg(test)]
    pub fn test_defaults() -> Self {
        Self {
            database_url: "postgres://localhost/huddle_test".into(),
            redis_url: "redis://127.0.0.1:6379/0".into(),
            port: 8081,
            jwt_secret: "test-secret".into(),
            gateway_base_url: "http://127.0.0.1:9999".into(),
            gateway_api_key: "test-key".into(),
            chat_model: "gpt-4o-mini".into(),
            image_model: "gpt-image-1".into(),
            speech_api_key: None,
            speech_model: "whisper-1".into(),
        }
    }
}
