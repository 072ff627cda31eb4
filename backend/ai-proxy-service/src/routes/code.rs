use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::error::AppError;
use crate::metrics;
use crate::middleware::guards::User;
use crate::prompts;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct GenerateCodeRequest {
    pub prompt: String,
    pub language: Option<String>,
}

/// POST /api/v1/generate-code
pub async fn generate_code(
    State(state): State<AppState>,
    user: User,
    Json(body): Json<GenerateCodeRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.limits.check("generate-code", user.id)?;

    if body.prompt.trim().is_empty() {
        return Err(AppError::BadRequest("prompt is empty".into()));
    }

    let prompt = match body.language.as_deref().filter(|l| !l.trim().is_empty()) {
        Some(language) => format!("Language: {language}\n\n{}", body.prompt.trim()),
        None => body.prompt.trim().to_string(),
    };

    metrics::GATEWAY_CALLS.inc();
    let content = state.gateway.complete(prompts::CODE, &prompt).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "content": content,
    })))
}
