use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::error::AppError;
use crate::metrics;
use crate::middleware::guards::User;
use crate::prompts;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct WebSearchRequest {
    pub query: String,
}

/// POST /api/v1/web-search
pub async fn web_search(
    State(state): State<AppState>,
    user: User,
    Json(body): Json<WebSearchRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.limits.check("web-search", user.id)?;

    if body.query.trim().is_empty() {
        return Err(AppError::BadRequest("query is empty".into()));
    }

    metrics::GATEWAY_CALLS.inc();
    let answer = state
        .gateway
        .complete(prompts::WEB_SEARCH, body.query.trim())
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "answer": answer,
    })))
}
