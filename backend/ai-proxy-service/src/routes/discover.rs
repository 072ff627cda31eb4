use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::error::AppError;
use crate::metrics;
use crate::middleware::guards::User;
use crate::parse::parse_string_list;
use crate::prompts::DiscoverCategory;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct DiscoverRequest {
    pub category: DiscoverCategory,
}

/// POST /api/v1/discover
pub async fn discover(
    State(state): State<AppState>,
    user: User,
    Json(body): Json<DiscoverRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.limits.check("discover", user.id)?;

    metrics::GATEWAY_CALLS.inc();
    let raw = state
        .gateway
        .complete(body.category.system_prompt(), "Go.")
        .await?;
    let suggestions = parse_string_list(&raw);

    Ok(Json(serde_json::json!({
        "success": true,
        "suggestions": suggestions,
    })))
}
