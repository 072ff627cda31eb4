use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::metrics;
use crate::middleware::guards::{verify_conversation_access, User};
use crate::parse::parse_string_list;
use crate::prompts;
use crate::services::artifacts::ArtifactService;
use crate::state::AppState;

const CONTEXT_TURNS: i64 = 10;

#[derive(Deserialize)]
pub struct SuggestRequest {
    pub conversation_id: Uuid,
}

/// POST /api/v1/ai-suggest
///
/// Proposes short replies the user might send next.
pub async fn ai_suggest(
    State(state): State<AppState>,
    user: User,
    Json(body): Json<SuggestRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.limits.check("ai-suggest", user.id)?;
    verify_conversation_access(&state.db, user.id, body.conversation_id).await?;

    let history =
        ArtifactService::recent_turns(&state.db, body.conversation_id, CONTEXT_TURNS).await?;
    if history.is_empty() {
        return Ok(Json(serde_json::json!({
            "success": true,
            "suggestions": Vec::<String>::new(),
        })));
    }

    let transcript = history
        .iter()
        .map(|(role, content)| format!("{role}: {content}"))
        .collect::<Vec<_>>()
        .join("\n");

    metrics::GATEWAY_CALLS.inc();
    let raw = state.gateway.complete(prompts::SUGGEST, &transcript).await?;
    let suggestions = parse_string_list(&raw);

    Ok(Json(serde_json::json!({
        "success": true,
        "suggestions": suggestions,
    })))
}
