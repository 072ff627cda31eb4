use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::services::share_service::{is_valid_token_format, SharedConversationView, ShareService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SharedConversationQuery {
    #[serde(alias = "conversationId")]
    pub conversation_id: String,
    pub token: String,
}

/// GET /api/v1/shared-conversation?conversationId=...&token=...
///
/// Unauthenticated read-only access to one conversation. Shape validation
/// happens before any lookup; the token comparison inside the service is
/// constant-time.
pub async fn shared_conversation(
    State(state): State<AppState>,
    Query(query): Query<SharedConversationQuery>,
) -> Result<Json<SharedConversationView>, AppError> {
    let conversation_id = Uuid::parse_str(&query.conversation_id)
        .map_err(|_| AppError::BadRequest("malformed conversation id".into()))?;

    if !is_valid_token_format(&query.token) {
        return Err(AppError::BadRequest("malformed token".into()));
    }

    let view = ShareService::resolve(&state.db, conversation_id, &query.token).await?;
    Ok(Json(view))
}
