use axum::extract::State;
use axum::Json;
use realtime_core::{ChangeEvent, RealtimeEvent, Topic};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::gateway::ChatTurn;
use crate::metrics;
use crate::middleware::guards::{verify_conversation_access, User};
use crate::prompts::Persona;
use crate::publish::publish_event;
use crate::services::artifacts::ArtifactService;
use crate::state::AppState;

const CONTEXT_TURNS: i64 = 20;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub conversation_id: Uuid,
    pub content: String,
    #[serde(default)]
    pub persona: Option<Persona>,
}

/// POST /api/v1/chat
///
/// The user's own message row is written by the chat service before this is
/// called; this endpoint produces and persists the assistant reply.
pub async fn chat(
    State(state): State<AppState>,
    user: User,
    Json(body): Json<ChatRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.limits.check("chat", user.id)?;
    verify_conversation_access(&state.db, user.id, body.conversation_id).await?;

    if body.content.trim().is_empty() {
        return Err(AppError::BadRequest("content is empty".into()));
    }

    let persona = body.persona.unwrap_or_default();
    let history = ArtifactService::recent_turns(&state.db, body.conversation_id, CONTEXT_TURNS)
        .await?;

    let mut turns = vec![ChatTurn::system(persona.system_prompt())];
    for (role, content) in &history {
        if role == "assistant" {
            turns.push(ChatTurn::assistant(content.clone()));
        } else {
            turns.push(ChatTurn::user(content.clone()));
        }
    }
    // The triggering message is usually the tail of the history already;
    // append it only when it is not.
    if history.last().map(|(_, c)| c.as_str()) != Some(body.content.as_str()) {
        turns.push(ChatTurn::user(body.content.clone()));
    }

    metrics::GATEWAY_CALLS.inc();
    let reply = state.gateway.chat_completion(&turns).await?;

    let message = ArtifactService::insert_assistant_message(
        &state.db,
        body.conversation_id,
        &reply,
        serde_json::json!([]),
    )
    .await?;

    publish_event(
        &state.redis,
        Topic::Messages(body.conversation_id),
        &RealtimeEvent::Change(ChangeEvent::insert(
            "messages",
            serde_json::to_value(&message).unwrap_or_default(),
        )),
    )
    .await;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": message,
    })))
}
