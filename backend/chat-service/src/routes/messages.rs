use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use realtime_core::{ChangeEvent, RealtimeEvent, Topic};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::guards::{verify_access, User};
use crate::models::message::{Message, ROLE_USER};
use crate::services::message_service::MessageService;
use crate::state::AppState;
use crate::websocket::broadcast::broadcast_event;

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

pub async fn get_message_history(
    State(state): State<AppState>,
    user: User,
    Path(conversation_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<Message>>, AppError> {
    verify_access(&state.db, user.id, conversation_id).await?;
    let messages = MessageService::list(&state.db, conversation_id, query.limit).await?;
    Ok(Json(messages))
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
    #[serde(default)]
    pub attachments: Option<serde_json::Value>,
}

pub async fn send_message(
    State(state): State<AppState>,
    user: User,
    Path(conversation_id): Path<Uuid>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    verify_access(&state.db, user.id, conversation_id).await?;

    if body.content.trim().is_empty() {
        return Err(AppError::BadRequest("message content is empty".into()));
    }

    let attachments = body.attachments.unwrap_or_else(|| serde_json::json!([]));
    let message = MessageService::create(
        &state.db,
        conversation_id,
        Some(user.id),
        ROLE_USER,
        &body.content,
        attachments,
    )
    .await?;

    broadcast_event(
        &state.registry,
        &state.redis,
        Topic::Messages(conversation_id),
        &RealtimeEvent::Change(ChangeEvent::insert(
            "messages",
            serde_json::to_value(&message).unwrap_or_default(),
        )),
    )
    .await;

    Ok((StatusCode::CREATED, Json(message)))
}

#[derive(Deserialize)]
pub struct PinMessageRequest {
    pub pinned: bool,
}

/// Pin or unpin a message. Allowed for its author and for the conversation
/// owner.
pub async fn set_message_pinned(
    State(state): State<AppState>,
    user: User,
    Path(message_id): Path<Uuid>,
    Json(body): Json<PinMessageRequest>,
) -> Result<Json<Message>, AppError> {
    let message = MessageService::get(&state.db, message_id).await?;

    let is_author = message.author_id == Some(user.id);
    if !is_author {
        let conversation =
            crate::services::conversation_service::ConversationService::get(
                &state.db,
                message.conversation_id,
            )
            .await?;
        if conversation.owner_id != user.id {
            return Err(AppError::Forbidden);
        }
    }

    let updated = MessageService::set_pinned(&state.db, message_id, body.pinned).await?;

    broadcast_event(
        &state.registry,
        &state.redis,
        Topic::Messages(updated.conversation_id),
        &RealtimeEvent::Change(ChangeEvent::update(
            "messages",
            serde_json::to_value(&updated).unwrap_or_default(),
        )),
    )
    .await;

    Ok(Json(updated))
}
