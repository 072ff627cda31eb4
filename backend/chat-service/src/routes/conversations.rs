use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use realtime_core::{ChangeEvent, RealtimeEvent, Topic};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::guards::{ConversationOwner, User};
use crate::models::conversation::Conversation;
use crate::services::conversation_service::ConversationService;
use crate::services::share_service::ShareService;
use crate::state::AppState;
use crate::websocket::broadcast::broadcast_event;

/// Emit a conversation change to every user whose list contains it.
async fn broadcast_to_audience(
    state: &AppState,
    audience: &[Uuid],
    event: &RealtimeEvent,
) {
    for user_id in audience {
        broadcast_event(
            &state.registry,
            &state.redis,
            Topic::Conversations(*user_id),
            event,
        )
        .await;
    }
}

fn conversation_row(conversation: &Conversation) -> serde_json::Value {
    // The realtime row mirrors the API shape: no share token.
    serde_json::to_value(conversation).unwrap_or_default()
}

pub async fn list_conversations(
    State(state): State<AppState>,
    user: User,
) -> Result<Json<Vec<Conversation>>, AppError> {
    let conversations = ConversationService::list_for_user(&state.db, user.id).await?;
    Ok(Json(conversations))
}

#[derive(Deserialize)]
pub struct CreateConversationRequest {
    pub title: Option<String>,
}

pub async fn create_conversation(
    State(state): State<AppState>,
    user: User,
    Json(body): Json<CreateConversationRequest>,
) -> Result<(StatusCode, Json<Conversation>), AppError> {
    let title = body.title.as_deref().unwrap_or("New conversation");
    let conversation = ConversationService::create(&state.db, user.id, title).await?;

    broadcast_to_audience(
        &state,
        &[user.id],
        &RealtimeEvent::Change(ChangeEvent::insert(
            "conversations",
            conversation_row(&conversation),
        )),
    )
    .await;

    Ok((StatusCode::CREATED, Json(conversation)))
}

#[derive(Deserialize)]
pub struct UpdateConversationRequest {
    pub title: Option<String>,
    pub pinned: Option<bool>,
}

pub async fn update_conversation(
    State(state): State<AppState>,
    user: User,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateConversationRequest>,
) -> Result<Json<Conversation>, AppError> {
    ConversationOwner::verify(&state.db, user.id, id).await?;

    if body.title.is_none() && body.pinned.is_none() {
        return Err(AppError::BadRequest("nothing to update".into()));
    }

    let conversation =
        ConversationService::update(&state.db, id, body.title.as_deref(), body.pinned).await?;

    let audience = ConversationService::audience(&state.db, id).await?;
    broadcast_to_audience(
        &state,
        &audience,
        &RealtimeEvent::Change(ChangeEvent::update(
            "conversations",
            conversation_row(&conversation),
        )),
    )
    .await;

    Ok(Json(conversation))
}

pub async fn delete_conversation(
    State(state): State<AppState>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ConversationOwner::verify(&state.db, user.id, id).await?;

    // Audience is fetched before the delete cascades the membership rows.
    let audience = ConversationService::audience(&state.db, id).await?;
    ConversationService::delete(&state.db, id).await?;

    broadcast_to_audience(
        &state,
        &audience,
        &RealtimeEvent::Change(ChangeEvent::delete("conversations", id)),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct SetCollaborationRequest {
    pub enabled: bool,
}

/// Toggle collaboration. Enabling upserts the owner membership; disabling
/// flips the flag only; memberships and the share token survive.
pub async fn set_collaboration(
    State(state): State<AppState>,
    user: User,
    Path(id): Path<Uuid>,
    Json(body): Json<SetCollaborationRequest>,
) -> Result<Json<Conversation>, AppError> {
    ConversationOwner::verify(&state.db, user.id, id).await?;

    let conversation =
        ConversationService::set_collaborative(&state.db, id, user.id, body.enabled).await?;

    let audience = ConversationService::audience(&state.db, id).await?;
    broadcast_to_audience(
        &state,
        &audience,
        &RealtimeEvent::Change(ChangeEvent::update(
            "conversations",
            conversation_row(&conversation),
        )),
    )
    .await;

    if body.enabled {
        // Owner membership appears in the members feed as well.
        if let Ok(members) =
            crate::services::member_service::MemberService::list_members(&state.db, id).await
        {
            if let Some(owner_row) = members.iter().find(|m| m.user_id == user.id) {
                broadcast_event(
                    &state.registry,
                    &state.redis,
                    Topic::Members(id),
                    &RealtimeEvent::Change(ChangeEvent::insert(
                        "conversation_members",
                        serde_json::to_value(owner_row).unwrap_or_default(),
                    )),
                )
                .await;
            }
        }
    }

    Ok(Json(conversation))
}

pub async fn create_share_token(
    State(state): State<AppState>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    ConversationOwner::verify(&state.db, user.id, id).await?;
    let token = ShareService::issue(&state.db, id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "share_token": token,
    })))
}

pub async fn revoke_share_token(
    State(state): State<AppState>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ConversationOwner::verify(&state.db, user.id, id).await?;
    ShareService::revoke(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
