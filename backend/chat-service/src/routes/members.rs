use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rate_limit::RateLimiter;
use realtime_core::{ChangeEvent, RealtimeEvent, Topic};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::metrics;
use crate::middleware::guards::{verify_access, ConversationOwner, User};
use crate::models::member::MemberWithProfile;
use crate::services::invite_service::{InviteOutcome, InviteService};
use crate::services::member_service::MemberService;
use crate::services::notification_service::NotificationService;
use crate::state::AppState;
use crate::websocket::broadcast::broadcast_event;

pub async fn list_members(
    State(state): State<AppState>,
    user: User,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<Vec<MemberWithProfile>>, AppError> {
    verify_access(&state.db, user.id, conversation_id).await?;
    let members = MemberService::list_members(&state.db, conversation_id).await?;
    Ok(Json(members))
}

#[derive(Deserialize)]
pub struct InviteRequest {
    pub username: String,
}

/// Invite a user by username.
///
/// The response body and status are identical whether the username exists,
/// is already a member, or was newly added; only the audit log tells the
/// branches apart.
pub async fn invite_user(
    State(state): State<AppState>,
    user: User,
    Path(conversation_id): Path<Uuid>,
    Json(body): Json<InviteRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let owner = ConversationOwner::verify(&state.db, user.id, conversation_id).await?;
    if !owner.is_collaborative {
        return Err(AppError::Forbidden);
    }

    let username = body.username.trim();
    if username.is_empty() {
        return Err(AppError::BadRequest("username is required".into()));
    }

    if !state.invite_limiter.check(&user.id.to_string()).is_allowed() {
        metrics::RATE_LIMITED.inc();
        return Err(AppError::RateLimited);
    }

    let outcome = InviteService::invite(&state.db, conversation_id, username).await?;

    match &outcome {
        InviteOutcome::Added { member, invitee } => {
            tracing::info!(conversation_id = %conversation_id, invitee = %invitee,
                "invite: member added");

            broadcast_event(
                &state.registry,
                &state.redis,
                Topic::Members(conversation_id),
                &RealtimeEvent::Change(ChangeEvent::insert(
                    "conversation_members",
                    serde_json::to_value(member).unwrap_or_default(),
                )),
            )
            .await;

            let notification = NotificationService::create(
                &state.db,
                *invitee,
                Some(user.id),
                "conversation_invite",
                serde_json::json!({ "conversation_id": conversation_id }),
            )
            .await?;
            broadcast_event(
                &state.registry,
                &state.redis,
                Topic::Notifications(*invitee),
                &RealtimeEvent::Change(ChangeEvent::insert(
                    "notifications",
                    serde_json::to_value(&notification).unwrap_or_default(),
                )),
            )
            .await;
        }
        InviteOutcome::AlreadyMember { invitee } => {
            tracing::info!(conversation_id = %conversation_id, invitee = %invitee,
                "invite: already a member");
        }
        InviteOutcome::NotFound => {
            tracing::info!(conversation_id = %conversation_id, "invite: username not found");
        }
    }

    if let Some(delay) = outcome.artificial_delay() {
        tokio::time::sleep(delay).await;
    }

    Ok(Json(outcome.uniform_response()))
}

/// Leave a conversation: delete the caller's own membership row.
pub async fn leave_conversation(
    State(state): State<AppState>,
    user: User,
    Path(conversation_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let removed = MemberService::remove_member(&state.db, conversation_id, user.id).await?;
    if !removed {
        return Err(AppError::NotFound);
    }

    broadcast_event(
        &state.registry,
        &state.redis,
        Topic::Members(conversation_id),
        &RealtimeEvent::Change(ChangeEvent::delete("conversation_members", user.id)),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
