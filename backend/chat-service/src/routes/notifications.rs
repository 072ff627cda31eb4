use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use realtime_core::{ChangeEvent, RealtimeEvent, Topic};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::guards::User;
use crate::services::notification_service::NotificationService;
use crate::state::AppState;
use crate::websocket::broadcast::broadcast_event;

#[derive(Debug, Deserialize)]
pub struct GetNotificationsQuery {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    20
}

pub async fn get_notifications(
    State(state): State<AppState>,
    user: User,
    Query(params): Query<GetNotificationsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let page = NotificationService::list(&state.db, user.id, params.limit, params.offset).await?;
    Ok(Json(serde_json::json!({
        "notifications": page.notifications,
        "unread_count": page.unread_count,
        "limit": params.limit,
        "offset": params.offset,
    })))
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    user: User,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let notification =
        NotificationService::mark_read(&state.db, user.id, notification_id).await?;

    broadcast_event(
        &state.registry,
        &state.redis,
        Topic::Notifications(user.id),
        &RealtimeEvent::Change(ChangeEvent::update(
            "notifications",
            serde_json::to_value(&notification).unwrap_or_default(),
        )),
    )
    .await;

    Ok(Json(serde_json::json!({
        "success": true,
        "notification": notification,
    })))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    user: User,
) -> Result<Json<serde_json::Value>, AppError> {
    let updated = NotificationService::mark_all_read(&state.db, user.id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "updated": updated,
    })))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    user: User,
    Path(notification_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    NotificationService::delete(&state.db, user.id, notification_id).await?;

    broadcast_event(
        &state.registry,
        &state.redis,
        Topic::Notifications(user.id),
        &RealtimeEvent::Change(ChangeEvent::delete("notifications", notification_id)),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
