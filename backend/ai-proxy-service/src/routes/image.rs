use axum::extract::State;
use axum::Json;
use realtime_core::{ChangeEvent, RealtimeEvent, Topic};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::metrics;
use crate::middleware::guards::{verify_conversation_access, User};
use crate::publish::publish_event;
use crate::services::artifacts::ArtifactService;
use crate::state::AppState;

const DEFAULT_SIZE: &str = "1024x1024";
const ALLOWED_SIZES: [&str; 3] = ["1024x1024", "1024x1536", "1536x1024"];

#[derive(Deserialize)]
pub struct GenerateImageRequest {
    pub conversation_id: Uuid,
    pub prompt: String,
    pub size: Option<String>,
}

/// POST /api/v1/generate-image
pub async fn generate_image(
    State(state): State<AppState>,
    user: User,
    Json(body): Json<GenerateImageRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.limits.check("generate-image", user.id)?;
    verify_conversation_access(&state.db, user.id, body.conversation_id).await?;

    if body.prompt.trim().is_empty() {
        return Err(AppError::BadRequest("prompt is empty".into()));
    }
    let size = body.size.as_deref().unwrap_or(DEFAULT_SIZE);
    if !ALLOWED_SIZES.contains(&size) {
        return Err(AppError::BadRequest(format!("unsupported size {size}")));
    }

    metrics::GATEWAY_CALLS.inc();
    let data_url = state.gateway.generate_image(&body.prompt, size).await?;

    let attachments = serde_json::json!([{
        "type": "image",
        "url": data_url,
    }]);
    let message = ArtifactService::insert_assistant_message(
        &state.db,
        body.conversation_id,
        &body.prompt,
        attachments,
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
