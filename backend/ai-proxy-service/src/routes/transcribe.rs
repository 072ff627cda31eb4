use axum::extract::{Multipart, State};
use axum::Json;

use crate::error::AppError;
use crate::metrics;
use crate::middleware::guards::User;
use crate::state::AppState;

const MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

/// POST /api/v1/voice-transcribe (multipart, field `audio`)
pub async fn voice_transcribe(
    State(state): State<AppState>,
    user: User,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    state.limits.check("voice-transcribe", user.id)?;

    let mut audio: Option<(Vec<u8>, String, String)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("audio") {
            continue;
        }
        let filename = field
            .file_name()
            .unwrap_or("recording.webm")
            .to_string();
        let mime = field
            .content_type()
            .unwrap_or("audio/webm")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read audio field: {e}")))?;
        audio = Some((bytes.to_vec(), filename, mime));
    }

    let (bytes, filename, mime) =
        audio.ok_or_else(|| AppError::BadRequest("missing audio field".into()))?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest("audio field is empty".into()));
    }
    if bytes.len() > MAX_AUDIO_BYTES {
        return Err(AppError::BadRequest("audio exceeds 25MB".into()));
    }

    metrics::GATEWAY_CALLS.inc();
    let text = state.gateway.transcribe(bytes, filename, mime).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "text": text,
    })))
}
