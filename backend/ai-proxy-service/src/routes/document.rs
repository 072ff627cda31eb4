use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::metrics;
use crate::middleware::guards::User;
use crate::prompts;
use crate::services::artifacts::ArtifactService;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct GenerateDocumentRequest {
    pub prompt: String,
    pub title: Option<String>,
}

/// POST /api/v1/generate-document
pub async fn generate_document(
    State(state): State<AppState>,
    user: User,
    Json(body): Json<GenerateDocumentRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.limits.check("generate-document", user.id)?;

    if body.prompt.trim().is_empty() {
        return Err(AppError::BadRequest("prompt is empty".into()));
    }

    metrics::GATEWAY_CALLS.inc();
    let content = state
        .gateway
        .complete(prompts::DOCUMENT, body.prompt.trim())
        .await?;

    let title = body
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or("Generated document");
    let document = ArtifactService::insert_document(&state.db, user.id, title, &content).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "document": document,
    })))
}

#[derive(Deserialize)]
pub struct ProcessDocumentRequest {
    pub document_id: Uuid,
}

/// POST /api/v1/process-document
///
/// Normalizes a stored document into plain extracted text.
pub async fn process_document(
    State(state): State<AppState>,
    user: User,
    Json(body): Json<ProcessDocumentRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.limits.check("process-document", user.id)?;

    let document = ArtifactService::get_document(&state.db, user.id, body.document_id).await?;
    if document.content.trim().is_empty() {
        return Err(AppError::BadRequest("document has no content".into()));
    }

    metrics::GATEWAY_CALLS.inc();
    let extracted = state
        .gateway
        .complete(prompts::EXTRACT_TEXT, &document.content)
        .await?;

    let updated =
        ArtifactService::mark_document_extracted(&state.db, document.id, &extracted).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "document": updated,
    })))
}
