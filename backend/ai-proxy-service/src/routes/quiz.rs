use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::metrics;
use crate::middleware::guards::{verify_conversation_access, User};
use crate::parse::parse_quiz;
use crate::prompts;
use crate::services::artifacts::ArtifactService;
use crate::state::AppState;

const DEFAULT_QUESTIONS: u32 = 5;
const MAX_QUESTIONS: u32 = 20;

#[derive(Deserialize)]
pub struct GenerateQuizRequest {
    pub topic: String,
    pub question_count: Option<u32>,
    pub conversation_id: Option<Uuid>,
}

/// POST /api/v1/generate-quiz
pub async fn generate_quiz(
    State(state): State<AppState>,
    user: User,
    Json(body): Json<GenerateQuizRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.limits.check("generate-quiz", user.id)?;

    if body.topic.trim().is_empty() {
        return Err(AppError::BadRequest("topic is empty".into()));
    }
    let count = body
        .question_count
        .unwrap_or(DEFAULT_QUESTIONS)
        .clamp(1, MAX_QUESTIONS);
    if let Some(conversation_id) = body.conversation_id {
        verify_conversation_access(&state.db, user.id, conversation_id).await?;
    }

    let prompt = format!("Topic: {}\nNumber of questions: {count}", body.topic.trim());
    metrics::GATEWAY_CALLS.inc();
    let raw = state.gateway.complete(prompts::QUIZ, &prompt).await?;
    let questions = parse_quiz(&raw)?;

    let (quiz, rows) = ArtifactService::insert_quiz(
        &state.db,
        user.id,
        body.conversation_id,
        body.topic.trim(),
        &questions,
    )
    .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "quiz": quiz,
        "questions": rows,
    })))
}
