//! Write-back of generated artifacts
//!
//! Each proxy call produces exactly one artifact (an assistant message, a
//! quiz with its questions, or a document), persisted before the response
//! envelope is returned.

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Document, Message, Quiz, QuizQuestion};

pub struct ArtifactService;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ParsedQuestion {
    pub prompt: String,
    pub choices: Vec<String>,
    pub answer_index: i32,
}

impl ArtifactService {
    /// Persist an assistant reply (author NULL) and bump the conversation.
    pub async fn insert_assistant_message(
        db: &Pool<Postgres>,
        conversation_id: Uuid,
        content: &str,
        attachments: serde_json::Value,
    ) -> Result<Message, AppError> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (conversation_id, author_id, role, content, attachments)
            VALUES ($1, NULL, 'assistant', $2, $3)
            RETURNING id, conversation_id, author_id, role, content, pinned, attachments,
                      created_at, updated_at
            "#,
        )
        .bind(conversation_id)
        .bind(content)
        .bind(attachments)
        .fetch_one(db)
        .await?;

        sqlx::query("UPDATE conversations SET updated_at = now() WHERE id = $1")
            .bind(conversation_id)
            .execute(db)
            .await?;

        Ok(message)
    }

    /// Recent turns for context, oldest first, as (role, content) pairs.
    pub async fn recent_turns(
        db: &Pool<Postgres>,
        conversation_id: Uuid,
        limit: i64,
    ) -> Result<Vec<(String, String)>, AppError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT role, content FROM (
                SELECT role, content, created_at
                FROM messages
                WHERE conversation_id = $1
                ORDER BY created_at DESC
                LIMIT $2
            ) recent
            ORDER BY created_at ASC
            "#,
        )
        .bind(conversation_id)
        .bind(limit)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Persist a quiz and its questions atomically.
    pub async fn insert_quiz(
        db: &Pool<Postgres>,
        owner_id: Uuid,
        conversation_id: Option<Uuid>,
        topic: &str,
        questions: &[ParsedQuestion],
    ) -> Result<(Quiz, Vec<QuizQuestion>), AppError> {
        let mut tx = db.begin().await?;

        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizzes (owner_id, conversation_id, topic)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, conversation_id, topic, created_at
            "#,
        )
        .bind(owner_id)
        .bind(conversation_id)
        .bind(topic)
        .fetch_one(&mut *tx)
        .await?;

        let mut rows = Vec::with_capacity(questions.len());
        for (position, question) in questions.iter().enumerate() {
            let row = sqlx::query_as::<_, QuizQuestion>(
                r#"
                INSERT INTO quiz_questions (quiz_id, position, prompt, choices, answer_index)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, quiz_id, position, prompt, choices, answer_index
                "#,
            )
            .bind(quiz.id)
            .bind(position as i32)
            .bind(&question.prompt)
            .bind(serde_json::json!(question.choices))
            .bind(question.answer_index)
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }

        tx.commit().await?;
        Ok((quiz, rows))
    }

    pub async fn insert_document(
        db: &Pool<Postgres>,
        owner_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Document, AppError> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (owner_id, title, content)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, title, content, extracted, created_at
            "#,
        )
        .bind(owner_id)
        .bind(title)
        .bind(content)
        .fetch_one(db)
        .await?;
        Ok(document)
    }

    /// Fetch a document scoped to its owner.
    pub async fn get_document(
        db: &Pool<Postgres>,
        owner_id: Uuid,
        document_id: Uuid,
    ) -> Result<Document, AppError> {
        sqlx::query_as::<_, Document>(
            r#"
            SELECT id, owner_id, title, content, extracted, created_at
            FROM documents
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(document_id)
        .bind(owner_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound)
    }

    pub async fn mark_document_extracted(
        db: &Pool<Postgres>,
        document_id: Uuid,
        content: &str,
    ) -> Result<Document, AppError> {
        sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents
            SET content = $2, extracted = TRUE
            WHERE id = $1
            RETURNING id, owner_id, title, content, extracted, created_at
            "#,
        )
        .bind(document_id)
        .bind(content)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound)
    }
}
