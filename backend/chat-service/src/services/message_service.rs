use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::message::Message;
use crate::services::conversation_service::ConversationService;

const DEFAULT_HISTORY_LIMIT: i64 = 200;

pub struct MessageService;

impl MessageService {
    /// Message history, oldest first, matching the append position of live
    /// inserts.
    pub async fn list(
        db: &Pool<Postgres>,
        conversation_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, AppError> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, 1000);
        let rows = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, conversation_id, author_id, role, content, pinned, attachments,
                   created_at, updated_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC
            LIMIT $2
            "#,
        )
        .bind(conversation_id)
        .bind(limit)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn create(
        db: &Pool<Postgres>,
        conversation_id: Uuid,
        author_id: Option<Uuid>,
        role: &str,
        content: &str,
        attachments: serde_json::Value,
    ) -> Result<Message, AppError> {
        let row = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (conversation_id, author_id, role, content, attachments)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, conversation_id, author_id, role, content, pinned, attachments,
                      created_at, updated_at
            "#,
        )
        .bind(conversation_id)
        .bind(author_id)
        .bind(role)
        .bind(content)
        .bind(attachments)
        .fetch_one(db)
        .await?;

        ConversationService::touch(db, conversation_id).await?;

        Ok(row)
    }

    pub async fn set_pinned(
        db: &Pool<Postgres>,
        message_id: Uuid,
        pinned: bool,
    ) -> Result<Message, AppError> {
        sqlx::query_as::<_, Message>(
            r#"
            UPDATE messages
            SET pinned = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, conversation_id, author_id, role, content, pinned, attachments,
                      created_at, updated_at
            "#,
        )
        .bind(message_id)
        .bind(pinned)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound)
    }

    pub async fn get(db: &Pool<Postgres>, message_id: Uuid) -> Result<Message, AppError> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT id, conversation_id, author_id, role, content, pinned, attachments,
                   created_at, updated_at
            FROM messages WHERE id = $1
            "#,
        )
        .bind(message_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound)
    }
}
