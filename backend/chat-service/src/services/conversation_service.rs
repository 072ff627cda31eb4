use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::conversation::Conversation;
use crate::models::member::ROLE_OWNER;
use crate::services::member_service::MemberService;

pub struct ConversationService;

impl ConversationService {
    /// Conversations visible to a user: owned or joined. Ordered pinned
    /// first, then most recently updated; live inserts prepend, so the
    /// subscription order matches the fetch order.
    pub async fn list_for_user(
        db: &Pool<Postgres>,
        user_id: Uuid,
    ) -> Result<Vec<Conversation>, AppError> {
        let rows = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT DISTINCT c.id, c.owner_id, c.title, c.is_collaborative, c.pinned,
                   c.share_token, c.created_at, c.updated_at
            FROM conversations c
            LEFT JOIN conversation_members cm ON cm.conversation_id = c.id
            WHERE c.owner_id = $1 OR cm.user_id = $1
            ORDER BY c.pinned DESC, c.updated_at DESC
            LIMIT 200
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn get(db: &Pool<Postgres>, id: Uuid) -> Result<Conversation, AppError> {
        sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, owner_id, title, is_collaborative, pinned, share_token,
                   created_at, updated_at
            FROM conversations WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound)
    }

    pub async fn create(
        db: &Pool<Postgres>,
        owner_id: Uuid,
        title: &str,
    ) -> Result<Conversation, AppError> {
        let row = sqlx::query_as::<_, Conversation>(
            r#"
            INSERT INTO conversations (owner_id, title)
            VALUES ($1, $2)
            RETURNING id, owner_id, title, is_collaborative, pinned, share_token,
                      created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(title)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn update(
        db: &Pool<Postgres>,
        id: Uuid,
        title: Option<&str>,
        pinned: Option<bool>,
    ) -> Result<Conversation, AppError> {
        let row = sqlx::query_as::<_, Conversation>(
            r#"
            UPDATE conversations
            SET title = COALESCE($2, title),
                pinned = COALESCE($3, pinned),
                updated_at = now()
            WHERE id = $1
            RETURNING id, owner_id, title, is_collaborative, pinned, share_token,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(pinned)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound)?;
        Ok(row)
    }

    /// Delete a conversation; messages and memberships cascade.
    pub async fn delete(db: &Pool<Postgres>, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    /// Flip the collaborative flag. Enabling also upserts the owner as a
    /// member. The two steps are separate statements; a failure between them
    /// leaves the flag set without the membership row (accepted window).
    /// Disabling is a flag flip only: memberships and the share token
    /// survive, so re-enabling restores the same member set.
    pub async fn set_collaborative(
        db: &Pool<Postgres>,
        id: Uuid,
        owner_id: Uuid,
        enabled: bool,
    ) -> Result<Conversation, AppError> {
        let row = sqlx::query_as::<_, Conversation>(
            r#"
            UPDATE conversations
            SET is_collaborative = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, owner_id, title, is_collaborative, pinned, share_token,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(enabled)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound)?;

        if enabled {
            MemberService::add_member(db, id, owner_id, ROLE_OWNER).await?;
        }

        Ok(row)
    }

    /// Everyone whose conversation list includes this conversation: the
    /// owner plus all members.
    pub async fn audience(db: &Pool<Postgres>, id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let users: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT owner_id AS user_id FROM conversations WHERE id = $1
            UNION
            SELECT user_id FROM conversation_members WHERE conversation_id = $1
            "#,
        )
        .bind(id)
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    /// Bump updated_at so the conversation resorts to the top of lists.
    pub async fn touch(db: &Pool<Postgres>, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE conversations SET updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
