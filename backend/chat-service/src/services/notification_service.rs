use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::notification::Notification;

pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub unread_count: i64,
}

pub struct NotificationService;

impl NotificationService {
    pub async fn create(
        db: &Pool<Postgres>,
        recipient_id: Uuid,
        actor_id: Option<Uuid>,
        kind: &str,
        body: serde_json::Value,
    ) -> Result<Notification, AppError> {
        let row = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (recipient_id, actor_id, kind, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, recipient_id, actor_id, kind, body, is_read, created_at
            "#,
        )
        .bind(recipient_id)
        .bind(actor_id)
        .bind(kind)
        .bind(body)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn list(
        db: &Pool<Postgres>,
        recipient_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<NotificationPage, AppError> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, recipient_id, actor_id, kind, body, is_read, created_at
            FROM notifications
            WHERE recipient_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(recipient_id)
        .bind(limit.clamp(1, 100))
        .bind(offset.max(0))
        .fetch_all(db)
        .await?;

        let unread_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .fetch_one(db)
        .await?;

        Ok(NotificationPage {
            notifications,
            unread_count,
        })
    }

    /// Mark one notification read; scoped to the recipient.
    pub async fn mark_read(
        db: &Pool<Postgres>,
        recipient_id: Uuid,
        notification_id: Uuid,
    ) -> Result<Notification, AppError> {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE id = $1 AND recipient_id = $2
            RETURNING id, recipient_id, actor_id, kind, body, is_read, created_at
            "#,
        )
        .bind(notification_id)
        .bind(recipient_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound)
    }

    pub async fn mark_all_read(
        db: &Pool<Postgres>,
        recipient_id: Uuid,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(
        db: &Pool<Postgres>,
        recipient_id: Uuid,
        notification_id: Uuid,
    ) -> Result<(), AppError> {
        let result =
            sqlx::query("DELETE FROM notifications WHERE id = $1 AND recipient_id = $2")
                .bind(notification_id)
                .bind(recipient_id)
                .execute(db)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
