use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::member::{ConversationMemberRow, MemberWithProfile};

/// Display colors assigned to members, in allocation order. Eight entries;
/// once every color is taken the first one is reused.
pub const COLOR_PALETTE: [&str; 8] = [
    "#E57373", "#64B5F6", "#81C784", "#FFD54F", "#BA68C8", "#4DB6AC", "#FF8A65", "#A1887F",
];

/// First palette entry not present in `used`. Exhaustion falls back to the
/// first entry; the collision is acknowledged and low-stakes.
pub fn allocate_color(used: &[String]) -> &'static str {
    COLOR_PALETTE
        .iter()
        .find(|color| !used.iter().any(|u| u == *color))
        .copied()
        .unwrap_or(COLOR_PALETTE[0])
}

pub struct MemberService;

impl MemberService {
    pub async fn list_members(
        db: &Pool<Postgres>,
        conversation_id: Uuid,
    ) -> Result<Vec<MemberWithProfile>, AppError> {
        let members = sqlx::query_as::<_, MemberWithProfile>(
            r#"
            SELECT cm.conversation_id, cm.user_id, p.username, cm.color, cm.role, cm.joined_at
            FROM conversation_members cm
            JOIN profiles p ON p.user_id = cm.user_id
            WHERE cm.conversation_id = $1
            ORDER BY cm.joined_at ASC
            "#,
        )
        .bind(conversation_id)
        .fetch_all(db)
        .await?;
        Ok(members)
    }

    pub async fn used_colors(
        db: &Pool<Postgres>,
        conversation_id: Uuid,
    ) -> Result<Vec<String>, AppError> {
        let colors: Vec<String> = sqlx::query_scalar(
            "SELECT color FROM conversation_members WHERE conversation_id = $1",
        )
        .bind(conversation_id)
        .fetch_all(db)
        .await?;
        Ok(colors)
    }

    pub async fn is_member(
        db: &Pool<Postgres>,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError> {
        let exists: Option<bool> = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM conversation_members WHERE conversation_id = $1 AND user_id = $2)",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(exists.unwrap_or(false))
    }

    /// Add a member with the first unused palette color. Idempotent: an
    /// existing membership is returned unchanged.
    pub async fn add_member(
        db: &Pool<Postgres>,
        conversation_id: Uuid,
        user_id: Uuid,
        role: &str,
    ) -> Result<ConversationMemberRow, AppError> {
        if let Some(existing) = sqlx::query_as::<_, ConversationMemberRow>(
            "SELECT conversation_id, user_id, color, role, joined_at FROM conversation_members WHERE conversation_id = $1 AND user_id = $2",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?
        {
            return Ok(existing);
        }

        let used = Self::used_colors(db, conversation_id).await?;
        let color = allocate_color(&used);

        let row = sqlx::query_as::<_, ConversationMemberRow>(
            r#"
            INSERT INTO conversation_members (conversation_id, user_id, color, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (conversation_id, user_id) DO UPDATE SET role = conversation_members.role
            RETURNING conversation_id, user_id, color, role, joined_at
            "#,
        )
        .bind(conversation_id)
        .bind(user_id)
        .bind(color)
        .bind(role)
        .fetch_one(db)
        .await?;

        Ok(row)
    }

    /// Delete the caller's own membership row ("leave").
    pub async fn remove_member(
        db: &Pool<Postgres>,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM conversation_members WHERE conversation_id = $1 AND user_id = $2",
        )
        .bind(conversation_id)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_first_unused_color() {
        let used = vec![COLOR_PALETTE[0].to_string(), COLOR_PALETTE[1].to_string()];
        assert_eq!(allocate_color(&used), COLOR_PALETTE[2]);
    }

    #[test]
    fn allocates_first_color_for_empty_conversation() {
        assert_eq!(allocate_color(&[]), COLOR_PALETTE[0]);
    }

    #[test]
    fn skips_gaps_in_the_palette() {
        let used = vec![COLOR_PALETTE[0].to_string(), COLOR_PALETTE[2].to_string()];
        assert_eq!(allocate_color(&used), COLOR_PALETTE[1]);
    }

    #[test]
    fn exhausted_palette_reuses_first_entry() {
        let used: Vec<String> = COLOR_PALETTE.iter().map(|c| c.to_string()).collect();
        assert_eq!(allocate_color(&used), COLOR_PALETTE[0]);
    }
}
