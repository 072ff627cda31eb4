//! Authorization guards that enforce permission checks at the type level

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

/// The authenticated caller, extracted from JWT claims.
#[derive(Debug, Clone, Copy)]
pub struct User {
    pub id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for User
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the auth middleware.
        let user_id = parts
            .extensions
            .get::<Uuid>()
            .copied()
            .ok_or(AppError::Unauthorized)?;

        Ok(User { id: user_id })
    }
}

/// A verified membership in a conversation.
#[derive(Debug, Clone)]
pub struct ConversationMember {
    pub user_id: Uuid,
    pub conversation_id: Uuid,
    pub role: String,
    pub color: String,
}

impl ConversationMember {
    pub async fn verify(
        db: &PgPool,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Self, AppError> {
        let row = sqlx::query_as::<_, MemberRecord>(
            r#"
            SELECT user_id, conversation_id, role, color
            FROM conversation_members
            WHERE user_id = $1 AND conversation_id = $2
            "#,
        )
        .bind(user_id)
        .bind(conversation_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::Forbidden)?;

        Ok(ConversationMember {
            user_id: row.user_id,
            conversation_id: row.conversation_id,
            role: row.role,
            color: row.color,
        })
    }

    pub fn is_owner(&self) -> bool {
        self.role == crate::models::member::ROLE_OWNER
    }
}

#[derive(sqlx::FromRow)]
struct MemberRecord {
    user_id: Uuid,
    conversation_id: Uuid,
    role: String,
    color: String,
}

/// The conversation's owner. Stricter than membership: owners of private
/// conversations have no membership row, so this checks the conversation
/// itself.
#[derive(Debug, Clone)]
pub struct ConversationOwner {
    pub user_id: Uuid,
    pub conversation_id: Uuid,
    pub is_collaborative: bool,
}

impl ConversationOwner {
    pub async fn verify(
        db: &PgPool,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Self, AppError> {
        let row = sqlx::query_as::<_, OwnerRecord>(
            "SELECT owner_id, is_collaborative FROM conversations WHERE id = $1",
        )
        .bind(conversation_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound)?;

        if row.owner_id != user_id {
            return Err(AppError::Forbidden);
        }

        Ok(ConversationOwner {
            user_id,
            conversation_id,
            is_collaborative: row.is_collaborative,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OwnerRecord {
    owner_id: Uuid,
    is_collaborative: bool,
}

/// Verify the caller can read/write a conversation: the owner always can, a
/// member can once collaboration added them.
pub async fn verify_access(
    db: &PgPool,
    user_id: Uuid,
    conversation_id: Uuid,
) -> Result<(), AppError> {
    let allowed: Option<bool> = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM conversations c
            WHERE c.id = $1 AND c.owner_id = $2
            UNION ALL
            SELECT 1 FROM conversation_members cm
            WHERE cm.conversation_id = $1 AND cm.user_id = $2
        )
        "#,
    )
    .bind(conversation_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    if allowed.unwrap_or(false) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_role_is_detected() {
        let member = ConversationMember {
            user_id: Uuid::new_v4(),
            conversation_id: Uuid::new_v4(),
            role: "owner".to_string(),
            color: "#E57373".to_string(),
        };
        assert!(member.is_owner());
    }

    #[test]
    fn plain_member_is_not_owner() {
        let member = ConversationMember {
            user_id: Uuid::new_v4(),
            conversation_id: Uuid::new_v4(),
            role: "member".to_string(),
            color: "#64B5F6".to_string(),
        };
        assert!(!member.is_owner());
    }
}
