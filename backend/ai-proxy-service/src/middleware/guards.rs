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
        let user_id = parts
            .extensions
            .get::<Uuid>()
            .copied()
            .ok_or(AppError::Unauthorized)?;
        Ok(User { id: user_id })
    }
}

/// The proxy writes into conversations owned by the chat service's schema;
/// the same access rule applies: owner always, member once collaboration
/// added them.
pub async fn verify_conversation_access(
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
