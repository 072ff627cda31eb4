use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ROLE_OWNER: &str = "owner";
pub const ROLE_MEMBER: &str = "member";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConversationMemberRow {
    pub conversation_id: Uuid,
    pub user_id: Uuid,
    pub color: String,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

/// Member row joined with the profile's username for display.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MemberWithProfile {
    pub conversation_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub color: String,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}
