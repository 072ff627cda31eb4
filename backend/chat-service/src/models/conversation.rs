use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub is_collaborative: bool,
    pub pinned: bool,
    /// Opaque read-only share credential. Never serialized into API
    /// responses; the share routes return it explicitly.
    #[serde(skip_serializing)]
    pub share_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl realtime_core::Keyed for Conversation {
    fn key(&self) -> Uuid {
        self.id
    }
}
