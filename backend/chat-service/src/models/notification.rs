use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub kind: String,
    pub body: serde_json::Value,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl realtime_core::Keyed for Notification {
    fn key(&self) -> Uuid {
        self.id
    }
}
