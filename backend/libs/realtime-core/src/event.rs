//! Realtime event envelopes
//!
//! Every frame delivered to a subscriber has the same top-level structure:
//!
//! ```json
//! {
//!     "topic": "messages-<uuid>",
//!     "type": "change.insert",
//!     "timestamp": "2026-08-04T10:30:00Z",
//!     ...event fields
//! }
//! ```
//!
//! Serialization is centralized here; handlers never hand-build frames.

use crate::roster::PresenceState;
use crate::topic::Topic;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The three diff operations a table subscriber can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

/// A row-level change on a table, carrying the full new row (or, for
/// deletes, at least the row id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: String,
    pub op: ChangeOp,
    pub row: Value,
}

impl ChangeEvent {
    pub fn insert(table: &str, row: Value) -> Self {
        Self {
            table: table.to_string(),
            op: ChangeOp::Insert,
            row,
        }
    }

    pub fn update(table: &str, row: Value) -> Self {
        Self {
            table: table.to_string(),
            op: ChangeOp::Update,
            row,
        }
    }

    pub fn delete(table: &str, id: Uuid) -> Self {
        Self {
            table: table.to_string(),
            op: ChangeOp::Delete,
            row: serde_json::json!({ "id": id }),
        }
    }
}

/// Typing flag broadcast on a conversation's typing topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingState {
    pub user_id: Uuid,
    pub username: String,
    pub color: String,
    pub typing: bool,
}

/// Everything that can be broadcast on a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RealtimeEvent {
    Change(ChangeEvent),
    PresenceSync { participants: Vec<PresenceState> },
    Typing(TypingState),
}

impl RealtimeEvent {
    /// Frame type string, e.g. `change.insert` or `presence.sync`.
    pub fn event_type(&self) -> &'static str {
        match self {
            RealtimeEvent::Change(c) => match c.op {
                ChangeOp::Insert => "change.insert",
                ChangeOp::Update => "change.update",
                ChangeOp::Delete => "change.delete",
            },
            RealtimeEvent::PresenceSync { .. } => "presence.sync",
            RealtimeEvent::Typing(_) => "typing",
        }
    }

    /// Build the flat frame for one topic. This is the only place frame
    /// serialization happens.
    pub fn to_frame_value(&self, topic: Topic) -> Result<Value, serde_json::Error> {
        let mut frame = serde_json::json!({
            "topic": topic.name(),
            "type": self.event_type(),
            "timestamp": Utc::now().to_rfc3339(),
        });

        let fields = serde_json::to_value(self)?;
        if let Value::Object(map) = fields {
            for (key, value) in map {
                frame[key] = value;
            }
        }

        Ok(frame)
    }

    pub fn to_frame(&self, topic: Topic) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_frame_value(topic)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_has_uniform_structure() {
        let conversation_id = Uuid::new_v4();
        let event = RealtimeEvent::Typing(TypingState {
            user_id: Uuid::new_v4(),
            username: "alice".into(),
            color: "#E57373".into(),
            typing: true,
        });

        let frame = event.to_frame(Topic::Typing(conversation_id)).unwrap();
        let parsed: Value = serde_json::from_str(&frame).unwrap();

        assert_eq!(parsed["type"], "typing");
        assert_eq!(
            parsed["topic"],
            format!("typing-{conversation_id}")
        );
        assert!(parsed["timestamp"].is_string());
        assert_eq!(parsed["username"], "alice");
        assert_eq!(parsed["typing"], true);
    }

    #[test]
    fn change_ops_map_to_event_types() {
        let id = Uuid::new_v4();
        let insert = RealtimeEvent::Change(ChangeEvent::insert(
            "messages",
            serde_json::json!({"id": id}),
        ));
        let delete = RealtimeEvent::Change(ChangeEvent::delete("messages", id));

        assert_eq!(insert.event_type(), "change.insert");
        assert_eq!(delete.event_type(), "change.delete");
    }

    #[test]
    fn delete_carries_the_row_id() {
        let id = Uuid::new_v4();
        let event = RealtimeEvent::Change(ChangeEvent::delete("conversations", id));
        let frame = event
            .to_frame_value(Topic::Messages(Uuid::new_v4()))
            .unwrap();
        assert_eq!(frame["row"]["id"], id.to_string());
    }
}
