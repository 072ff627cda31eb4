//! Presence roster flattening
//!
//! Presence is broadcast state, not rows: each connection contributes one
//! `{user_id, username, color, online_at}` record whose lifetime is bound to
//! the connection. The roster is the flattened view, deduplicated by user id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One participant's ephemeral presence record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceState {
    pub user_id: Uuid,
    pub username: String,
    pub color: String,
    pub online_at: DateTime<Utc>,
}

/// Flatten tracked presence states into a roster deduplicated by user id.
///
/// Last writer for a given id wins. Duplicate ids should not normally occur
/// and are not otherwise defended against.
pub fn flatten_roster<I>(states: I) -> Vec<PresenceState>
where
    I: IntoIterator<Item = PresenceState>,
{
    let mut roster: Vec<PresenceState> = Vec::new();
    for state in states {
        if let Some(existing) = roster.iter_mut().find(|p| p.user_id == state.user_id) {
            *existing = state;
        } else {
            roster.push(state);
        }
    }
    roster
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(user_id: Uuid, username: &str) -> PresenceState {
        PresenceState {
            user_id,
            username: username.into(),
            color: "#E57373".into(),
            online_at: Utc::now(),
        }
    }

    #[test]
    fn dedups_by_user_id_last_writer_wins() {
        let id = Uuid::new_v4();
        let other = Uuid::new_v4();
        let roster = flatten_roster(vec![
            state(id, "alice"),
            state(other, "bob"),
            state(id, "alice-renamed"),
        ]);

        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].username, "alice-renamed");
        assert_eq!(roster[1].username, "bob");
    }

    #[test]
    fn empty_input_yields_empty_roster() {
        assert!(flatten_roster(std::iter::empty()).is_empty());
    }
}
