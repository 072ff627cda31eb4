//! Ephemeral presence and typing state
//!
//! Both are broadcast state, never rows: transient, high-frequency and
//! lossy-tolerant. Lifetime is bound to the websocket connection; the socket
//! task owns its roster entry and removes it on every exit path, so no
//! heartbeat or TTL assumption is needed beyond close detection.

use realtime_core::{flatten_roster, PresenceState, TypingState};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use uuid::Uuid;

/// A typing flag left unrefreshed clears itself after this long.
pub const TYPING_IDLE_CLEAR: Duration = Duration::from_millis(2000);

/// Who is currently present in each conversation.
#[derive(Default, Clone)]
pub struct PresenceTracker {
    inner: Arc<RwLock<HashMap<Uuid, HashMap<Uuid, PresenceState>>>>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a participant and return the updated roster.
    pub fn join(&self, conversation_id: Uuid, state: PresenceState) -> Vec<PresenceState> {
        let mut guard = self.inner.write().expect("presence lock poisoned");
        guard
            .entry(conversation_id)
            .or_default()
            .insert(state.user_id, state);
        Self::roster_locked(guard.get(&conversation_id))
    }

    /// Drop a participant and return the updated roster.
    pub fn leave(&self, conversation_id: Uuid, user_id: Uuid) -> Vec<PresenceState> {
        let mut guard = self.inner.write().expect("presence lock poisoned");
        let drained = match guard.get_mut(&conversation_id) {
            Some(participants) => {
                participants.remove(&user_id);
                participants.is_empty()
            }
            None => false,
        };
        if drained {
            guard.remove(&conversation_id);
            return Vec::new();
        }
        Self::roster_locked(guard.get(&conversation_id))
    }

    pub fn roster(&self, conversation_id: Uuid) -> Vec<PresenceState> {
        let guard = self.inner.read().expect("presence lock poisoned");
        Self::roster_locked(guard.get(&conversation_id))
    }

    fn roster_locked(participants: Option<&HashMap<Uuid, PresenceState>>) -> Vec<PresenceState> {
        let mut states: Vec<PresenceState> = participants
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default();
        // Stable roster order: join time, then id for ties.
        states.sort_by(|a, b| {
            a.online_at
                .cmp(&b.online_at)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        flatten_roster(states)
    }
}

struct TypingEntry {
    generation: u64,
    state: TypingState,
}

/// Who is currently typing in each conversation. Every set bumps a
/// generation counter; the auto-clear timer only fires if its generation is
/// still current, which makes "reset the timer on every keystroke" a
/// compare instead of timer bookkeeping.
#[derive(Default, Clone)]
pub struct TypingTracker {
    inner: Arc<RwLock<HashMap<(Uuid, Uuid), TypingEntry>>>,
    counter: Arc<AtomicU64>,
}

impl TypingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a typing flag. Returns the generation to hand to the
    /// auto-clear timer; a `typing = false` state removes the entry.
    pub fn set(&self, conversation_id: Uuid, state: TypingState) -> u64 {
        let generation = self.counter.fetch_add(1, Ordering::Relaxed);
        let key = (conversation_id, state.user_id);
        let mut guard = self.inner.write().expect("typing lock poisoned");
        if state.typing {
            guard.insert(key, TypingEntry { generation, state });
        } else {
            guard.remove(&key);
        }
        generation
    }

    /// Clear the flag if no newer keystroke replaced it. Returns the state
    /// to broadcast as `typing = false`.
    pub fn clear_if_current(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        generation: u64,
    ) -> Option<TypingState> {
        let mut guard = self.inner.write().expect("typing lock poisoned");
        let key = (conversation_id, user_id);
        match guard.get(&key) {
            Some(entry) if entry.generation == generation => {
                let mut state = guard.remove(&key)?.state;
                state.typing = false;
                Some(state)
            }
            _ => None,
        }
    }

    /// Unconditional clear, used on disconnect. Returns the state to
    /// broadcast if the user was typing.
    pub fn clear(&self, conversation_id: Uuid, user_id: Uuid) -> Option<TypingState> {
        let mut guard = self.inner.write().expect("typing lock poisoned");
        let mut state = guard.remove(&(conversation_id, user_id))?.state;
        state.typing = false;
        Some(state)
    }

    pub fn is_typing(&self, conversation_id: Uuid, user_id: Uuid) -> bool {
        self.inner
            .read()
            .expect("typing lock poisoned")
            .contains_key(&(conversation_id, user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn presence(user_id: Uuid, username: &str) -> PresenceState {
        PresenceState {
            user_id,
            username: username.into(),
            color: "#E57373".into(),
            online_at: Utc::now(),
        }
    }

    fn typing(user_id: Uuid, flag: bool) -> TypingState {
        TypingState {
            user_id,
            username: "alice".into(),
            color: "#E57373".into(),
            typing: flag,
        }
    }

    #[test]
    fn join_and_leave_update_the_roster() {
        let tracker = PresenceTracker::new();
        let conversation = Uuid::new_v4();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        assert_eq!(tracker.join(conversation, presence(alice, "alice")).len(), 1);
        assert_eq!(tracker.join(conversation, presence(bob, "bob")).len(), 2);

        let roster = tracker.leave(conversation, alice);
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].user_id, bob);

        assert!(tracker.leave(conversation, bob).is_empty());
        assert!(tracker.roster(conversation).is_empty());
    }

    #[test]
    fn rejoining_replaces_the_previous_state() {
        let tracker = PresenceTracker::new();
        let conversation = Uuid::new_v4();
        let alice = Uuid::new_v4();

        tracker.join(conversation, presence(alice, "alice"));
        let roster = tracker.join(conversation, presence(alice, "alice-2"));
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].username, "alice-2");
    }

    #[test]
    fn conversations_are_isolated() {
        let tracker = PresenceTracker::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        tracker.join(a, presence(Uuid::new_v4(), "alice"));
        assert!(tracker.roster(b).is_empty());
    }

    #[test]
    fn stale_generation_does_not_clear_newer_keystroke() {
        let tracker = TypingTracker::new();
        let conversation = Uuid::new_v4();
        let user = Uuid::new_v4();

        let first = tracker.set(conversation, typing(user, true));
        let _second = tracker.set(conversation, typing(user, true));

        // Timer armed by the first keystroke fires after the second one.
        assert!(tracker.clear_if_current(conversation, user, first).is_none());
        assert!(tracker.is_typing(conversation, user));
    }

    #[test]
    fn current_generation_clears_and_reports_state() {
        let tracker = TypingTracker::new();
        let conversation = Uuid::new_v4();
        let user = Uuid::new_v4();

        let generation = tracker.set(conversation, typing(user, true));
        let cleared = tracker
            .clear_if_current(conversation, user, generation)
            .unwrap();
        assert!(!cleared.typing);
        assert!(!tracker.is_typing(conversation, user));
    }

    #[test]
    fn explicit_stop_removes_the_entry() {
        let tracker = TypingTracker::new();
        let conversation = Uuid::new_v4();
        let user = Uuid::new_v4();

        tracker.set(conversation, typing(user, true));
        tracker.set(conversation, typing(user, false));
        assert!(!tracker.is_typing(conversation, user));
        assert!(tracker.clear(conversation, user).is_none());
    }
}
