use std::fmt;
use uuid::Uuid;

/// Prefix for the Redis channels that mirror in-process topics.
pub const REDIS_CHANNEL_PREFIX: &str = "rt:";

/// A logical realtime channel.
///
/// Topic names carry the scoping id, so two conversations never share a
/// channel. Collisions are avoided by construction rather than enforced by
/// the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Row changes on one user's conversation list.
    Conversations(Uuid),
    /// Row changes on a conversation's messages.
    Messages(Uuid),
    /// Ephemeral typing flags for a conversation.
    Typing(Uuid),
    /// Ephemeral presence roster for a conversation.
    Presence(Uuid),
    /// Row changes on a conversation's membership.
    Members(Uuid),
    /// Row changes on one user's notifications.
    Notifications(Uuid),
}

impl Topic {
    /// Canonical channel name, e.g. `messages-{uuid}`.
    pub fn name(&self) -> String {
        match self {
            Topic::Conversations(id) => format!("conversations-{id}"),
            Topic::Messages(id) => format!("messages-{id}"),
            Topic::Typing(id) => format!("typing-{id}"),
            Topic::Presence(id) => format!("presence-{id}"),
            Topic::Members(id) => format!("conversation-members-{id}"),
            Topic::Notifications(id) => format!("notifications-{id}"),
        }
    }

    /// Parse a canonical channel name back into a topic.
    pub fn parse(name: &str) -> Option<Topic> {
        // Uuids render as 36 chars; the kind is everything before "-<uuid>".
        if name.len() < 38 || !name.is_char_boundary(name.len() - 36) {
            return None;
        }
        let (kind, id) = name.split_at(name.len() - 36);
        let kind = kind.strip_suffix('-')?;
        let id = Uuid::parse_str(id).ok()?;
        match kind {
            "conversations" => Some(Topic::Conversations(id)),
            "messages" => Some(Topic::Messages(id)),
            "typing" => Some(Topic::Typing(id)),
            "presence" => Some(Topic::Presence(id)),
            "conversation-members" => Some(Topic::Members(id)),
            "notifications" => Some(Topic::Notifications(id)),
            _ => None,
        }
    }

    /// Redis channel carrying this topic across instances.
    pub fn redis_channel(&self) -> String {
        format!("{REDIS_CHANNEL_PREFIX}{}", self.name())
    }

    /// Topic name from a Redis channel name, if it carries the prefix.
    pub fn from_redis_channel(channel: &str) -> Option<Topic> {
        Topic::parse(channel.strip_prefix(REDIS_CHANNEL_PREFIX)?)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_scoped_by_id() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_ne!(Topic::Messages(a).name(), Topic::Messages(b).name());
        assert_ne!(Topic::Messages(a).name(), Topic::Typing(a).name());
    }

    #[test]
    fn parse_round_trips() {
        let id = Uuid::new_v4();
        for topic in [
            Topic::Conversations(id),
            Topic::Messages(id),
            Topic::Typing(id),
            Topic::Presence(id),
            Topic::Members(id),
            Topic::Notifications(id),
        ] {
            assert_eq!(Topic::parse(&topic.name()), Some(topic));
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(Topic::parse("messages-not-a-uuid"), None);
        assert_eq!(Topic::parse("bogus"), None);
        assert_eq!(
            Topic::parse(&format!("unknown-{}", Uuid::new_v4())),
            None
        );
    }

    #[test]
    fn redis_channel_round_trips() {
        let topic = Topic::Presence(Uuid::new_v4());
        assert_eq!(Topic::from_redis_channel(&topic.redis_channel()), Some(topic));
        assert_eq!(Topic::from_redis_channel("other:messages-x"), None);
    }
}
