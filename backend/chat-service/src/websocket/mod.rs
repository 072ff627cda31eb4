use axum::extract::ws::Message;
use realtime_core::{Subscription, Topic};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub mod broadcast;
pub mod handlers;
pub mod presence;
pub mod pubsub;

type Slots = HashMap<String, Vec<(u64, UnboundedSender<Message>)>>;

/// Topic-keyed fanout of realtime frames to local websocket connections.
///
/// One logical channel per distinct topic name; per-conversation names keep
/// unrelated subscribers from sharing a channel.
#[derive(Default, Clone)]
pub struct ChannelRegistry {
    inner: Arc<RwLock<Slots>>,
    next_id: Arc<AtomicU64>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one receiver under several topics. The returned subscription
    /// detaches all of them; teardown is idempotent.
    pub fn subscribe_all(
        &self,
        topics: &[Topic],
    ) -> (Subscription, UnboundedReceiver<Message>) {
        let (tx, rx) = unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let names: Vec<String> = topics.iter().map(|t| t.name()).collect();

        {
            let mut guard = self.inner.write().expect("channel registry lock poisoned");
            for name in &names {
                guard.entry(name.clone()).or_default().push((id, tx.clone()));
            }
        }

        let inner = self.inner.clone();
        let subscription = Subscription::new(move || {
            let mut guard = inner.write().expect("channel registry lock poisoned");
            for name in &names {
                let drained = match guard.get_mut(name) {
                    Some(list) => {
                        list.retain(|(slot, _)| *slot != id);
                        list.is_empty()
                    }
                    None => false,
                };
                if drained {
                    guard.remove(name);
                }
            }
        });

        (subscription, rx)
    }

    pub fn subscribe(&self, topic: Topic) -> (Subscription, UnboundedReceiver<Message>) {
        self.subscribe_all(std::slice::from_ref(&topic))
    }

    /// Deliver a frame to every live subscriber of a topic, pruning closed
    /// ones.
    pub fn broadcast(&self, topic_name: &str, msg: Message) {
        let mut guard = self.inner.write().expect("channel registry lock poisoned");
        let drained = match guard.get_mut(topic_name) {
            Some(list) => {
                list.retain(|(_, tx)| tx.send(msg.clone()).is_ok());
                list.is_empty()
            }
            None => false,
        };
        if drained {
            guard.remove(topic_name);
        }
    }

    pub fn subscriber_count(&self, topic_name: &str) -> usize {
        self.inner
            .read()
            .expect("channel registry lock poisoned")
            .get(topic_name)
            .map(|list| list.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn text(s: &str) -> Message {
        Message::Text(s.to_string())
    }

    #[tokio::test]
    async fn broadcast_reaches_topic_subscribers_only() {
        let registry = ChannelRegistry::new();
        let topic_a = Topic::Messages(Uuid::new_v4());
        let topic_b = Topic::Messages(Uuid::new_v4());

        let (_sub_a, mut rx_a) = registry.subscribe(topic_a);
        let (_sub_b, mut rx_b) = registry.subscribe(topic_b);

        registry.broadcast(&topic_a.name(), text("hello"));

        assert!(matches!(rx_a.recv().await, Some(Message::Text(t)) if t == "hello"));
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn closing_subscription_prunes_the_topic() {
        let registry = ChannelRegistry::new();
        let topic = Topic::Typing(Uuid::new_v4());

        let (sub, _rx) = registry.subscribe(topic);
        assert_eq!(registry.subscriber_count(&topic.name()), 1);

        sub.close();
        assert_eq!(registry.subscriber_count(&topic.name()), 0);

        // Second close is a no-op.
        sub.close();
        assert_eq!(registry.subscriber_count(&topic.name()), 0);
    }

    #[tokio::test]
    async fn one_receiver_can_span_multiple_topics() {
        let registry = ChannelRegistry::new();
        let conversation = Uuid::new_v4();
        let topics = [Topic::Messages(conversation), Topic::Typing(conversation)];

        let (sub, mut rx) = registry.subscribe_all(&topics);

        registry.broadcast(&topics[0].name(), text("a"));
        registry.broadcast(&topics[1].name(), text("b"));

        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_some());

        sub.close();
        assert_eq!(registry.subscriber_count(&topics[0].name()), 0);
        assert_eq!(registry.subscriber_count(&topics[1].name()), 0);
    }

    #[tokio::test]
    async fn dead_receivers_are_pruned_on_broadcast() {
        let registry = ChannelRegistry::new();
        let topic = Topic::Presence(Uuid::new_v4());

        let (_sub, rx) = registry.subscribe(topic);
        drop(rx);

        registry.broadcast(&topic.name(), text("x"));
        assert_eq!(registry.subscriber_count(&topic.name()), 0);
    }
}
