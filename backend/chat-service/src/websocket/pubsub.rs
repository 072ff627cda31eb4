//! Redis pub/sub bridge for cross-instance fanout
//!
//! Every local broadcast is mirrored to `rt:{topic}`; a pattern-subscribed
//! listener rebroadcasts remote frames into the local registry. Frames carry
//! the publishing instance id so a node never redelivers its own traffic.
//! Delivery during a disconnect window is lost, not queued; subscribers are
//! expected to refetch after a gap.

use futures_util::StreamExt;
use once_cell::sync::Lazy;
use realtime_core::topic::{Topic, REDIS_CHANNEL_PREFIX};
use realtime_core::BridgeEnvelope;
use redis::AsyncCommands;
use std::time::Duration;
use uuid::Uuid;

use crate::websocket::ChannelRegistry;

static INSTANCE_ID: Lazy<Uuid> = Lazy::new(Uuid::new_v4);

const BACKOFF_INITIAL: Duration = Duration::from_millis(250);
const BACKOFF_MAX: Duration = Duration::from_secs(8);

/// Publish a serialized frame for one topic.
pub async fn publish(
    client: &redis::Client,
    topic: Topic,
    frame: &str,
) -> redis::RedisResult<()> {
    let envelope = BridgeEnvelope::new(*INSTANCE_ID, frame.to_string());
    let payload = serde_json::to_string(&envelope).map_err(|e| {
        redis::RedisError::from((redis::ErrorKind::TypeError, "bridge envelope", e.to_string()))
    })?;
    let mut conn = client.get_multiplexed_async_connection().await?;
    conn.publish::<_, _, ()>(topic.redis_channel(), payload).await
}

/// Run the pattern-subscribed listener until shutdown. Reconnects with
/// capped exponential backoff; frames lost during the gap are not replayed.
pub async fn start_psub_listener(client: redis::Client, registry: ChannelRegistry) {
    let mut backoff = BACKOFF_INITIAL;
    loop {
        match run_listener(&client, &registry).await {
            Ok(()) => {
                tracing::warn!("redis pub/sub stream ended, resubscribing");
                backoff = BACKOFF_INITIAL;
            }
            Err(e) => {
                tracing::warn!(error = %e, backoff_ms = backoff.as_millis() as u64,
                    "redis pub/sub listener failed, retrying; frames in the gap are lost");
            }
        }
        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(BACKOFF_MAX);
    }
}

async fn run_listener(
    client: &redis::Client,
    registry: &ChannelRegistry,
) -> redis::RedisResult<()> {
    // PubSub requires a dedicated connection, not a multiplexed one.
    let conn = client.get_async_connection().await?;
    let mut pubsub = conn.into_pubsub();
    pubsub
        .psubscribe(format!("{REDIS_CHANNEL_PREFIX}*"))
        .await?;
    tracing::info!("redis pub/sub bridge subscribed");

    let mut stream = pubsub.on_message();
    while let Some(msg) = stream.next().await {
        let channel: String = msg.get_channel_name().into();
        let payload: String = msg.get_payload()?;

        let Some(topic) = Topic::from_redis_channel(&channel) else {
            continue;
        };
        let Ok(envelope) = serde_json::from_str::<BridgeEnvelope>(&payload) else {
            tracing::warn!(%channel, "dropping malformed bridge payload");
            continue;
        };
        if envelope.origin == *INSTANCE_ID {
            continue;
        }

        registry.broadcast(
            &topic.name(),
            axum::extract::ws::Message::Text(envelope.frame),
        );
    }
    Ok(())
}
