//! Outbound side of the Redis bridge
//!
//! The proxy has no websocket clients of its own; events it produces (new
//! assistant messages) are published to the bridge and fanned out by the
//! chat service instances.

use once_cell::sync::Lazy;
use realtime_core::{BridgeEnvelope, RealtimeEvent, Topic};
use redis::AsyncCommands;
use uuid::Uuid;

static INSTANCE_ID: Lazy<Uuid> = Lazy::new(Uuid::new_v4);

/// Serialize and publish one event. Failures are logged, not surfaced: the
/// artifact row has already committed.
pub async fn publish_event(client: &redis::Client, topic: Topic, event: &RealtimeEvent) {
    let frame = match event.to_frame(topic) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::error!(error = %e, topic = %topic, "failed to serialize realtime event");
            return;
        }
    };
    let envelope = BridgeEnvelope::new(*INSTANCE_ID, frame);
    let payload = match serde_json::to_string(&envelope) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize bridge envelope");
            return;
        }
    };

    let result: redis::RedisResult<()> = async {
        let mut conn = client.get_multiplexed_async_connection().await?;
        conn.publish(topic.redis_channel(), payload).await
    }
    .await;

    if let Err(e) = result {
        tracing::warn!(error = %e, topic = %topic, "failed to publish event to redis");
    }
}
