use realtime_core::{RealtimeEvent, Topic};

use crate::metrics;
use crate::websocket::{pubsub, ChannelRegistry};

/// The canonical way to emit a realtime event: serialize once, deliver to
/// local subscribers, mirror through the Redis bridge. The mutation that
/// triggered the event has already committed, so bridge failures are logged
/// and counted rather than failing the request.
pub async fn broadcast_event(
    registry: &ChannelRegistry,
    redis: &redis::Client,
    topic: Topic,
    event: &RealtimeEvent,
) {
    let frame = match event.to_frame(topic) {
        Ok(frame) => frame,
        Err(e) => {
            metrics::BROADCAST_FAILURES.inc();
            tracing::error!(error = %e, topic = %topic, "failed to serialize realtime event");
            return;
        }
    };

    registry.broadcast(&topic.name(), axum::extract::ws::Message::Text(frame.clone()));

    if let Err(e) = pubsub::publish(redis, topic, &frame).await {
        metrics::BROADCAST_FAILURES.inc();
        tracing::warn!(error = %e, topic = %topic, "failed to mirror event to redis");
    }
}
