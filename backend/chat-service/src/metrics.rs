use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntGauge, Registry, TextEncoder};

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

pub static WS_CONNECTIONS: Lazy<IntGauge> = Lazy::new(|| {
    let gauge = IntGauge::new(
        "chat_ws_connections",
        "Active websocket connections",
    )
    .expect("metric definition");
    REGISTRY
        .register(Box::new(gauge.clone()))
        .expect("register chat_ws_connections");
    gauge
});

pub static RATE_LIMITED: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new(
        "chat_rate_limited_total",
        "Requests rejected by the rate limiter",
    )
    .expect("metric definition");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("register chat_rate_limited_total");
    counter
});

pub static BROADCAST_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new(
        "chat_broadcast_failures_total",
        "Realtime broadcasts that failed to publish",
    )
    .expect("metric definition");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("register chat_broadcast_failures_total");
    counter
});

/// Prometheus text exposition of all chat-service metrics.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    encoder
        .encode_to_string(&REGISTRY.gather())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_registered_metrics() {
        WS_CONNECTIONS.set(2);
        RATE_LIMITED.inc();
        BROADCAST_FAILURES.inc();
        let text = render();
        assert!(text.contains("chat_ws_connections"));
        assert!(text.contains("chat_rate_limited_total"));
    }
}
