use once_cell::sync::Lazy;
use prometheus::{IntCounter, Registry, TextEncoder};

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

pub static GATEWAY_CALLS: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new("ai_proxy_gateway_calls_total", "Model gateway round trips")
        .expect("metric definition");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("register ai_proxy_gateway_calls_total");
    counter
});

pub static RATE_LIMITED: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new(
        "ai_proxy_rate_limited_total",
        "Requests rejected by the rate limiter",
    )
    .expect("metric definition");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("register ai_proxy_rate_limited_total");
    counter
});

pub fn render() -> String {
    TextEncoder::new()
        .encode_to_string(&REGISTRY.gather())
        .unwrap_or_default()
}
