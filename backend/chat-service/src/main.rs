use chat_service::{config, db, error, logging, routes, state::AppState};
use rate_limit::SlidingWindowLimiter;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    logging::init_tracing();
    let cfg = Arc::new(config::Config::from_env()?);

    let pool = db::init_pool(&cfg.database_url)
        .await
        .map_err(|e| error::AppError::StartServer(format!("db: {e}")))?;

    // Embedded migrations are idempotent; a schema mismatch is fatal.
    db::run_migrations(&pool)
        .await
        .map_err(|e| error::AppError::StartServer(format!("database migrations failed: {e}")))?;

    let redis = redis::Client::open(cfg.redis_url.as_str())
        .map_err(|e| error::AppError::StartServer(format!("redis: {e}")))?;

    let registry = chat_service::websocket::ChannelRegistry::new();
    let presence = chat_service::websocket::presence::PresenceTracker::new();
    let typing = chat_service::websocket::presence::TypingTracker::new();

    let invite_limiter = Arc::new(SlidingWindowLimiter::new(
        cfg.invite_rate_max,
        Duration::from_secs(cfg.invite_rate_window_secs),
    ));

    let state = AppState {
        db: pool,
        registry: registry.clone(),
        presence,
        typing,
        redis: redis.clone(),
        config: cfg.clone(),
        invite_limiter,
    };

    // Cross-instance fanout: frames published by peers (or the AI proxy)
    // arrive through the Redis bridge.
    tokio::spawn(chat_service::websocket::pubsub::start_psub_listener(
        redis, registry,
    ));

    let app = routes::build_router(state);

    let bind_addr = format!("0.0.0.0:{}", cfg.port);
    tracing::info!(%bind_addr, "starting chat-service");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| error::AppError::StartServer(e.to_string()))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| error::AppError::StartServer(e.to_string()))?;

    Ok(())
}
