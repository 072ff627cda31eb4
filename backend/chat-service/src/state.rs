use crate::config::Config;
use crate::websocket::presence::{PresenceTracker, TypingTracker};
use crate::websocket::ChannelRegistry;
use rate_limit::SlidingWindowLimiter;
use sqlx::{Pool, Postgres};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Postgres>,
    pub registry: ChannelRegistry,
    pub presence: PresenceTracker,
    pub typing: TypingTracker,
    pub redis: redis::Client,
    pub config: Arc<Config>,
    /// Bounds invite attempts per inviting user; process-local by design.
    pub invite_limiter: Arc<SlidingWindowLimiter>,
}
