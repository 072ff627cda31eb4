use crate::state::AppState;
use axum::middleware;
use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

pub mod conversations;
pub mod members;
pub mod messages;
pub mod notifications;
pub mod shared;

use conversations::{
    create_conversation, create_share_token, delete_conversation, list_conversations,
    revoke_share_token, set_collaboration, update_conversation,
};
use members::{invite_user, leave_conversation, list_members};
use messages::{get_message_history, send_message, set_message_pinned};
use notifications::{
    delete_notification, get_notifications, mark_all_read, mark_notification_read,
};
use shared::shared_conversation;

async fn health() -> &'static str {
    "OK"
}

async fn metrics() -> String {
    crate::metrics::render()
}

pub fn build_router(state: AppState) -> Router {
    // Public surface: introspection, the anonymous share resolver, and the
    // websocket upgrade, which authenticates its own query token (browsers
    // cannot set headers on upgrade requests).
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api/v1/shared-conversation", get(shared_conversation))
        .route("/api/v1/ws", get(crate::websocket::handlers::ws_handler));

    let api_v1 = Router::new()
        // Conversations
        .route("/conversations", get(list_conversations))
        .route("/conversations", post(create_conversation))
        .route(
            "/conversations/:id",
            patch(update_conversation).delete(delete_conversation),
        )
        .route("/conversations/:id/collaboration", post(set_collaboration))
        .route(
            "/conversations/:id/share",
            post(create_share_token).delete(revoke_share_token),
        )
        // Messages
        .route("/conversations/:id/messages", get(get_message_history))
        .route("/conversations/:id/messages", post(send_message))
        .route("/messages/:id", patch(set_message_pinned))
        // Collaboration members
        .route("/conversations/:id/members", get(list_members))
        .route("/conversations/:id/invite", post(invite_user))
        .route("/conversations/:id/leave", post(leave_conversation))
        // Notifications
        .route("/notifications", get(get_notifications))
        .route(
            "/notifications/:id/read",
            put(mark_notification_read),
        )
        .route("/notifications/read-all", put(mark_all_read))
        .route("/notifications/:id", delete(delete_notification));

    let secured_api_v1 = api_v1.layer(middleware::from_fn_with_state(
        state.clone(),
        crate::middleware::auth::auth_middleware,
    ));

    let router = public
        .merge(Router::new().nest("/api/v1", secured_api_v1))
        .with_state(state);

    crate::middleware::with_defaults(router)
}
