use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use realtime_core::{PresenceState, RealtimeEvent, Topic, TypingState};
use serde::Deserialize;
use tracing::{error, warn};
use uuid::Uuid;

use crate::metrics;
use crate::middleware::auth::resolve_user;
use crate::middleware::guards::verify_access;
use crate::state::AppState;
use crate::websocket::broadcast::broadcast_event;
use crate::websocket::presence::TYPING_IDLE_CLEAR;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub conversation_id: Uuid,
    pub token: Option<String>,
}

/// Frames a client may send on the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum WsInbound {
    /// Announce presence in the conversation.
    #[serde(rename = "presence.track")]
    PresenceTrack { username: String, color: String },
    /// Set or clear the typing flag.
    #[serde(rename = "typing")]
    Typing {
        typing: bool,
        username: Option<String>,
        color: Option<String>,
    },
}

fn bearer_token(params: &WsParams, headers: &HeaderMap) -> Option<String> {
    params.token.clone().or_else(|| {
        headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(|s| s.to_string())
    })
}

/// GET /api/v1/ws?conversation_id=...&token=...
///
/// Browsers cannot set headers on websocket upgrades, so the token rides a
/// query parameter; the handler authenticates before upgrading.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let Some(token) = bearer_token(&params, &headers) else {
        return axum::http::StatusCode::UNAUTHORIZED.into_response();
    };
    let user_id = match resolve_user(&token, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(_) => return axum::http::StatusCode::UNAUTHORIZED.into_response(),
    };

    if verify_access(&state.db, user_id, params.conversation_id)
        .await
        .is_err()
    {
        warn!(%user_id, conversation_id = %params.conversation_id,
            "websocket rejected: no access to conversation");
        return axum::http::StatusCode::FORBIDDEN.into_response();
    }

    ws.on_upgrade(move |socket| handle_socket(state, params.conversation_id, user_id, socket))
}

async fn handle_socket(
    state: AppState,
    conversation_id: Uuid,
    user_id: Uuid,
    socket: WebSocket,
) {
    metrics::WS_CONNECTIONS.inc();

    // One receiver spans every topic of this conversation plus the caller's
    // notification feed.
    let topics = [
        Topic::Messages(conversation_id),
        Topic::Typing(conversation_id),
        Topic::Presence(conversation_id),
        Topic::Members(conversation_id),
        Topic::Notifications(user_id),
        Topic::Conversations(user_id),
    ];
    let (subscription, mut rx) = state.registry.subscribe_all(&topics);

    let (mut sender, mut receiver) = socket.split();

    // Late joiners see the current roster immediately.
    let initial = RealtimeEvent::PresenceSync {
        participants: state.presence.roster(conversation_id),
    };
    match initial.to_frame(Topic::Presence(conversation_id)) {
        Ok(frame) => {
            if sender.send(Message::Text(frame)).await.is_err() {
                subscription.close();
                metrics::WS_CONNECTIONS.dec();
                return;
            }
        }
        Err(e) => error!(error = %e, "failed to serialize initial roster"),
    }

    // Set once the client announces itself; cleaned up on disconnect.
    let mut tracked = false;

    loop {
        tokio::select! {
            maybe = rx.recv() => {
                match maybe {
                    Some(msg) => {
                        if sender.send(msg).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<WsInbound>(&text) {
                            Ok(frame) => {
                                handle_inbound(&state, conversation_id, user_id, frame, &mut tracked)
                                    .await;
                            }
                            Err(_) => {
                                warn!(%user_id, "ignoring malformed websocket frame");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    // Every exit path releases the ephemeral state this connection owns.
    if tracked {
        let roster = state.presence.leave(conversation_id, user_id);
        broadcast_event(
            &state.registry,
            &state.redis,
            Topic::Presence(conversation_id),
            &RealtimeEvent::PresenceSync { participants: roster },
        )
        .await;
    }
    if let Some(cleared) = state.typing.clear(conversation_id, user_id) {
        broadcast_event(
            &state.registry,
            &state.redis,
            Topic::Typing(conversation_id),
            &RealtimeEvent::Typing(cleared),
        )
        .await;
    }

    subscription.close();
    metrics::WS_CONNECTIONS.dec();
}

async fn handle_inbound(
    state: &AppState,
    conversation_id: Uuid,
    user_id: Uuid,
    frame: WsInbound,
    tracked: &mut bool,
) {
    match frame {
        WsInbound::PresenceTrack { username, color } => {
            let roster = state.presence.join(
                conversation_id,
                PresenceState {
                    user_id,
                    username,
                    color,
                    online_at: Utc::now(),
                },
            );
            *tracked = true;
            broadcast_event(
                &state.registry,
                &state.redis,
                Topic::Presence(conversation_id),
                &RealtimeEvent::PresenceSync { participants: roster },
            )
            .await;
        }
        WsInbound::Typing {
            typing,
            username,
            color,
        } => {
            // Fall back to the tracked presence descriptor when the client
            // omits display fields.
            let descriptor = state
                .presence
                .roster(conversation_id)
                .into_iter()
                .find(|p| p.user_id == user_id);
            let username = username
                .or_else(|| descriptor.as_ref().map(|d| d.username.clone()))
                .unwrap_or_default();
            let color = color
                .or_else(|| descriptor.map(|d| d.color))
                .unwrap_or_default();

            let typing_state = TypingState {
                user_id,
                username,
                color,
                typing,
            };

            let generation = state.typing.set(conversation_id, typing_state.clone());
            broadcast_event(
                &state.registry,
                &state.redis,
                Topic::Typing(conversation_id),
                &RealtimeEvent::Typing(typing_state),
            )
            .await;

            if typing {
                // Reset-on-keystroke timer: the clear only fires if this
                // generation is still the latest when it wakes.
                let state = state.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(TYPING_IDLE_CLEAR).await;
                    if let Some(cleared) =
                        state
                            .typing
                            .clear_if_current(conversation_id, user_id, generation)
                    {
                        broadcast_event(
                            &state.registry,
                            &state.redis,
                            Topic::Typing(conversation_id),
                            &RealtimeEvent::Typing(cleared),
                        )
                        .await;
                    }
                });
            }
        }
    }
}
