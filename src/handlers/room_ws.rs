//! WebSocket handler for the per-room realtime feed
//!
//! Provides `/api/rooms/{id}/ws`. After the upgrade the client receives an
//! initial snapshot (bias set plus online roster), then a stream of
//! [`RoomEvent`]s for that room only. Presence registers on connect and
//! deregisters on close; incoming frames refresh the liveness timestamp.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::handlers::auth::Identity;
use crate::handlers::bias::load_bias_set;
use crate::handlers::profile::username_of;
use crate::handlers::rooms::{ensure_member_or_owner, load_room};
use crate::models::error::ApiError;
use crate::models::event::{RoomEvent, WsMessage};
use crate::AppState;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Client frame on the feed socket
#[derive(Debug, Clone, Deserialize)]
struct WsClientMessage {
    /// "ping" or "leave"
    action: String,
}

/// GET /api/rooms/{id}/ws - Upgrade to the room's realtime feed
pub async fn room_websocket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(room_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    // Reject before the upgrade so the client gets a proper status code
    let room = load_room(&*state.db, room_id).await?;
    ensure_member_or_owner(&*state.db, &room, &user_id).await?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, room_id, user_id)))
}

async fn handle_socket(socket: WebSocket, state: AppState, room_id: Uuid, user_id: String) {
    let (mut sender, mut receiver) = socket.split();

    info!("Room feed connected: room={} user={}", room_id, user_id);

    // Subscribe before the snapshot so no event falls in the gap
    let mut events = state.events.subscribe(room_id).await;

    let username = match username_of(&*state.db, &user_id).await {
        Ok(name) => name,
        Err(e) => {
            warn!("Failed to resolve username for {}: {}", user_id, e);
            None
        }
    };
    state.presence.join(room_id, &user_id, username).await;
    broadcast_presence(&state, room_id).await;

    match snapshot_message(&state, room_id).await {
        Ok(initial) => {
            if send_json(&mut sender, &initial).await.is_err() {
                finish(&state, room_id, &user_id).await;
                return;
            }
        }
        Err(e) => {
            warn!("Failed to build initial snapshot: {}", e);
            let _ = send_json(
                &mut sender,
                &WsMessage::Error {
                    message: "failed to load room state".to_string(),
                },
            )
            .await;
            finish(&state, room_id, &user_id).await;
            return;
        }
    }

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await; // first tick fires immediately

    loop {
        tokio::select! {
            result = events.recv() => {
                match result {
                    Ok(event) => {
                        if let Err(e) = send_event(&mut sender, &event).await {
                            debug!("Room feed send error: {}", e);
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Resync the client rather than replaying the gap
                        warn!("Room feed lagged {} events, resyncing", n);
                        match snapshot_message(&state, room_id).await {
                            Ok(initial) => {
                                if send_json(&mut sender, &initial).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!("Resync failed: {}", e);
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Room channel closed");
                        break;
                    }
                }
            }

            _ = heartbeat.tick() => {
                if let Err(e) = sender.send(Message::Ping(axum::body::Bytes::new())).await {
                    debug!("Heartbeat failed: {}", e);
                    break;
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        state.presence.heartbeat(room_id, &user_id).await;
                        if let Ok(req) = serde_json::from_str::<WsClientMessage>(&text) {
                            match req.action.as_str() {
                                "ping" => {
                                    let _ = send_json(&mut sender, &WsMessage::Pong).await;
                                }
                                "leave" => {
                                    info!("Client left room feed: {}", room_id);
                                    break;
                                }
                                _ => {}
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        state.presence.heartbeat(room_id, &user_id).await;
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Pong(_))) => {
                        state.presence.heartbeat(room_id, &user_id).await;
                    }
                    Some(Ok(Message::Close(_))) => {
                        debug!("Room feed closed by client");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!("Room feed receive error: {}", e);
                        break;
                    }
                    None => break,
                    _ => {}
                }
            }
        }
    }

    finish(&state, room_id, &user_id).await;
    info!("Room feed disconnected: room={} user={}", room_id, user_id);
}

async fn finish(state: &AppState, room_id: Uuid, user_id: &str) {
    if state.presence.leave(room_id, user_id).await {
        broadcast_presence(state, room_id).await;
    }
    state.events.gc().await;
}

async fn broadcast_presence(state: &AppState, room_id: Uuid) {
    let online = state.presence.snapshot(room_id).await;
    state
        .events
        .publish(room_id, RoomEvent::Presence { room_id, online })
        .await;
}

async fn snapshot_message(state: &AppState, room_id: Uuid) -> Result<WsMessage, ApiError> {
    let room = load_room(&*state.db, room_id).await?;
    let set = load_bias_set(&*state.db, &room).await?;
    let online = state.presence.snapshot(room_id).await;
    Ok(WsMessage::Initial {
        room_id,
        entries: set.entries,
        counts: set.counts,
        overall: set.overall,
        online,
    })
}

async fn send_json(
    sender: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    message: &WsMessage,
) -> Result<(), axum::Error> {
    let text = serde_json::to_string(message).unwrap_or_default();
    sender.send(Message::Text(text.into())).await
}

async fn send_event(
    sender: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    event: &RoomEvent,
) -> Result<(), axum::Error> {
    let text = serde_json::to_string(event).unwrap_or_default();
    sender.send(Message::Text(text.into())).await
}
