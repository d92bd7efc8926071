//! Room chat and direct messages

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::{direct_messages, room_messages};
use crate::handlers::auth::Identity;
use crate::handlers::rooms::{ensure_member_or_owner, load_room, username_map};
use crate::handlers::{friends, profile};
use crate::models::chat::{
    ChatHistoryResponse, ChatMessage, DmConversationResponse, DmEntry, SendDmRequest,
    SendMessageRequest,
};
use crate::models::error::ApiError;
use crate::models::event::RoomEvent;
use crate::services::stats::ActivityKind;
use crate::services::{achievements, stats};
use crate::AppState;

/// Messages longer than this are rejected
pub const MAX_MESSAGE_LEN: usize = 1000;

const DEFAULT_HISTORY_LIMIT: u64 = 100;
const MAX_HISTORY_LIMIT: u64 = 500;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u64>,
}

fn validate_message(raw: &str) -> Result<String, ApiError> {
    let message = raw.trim();
    if message.is_empty() {
        return Err(ApiError::Validation("Message is required".to_string()));
    }
    // Character count, not byte length; multi-byte text gets the full limit
    if message.chars().count() > MAX_MESSAGE_LEN {
        return Err(ApiError::Validation(format!(
            "Message exceeds {} characters",
            MAX_MESSAGE_LEN
        )));
    }
    Ok(message.to_string())
}

/// GET /api/rooms/{id}/messages - Recent history, chronological
pub async fn room_history(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(room_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ChatHistoryResponse>, ApiError> {
    let room = load_room(&*state.db, room_id).await?;
    ensure_member_or_owner(&*state.db, &room, &user_id).await?;

    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);

    // Newest N, then flip to chronological
    let mut rows = room_messages::Entity::find()
        .filter(room_messages::Column::RoomId.eq(room_id))
        .order_by_desc(room_messages::Column::CreatedAt)
        .limit(limit)
        .all(&*state.db)
        .await?;
    rows.reverse();

    let user_ids: Vec<String> = rows.iter().map(|m| m.user_id.clone()).collect();
    let names = username_map(&*state.db, &user_ids).await?;

    let messages = rows
        .into_iter()
        .map(|m| ChatMessage {
            id: m.id,
            room_id: m.room_id,
            username: names.get(&m.user_id).cloned().flatten(),
            user_id: m.user_id,
            message: m.message,
            created_at: m.created_at,
        })
        .collect();

    Ok(Json(ChatHistoryResponse { messages }))
}

/// POST /api/rooms/{id}/messages - Post a message and broadcast it
pub async fn send_message(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(room_id): Path<Uuid>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), ApiError> {
    let room = load_room(&*state.db, room_id).await?;
    ensure_member_or_owner(&*state.db, &room, &user_id).await?;

    let message = validate_message(&payload.message)?;
    let now = Utc::now().fixed_offset();

    let row = room_messages::ActiveModel {
        id: Set(Uuid::new_v4()),
        room_id: Set(room_id),
        user_id: Set(user_id.clone()),
        message: Set(message),
        created_at: Set(now),
    };
    let row = row.insert(&*state.db).await?;

    let username = profile::username_of(&*state.db, &user_id).await?;
    let chat_message = ChatMessage {
        id: row.id,
        room_id: row.room_id,
        user_id: row.user_id,
        username,
        message: row.message,
        created_at: row.created_at,
    };

    state
        .events
        .publish(room_id, RoomEvent::Message(chat_message.clone()))
        .await;

    let updated = stats::record_activity(&*state.db, &user_id, ActivityKind::Message).await?;
    achievements::check_unlocks(&*state.db, &user_id, &updated).await?;

    Ok((StatusCode::CREATED, Json(chat_message)))
}

/// GET /api/dm/{peer_id}?limit= - Conversation with a friend, oldest first.
/// Marks the peer's messages to the caller as read.
pub async fn dm_conversation(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(peer_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<DmConversationResponse>, ApiError> {
    if !friends::are_friends(&*state.db, &user_id, &peer_id).await? {
        return Err(ApiError::PermissionDenied(
            "Direct messages are limited to friends".to_string(),
        ));
    }

    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);

    // Newest N, flipped to chronological
    let mut rows = direct_messages::Entity::find()
        .filter(
            Condition::any()
                .add(
                    Condition::all()
                        .add(direct_messages::Column::SenderId.eq(&user_id))
                        .add(direct_messages::Column::ReceiverId.eq(&peer_id)),
                )
                .add(
                    Condition::all()
                        .add(direct_messages::Column::SenderId.eq(&peer_id))
                        .add(direct_messages::Column::ReceiverId.eq(&user_id)),
                ),
        )
        .order_by_desc(direct_messages::Column::CreatedAt)
        .limit(limit)
        .all(&*state.db)
        .await?;
    rows.reverse();

    direct_messages::Entity::update_many()
        .col_expr(direct_messages::Column::Read, Expr::value(true))
        .filter(direct_messages::Column::SenderId.eq(&peer_id))
        .filter(direct_messages::Column::ReceiverId.eq(&user_id))
        .filter(direct_messages::Column::Read.eq(false))
        .exec(&*state.db)
        .await?;

    let messages = rows
        .into_iter()
        .map(|m| DmEntry {
            id: m.id,
            sender_id: m.sender_id,
            receiver_id: m.receiver_id,
            message: m.message,
            read: m.read,
            created_at: m.created_at,
        })
        .collect();

    Ok(Json(DmConversationResponse { messages }))
}

/// POST /api/dm/{peer_id} - Send a direct message to a friend
pub async fn send_dm(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(peer_id): Path<String>,
    Json(payload): Json<SendDmRequest>,
) -> Result<(StatusCode, Json<DmEntry>), ApiError> {
    if peer_id == user_id {
        return Err(ApiError::Validation(
            "Cannot message yourself".to_string(),
        ));
    }
    if !friends::are_friends(&*state.db, &user_id, &peer_id).await? {
        return Err(ApiError::PermissionDenied(
            "Direct messages are limited to friends".to_string(),
        ));
    }

    let message = validate_message(&payload.message)?;

    let row = direct_messages::ActiveModel {
        id: Set(Uuid::new_v4()),
        sender_id: Set(user_id),
        receiver_id: Set(peer_id),
        message: Set(message),
        read: Set(false),
        created_at: Set(Utc::now().fixed_offset()),
    };
    let row = row.insert(&*state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(DmEntry {
            id: row.id,
            sender_id: row.sender_id,
            receiver_id: row.receiver_id,
            message: row.message,
            read: row.read,
            created_at: row.created_at,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_trimmed() {
        assert_eq!(validate_message("  hi  ").unwrap(), "hi");
    }

    #[test]
    fn test_empty_message_rejected() {
        assert!(validate_message("   ").is_err());
    }

    #[test]
    fn test_oversized_message_rejected() {
        let long = "a".repeat(MAX_MESSAGE_LEN + 1);
        assert!(validate_message(&long).is_err());
        let ok = "a".repeat(MAX_MESSAGE_LEN);
        assert!(validate_message(&ok).is_ok());
    }

    #[test]
    fn test_limit_counts_characters_not_bytes() {
        // Two bytes per char; must still fit the full character limit
        let ok = "é".repeat(MAX_MESSAGE_LEN);
        assert!(validate_message(&ok).is_ok());
        let long = "é".repeat(MAX_MESSAGE_LEN + 1);
        assert!(validate_message(&long).is_err());
    }
}
