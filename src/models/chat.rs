//! Room chat and direct message models

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// POST /api/rooms/{id}/messages request
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

/// One chat message with the sender's profile name resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub room_id: Uuid,
    pub user_id: String,
    pub username: Option<String>,
    pub message: String,
    pub created_at: DateTime<FixedOffset>,
}

/// GET /api/rooms/{id}/messages response (chronological)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHistoryResponse {
    pub messages: Vec<ChatMessage>,
}

/// POST /api/dm/{peer_id} request
#[derive(Debug, Clone, Deserialize)]
pub struct SendDmRequest {
    pub message: String,
}

/// One direct message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DmEntry {
    pub id: Uuid,
    pub sender_id: String,
    pub receiver_id: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<FixedOffset>,
}

/// GET /api/dm/{peer_id} response (oldest first)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DmConversationResponse {
    pub messages: Vec<DmEntry>,
}
