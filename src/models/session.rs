//! Room session snapshot models

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::room_sessions;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub room_id: Uuid,
    pub started_at: DateTime<FixedOffset>,
    pub ended_at: Option<DateTime<FixedOffset>>,
    pub participants_count: Option<i32>,
    pub short_term_bias: Option<String>,
    pub medium_term_bias: Option<String>,
    pub long_term_bias: Option<String>,
}

impl From<room_sessions::Model> for SessionResponse {
    fn from(model: room_sessions::Model) -> Self {
        Self {
            id: model.id,
            room_id: model.room_id,
            started_at: model.started_at,
            ended_at: model.ended_at,
            participants_count: model.participants_count,
            short_term_bias: model.short_term_bias,
            medium_term_bias: model.medium_term_bias,
            long_term_bias: model.long_term_bias,
        }
    }
}

/// GET /api/rooms/{id}/sessions response (newest first)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionResponse>,
}
