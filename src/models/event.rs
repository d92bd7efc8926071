//! Typed room events for the realtime feed
//!
//! Events carry absolute state (the full tally, the full roster) rather than
//! deltas, so delivering the same event twice is a no-op for consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::bias::{BiasCounts, BiasState};
use crate::models::chat::ChatMessage;

/// One user currently present in a room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceUser {
    pub user_id: String,
    pub username: Option<String>,
    pub online_at: DateTime<Utc>,
}

/// Event broadcast to every subscriber of a room's feed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    /// A timeframe's bias state changed; carries the recomputed aggregate
    BiasChanged {
        room_id: Uuid,
        timeframe: String,
        bias_state: BiasState,
        counts: BiasCounts,
        overall: BiasState,
    },
    /// A vote was cast, replaced or retracted; carries the full tally
    VoteChanged {
        room_id: Uuid,
        timeframe: String,
        agree: u32,
        disagree: u32,
    },
    /// A chat message was posted
    Message(ChatMessage),
    /// The room's timeframe set changed
    TimeframesChanged {
        room_id: Uuid,
        timeframes: Vec<String>,
    },
    /// A user joined the room via invite code
    MemberJoined {
        room_id: Uuid,
        user_id: String,
        username: Option<String>,
    },
    /// The online roster changed; carries the full roster
    Presence {
        room_id: Uuid,
        online: Vec<PresenceUser>,
    },
}

/// Control messages on the WebSocket, distinguished from [`RoomEvent`]s by
/// their `type` tag
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// First frame after connecting: current bias set and roster
    Initial {
        room_id: Uuid,
        entries: Vec<crate::models::bias::TimeframeBias>,
        counts: BiasCounts,
        overall: BiasState,
        online: Vec<PresenceUser>,
    },
    Error {
        message: String,
    },
    Pong,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = RoomEvent::VoteChanged {
            room_id: Uuid::nil(),
            timeframe: "4H".to_string(),
            agree: 3,
            disagree: 1,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "vote_changed");
        assert_eq!(json["agree"], 3);
    }

    #[test]
    fn test_bias_changed_round_trips() {
        let event = RoomEvent::BiasChanged {
            room_id: Uuid::nil(),
            timeframe: "1D".to_string(),
            bias_state: BiasState::Bullish,
            counts: BiasCounts {
                bullish: 1,
                bearish: 0,
                neutral: 4,
            },
            overall: BiasState::Neutral,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: RoomEvent = serde_json::from_str(&json).unwrap();
        match back {
            RoomEvent::BiasChanged {
                bias_state, overall, ..
            } => {
                assert_eq!(bias_state, BiasState::Bullish);
                assert_eq!(overall, BiasState::Neutral);
            }
            _ => panic!("wrong variant"),
        }
    }
}
