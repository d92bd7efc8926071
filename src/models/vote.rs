//! Vote request/response models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Member verdict on the owner's current bias for a timeframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Agree,
    Disagree,
}

impl std::fmt::Display for VoteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteType::Agree => write!(f, "agree"),
            VoteType::Disagree => write!(f, "disagree"),
        }
    }
}

impl std::str::FromStr for VoteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "agree" => Ok(VoteType::Agree),
            "disagree" => Ok(VoteType::Disagree),
            _ => Err(format!("Unknown vote type: {}", s)),
        }
    }
}

/// POST /api/rooms/{id}/votes request
#[derive(Debug, Clone, Deserialize)]
pub struct CastVoteRequest {
    pub timeframe: String,
    pub vote: VoteType,
}

/// Vote tally for one (room, timeframe), including the caller's own vote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteTallyResponse {
    pub room_id: Uuid,
    pub timeframe: String,
    pub agree: u32,
    pub disagree: u32,
    /// None when the caller has not voted
    pub your_vote: Option<VoteType>,
}
