//! Bias state and aggregation response models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-timeframe market-direction flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiasState {
    Neutral,
    Bullish,
    Bearish,
}

impl std::fmt::Display for BiasState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BiasState::Neutral => write!(f, "neutral"),
            BiasState::Bullish => write!(f, "bullish"),
            BiasState::Bearish => write!(f, "bearish"),
        }
    }
}

impl std::str::FromStr for BiasState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "neutral" => Ok(BiasState::Neutral),
            "bullish" => Ok(BiasState::Bullish),
            "bearish" => Ok(BiasState::Bearish),
            _ => Err(format!("Unknown bias state: {}", s)),
        }
    }
}

/// Raw occurrence counts over a room's configured timeframes.
/// Always sums to the number of timeframes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiasCounts {
    pub bullish: u32,
    pub bearish: u32,
    pub neutral: u32,
}

/// One timeframe's current state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeframeBias {
    pub timeframe: String,
    pub bias_state: BiasState,
}

/// GET /api/rooms/{id}/bias response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiasSetResponse {
    pub room_id: Uuid,
    /// In the room's configured timeframe order
    pub entries: Vec<TimeframeBias>,
    pub counts: BiasCounts,
    pub overall: BiasState,
}

/// POST /api/rooms/{id}/bias/advance request
#[derive(Debug, Clone, Deserialize)]
pub struct AdvanceBiasRequest {
    pub timeframe: String,
}

/// POST /api/rooms/{id}/timeframes request
#[derive(Debug, Clone, Deserialize)]
pub struct AddTimeframeRequest {
    pub timeframe: String,
}

/// GET /api/timeframes/presets response
#[derive(Debug, Clone, Serialize)]
pub struct PresetsResponse {
    pub presets: Vec<String>,
}
