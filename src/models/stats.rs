//! User stats and achievement response models

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::entities::user_stats;

/// GET /api/stats response; zeroed defaults when the user has no row yet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_votes: i32,
    pub messages_sent: i32,
    pub rooms_visited: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_active_date: Option<NaiveDate>,
}

impl From<user_stats::Model> for StatsResponse {
    fn from(model: user_stats::Model) -> Self {
        Self {
            total_votes: model.total_votes,
            messages_sent: model.messages_sent,
            rooms_visited: model.rooms_visited,
            current_streak: model.current_streak,
            longest_streak: model.longest_streak,
            last_active_date: model.last_active_date,
        }
    }
}

/// One catalog achievement with the caller's unlock state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementStatus {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: String,
    pub requirement_value: i32,
    /// Set when the caller has unlocked it
    pub unlocked_at: Option<DateTime<FixedOffset>>,
}

/// GET /api/achievements response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementsResponse {
    pub achievements: Vec<AchievementStatus>,
    pub unlocked: usize,
    pub total: usize,
}
