//! User stats and achievement endpoints

use axum::{extract::State, Json};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use std::collections::HashMap;

use crate::entities::{achievements, user_achievements, user_stats};
use crate::handlers::auth::Identity;
use crate::models::error::ApiError;
use crate::models::stats::{AchievementStatus, AchievementsResponse, StatsResponse};
use crate::AppState;

/// GET /api/stats - Caller's counters and streaks; zeroes when inactive
pub async fn get_stats(
    State(state): State<AppState>,
    Identity(user_id): Identity,
) -> Result<Json<StatsResponse>, ApiError> {
    let row = user_stats::Entity::find_by_id(&user_id).one(&*state.db).await?;
    Ok(Json(row.map(StatsResponse::from).unwrap_or_default()))
}

/// GET /api/achievements - Full catalog with the caller's unlock state
pub async fn get_achievements(
    State(state): State<AppState>,
    Identity(user_id): Identity,
) -> Result<Json<AchievementsResponse>, ApiError> {
    let catalog = achievements::Entity::find().all(&*state.db).await?;
    let unlocked_rows = user_achievements::Entity::find()
        .filter(user_achievements::Column::UserId.eq(&user_id))
        .all(&*state.db)
        .await?;
    let unlocked_at: HashMap<String, chrono::DateTime<chrono::FixedOffset>> = unlocked_rows
        .into_iter()
        .map(|r| (r.achievement_id, r.unlocked_at))
        .collect();

    let total = catalog.len();
    let unlocked = unlocked_at.len();
    let statuses = catalog
        .into_iter()
        .map(|a| AchievementStatus {
            unlocked_at: unlocked_at.get(&a.id).copied(),
            id: a.id,
            name: a.name,
            description: a.description,
            icon: a.icon,
            category: a.category,
            requirement_value: a.requirement_value,
        })
        .collect();

    Ok(Json(AchievementsResponse {
        achievements: statuses,
        unlocked,
        total,
    }))
}
