//! Vote tally reads and member vote casting

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, Set,
};
use std::str::FromStr;
use uuid::Uuid;

use crate::entities::room_bias_votes;
use crate::handlers::auth::Identity;
use crate::handlers::rooms::{ensure_member_or_owner, load_room};
use crate::models::error::ApiError;
use crate::models::event::RoomEvent;
use crate::models::vote::{CastVoteRequest, VoteTallyResponse, VoteType};
use crate::services::stats::ActivityKind;
use crate::services::{achievements, stats, timeframes};
use crate::AppState;

async fn tally(
    db: &sea_orm::DatabaseConnection,
    room_id: Uuid,
    timeframe: &str,
) -> Result<(u32, u32), ApiError> {
    let agree = room_bias_votes::Entity::find()
        .filter(room_bias_votes::Column::RoomId.eq(room_id))
        .filter(room_bias_votes::Column::Timeframe.eq(timeframe))
        .filter(room_bias_votes::Column::VoteType.eq("agree"))
        .count(db)
        .await?;
    let disagree = room_bias_votes::Entity::find()
        .filter(room_bias_votes::Column::RoomId.eq(room_id))
        .filter(room_bias_votes::Column::Timeframe.eq(timeframe))
        .filter(room_bias_votes::Column::VoteType.eq("disagree"))
        .count(db)
        .await?;
    Ok((agree as u32, disagree as u32))
}

async fn own_vote(
    db: &sea_orm::DatabaseConnection,
    room_id: Uuid,
    timeframe: &str,
    user_id: &str,
) -> Result<Option<room_bias_votes::Model>, ApiError> {
    Ok(room_bias_votes::Entity::find()
        .filter(room_bias_votes::Column::RoomId.eq(room_id))
        .filter(room_bias_votes::Column::Timeframe.eq(timeframe))
        .filter(room_bias_votes::Column::UserId.eq(user_id))
        .one(db)
        .await?)
}

/// GET /api/rooms/{id}/votes/{timeframe} - Tally plus the caller's vote
pub async fn get_tally(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path((room_id, timeframe)): Path<(Uuid, String)>,
) -> Result<Json<VoteTallyResponse>, ApiError> {
    let room = load_room(&*state.db, room_id).await?;
    ensure_member_or_owner(&*state.db, &room, &user_id).await?;

    let labels = timeframes::labels_from_json(&room.timeframes);
    if !labels.contains(&timeframe) {
        return Err(ApiError::Validation(format!(
            "Timeframe '{}' is not configured for this room",
            timeframe
        )));
    }

    let (agree, disagree) = tally(&*state.db, room_id, &timeframe).await?;
    let your_vote = own_vote(&*state.db, room_id, &timeframe, &user_id)
        .await?
        .and_then(|v| VoteType::from_str(&v.vote_type).ok());

    Ok(Json(VoteTallyResponse {
        room_id,
        timeframe,
        agree,
        disagree,
        your_vote,
    }))
}

/// POST /api/rooms/{id}/votes - Cast, flip or retract a vote
///
/// Casting the same verdict twice retracts it; a different verdict replaces
/// the stored one.
pub async fn cast_vote(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(room_id): Path<Uuid>,
    Json(payload): Json<CastVoteRequest>,
) -> Result<Json<VoteTallyResponse>, ApiError> {
    let room = load_room(&*state.db, room_id).await?;
    ensure_member_or_owner(&*state.db, &room, &user_id).await?;

    let timeframe = payload.timeframe.trim().to_string();
    let labels = timeframes::labels_from_json(&room.timeframes);
    if !labels.contains(&timeframe) {
        return Err(ApiError::Validation(format!(
            "Timeframe '{}' is not configured for this room",
            timeframe
        )));
    }

    let existing = own_vote(&*state.db, room_id, &timeframe, &user_id).await?;
    let mut counted = false;

    match existing {
        Some(vote) if vote.vote_type == payload.vote.to_string() => {
            // Toggle off
            vote.delete(&*state.db).await?;
        }
        Some(vote) => {
            let mut active: room_bias_votes::ActiveModel = vote.into();
            active.vote_type = Set(payload.vote.to_string());
            active.created_at = Set(Utc::now().fixed_offset());
            active.update(&*state.db).await?;
            counted = true;
        }
        None => {
            // A racing insert hitting the unique index becomes an update
            let active = room_bias_votes::ActiveModel {
                id: Set(Uuid::new_v4()),
                room_id: Set(room_id),
                timeframe: Set(timeframe.clone()),
                user_id: Set(user_id.clone()),
                vote_type: Set(payload.vote.to_string()),
                created_at: Set(Utc::now().fixed_offset()),
            };
            room_bias_votes::Entity::insert(active)
                .on_conflict(
                    OnConflict::columns([
                        room_bias_votes::Column::RoomId,
                        room_bias_votes::Column::Timeframe,
                        room_bias_votes::Column::UserId,
                    ])
                    .update_columns([
                        room_bias_votes::Column::VoteType,
                        room_bias_votes::Column::CreatedAt,
                    ])
                    .to_owned(),
                )
                .exec(&*state.db)
                .await?;
            counted = true;
        }
    }

    let (agree, disagree) = tally(&*state.db, room_id, &timeframe).await?;
    state
        .events
        .publish(
            room_id,
            RoomEvent::VoteChanged {
                room_id,
                timeframe: timeframe.clone(),
                agree,
                disagree,
            },
        )
        .await;

    let your_vote = own_vote(&*state.db, room_id, &timeframe, &user_id)
        .await?
        .and_then(|v| VoteType::from_str(&v.vote_type).ok());

    if counted {
        let updated = stats::record_activity(&*state.db, &user_id, ActivityKind::Vote).await?;
        achievements::check_unlocks(&*state.db, &user_id, &updated).await?;
    }

    Ok(Json(VoteTallyResponse {
        room_id,
        timeframe,
        agree,
        disagree,
        your_vote,
    }))
}
