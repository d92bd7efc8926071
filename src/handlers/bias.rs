//! Bias read/advance/reset and timeframe management

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::entities::{room_bias, room_bias_votes, rooms};
use crate::handlers::auth::Identity;
use crate::handlers::rooms::{ensure_member_or_owner, ensure_owner, load_room};
use crate::models::bias::{
    AddTimeframeRequest, AdvanceBiasRequest, BiasSetResponse, BiasState, PresetsResponse,
    TimeframeBias,
};
use crate::models::error::ApiError;
use crate::models::event::RoomEvent;
use crate::services::{bias, timeframes};
use crate::AppState;

/// Load the room's bias entries in configured timeframe order. Timeframes
/// without a stored row read as neutral.
pub(crate) async fn load_bias_set(
    db: &sea_orm::DatabaseConnection,
    room: &rooms::Model,
) -> Result<BiasSetResponse, ApiError> {
    let labels = timeframes::labels_from_json(&room.timeframes);

    let rows = room_bias::Entity::find()
        .filter(room_bias::Column::RoomId.eq(room.id))
        .all(db)
        .await?;
    let by_timeframe: HashMap<String, String> = rows
        .into_iter()
        .map(|row| (row.timeframe, row.bias_state))
        .collect();

    let entries: Vec<TimeframeBias> = labels
        .iter()
        .map(|label| TimeframeBias {
            timeframe: label.clone(),
            bias_state: by_timeframe
                .get(label)
                .and_then(|s| BiasState::from_str(s).ok())
                .unwrap_or(BiasState::Neutral),
        })
        .collect();

    let (counts, overall) = bias::aggregate(entries.iter().map(|e| e.bias_state));

    Ok(BiasSetResponse {
        room_id: room.id,
        entries,
        counts,
        overall,
    })
}

/// GET /api/rooms/{id}/bias - Full bias set with the aggregate verdict
pub async fn get_bias(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(room_id): Path<Uuid>,
) -> Result<Json<BiasSetResponse>, ApiError> {
    let room = load_room(&*state.db, room_id).await?;
    ensure_member_or_owner(&*state.db, &room, &user_id).await?;
    Ok(Json(load_bias_set(&*state.db, &room).await?))
}

/// POST /api/rooms/{id}/bias/advance - Owner cycles one timeframe's state
///
/// neutral -> bullish -> bearish -> neutral. Votes for the timeframe are
/// cleared since they referred to the previous state.
pub async fn advance_bias(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(room_id): Path<Uuid>,
    Json(payload): Json<AdvanceBiasRequest>,
) -> Result<Json<BiasSetResponse>, ApiError> {
    let room = load_room(&*state.db, room_id).await?;
    ensure_owner(&room, &user_id)?;

    let labels = timeframes::labels_from_json(&room.timeframes);
    let label = payload.timeframe.trim().to_string();
    if !labels.contains(&label) {
        return Err(ApiError::Validation(format!(
            "Timeframe '{}' is not configured for this room",
            label
        )));
    }

    let now = Utc::now().fixed_offset();
    let existing = room_bias::Entity::find()
        .filter(room_bias::Column::RoomId.eq(room_id))
        .filter(room_bias::Column::Timeframe.eq(&label))
        .one(&*state.db)
        .await?;

    let next = match existing {
        Some(row) => {
            let current = BiasState::from_str(&row.bias_state).unwrap_or(BiasState::Neutral);
            let next = bias::advance(current);
            let mut active: room_bias::ActiveModel = row.into();
            active.bias_state = Set(next.to_string());
            active.updated_by = Set(Some(user_id.clone()));
            active.updated_at = Set(now);
            active.update(&*state.db).await?;
            next
        }
        None => {
            let next = bias::advance(BiasState::Neutral);
            let active = room_bias::ActiveModel {
                id: Set(Uuid::new_v4()),
                room_id: Set(room_id),
                timeframe: Set(label.clone()),
                bias_state: Set(next.to_string()),
                updated_by: Set(Some(user_id.clone())),
                updated_at: Set(now),
            };
            active.insert(&*state.db).await?;
            next
        }
    };

    // Votes were cast against the previous state
    room_bias_votes::Entity::delete_many()
        .filter(room_bias_votes::Column::RoomId.eq(room_id))
        .filter(room_bias_votes::Column::Timeframe.eq(&label))
        .exec(&*state.db)
        .await?;

    let set = load_bias_set(&*state.db, &room).await?;

    state
        .events
        .publish(
            room_id,
            RoomEvent::BiasChanged {
                room_id,
                timeframe: label.clone(),
                bias_state: next,
                counts: set.counts,
                overall: set.overall,
            },
        )
        .await;
    state
        .events
        .publish(
            room_id,
            RoomEvent::VoteChanged {
                room_id,
                timeframe: label,
                agree: 0,
                disagree: 0,
            },
        )
        .await;

    Ok(Json(set))
}

/// POST /api/rooms/{id}/bias/reset - Owner resets every timeframe to neutral
pub async fn reset_bias(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(room_id): Path<Uuid>,
) -> Result<Json<BiasSetResponse>, ApiError> {
    let room = load_room(&*state.db, room_id).await?;
    ensure_owner(&room, &user_id)?;

    let now = Utc::now().fixed_offset();
    room_bias::Entity::update_many()
        .col_expr(
            room_bias::Column::BiasState,
            sea_orm::sea_query::Expr::value("neutral"),
        )
        .col_expr(
            room_bias::Column::UpdatedBy,
            sea_orm::sea_query::Expr::value(user_id.clone()),
        )
        .col_expr(room_bias::Column::UpdatedAt, sea_orm::sea_query::Expr::value(now))
        .filter(room_bias::Column::RoomId.eq(room_id))
        .exec(&*state.db)
        .await?;

    room_bias_votes::Entity::delete_many()
        .filter(room_bias_votes::Column::RoomId.eq(room_id))
        .exec(&*state.db)
        .await?;

    info!("User {} reset bias for room {}", user_id, room_id);

    let set = load_bias_set(&*state.db, &room).await?;
    for entry in &set.entries {
        state
            .events
            .publish(
                room_id,
                RoomEvent::BiasChanged {
                    room_id,
                    timeframe: entry.timeframe.clone(),
                    bias_state: entry.bias_state,
                    counts: set.counts,
                    overall: set.overall,
                },
            )
            .await;
    }

    Ok(Json(set))
}

/// POST /api/rooms/{id}/timeframes - Owner appends a timeframe
pub async fn add_timeframe(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(room_id): Path<Uuid>,
    Json(payload): Json<AddTimeframeRequest>,
) -> Result<Json<BiasSetResponse>, ApiError> {
    let room = load_room(&*state.db, room_id).await?;
    ensure_owner(&room, &user_id)?;

    let label = timeframes::validate_label(&payload.timeframe)?;
    let mut labels = timeframes::labels_from_json(&room.timeframes);
    if labels.contains(&label) {
        return Err(ApiError::Validation(format!(
            "Timeframe '{}' already configured",
            label
        )));
    }
    if labels.len() >= timeframes::MAX_TIMEFRAMES {
        return Err(ApiError::Validation(format!(
            "Maximum {} timeframes allowed",
            timeframes::MAX_TIMEFRAMES
        )));
    }
    labels.push(label.clone());

    let mut active: rooms::ActiveModel = room.into();
    active.timeframes = Set(timeframes::labels_to_json(&labels));
    let room = active.update(&*state.db).await?;

    let now = Utc::now().fixed_offset();
    let seed = room_bias::ActiveModel {
        id: Set(Uuid::new_v4()),
        room_id: Set(room_id),
        timeframe: Set(label),
        bias_state: Set("neutral".to_string()),
        updated_by: Set(Some(user_id)),
        updated_at: Set(now),
    };
    seed.insert(&*state.db).await?;

    state
        .events
        .publish(
            room_id,
            RoomEvent::TimeframesChanged {
                room_id,
                timeframes: labels,
            },
        )
        .await;

    Ok(Json(load_bias_set(&*state.db, &room).await?))
}

/// DELETE /api/rooms/{id}/timeframes/{label} - Owner removes a timeframe
pub async fn remove_timeframe(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path((room_id, label)): Path<(Uuid, String)>,
) -> Result<Json<BiasSetResponse>, ApiError> {
    let room = load_room(&*state.db, room_id).await?;
    ensure_owner(&room, &user_id)?;

    let mut labels = timeframes::labels_from_json(&room.timeframes);
    let before = labels.len();
    labels.retain(|l| l != &label);
    if labels.len() == before {
        return Err(ApiError::NotFound(format!(
            "Timeframe '{}' is not configured for this room",
            label
        )));
    }
    if labels.is_empty() {
        return Err(ApiError::Validation(
            "A room needs at least 1 timeframe".to_string(),
        ));
    }

    let mut active: rooms::ActiveModel = room.into();
    active.timeframes = Set(timeframes::labels_to_json(&labels));
    let room = active.update(&*state.db).await?;

    room_bias::Entity::delete_many()
        .filter(room_bias::Column::RoomId.eq(room_id))
        .filter(room_bias::Column::Timeframe.eq(&label))
        .exec(&*state.db)
        .await?;
    room_bias_votes::Entity::delete_many()
        .filter(room_bias_votes::Column::RoomId.eq(room_id))
        .filter(room_bias_votes::Column::Timeframe.eq(&label))
        .exec(&*state.db)
        .await?;

    state
        .events
        .publish(
            room_id,
            RoomEvent::TimeframesChanged {
                room_id,
                timeframes: labels,
            },
        )
        .await;

    Ok(Json(load_bias_set(&*state.db, &room).await?))
}

/// GET /api/timeframes/presets - Static preset catalog
pub async fn presets() -> (StatusCode, Json<PresetsResponse>) {
    (
        StatusCode::OK,
        Json(PresetsResponse {
            presets: timeframes::PRESET_TIMEFRAMES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }),
    )
}
