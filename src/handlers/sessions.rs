//! Room session snapshots
//!
//! A session captures the bias verdicts at the moment it opens: the first,
//! middle and last configured timeframes map to short/medium/long term,
//! with the participant count taken from the live presence roster. Ending
//! the session stamps `ended_at` on the open row.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entities::room_sessions;
use crate::handlers::auth::Identity;
use crate::handlers::bias::load_bias_set;
use crate::handlers::rooms::{ensure_member_or_owner, ensure_owner, load_room};
use crate::models::error::ApiError;
use crate::models::session::{SessionResponse, SessionsResponse};
use crate::AppState;

/// POST /api/rooms/{id}/sessions - Owner opens a session, snapshotting the
/// current verdicts and participant count
pub async fn start_session(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(room_id): Path<Uuid>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let room = load_room(&*state.db, room_id).await?;
    ensure_owner(&room, &user_id)?;

    let open = room_sessions::Entity::find()
        .filter(room_sessions::Column::RoomId.eq(room_id))
        .filter(room_sessions::Column::EndedAt.is_null())
        .one(&*state.db)
        .await?;
    if open.is_some() {
        return Err(ApiError::Conflict(
            "A session is already open for this room".to_string(),
        ));
    }

    let set = load_bias_set(&*state.db, &room).await?;
    let states: Vec<String> = set
        .entries
        .iter()
        .map(|e| e.bias_state.to_string())
        .collect();
    let (short, medium, long) = term_snapshot(&states);
    let participants = state.presence.count(room_id).await as i32;

    let session = room_sessions::ActiveModel {
        id: Set(Uuid::new_v4()),
        room_id: Set(room_id),
        started_at: Set(Utc::now().fixed_offset()),
        ended_at: Set(None),
        participants_count: Set(Some(participants)),
        short_term_bias: Set(short),
        medium_term_bias: Set(medium),
        long_term_bias: Set(long),
    };
    let session = session.insert(&*state.db).await?;

    Ok((StatusCode::CREATED, Json(session.into())))
}

/// POST /api/rooms/{id}/sessions/end - Owner closes the open session
pub async fn end_session(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(room_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let room = load_room(&*state.db, room_id).await?;
    ensure_owner(&room, &user_id)?;

    let session = room_sessions::Entity::find()
        .filter(room_sessions::Column::RoomId.eq(room_id))
        .filter(room_sessions::Column::EndedAt.is_null())
        .one(&*state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("No open session for this room".to_string()))?;

    let mut active: room_sessions::ActiveModel = session.into();
    active.ended_at = Set(Some(Utc::now().fixed_offset()));
    let session = active.update(&*state.db).await?;

    Ok(Json(session.into()))
}

/// GET /api/rooms/{id}/sessions - History, newest first
pub async fn list_sessions(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(room_id): Path<Uuid>,
) -> Result<Json<SessionsResponse>, ApiError> {
    let room = load_room(&*state.db, room_id).await?;
    ensure_member_or_owner(&*state.db, &room, &user_id).await?;

    let rows = room_sessions::Entity::find()
        .filter(room_sessions::Column::RoomId.eq(room_id))
        .order_by_desc(room_sessions::Column::StartedAt)
        .all(&*state.db)
        .await?;

    Ok(Json(SessionsResponse {
        sessions: rows.into_iter().map(SessionResponse::from).collect(),
    }))
}

/// Map an ordered list of per-timeframe states onto (short, medium, long):
/// first, middle and last entries. Shorter lists collapse onto the same
/// entries.
fn term_snapshot(states: &[String]) -> (Option<String>, Option<String>, Option<String>) {
    if states.is_empty() {
        return (None, None, None);
    }
    let first = states.first().cloned();
    let middle = states.get(states.len() / 2).cloned();
    let last = states.last().cloned();
    (first, middle, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_snapshot_five_entries() {
        let states = labels(&["bullish", "bullish", "neutral", "bearish", "bearish"]);
        let (s, m, l) = term_snapshot(&states);
        assert_eq!(s.as_deref(), Some("bullish"));
        assert_eq!(m.as_deref(), Some("neutral"));
        assert_eq!(l.as_deref(), Some("bearish"));
    }

    #[test]
    fn test_snapshot_single_entry() {
        let states = labels(&["bearish"]);
        let (s, m, l) = term_snapshot(&states);
        assert_eq!(s.as_deref(), Some("bearish"));
        assert_eq!(m.as_deref(), Some("bearish"));
        assert_eq!(l.as_deref(), Some("bearish"));
    }

    #[test]
    fn test_snapshot_empty() {
        assert_eq!(term_snapshot(&[]), (None, None, None));
    }

    #[test]
    fn test_snapshot_two_entries() {
        let states = labels(&["bullish", "bearish"]);
        let (s, m, l) = term_snapshot(&states);
        assert_eq!(s.as_deref(), Some("bullish"));
        assert_eq!(m.as_deref(), Some("bearish"));
        assert_eq!(l.as_deref(), Some("bearish"));
    }
}
