//! Room CRUD, invite-code joining, membership and favorites

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::{
    favorite_rooms, notifications, profiles, room_bias, room_bias_votes, room_members,
    room_messages, room_sessions, rooms,
};
use crate::handlers::auth::Identity;
use crate::models::error::ApiError;
use crate::models::event::RoomEvent;
use crate::models::room::{
    CreateRoomRequest, FavoriteEntry, FavoritesResponse, JoinRoomRequest, JoinRoomResponse,
    MemberEntry, MembersResponse, RoomListResponse, RoomResponse,
};
use crate::services::stats::ActivityKind;
use crate::services::{achievements, invite, notify, stats, timeframes};
use crate::AppState;

/// A user owns at most this many rooms
pub const MAX_OWNED_ROOMS: u64 = 5;

/// Fetch a room or fail with NotFound.
pub(crate) async fn load_room(
    db: &sea_orm::DatabaseConnection,
    room_id: Uuid,
) -> Result<rooms::Model, ApiError> {
    rooms::Entity::find_by_id(room_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))
}

pub(crate) async fn is_member(
    db: &sea_orm::DatabaseConnection,
    room_id: Uuid,
    user_id: &str,
) -> Result<bool, DbErr> {
    Ok(room_members::Entity::find()
        .filter(room_members::Column::RoomId.eq(room_id))
        .filter(room_members::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .is_some())
}

/// Members and the owner may read room state.
pub(crate) async fn ensure_member_or_owner(
    db: &sea_orm::DatabaseConnection,
    room: &rooms::Model,
    user_id: &str,
) -> Result<(), ApiError> {
    if room.owner_id == user_id || is_member(db, room.id, user_id).await? {
        Ok(())
    } else {
        Err(ApiError::PermissionDenied(
            "You are not a member of this room".to_string(),
        ))
    }
}

/// Owner-only mutations.
pub(crate) fn ensure_owner(room: &rooms::Model, user_id: &str) -> Result<(), ApiError> {
    if room.owner_id == user_id {
        Ok(())
    } else {
        Err(ApiError::PermissionDenied(
            "Only the room owner can do this".to_string(),
        ))
    }
}

fn to_response(room: rooms::Model, user_id: &str) -> RoomResponse {
    let is_owner = room.owner_id == user_id;
    RoomResponse {
        id: room.id,
        name: room.name,
        owner_id: room.owner_id,
        invite_code: room.invite_code,
        timeframes: timeframes::labels_from_json(&room.timeframes),
        created_at: room.created_at,
        is_owner,
    }
}

/// POST /api/rooms - Create a room
pub async fn create_room(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Json(payload): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomResponse>), ApiError> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Validation("Room name is required".to_string()));
    }

    let labels = match payload.timeframes {
        Some(ref labels) => timeframes::validate_set(labels)?,
        None => timeframes::DEFAULT_TIMEFRAMES
            .iter()
            .map(|s| s.to_string())
            .collect(),
    };

    let owned = rooms::Entity::find()
        .filter(rooms::Column::OwnerId.eq(&user_id))
        .count(&*state.db)
        .await?;
    if owned >= MAX_OWNED_ROOMS {
        return Err(ApiError::Validation(format!(
            "You already own the maximum of {} rooms",
            MAX_OWNED_ROOMS
        )));
    }

    let duplicate = rooms::Entity::find()
        .filter(rooms::Column::OwnerId.eq(&user_id))
        .filter(rooms::Column::Name.eq(&name))
        .one(&*state.db)
        .await?;
    if duplicate.is_some() {
        return Err(ApiError::Validation(format!(
            "You already own a room named '{}'",
            name
        )));
    }

    let invite_code = invite::fresh_code(&*state.db).await?;
    let room_id = Uuid::new_v4();
    let now = Utc::now().fixed_offset();

    let room = rooms::ActiveModel {
        id: Set(room_id),
        name: Set(name),
        owner_id: Set(user_id.clone()),
        invite_code: Set(invite_code),
        timeframes: Set(timeframes::labels_to_json(&labels)),
        created_at: Set(now),
    };
    let room = room.insert(&*state.db).await?;

    // Seed a neutral bias row per timeframe
    for label in &labels {
        let bias = room_bias::ActiveModel {
            id: Set(Uuid::new_v4()),
            room_id: Set(room_id),
            timeframe: Set(label.clone()),
            bias_state: Set("neutral".to_string()),
            updated_by: Set(Some(user_id.clone())),
            updated_at: Set(now),
        };
        bias.insert(&*state.db).await?;
    }

    info!("User {} created room {}", user_id, room_id);

    Ok((StatusCode::CREATED, Json(to_response(room, &user_id))))
}

/// GET /api/rooms - Rooms the caller owns or belongs to, deduplicated
pub async fn list_rooms(
    State(state): State<AppState>,
    Identity(user_id): Identity,
) -> Result<Json<RoomListResponse>, ApiError> {
    let owned = rooms::Entity::find()
        .filter(rooms::Column::OwnerId.eq(&user_id))
        .order_by_desc(rooms::Column::CreatedAt)
        .all(&*state.db)
        .await?;

    let memberships = room_members::Entity::find()
        .filter(room_members::Column::UserId.eq(&user_id))
        .all(&*state.db)
        .await?;
    let member_room_ids: Vec<Uuid> = memberships.iter().map(|m| m.room_id).collect();

    let joined = if member_room_ids.is_empty() {
        Vec::new()
    } else {
        rooms::Entity::find()
            .filter(rooms::Column::Id.is_in(member_room_ids))
            .all(&*state.db)
            .await?
    };

    let mut seen = HashMap::new();
    for room in owned.into_iter().chain(joined) {
        seen.entry(room.id).or_insert(room);
    }
    let mut list: Vec<RoomResponse> = seen
        .into_values()
        .map(|room| to_response(room, &user_id))
        .collect();
    list.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(RoomListResponse { rooms: list }))
}

/// GET /api/rooms/{id} - Room detail for members and the owner
pub async fn get_room(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(room_id): Path<Uuid>,
) -> Result<Json<RoomResponse>, ApiError> {
    let room = load_room(&*state.db, room_id).await?;
    ensure_member_or_owner(&*state.db, &room, &user_id).await?;
    Ok(Json(to_response(room, &user_id)))
}

/// DELETE /api/rooms/{id} - Owner deletes a room and its dependent rows
///
/// The deletes are independent statements with no cross-statement
/// atomicity; a failure part-way through surfaces as an error and leaves
/// the remaining rows intact.
pub async fn delete_room(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(room_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let room = load_room(&*state.db, room_id).await?;
    ensure_owner(&room, &user_id)?;

    room_members::Entity::delete_many()
        .filter(room_members::Column::RoomId.eq(room_id))
        .exec(&*state.db)
        .await?;
    room_bias::Entity::delete_many()
        .filter(room_bias::Column::RoomId.eq(room_id))
        .exec(&*state.db)
        .await?;
    room_bias_votes::Entity::delete_many()
        .filter(room_bias_votes::Column::RoomId.eq(room_id))
        .exec(&*state.db)
        .await?;
    room_messages::Entity::delete_many()
        .filter(room_messages::Column::RoomId.eq(room_id))
        .exec(&*state.db)
        .await?;
    room_sessions::Entity::delete_many()
        .filter(room_sessions::Column::RoomId.eq(room_id))
        .exec(&*state.db)
        .await?;
    favorite_rooms::Entity::delete_many()
        .filter(favorite_rooms::Column::RoomId.eq(room_id))
        .exec(&*state.db)
        .await?;
    notifications::Entity::delete_many()
        .filter(notifications::Column::RoomId.eq(room_id))
        .exec(&*state.db)
        .await?;

    rooms::Entity::delete_by_id(room_id).exec(&*state.db).await?;

    info!("User {} deleted room {}", user_id, room_id);

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/rooms/join - Join by invite code; idempotent for existing members
pub async fn join_room(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Json(payload): Json<JoinRoomRequest>,
) -> Result<Json<JoinRoomResponse>, ApiError> {
    let code = payload.invite_code.trim();
    if code.is_empty() {
        return Err(ApiError::Validation("Invite code is required".to_string()));
    }

    let room = rooms::Entity::find()
        .filter(rooms::Column::InviteCode.eq(code))
        .one(&*state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invalid invite code".to_string()))?;

    // The owner is an implicit member; never store a membership row
    if room.owner_id == user_id || is_member(&*state.db, room.id, &user_id).await? {
        return Ok(Json(JoinRoomResponse {
            room_id: room.id,
            already_member: true,
        }));
    }

    let membership = room_members::ActiveModel {
        id: Set(Uuid::new_v4()),
        room_id: Set(room.id),
        user_id: Set(user_id.clone()),
        joined_at: Set(Utc::now().fixed_offset()),
    };
    let inserted = room_members::Entity::insert(membership)
        .on_conflict(
            OnConflict::columns([room_members::Column::RoomId, room_members::Column::UserId])
                .do_nothing()
                .to_owned(),
        )
        .exec(&*state.db)
        .await;

    match inserted {
        Ok(_) => {}
        // A racing join beat us to the unique index; same idempotent outcome
        Err(DbErr::RecordNotInserted) => {
            return Ok(Json(JoinRoomResponse {
                room_id: room.id,
                already_member: true,
            }));
        }
        Err(e) => return Err(e.into()),
    }

    let username = super::profile::username_of(&*state.db, &user_id).await?;

    state
        .events
        .publish(
            room.id,
            RoomEvent::MemberJoined {
                room_id: room.id,
                user_id: user_id.clone(),
                username: username.clone(),
            },
        )
        .await;

    let display = username.unwrap_or_else(|| user_id.clone());
    if let Err(e) = notify::push(
        &*state.db,
        &room.owner_id,
        "New member",
        &format!("{} joined {}", display, room.name),
        "member_joined",
        Some(room.id),
    )
    .await
    {
        warn!("Failed to notify owner of join: {}", e);
    }

    let updated = stats::record_activity(&*state.db, &user_id, ActivityKind::RoomVisited).await?;
    achievements::check_unlocks(&*state.db, &user_id, &updated).await?;

    info!("User {} joined room {}", user_id, room.id);

    Ok(Json(JoinRoomResponse {
        room_id: room.id,
        already_member: false,
    }))
}

/// GET /api/rooms/{id}/members - Member list with usernames
pub async fn list_members(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(room_id): Path<Uuid>,
) -> Result<Json<MembersResponse>, ApiError> {
    let room = load_room(&*state.db, room_id).await?;
    ensure_member_or_owner(&*state.db, &room, &user_id).await?;

    let memberships = room_members::Entity::find()
        .filter(room_members::Column::RoomId.eq(room_id))
        .order_by_asc(room_members::Column::JoinedAt)
        .all(&*state.db)
        .await?;

    let user_ids: Vec<String> = memberships.iter().map(|m| m.user_id.clone()).collect();
    let names = username_map(&*state.db, &user_ids).await?;

    let members = memberships
        .into_iter()
        .map(|m| MemberEntry {
            username: names.get(&m.user_id).cloned().flatten(),
            user_id: m.user_id,
            joined_at: m.joined_at,
        })
        .collect();

    Ok(Json(MembersResponse {
        owner_id: room.owner_id,
        members,
    }))
}

/// POST /api/favorites/{room_id} - Idempotent favorite
pub async fn add_favorite(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(room_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let room = load_room(&*state.db, room_id).await?;
    ensure_member_or_owner(&*state.db, &room, &user_id).await?;

    let favorite = favorite_rooms::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        room_id: Set(room_id),
        created_at: Set(Utc::now().fixed_offset()),
    };
    match favorite_rooms::Entity::insert(favorite)
        .on_conflict(
            OnConflict::columns([
                favorite_rooms::Column::UserId,
                favorite_rooms::Column::RoomId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec(&*state.db)
        .await
    {
        Ok(_) | Err(DbErr::RecordNotInserted) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(e.into()),
    }
}

/// DELETE /api/favorites/{room_id}
pub async fn remove_favorite(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(room_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    favorite_rooms::Entity::delete_many()
        .filter(favorite_rooms::Column::UserId.eq(&user_id))
        .filter(favorite_rooms::Column::RoomId.eq(room_id))
        .exec(&*state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/favorites - Caller's favorited rooms
pub async fn list_favorites(
    State(state): State<AppState>,
    Identity(user_id): Identity,
) -> Result<Json<FavoritesResponse>, ApiError> {
    let favorites = favorite_rooms::Entity::find()
        .filter(favorite_rooms::Column::UserId.eq(&user_id))
        .order_by_desc(favorite_rooms::Column::CreatedAt)
        .all(&*state.db)
        .await?;

    let room_ids: Vec<Uuid> = favorites.iter().map(|f| f.room_id).collect();
    let room_rows = if room_ids.is_empty() {
        Vec::new()
    } else {
        rooms::Entity::find()
            .filter(rooms::Column::Id.is_in(room_ids))
            .all(&*state.db)
            .await?
    };
    let by_id: HashMap<Uuid, rooms::Model> =
        room_rows.into_iter().map(|r| (r.id, r)).collect();

    // Skip favorites whose room was deleted out from under them
    let entries = favorites
        .into_iter()
        .filter_map(|f| {
            by_id.get(&f.room_id).map(|room| FavoriteEntry {
                room_id: room.id,
                name: room.name.clone(),
                invite_code: room.invite_code.clone(),
            })
        })
        .collect();

    Ok(Json(FavoritesResponse { favorites: entries }))
}

/// Resolve usernames for a set of user ids.
pub(crate) async fn username_map(
    db: &sea_orm::DatabaseConnection,
    user_ids: &[String],
) -> Result<HashMap<String, Option<String>>, DbErr> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = profiles::Entity::find()
        .filter(profiles::Column::UserId.is_in(user_ids.to_vec()))
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|p| (p.user_id, p.username))
        .collect())
}
