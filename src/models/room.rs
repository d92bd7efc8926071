//! Room CRUD and membership request/response models

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// POST /api/rooms request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    /// Optional initial timeframe set; defaults to the standard five
    #[serde(default)]
    pub timeframes: Option<Vec<String>>,
}

/// Room detail as returned to a member or owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomResponse {
    pub id: Uuid,
    pub name: String,
    pub owner_id: String,
    pub invite_code: String,
    pub timeframes: Vec<String>,
    pub created_at: DateTime<FixedOffset>,
    /// True when the caller owns the room
    pub is_owner: bool,
}

/// GET /api/rooms response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomListResponse {
    pub rooms: Vec<RoomResponse>,
}

/// POST /api/rooms/join request
#[derive(Debug, Clone, Deserialize)]
pub struct JoinRoomRequest {
    pub invite_code: String,
}

/// POST /api/rooms/join response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRoomResponse {
    pub room_id: Uuid,
    /// True when the join was a no-op (caller was already a member or owner)
    pub already_member: bool,
}

/// One entry in a room's member list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberEntry {
    pub user_id: String,
    pub username: Option<String>,
    pub joined_at: DateTime<FixedOffset>,
}

/// GET /api/rooms/{id}/members response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembersResponse {
    pub owner_id: String,
    pub members: Vec<MemberEntry>,
}

/// One favorited room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub room_id: Uuid,
    pub name: String,
    pub invite_code: String,
}

/// GET /api/favorites response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<FavoriteEntry>,
}
