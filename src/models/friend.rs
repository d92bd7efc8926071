//! Friendship request/response models

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// POST /api/friends/requests request
#[derive(Debug, Clone, Deserialize)]
pub struct SendFriendRequest {
    /// Username of the profile to befriend
    pub username: String,
}

/// One accepted friend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendEntry {
    pub user_id: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub favorite_bias: Option<String>,
}

/// GET /api/friends response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendsResponse {
    pub friends: Vec<FriendEntry>,
}

/// One incoming pending request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingFriendRequest {
    pub id: Uuid,
    pub from_user_id: String,
    pub from_username: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

/// GET /api/friends/requests response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRequestsResponse {
    pub requests: Vec<PendingFriendRequest>,
}
