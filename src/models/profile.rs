//! Profile request/response models

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::entities::profiles;

/// PUT /api/profile request; absent fields are left unchanged
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub favorite_bias: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user_id: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub favorite_bias: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

impl From<profiles::Model> for ProfileResponse {
    fn from(model: profiles::Model) -> Self {
        Self {
            user_id: model.user_id,
            username: model.username,
            avatar_url: model.avatar_url,
            bio: model.bio,
            favorite_bias: model.favorite_bias,
            created_at: model.created_at,
        }
    }
}
