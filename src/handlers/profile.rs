//! Profile reads and updates

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, Set};
use std::str::FromStr;

use crate::entities::profiles;
use crate::handlers::auth::Identity;
use crate::models::bias::BiasState;
use crate::models::error::ApiError;
use crate::models::profile::{ProfileResponse, UpdateProfileRequest};
use crate::AppState;

/// Usernames are 3-30 chars: letters, digits, underscore
const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 30;

pub(crate) async fn username_of(
    db: &sea_orm::DatabaseConnection,
    user_id: &str,
) -> Result<Option<String>, DbErr> {
    Ok(profiles::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .and_then(|p| p.username))
}

fn validate_username(raw: &str) -> Result<String, ApiError> {
    let username = raw.trim();
    if username.len() < USERNAME_MIN || username.len() > USERNAME_MAX {
        return Err(ApiError::Validation(format!(
            "Username must be {}-{} characters",
            USERNAME_MIN, USERNAME_MAX
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ApiError::Validation(
            "Username may only contain letters, digits and underscores".to_string(),
        ));
    }
    Ok(username.to_string())
}

/// GET /api/profile - Caller's own profile; empty shell when none exists yet
pub async fn get_own(
    State(state): State<AppState>,
    Identity(user_id): Identity,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = profiles::Entity::find_by_id(&user_id).one(&*state.db).await?;
    match profile {
        Some(model) => Ok(Json(model.into())),
        None => Ok(Json(ProfileResponse {
            user_id,
            username: None,
            avatar_url: None,
            bio: None,
            favorite_bias: None,
            created_at: Utc::now().fixed_offset(),
        })),
    }
}

/// PUT /api/profile - Upsert the caller's profile; absent fields unchanged
pub async fn update_own(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let username = payload.username.as_deref().map(validate_username).transpose()?;

    if let Some(ref bias) = payload.favorite_bias {
        BiasState::from_str(bias)
            .map_err(|_| ApiError::Validation(format!("Unknown bias '{}'", bias)))?;
    }

    if let Some(ref name) = username {
        let taken = profiles::Entity::find()
            .filter(profiles::Column::Username.eq(name))
            .filter(profiles::Column::UserId.ne(&user_id))
            .one(&*state.db)
            .await?;
        if taken.is_some() {
            return Err(ApiError::Conflict(format!(
                "Username '{}' is taken",
                name
            )));
        }
    }

    let now = Utc::now().fixed_offset();
    let existing = profiles::Entity::find_by_id(&user_id).one(&*state.db).await?;

    let model = match existing {
        Some(model) => {
            let mut active: profiles::ActiveModel = model.into();
            if let Some(name) = username {
                active.username = Set(Some(name));
            }
            if let Some(bio) = payload.bio {
                active.bio = Set(Some(bio));
            }
            if let Some(avatar) = payload.avatar_url {
                active.avatar_url = Set(Some(avatar));
            }
            if let Some(bias) = payload.favorite_bias {
                active.favorite_bias = Set(Some(bias));
            }
            active.updated_at = Set(Some(now));
            active.update(&*state.db).await?
        }
        None => {
            let active = profiles::ActiveModel {
                user_id: Set(user_id.clone()),
                username: Set(username),
                bio: Set(payload.bio),
                avatar_url: Set(payload.avatar_url),
                favorite_bias: Set(payload.favorite_bias),
                created_at: Set(now),
                updated_at: Set(Some(now)),
            };
            active.insert(&*state.db).await?
        }
    };

    Ok(Json(model.into()))
}

/// GET /api/profiles/{user_id} - Public view of another user's profile
pub async fn get_public(
    State(state): State<AppState>,
    Identity(_user_id): Identity,
    Path(target_id): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = profiles::Entity::find_by_id(&target_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;
    Ok(Json(profile.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert_eq!(validate_username(" trader_1 ").unwrap(), "trader_1");
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(31)).is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("semi;colon").is_err());
    }
}
