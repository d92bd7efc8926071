//! Friend requests and the friends list
//!
//! A pending request is a single row (requester -> target). Accepting flips
//! it to "accepted" and inserts the reciprocal row, so the friends list is a
//! plain lookup on the caller's own rows.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use tracing::warn;
use uuid::Uuid;

use crate::entities::{friendships, profiles};
use crate::handlers::auth::Identity;
use crate::handlers::profile::username_of;
use crate::models::error::ApiError;
use crate::models::friend::{
    FriendEntry, FriendsResponse, PendingFriendRequest, PendingRequestsResponse, SendFriendRequest,
};
use crate::services::notify;
use crate::AppState;

pub(crate) async fn are_friends(
    db: &sea_orm::DatabaseConnection,
    user_id: &str,
    peer_id: &str,
) -> Result<bool, DbErr> {
    Ok(friendships::Entity::find()
        .filter(friendships::Column::UserId.eq(user_id))
        .filter(friendships::Column::FriendId.eq(peer_id))
        .filter(friendships::Column::Status.eq("accepted"))
        .one(db)
        .await?
        .is_some())
}

/// POST /api/friends/requests - Send a request by username
pub async fn send_request(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Json(payload): Json<SendFriendRequest>,
) -> Result<StatusCode, ApiError> {
    let username = payload.username.trim();
    if username.is_empty() {
        return Err(ApiError::Validation("Username is required".to_string()));
    }

    let target = profiles::Entity::find()
        .filter(profiles::Column::Username.eq(username))
        .one(&*state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No user named '{}'", username)))?;

    if target.user_id == user_id {
        return Err(ApiError::Validation(
            "Cannot befriend yourself".to_string(),
        ));
    }

    // Any existing row in either direction blocks a new request
    let existing = friendships::Entity::find()
        .filter(
            sea_orm::Condition::any()
                .add(
                    sea_orm::Condition::all()
                        .add(friendships::Column::UserId.eq(&user_id))
                        .add(friendships::Column::FriendId.eq(&target.user_id)),
                )
                .add(
                    sea_orm::Condition::all()
                        .add(friendships::Column::UserId.eq(&target.user_id))
                        .add(friendships::Column::FriendId.eq(&user_id)),
                ),
        )
        .one(&*state.db)
        .await?;
    if let Some(row) = existing {
        let reason = if row.status == "accepted" {
            "Already friends"
        } else {
            "A request is already pending"
        };
        return Err(ApiError::Conflict(reason.to_string()));
    }

    let now = Utc::now().fixed_offset();
    let request = friendships::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id.clone()),
        friend_id: Set(target.user_id.clone()),
        status: Set("pending".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    request.insert(&*state.db).await?;

    let sender_name = username_of(&*state.db, &user_id).await?;
    let display = sender_name.unwrap_or_else(|| user_id.clone());
    if let Err(e) = notify::push(
        &*state.db,
        &target.user_id,
        "Friend request",
        &format!("{} wants to be your friend", display),
        "friend_request",
        None,
    )
    .await
    {
        warn!("Failed to notify friend request target: {}", e);
    }

    Ok(StatusCode::CREATED)
}

/// GET /api/friends/requests - Incoming pending requests
pub async fn pending_requests(
    State(state): State<AppState>,
    Identity(user_id): Identity,
) -> Result<Json<PendingRequestsResponse>, ApiError> {
    let rows = friendships::Entity::find()
        .filter(friendships::Column::FriendId.eq(&user_id))
        .filter(friendships::Column::Status.eq("pending"))
        .order_by_desc(friendships::Column::CreatedAt)
        .all(&*state.db)
        .await?;

    let mut requests = Vec::with_capacity(rows.len());
    for row in rows {
        let from_username = username_of(&*state.db, &row.user_id).await?;
        requests.push(PendingFriendRequest {
            id: row.id,
            from_user_id: row.user_id,
            from_username,
            created_at: row.created_at,
        });
    }

    Ok(Json(PendingRequestsResponse { requests }))
}

/// POST /api/friends/requests/{id}/accept - Target accepts a pending request
pub async fn accept_request(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(request_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let row = friendships::Entity::find_by_id(request_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Friend request not found".to_string()))?;

    if row.friend_id != user_id {
        return Err(ApiError::PermissionDenied(
            "Only the request's target can accept it".to_string(),
        ));
    }
    if row.status != "pending" {
        return Err(ApiError::Conflict("Request is not pending".to_string()));
    }

    let requester_id = row.user_id.clone();
    let now = Utc::now().fixed_offset();

    let mut active: friendships::ActiveModel = row.into();
    active.status = Set("accepted".to_string());
    active.updated_at = Set(now);
    active.update(&*state.db).await?;

    // Reciprocal row so both sides see the friendship
    let reciprocal = friendships::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id.clone()),
        friend_id: Set(requester_id.clone()),
        status: Set("accepted".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    reciprocal.insert(&*state.db).await?;

    let accepter_name = username_of(&*state.db, &user_id).await?;
    let display = accepter_name.unwrap_or_else(|| user_id.clone());
    if let Err(e) = notify::push(
        &*state.db,
        &requester_id,
        "Friend request accepted",
        &format!("{} accepted your friend request", display),
        "friend_accepted",
        None,
    )
    .await
    {
        warn!("Failed to notify requester of acceptance: {}", e);
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/friends/requests/{id}/decline - Target declines a pending request
pub async fn decline_request(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(request_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let row = friendships::Entity::find_by_id(request_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Friend request not found".to_string()))?;

    if row.friend_id != user_id {
        return Err(ApiError::PermissionDenied(
            "Only the request's target can decline it".to_string(),
        ));
    }
    if row.status != "pending" {
        return Err(ApiError::Conflict("Request is not pending".to_string()));
    }

    row.delete(&*state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/friends - Accepted friends with profile details
pub async fn list_friends(
    State(state): State<AppState>,
    Identity(user_id): Identity,
) -> Result<Json<FriendsResponse>, ApiError> {
    let rows = friendships::Entity::find()
        .filter(friendships::Column::UserId.eq(&user_id))
        .filter(friendships::Column::Status.eq("accepted"))
        .all(&*state.db)
        .await?;

    let friend_ids: Vec<String> = rows.into_iter().map(|r| r.friend_id).collect();
    let profile_rows = if friend_ids.is_empty() {
        Vec::new()
    } else {
        profiles::Entity::find()
            .filter(profiles::Column::UserId.is_in(friend_ids.clone()))
            .all(&*state.db)
            .await?
    };
    let by_id: std::collections::HashMap<String, profiles::Model> = profile_rows
        .into_iter()
        .map(|p| (p.user_id.clone(), p))
        .collect();

    let friends = friend_ids
        .into_iter()
        .map(|id| match by_id.get(&id) {
            Some(p) => FriendEntry {
                user_id: id,
                username: p.username.clone(),
                avatar_url: p.avatar_url.clone(),
                favorite_bias: p.favorite_bias.clone(),
            },
            None => FriendEntry {
                user_id: id,
                username: None,
                avatar_url: None,
                favorite_bias: None,
            },
        })
        .collect();

    Ok(Json(FriendsResponse { friends }))
}

/// DELETE /api/friends/{peer_id} - Remove both directions of a friendship
pub async fn remove_friend(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(peer_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    friendships::Entity::delete_many()
        .filter(
            sea_orm::Condition::any()
                .add(
                    sea_orm::Condition::all()
                        .add(friendships::Column::UserId.eq(&user_id))
                        .add(friendships::Column::FriendId.eq(&peer_id)),
                )
                .add(
                    sea_orm::Condition::all()
                        .add(friendships::Column::UserId.eq(&peer_id))
                        .add(friendships::Column::FriendId.eq(&user_id)),
                ),
        )
        .exec(&*state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
