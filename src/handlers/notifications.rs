//! Notification listing and read-state updates

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::notifications;
use crate::handlers::auth::Identity;
use crate::models::error::ApiError;
use crate::models::notification::{NotificationEntry, NotificationsResponse};
use crate::AppState;

const DEFAULT_LIST_LIMIT: u64 = 20;
const MAX_LIST_LIMIT: u64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u64>,
}

/// GET /api/notifications?limit= - Newest first, with the unread count
pub async fn list(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Query(query): Query<ListQuery>,
) -> Result<Json<NotificationsResponse>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .min(MAX_LIST_LIMIT);

    let rows = notifications::Entity::find()
        .filter(notifications::Column::UserId.eq(&user_id))
        .order_by_desc(notifications::Column::CreatedAt)
        .limit(limit)
        .all(&*state.db)
        .await?;

    let unread = notifications::Entity::find()
        .filter(notifications::Column::UserId.eq(&user_id))
        .filter(notifications::Column::Read.eq(false))
        .count(&*state.db)
        .await?;

    Ok(Json(NotificationsResponse {
        notifications: rows.into_iter().map(NotificationEntry::from).collect(),
        unread,
    }))
}

/// POST /api/notifications/{id}/read - Mark one as read
pub async fn mark_read(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(notification_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let updated = notifications::Entity::update_many()
        .col_expr(notifications::Column::Read, Expr::value(true))
        .filter(notifications::Column::Id.eq(notification_id))
        .filter(notifications::Column::UserId.eq(&user_id))
        .exec(&*state.db)
        .await?;

    if updated.rows_affected == 0 {
        return Err(ApiError::NotFound("Notification not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/notifications/read_all - Mark every notification as read
pub async fn mark_all_read(
    State(state): State<AppState>,
    Identity(user_id): Identity,
) -> Result<StatusCode, ApiError> {
    notifications::Entity::update_many()
        .col_expr(notifications::Column::Read, Expr::value(true))
        .filter(notifications::Column::UserId.eq(&user_id))
        .filter(notifications::Column::Read.eq(false))
        .exec(&*state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
