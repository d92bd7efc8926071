//! Notification fan-out helper

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, Set};
use uuid::Uuid;

use crate::entities::notifications;

/// Insert one notification row for a user.
pub async fn push(
    db: &DatabaseConnection,
    user_id: &str,
    title: &str,
    message: &str,
    kind: &str,
    room_id: Option<Uuid>,
) -> Result<(), DbErr> {
    let notification = notifications::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id.to_string()),
        title: Set(title.to_string()),
        message: Set(message.to_string()),
        kind: Set(kind.to_string()),
        room_id: Set(room_id),
        read: Set(false),
        created_at: Set(Utc::now().fixed_offset()),
    };
    notification.insert(db).await?;
    Ok(())
}
