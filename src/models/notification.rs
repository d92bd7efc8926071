//! Notification response models

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::notifications;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEntry {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub room_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<FixedOffset>,
}

impl From<notifications::Model> for NotificationEntry {
    fn from(model: notifications::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            message: model.message,
            kind: model.kind,
            room_id: model.room_id,
            read: model.read,
            created_at: model.created_at,
        }
    }
}

/// GET /api/notifications response (newest first)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<NotificationEntry>,
    pub unread: u64,
}
