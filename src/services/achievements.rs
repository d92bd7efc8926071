//! Achievement unlock checks
//!
//! After a counter bump, any catalog achievement whose requirement is now
//! met for its category is unlocked. Unlocks are idempotent (unique index
//! on user + achievement) and notify the user.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Set};
use tracing::info;
use uuid::Uuid;

use crate::entities::{achievements, user_achievements, user_stats};
use crate::services::notify;

/// Value of the stats counter an achievement category keys on.
fn category_value(category: &str, stats: &user_stats::Model) -> Option<i32> {
    match category {
        "votes" => Some(stats.total_votes),
        "messages" => Some(stats.messages_sent),
        "rooms" => Some(stats.rooms_visited),
        "streak" => Some(stats.current_streak),
        _ => None,
    }
}

/// Unlock every achievement the given stats now satisfy. Returns the newly
/// unlocked catalog entries.
pub async fn check_unlocks(
    db: &DatabaseConnection,
    user_id: &str,
    stats: &user_stats::Model,
) -> Result<Vec<achievements::Model>, DbErr> {
    let catalog = achievements::Entity::find().all(db).await?;
    let now = Utc::now().fixed_offset();
    let mut unlocked = Vec::new();

    for achievement in catalog {
        let Some(value) = category_value(&achievement.category, stats) else {
            continue;
        };
        if value < achievement.requirement_value {
            continue;
        }

        let insert = user_achievements::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id.to_string()),
            achievement_id: Set(achievement.id.clone()),
            unlocked_at: Set(now),
        };
        let result = user_achievements::Entity::insert(insert)
            .on_conflict(
                OnConflict::columns([
                    user_achievements::Column::UserId,
                    user_achievements::Column::AchievementId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec(db)
            .await;

        match result {
            Ok(_) => {
                info!("User {} unlocked achievement {}", user_id, achievement.id);
                notify::push(
                    db,
                    user_id,
                    "Achievement unlocked",
                    &format!("{}: {}", achievement.name, achievement.description),
                    "achievement",
                    None,
                )
                .await?;
                unlocked.push(achievement);
            }
            // Already unlocked earlier
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    Ok(unlocked)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(votes: i32, messages: i32, rooms: i32, streak: i32) -> user_stats::Model {
        let now = Utc::now().fixed_offset();
        user_stats::Model {
            user_id: "u1".to_string(),
            total_votes: votes,
            messages_sent: messages,
            rooms_visited: rooms,
            current_streak: streak,
            longest_streak: streak,
            last_active_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_category_values() {
        let s = stats(12, 3, 2, 5);
        assert_eq!(category_value("votes", &s), Some(12));
        assert_eq!(category_value("messages", &s), Some(3));
        assert_eq!(category_value("rooms", &s), Some(2));
        assert_eq!(category_value("streak", &s), Some(5));
        assert_eq!(category_value("unknown", &s), None);
    }
}
