//! Per-user activity counters and daily streaks

use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};

use crate::entities::user_stats;

/// What kind of activity is being recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Vote,
    Message,
    RoomVisited,
}

/// Roll the streak forward for an activity on `today`. Same-day activity
/// leaves the streak alone; a consecutive day extends it; a gap resets it
/// to 1. Returns (current, longest).
pub fn roll_streak(
    current: i32,
    longest: i32,
    last_active: Option<NaiveDate>,
    today: NaiveDate,
) -> (i32, i32) {
    let next = match last_active {
        Some(date) if date == today => current,
        Some(date) if date == today - Duration::days(1) => current + 1,
        _ => 1,
    };
    (next, longest.max(next))
}

/// Record one activity for a user: bump the matching counter and roll the
/// streak. Creates the stats row on first activity.
pub async fn record_activity(
    db: &DatabaseConnection,
    user_id: &str,
    kind: ActivityKind,
) -> Result<user_stats::Model, DbErr> {
    let today = Utc::now().date_naive();
    let now = Utc::now().fixed_offset();

    let existing = user_stats::Entity::find_by_id(user_id).one(db).await?;

    match existing {
        Some(model) => {
            let (current, longest) = roll_streak(
                model.current_streak,
                model.longest_streak,
                model.last_active_date,
                today,
            );
            let mut active: user_stats::ActiveModel = model.into();
            match kind {
                ActivityKind::Vote => {
                    let v = active.total_votes.take().unwrap_or(0);
                    active.total_votes = Set(v + 1);
                }
                ActivityKind::Message => {
                    let v = active.messages_sent.take().unwrap_or(0);
                    active.messages_sent = Set(v + 1);
                }
                ActivityKind::RoomVisited => {
                    let v = active.rooms_visited.take().unwrap_or(0);
                    active.rooms_visited = Set(v + 1);
                }
            }
            active.current_streak = Set(current);
            active.longest_streak = Set(longest);
            active.last_active_date = Set(Some(today));
            active.updated_at = Set(now);
            active.update(db).await
        }
        None => {
            let active = user_stats::ActiveModel {
                user_id: Set(user_id.to_string()),
                total_votes: Set((kind == ActivityKind::Vote) as i32),
                messages_sent: Set((kind == ActivityKind::Message) as i32),
                rooms_visited: Set((kind == ActivityKind::RoomVisited) as i32),
                current_streak: Set(1),
                longest_streak: Set(1),
                last_active_date: Set(Some(today)),
                created_at: Set(now),
                updated_at: Set(now),
            };
            active.insert(db).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_first_activity_starts_streak() {
        assert_eq!(roll_streak(0, 0, None, date(2026, 8, 27)), (1, 1));
    }

    #[test]
    fn test_same_day_is_noop() {
        let today = date(2026, 8, 27);
        assert_eq!(roll_streak(4, 6, Some(today), today), (4, 6));
    }

    #[test]
    fn test_consecutive_day_extends() {
        assert_eq!(
            roll_streak(4, 6, Some(date(2026, 8, 26)), date(2026, 8, 27)),
            (5, 6)
        );
    }

    #[test]
    fn test_new_high_water_mark() {
        assert_eq!(
            roll_streak(6, 6, Some(date(2026, 8, 26)), date(2026, 8, 27)),
            (7, 7)
        );
    }

    #[test]
    fn test_gap_resets() {
        assert_eq!(
            roll_streak(9, 9, Some(date(2026, 8, 20)), date(2026, 8, 27)),
            (1, 9)
        );
    }

    #[test]
    fn test_month_boundary() {
        assert_eq!(
            roll_streak(2, 2, Some(date(2026, 7, 31)), date(2026, 8, 1)),
            (3, 3)
        );
    }
}
