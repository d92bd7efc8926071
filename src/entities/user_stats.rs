//! SeaORM Entity for per-user activity counters and streaks

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "user_stats")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub total_votes: i32,
    pub messages_sent: i32,
    pub rooms_visited: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    /// Last calendar day with any recorded activity (streak bookkeeping)
    pub last_active_date: Option<Date>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
