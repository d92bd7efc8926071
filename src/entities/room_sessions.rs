//! SeaORM Entity for room bias session snapshots
//!
//! A session captures the bias verdicts at a point in time: the first,
//! middle and last configured timeframes map to short/medium/long term.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "room_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub room_id: Uuid,
    pub started_at: DateTimeWithTimeZone,
    pub ended_at: Option<DateTimeWithTimeZone>,
    pub participants_count: Option<i32>,
    pub short_term_bias: Option<String>,
    pub medium_term_bias: Option<String>,
    pub long_term_bias: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
