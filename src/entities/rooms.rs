//! SeaORM Entity for rooms
//!
//! A room is an owner-created shared bias tracker with its own invite code,
//! timeframe set, members and chat.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Display name, unique per owner
    pub name: String,
    /// User id of the room owner (owner is an implicit member)
    pub owner_id: String,
    /// Short unique join token
    pub invite_code: String,
    /// Ordered timeframe labels as a JSON array (1-7 entries)
    #[sea_orm(column_type = "JsonBinary")]
    pub timeframes: Json,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
