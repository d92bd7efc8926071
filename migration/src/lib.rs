pub use sea_orm_migration::prelude::*;

mod m20260801_000001_create_rooms;
mod m20260801_000002_create_social;
mod m20260805_000001_create_progress;
mod m20260812_000001_create_room_sessions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_create_rooms::Migration),
            Box::new(m20260801_000002_create_social::Migration),
            Box::new(m20260805_000001_create_progress::Migration),
            Box::new(m20260812_000001_create_room_sessions::Migration),
        ]
    }
}
