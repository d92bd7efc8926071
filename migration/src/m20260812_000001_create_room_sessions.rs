use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RoomSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RoomSessions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RoomSessions::RoomId).uuid().not_null())
                    .col(
                        ColumnDef::new(RoomSessions::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(RoomSessions::EndedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(RoomSessions::ParticipantsCount).integer())
                    .col(ColumnDef::new(RoomSessions::ShortTermBias).string())
                    .col(ColumnDef::new(RoomSessions::MediumTermBias).string())
                    .col(ColumnDef::new(RoomSessions::LongTermBias).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_room_sessions_room_started")
                    .table(RoomSessions::Table)
                    .col(RoomSessions::RoomId)
                    .col(RoomSessions::StartedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RoomSessions::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum RoomSessions {
    Table,
    Id,
    RoomId,
    StartedAt,
    EndedAt,
    ParticipantsCount,
    ShortTermBias,
    MediumTermBias,
    LongTermBias,
}
