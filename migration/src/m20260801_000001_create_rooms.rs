use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create rooms table
        manager
            .create_table(
                Table::create()
                    .table(Rooms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rooms::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rooms::Name).string().not_null())
                    .col(ColumnDef::new(Rooms::OwnerId).string().not_null())
                    .col(
                        ColumnDef::new(Rooms::InviteCode)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Rooms::Timeframes)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rooms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Create room_members table
        manager
            .create_table(
                Table::create()
                    .table(RoomMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RoomMembers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RoomMembers::RoomId).uuid().not_null())
                    .col(ColumnDef::new(RoomMembers::UserId).string().not_null())
                    .col(
                        ColumnDef::new(RoomMembers::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // One membership row per (room, user)
        manager
            .create_index(
                Index::create()
                    .name("idx_room_members_room_user")
                    .table(RoomMembers::Table)
                    .col(RoomMembers::RoomId)
                    .col(RoomMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create room_bias table
        manager
            .create_table(
                Table::create()
                    .table(RoomBias::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RoomBias::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RoomBias::RoomId).uuid().not_null())
                    .col(ColumnDef::new(RoomBias::Timeframe).string().not_null())
                    .col(ColumnDef::new(RoomBias::BiasState).string().not_null())
                    .col(ColumnDef::new(RoomBias::UpdatedBy).string())
                    .col(
                        ColumnDef::new(RoomBias::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Exactly one current bias row per (room, timeframe)
        manager
            .create_index(
                Index::create()
                    .name("idx_room_bias_room_timeframe")
                    .table(RoomBias::Table)
                    .col(RoomBias::RoomId)
                    .col(RoomBias::Timeframe)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create room_bias_votes table
        manager
            .create_table(
                Table::create()
                    .table(RoomBiasVotes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RoomBiasVotes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RoomBiasVotes::RoomId).uuid().not_null())
                    .col(ColumnDef::new(RoomBiasVotes::Timeframe).string().not_null())
                    .col(ColumnDef::new(RoomBiasVotes::UserId).string().not_null())
                    .col(ColumnDef::new(RoomBiasVotes::VoteType).string().not_null())
                    .col(
                        ColumnDef::new(RoomBiasVotes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one vote per member per (room, timeframe)
        manager
            .create_index(
                Index::create()
                    .name("idx_room_bias_votes_room_tf_user")
                    .table(RoomBiasVotes::Table)
                    .col(RoomBiasVotes::RoomId)
                    .col(RoomBiasVotes::Timeframe)
                    .col(RoomBiasVotes::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create room_messages table
        manager
            .create_table(
                Table::create()
                    .table(RoomMessages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RoomMessages::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RoomMessages::RoomId).uuid().not_null())
                    .col(ColumnDef::new(RoomMessages::UserId).string().not_null())
                    .col(ColumnDef::new(RoomMessages::Message).text().not_null())
                    .col(
                        ColumnDef::new(RoomMessages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_room_messages_room_created")
                    .table(RoomMessages::Table)
                    .col(RoomMessages::RoomId)
                    .col(RoomMessages::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RoomMessages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RoomBiasVotes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RoomBias::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RoomMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rooms::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Rooms {
    Table,
    Id,
    Name,
    OwnerId,
    InviteCode,
    Timeframes,
    CreatedAt,
}

#[derive(DeriveIden)]
enum RoomMembers {
    Table,
    Id,
    RoomId,
    UserId,
    JoinedAt,
}

#[derive(DeriveIden)]
enum RoomBias {
    Table,
    Id,
    RoomId,
    Timeframe,
    BiasState,
    UpdatedBy,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum RoomBiasVotes {
    Table,
    Id,
    RoomId,
    Timeframe,
    UserId,
    VoteType,
    CreatedAt,
}

#[derive(DeriveIden)]
enum RoomMessages {
    Table,
    Id,
    RoomId,
    UserId,
    Message,
    CreatedAt,
}
