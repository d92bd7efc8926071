use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create user_stats table
        manager
            .create_table(
                Table::create()
                    .table(UserStats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserStats::UserId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserStats::TotalVotes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserStats::MessagesSent)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserStats::RoomsVisited)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserStats::CurrentStreak)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserStats::LongestStreak)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(UserStats::LastActiveDate).date())
                    .col(
                        ColumnDef::new(UserStats::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(UserStats::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Create achievements catalog table
        manager
            .create_table(
                Table::create()
                    .table(Achievements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Achievements::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Achievements::Name).string().not_null())
                    .col(ColumnDef::new(Achievements::Description).text().not_null())
                    .col(ColumnDef::new(Achievements::Icon).string().not_null())
                    .col(ColumnDef::new(Achievements::Category).string().not_null())
                    .col(
                        ColumnDef::new(Achievements::RequirementValue)
                            .integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create user_achievements table
        manager
            .create_table(
                Table::create()
                    .table(UserAchievements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserAchievements::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserAchievements::UserId).string().not_null())
                    .col(
                        ColumnDef::new(UserAchievements::AchievementId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAchievements::UnlockedAt)
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
                    .name("idx_user_achievements_user_achievement")
                    .table(UserAchievements::Table)
                    .col(UserAchievements::UserId)
                    .col(UserAchievements::AchievementId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Seed the achievement catalog
        let seed = [
            ("first_vote", "First Call", "Cast your first bias vote", "thumbs-up", "votes", 1),
            ("vote_50", "Opinionated", "Cast 50 bias votes", "bar-chart", "votes", 50),
            ("vote_250", "Market Oracle", "Cast 250 bias votes", "trending-up", "votes", 250),
            ("first_message", "Ice Breaker", "Send your first room message", "message-square", "messages", 1),
            ("message_100", "Chatterbox", "Send 100 room messages", "messages-square", "messages", 100),
            ("rooms_3", "Explorer", "Join 3 rooms", "compass", "rooms", 3),
            ("rooms_10", "Socialite", "Join 10 rooms", "users", "rooms", 10),
            ("streak_7", "Consistent", "Stay active 7 days in a row", "flame", "streak", 7),
            ("streak_30", "Dedicated", "Stay active 30 days in a row", "award", "streak", 30),
        ];

        for (id, name, description, icon, category, requirement) in seed {
            let insert = Query::insert()
                .into_table(Achievements::Table)
                .columns([
                    Achievements::Id,
                    Achievements::Name,
                    Achievements::Description,
                    Achievements::Icon,
                    Achievements::Category,
                    Achievements::RequirementValue,
                ])
                .values_panic([
                    id.into(),
                    name.into(),
                    description.into(),
                    icon.into(),
                    category.into(),
                    requirement.into(),
                ])
                .to_owned();
            manager.exec_stmt(insert).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserAchievements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Achievements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserStats::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum UserStats {
    Table,
    UserId,
    TotalVotes,
    MessagesSent,
    RoomsVisited,
    CurrentStreak,
    LongestStreak,
    LastActiveDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Achievements {
    Table,
    Id,
    Name,
    Description,
    Icon,
    Category,
    RequirementValue,
}

#[derive(DeriveIden)]
enum UserAchievements {
    Table,
    Id,
    UserId,
    AchievementId,
    UnlockedAt,
}
