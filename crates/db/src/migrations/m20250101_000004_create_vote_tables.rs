//! Create vote and vote_winner tables migration.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_restaurant_table::Restaurant;
use super::m20250101_000003_create_user_table::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vote::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vote::UserId).integer().not_null())
                    .col(ColumnDef::new(Vote::RestaurantId).integer().not_null())
                    .col(ColumnDef::new(Vote::VotingDate).date().not_null())
                    .col(
                        ColumnDef::new(Vote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_user")
                            .from(Vote::Table, Vote::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_restaurant")
                            .from(Vote::Table, Vote::RestaurantId)
                            .to(Restaurant::Table, Restaurant::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, voting_date) - one vote per user per day
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_user_voting_date")
                    .table(Vote::Table)
                    .col(Vote::UserId)
                    .col(Vote::VotingDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: voting_date (for tallying a day)
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_voting_date")
                    .table(Vote::Table)
                    .col(Vote::VotingDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VoteWinner::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VoteWinner::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VoteWinner::RestaurantId).integer().not_null())
                    .col(ColumnDef::new(VoteWinner::VotingDate).date().not_null())
                    .col(ColumnDef::new(VoteWinner::Votes).integer().not_null())
                    .col(
                        ColumnDef::new(VoteWinner::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_winner_restaurant")
                            .from(VoteWinner::Table, VoteWinner::RestaurantId)
                            .to(Restaurant::Table, Restaurant::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (restaurant_id, voting_date) - a restaurant wins a day once
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_winner_restaurant_voting_date")
                    .table(VoteWinner::Table)
                    .col(VoteWinner::RestaurantId)
                    .col(VoteWinner::VotingDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: voting_date (for reading a day's winners)
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_winner_voting_date")
                    .table(VoteWinner::Table)
                    .col(VoteWinner::VotingDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VoteWinner::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Vote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Vote {
    Table,
    Id,
    UserId,
    RestaurantId,
    VotingDate,
    CreatedAt,
}

#[derive(Iden)]
enum VoteWinner {
    Table,
    Id,
    RestaurantId,
    VotingDate,
    Votes,
    CreatedAt,
}
