//! Create restaurant and daily_menu tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Restaurant::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Restaurant::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Restaurant::Name).string_len(32).not_null().unique_key())
                    .col(ColumnDef::new(Restaurant::Description).string_len(255))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DailyMenu::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyMenu::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DailyMenu::Title).string_len(32))
                    .col(ColumnDef::new(DailyMenu::Day).string_len(16).not_null())
                    .col(ColumnDef::new(DailyMenu::RestaurantId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_daily_menu_restaurant")
                            .from(DailyMenu::Table, DailyMenu::RestaurantId)
                            .to(Restaurant::Table, Restaurant::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (restaurant_id, day) - one menu per weekday
        manager
            .create_index(
                Index::create()
                    .name("idx_daily_menu_restaurant_day")
                    .table(DailyMenu::Table)
                    .col(DailyMenu::RestaurantId)
                    .col(DailyMenu::Day)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailyMenu::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Restaurant::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Restaurant {
    Table,
    Id,
    Name,
    Description,
}

#[derive(Iden)]
pub enum DailyMenu {
    Table,
    Id,
    Title,
    Day,
    RestaurantId,
}
