//! Create item and item_daily_menu tables migration.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_restaurant_table::{DailyMenu, Restaurant};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Item::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Item::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Item::Name).string_len(32).not_null().unique_key())
                    .col(ColumnDef::new(Item::Price).integer().not_null())
                    .col(ColumnDef::new(Item::Description).string_len(255))
                    .col(ColumnDef::new(Item::RestaurantId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_restaurant")
                            .from(Item::Table, Item::RestaurantId)
                            .to(Restaurant::Table, Restaurant::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: restaurant_id (for listing a restaurant's items)
        manager
            .create_index(
                Index::create()
                    .name("idx_item_restaurant_id")
                    .table(Item::Table)
                    .col(Item::RestaurantId)
                    .to_owned(),
            )
            .await?;

        // Associations must be removed before their item can be deleted
        manager
            .create_table(
                Table::create()
                    .table(ItemDailyMenu::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ItemDailyMenu::ItemId).integer().not_null())
                    .col(ColumnDef::new(ItemDailyMenu::DailyMenuId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(ItemDailyMenu::ItemId)
                            .col(ItemDailyMenu::DailyMenuId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_daily_menu_item")
                            .from(ItemDailyMenu::Table, ItemDailyMenu::ItemId)
                            .to(Item::Table, Item::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_daily_menu_daily_menu")
                            .from(ItemDailyMenu::Table, ItemDailyMenu::DailyMenuId)
                            .to(DailyMenu::Table, DailyMenu::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: daily_menu_id (for listing a day's items)
        manager
            .create_index(
                Index::create()
                    .name("idx_item_daily_menu_daily_menu_id")
                    .table(ItemDailyMenu::Table)
                    .col(ItemDailyMenu::DailyMenuId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ItemDailyMenu::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Item::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Item {
    Table,
    Id,
    Name,
    Price,
    Description,
    RestaurantId,
}

#[derive(Iden)]
enum ItemDailyMenu {
    Table,
    ItemId,
    DailyMenuId,
}
