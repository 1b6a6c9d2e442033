//! Menu item entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Item names are unique across all restaurants.
    #[sea_orm(unique)]
    pub name: String,

    /// Price in the smallest currency unit.
    pub price: i32,

    #[sea_orm(nullable)]
    pub description: Option<String>,

    #[sea_orm(indexed)]
    pub restaurant_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::restaurant::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurant::Column::Id",
        on_delete = "Cascade"
    )]
    Restaurant,

    #[sea_orm(has_many = "super::item_daily_menu::Entity")]
    ItemDailyMenu,
}

impl Related<super::restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurant.def()
    }
}

impl Related<super::item_daily_menu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemDailyMenu.def()
    }
}

impl Related<super::daily_menu::Entity> for Entity {
    fn to() -> RelationDef {
        super::item_daily_menu::Relation::DailyMenu.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::item_daily_menu::Relation::Item.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
