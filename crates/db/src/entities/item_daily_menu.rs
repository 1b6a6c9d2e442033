//! Association between items and the daily menus they appear on.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item_daily_menu")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub item_id: i32,

    #[sea_orm(primary_key, auto_increment = false)]
    pub daily_menu_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,

    #[sea_orm(
        belongs_to = "super::daily_menu::Entity",
        from = "Column::DailyMenuId",
        to = "super::daily_menu::Column::Id"
    )]
    DailyMenu,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::daily_menu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyMenu.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
