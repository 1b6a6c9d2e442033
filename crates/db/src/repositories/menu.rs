//! Menu repository: items and their weekday menu associations.

use std::sync::Arc;

use crate::entities::{daily_menu, item, item_daily_menu, DailyMenu, Item, ItemDailyMenu, Weekday};
use lunch_common::{AppError, AppResult};
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, Set, SqlErr,
    TransactionTrait,
};

/// Which of a restaurant's items to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemFilter {
    /// Every item of the restaurant.
    All,
    /// Items on the menu of the given weekday.
    Day(Weekday),
    /// Items that are on no weekday menu.
    Unassigned,
}

/// Menu repository for database operations.
#[derive(Clone)]
pub struct MenuRepository {
    db: Arc<DatabaseConnection>,
}

impl MenuRepository {
    /// Create a new menu repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List a restaurant's items in creation order.
    pub async fn find_items(
        &self,
        restaurant_id: i32,
        filter: ItemFilter,
    ) -> AppResult<Vec<item::Model>> {
        let mut query = Item::find().filter(item::Column::RestaurantId.eq(restaurant_id));

        match filter {
            ItemFilter::All => {}
            ItemFilter::Day(day) => {
                let on_day = ItemDailyMenu::find()
                    .select_only()
                    .column(item_daily_menu::Column::ItemId)
                    .inner_join(DailyMenu)
                    .filter(daily_menu::Column::RestaurantId.eq(restaurant_id))
                    .filter(daily_menu::Column::Day.eq(day))
                    .into_query();
                query = query.filter(item::Column::Id.in_subquery(on_day));
            }
            ItemFilter::Unassigned => {
                let assigned = ItemDailyMenu::find()
                    .select_only()
                    .column(item_daily_menu::Column::ItemId)
                    .into_query();
                query = query.filter(item::Column::Id.not_in_subquery(assigned));
            }
        }

        query
            .order_by_asc(item::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create items and put each of them on the menus of `days`.
    ///
    /// Items are inserted in input order and returned in that order.
    pub async fn create_items(
        &self,
        restaurant_id: i32,
        items: Vec<item::ActiveModel>,
        days: &[Weekday],
    ) -> AppResult<Vec<item::Model>> {
        let result: Result<_, DbErr> = async {
            let txn = self.db.begin().await?;

            let mut created = Vec::with_capacity(items.len());
            for mut model in items {
                model.restaurant_id = Set(restaurant_id);
                created.push(model.insert(&txn).await?);
            }

            let ids: Vec<i32> = created.iter().map(|i| i.id).collect();
            link(&txn, restaurant_id, days, &ids).await?;

            txn.commit().await?;
            Ok(created)
        }
        .await;

        result.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("Item with this name already exists".to_string())
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                AppError::NoSuchRestaurant(restaurant_id)
            }
            _ => AppError::Database(e.to_string()),
        })
    }

    /// Put the restaurant's items `ids` on its menus for `days`.
    ///
    /// Existing associations are kept; ids of other restaurants are skipped.
    pub async fn add_to_menus(
        &self,
        restaurant_id: i32,
        days: &[Weekday],
        ids: &[i32],
    ) -> AppResult<u64> {
        link(self.db.as_ref(), restaurant_id, days, ids)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Take the restaurant's items `ids` off its menus for `days`.
    pub async fn remove_from_menus(
        &self,
        restaurant_id: i32,
        days: &[Weekday],
        ids: &[i32],
    ) -> AppResult<u64> {
        if days.is_empty() || ids.is_empty() {
            return Ok(0);
        }

        let items = owned_items(restaurant_id, ids);
        let menus = DailyMenu::find()
            .select_only()
            .column(daily_menu::Column::Id)
            .filter(daily_menu::Column::RestaurantId.eq(restaurant_id))
            .filter(daily_menu::Column::Day.is_in(days.iter().copied()))
            .into_query();

        ItemDailyMenu::delete_many()
            .filter(item_daily_menu::Column::ItemId.in_subquery(items))
            .filter(item_daily_menu::Column::DailyMenuId.in_subquery(menus))
            .exec(self.db.as_ref())
            .await
            .map(|res| res.rows_affected)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete the restaurant's items `ids`, dropping their associations first.
    ///
    /// Returns the number of deleted items.
    pub async fn delete_items(&self, restaurant_id: i32, ids: &[i32]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result: Result<_, DbErr> = async {
            let txn = self.db.begin().await?;

            ItemDailyMenu::delete_many()
                .filter(item_daily_menu::Column::ItemId.in_subquery(owned_items(restaurant_id, ids)))
                .exec(&txn)
                .await?;

            let deleted = Item::delete_many()
                .filter(item::Column::RestaurantId.eq(restaurant_id))
                .filter(item::Column::Id.is_in(ids.iter().copied()))
                .exec(&txn)
                .await?;

            txn.commit().await?;
            Ok(deleted.rows_affected)
        }
        .await;

        result.map_err(|e| AppError::Database(e.to_string()))
    }
}

/// Subquery selecting which of `ids` belong to the restaurant.
fn owned_items(restaurant_id: i32, ids: &[i32]) -> sea_orm::sea_query::SelectStatement {
    Item::find()
        .select_only()
        .column(item::Column::Id)
        .filter(item::Column::RestaurantId.eq(restaurant_id))
        .filter(item::Column::Id.is_in(ids.iter().copied()))
        .into_query()
}

/// Insert the missing (item, menu) pairs for the restaurant's `ids` and `days`.
///
/// Both sides are resolved through `restaurant_id`, so an association never
/// crosses restaurants.
async fn link<C: ConnectionTrait>(
    conn: &C,
    restaurant_id: i32,
    days: &[Weekday],
    ids: &[i32],
) -> Result<u64, DbErr> {
    if days.is_empty() || ids.is_empty() {
        return Ok(0);
    }

    let menu_ids: Vec<i32> = DailyMenu::find()
        .select_only()
        .column(daily_menu::Column::Id)
        .filter(daily_menu::Column::RestaurantId.eq(restaurant_id))
        .filter(daily_menu::Column::Day.is_in(days.iter().copied()))
        .into_tuple()
        .all(conn)
        .await?;

    let item_ids: Vec<i32> = Item::find()
        .select_only()
        .column(item::Column::Id)
        .filter(item::Column::RestaurantId.eq(restaurant_id))
        .filter(item::Column::Id.is_in(ids.iter().copied()))
        .into_tuple()
        .all(conn)
        .await?;

    let rows: Vec<item_daily_menu::ActiveModel> = item_ids
        .iter()
        .flat_map(|&item_id| {
            menu_ids.iter().map(move |&daily_menu_id| item_daily_menu::ActiveModel {
                item_id: Set(item_id),
                daily_menu_id: Set(daily_menu_id),
            })
        })
        .collect();

    if rows.is_empty() {
        return Ok(0);
    }

    ItemDailyMenu::insert_many(rows)
        .on_conflict(
            OnConflict::columns([
                item_daily_menu::Column::ItemId,
                item_daily_menu::Column::DailyMenuId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_item(id: i32, name: &str) -> item::Model {
        item::Model {
            id,
            name: name.to_string(),
            price: 1200,
            description: None,
            restaurant_id: 1,
        }
    }

    #[tokio::test]
    async fn test_find_items_all() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_item(1, "Goulash"),
                    create_test_item(2, "Pancake"),
                ]])
                .into_connection(),
        );

        let repo = MenuRepository::new(db);
        let result = repo.find_items(1, ItemFilter::All).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "Goulash");
    }

    #[tokio::test]
    async fn test_find_items_for_day_filters_by_menu() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_item(2, "Pancake")]])
            .into_connection();
        let db = Arc::new(db);

        let repo = MenuRepository::new(db.clone());
        let result = repo
            .find_items(1, ItemFilter::Day(Weekday::Friday))
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        drop(repo);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let sql = format!("{log:?}");
        assert!(sql.contains("daily_menu"));
        assert!(sql.contains("friday"));
    }

    #[tokio::test]
    async fn test_find_items_unassigned_uses_not_in() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<item::Model>::new()])
                .into_connection(),
        );

        let repo = MenuRepository::new(db.clone());
        let result = repo.find_items(1, ItemFilter::Unassigned).await.unwrap();
        assert!(result.is_empty());
        drop(repo);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert!(format!("{log:?}").contains("NOT IN"));
    }

    #[tokio::test]
    async fn test_add_to_menus_without_days_is_noop() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = MenuRepository::new(db);
        let affected = repo.add_to_menus(1, &[], &[1, 2]).await.unwrap();

        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn test_remove_from_menus() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );

        let repo = MenuRepository::new(db);
        let affected = repo
            .remove_from_menus(1, &[Weekday::Monday, Weekday::Tuesday], &[5])
            .await
            .unwrap();

        assert_eq!(affected, 2);
    }

    #[tokio::test]
    async fn test_delete_items_without_ids_is_noop() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = MenuRepository::new(db);
        assert_eq!(repo.delete_items(1, &[]).await.unwrap(), 0);
    }
}
