//! Restaurant repository.

use std::sync::Arc;

use crate::entities::{daily_menu, restaurant, DailyMenu, Restaurant, Weekday};
use lunch_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, Iterable, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};

/// Restaurant repository for database operations.
#[derive(Clone)]
pub struct RestaurantRepository {
    db: Arc<DatabaseConnection>,
}

impl RestaurantRepository {
    /// Create a new restaurant repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a restaurant by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<restaurant::Model>> {
        Restaurant::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a restaurant by ID, returning error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<restaurant::Model> {
        self.find_by_id(id)
            .await?
            .ok_or(AppError::NoSuchRestaurant(id))
    }

    /// List all restaurants in creation order.
    pub async fn find_all(&self) -> AppResult<Vec<restaurant::Model>> {
        Restaurant::find()
            .order_by_asc(restaurant::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a restaurant together with an empty menu for every weekday.
    pub async fn create_with_menus(
        &self,
        model: restaurant::ActiveModel,
    ) -> AppResult<(restaurant::Model, Vec<daily_menu::Model>)> {
        let result: Result<_, DbErr> = async {
            let txn = self.db.begin().await?;

            let restaurant = model.insert(&txn).await?;
            let mut menus = Vec::with_capacity(7);
            for day in Weekday::iter() {
                let menu = daily_menu::ActiveModel {
                    title: Set(None),
                    day: Set(day),
                    restaurant_id: Set(restaurant.id),
                    ..Default::default()
                };
                menus.push(menu.insert(&txn).await?);
            }

            txn.commit().await?;
            Ok((restaurant, menus))
        }
        .await;

        result.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("Restaurant with this name already exists".to_string())
            }
            _ => AppError::Database(e.to_string()),
        })
    }

    /// Get the daily menus of a restaurant.
    pub async fn find_daily_menus(&self, restaurant_id: i32) -> AppResult<Vec<daily_menu::Model>> {
        DailyMenu::find()
            .filter(daily_menu::Column::RestaurantId.eq(restaurant_id))
            .order_by_asc(daily_menu::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_restaurant(id: i32, name: &str) -> restaurant::Model {
        restaurant::Model {
            id,
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let restaurant = create_test_restaurant(1, "Soup Kitchen");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[restaurant.clone()]])
                .into_connection(),
        );

        let repo = RestaurantRepository::new(db);
        let result = repo.find_by_id(1).await.unwrap();

        assert_eq!(result, Some(restaurant));
    }

    #[tokio::test]
    async fn test_get_by_id_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<restaurant::Model>::new()])
                .into_connection(),
        );

        let repo = RestaurantRepository::new(db);
        let result = repo.get_by_id(42).await;

        assert!(matches!(result, Err(AppError::NoSuchRestaurant(42))));
    }

    #[tokio::test]
    async fn test_find_all() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_restaurant(1, "Soup Kitchen"),
                    create_test_restaurant(2, "Noodle Bar"),
                ]])
                .into_connection(),
        );

        let repo = RestaurantRepository::new(db);
        let result = repo.find_all().await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[1].name, "Noodle Bar");
    }
}
