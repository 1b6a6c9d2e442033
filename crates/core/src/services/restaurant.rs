//! Restaurant service.

use lunch_common::AppResult;
use lunch_db::{
    entities::{daily_menu, restaurant},
    repositories::RestaurantRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Restaurant service for business logic.
#[derive(Clone)]
pub struct RestaurantService {
    restaurant_repo: RestaurantRepository,
}

/// Input for creating a restaurant.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRestaurantInput {
    #[validate(length(min = 1, max = 32))]
    pub name: String,

    #[validate(length(max = 255))]
    pub description: Option<String>,
}

impl RestaurantService {
    /// Create a new restaurant service.
    #[must_use]
    pub const fn new(restaurant_repo: RestaurantRepository) -> Self {
        Self { restaurant_repo }
    }

    /// Create a restaurant with an empty menu for each weekday.
    pub async fn create(&self, input: CreateRestaurantInput) -> AppResult<restaurant::Model> {
        input.validate()?;

        let model = restaurant::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            ..Default::default()
        };

        let (restaurant, menus) = self.restaurant_repo.create_with_menus(model).await?;
        tracing::info!(
            restaurant_id = restaurant.id,
            menus = menus.len(),
            "Restaurant created"
        );

        Ok(restaurant)
    }

    /// Get a restaurant by ID.
    pub async fn get(&self, id: i32) -> AppResult<restaurant::Model> {
        self.restaurant_repo.get_by_id(id).await
    }

    /// List all restaurants.
    pub async fn list(&self) -> AppResult<Vec<restaurant::Model>> {
        self.restaurant_repo.find_all().await
    }

    /// Get the weekday menus of a restaurant, Monday first.
    pub async fn daily_menus(&self, restaurant_id: i32) -> AppResult<Vec<daily_menu::Model>> {
        self.restaurant_repo.get_by_id(restaurant_id).await?;
        self.restaurant_repo.find_daily_menus(restaurant_id).await
    }
}
