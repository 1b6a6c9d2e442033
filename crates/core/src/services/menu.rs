//! Menu service: a restaurant's items and the weekday menus they are on.

use lunch_common::{AppError, AppResult};
use lunch_db::{
    entities::{item, Weekday},
    repositories::{ItemFilter, MenuRepository, RestaurantRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Menu service for business logic.
#[derive(Clone)]
pub struct MenuService {
    menu_repo: MenuRepository,
    restaurant_repo: RestaurantRepository,
}

/// Input for creating an item.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewItem {
    #[validate(length(min = 1, max = 32))]
    pub name: String,

    /// Price in the smallest currency unit.
    #[validate(range(min = 1, max = 999_999))]
    pub price: i32,

    #[validate(length(max = 255))]
    pub description: Option<String>,
}

/// Operation of a menu patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    /// Put items on the menus of `days`.
    Add,
    /// Take items off the menus of `days`.
    Remove,
    /// Delete the items altogether.
    Delete,
}

/// A change to the menu associations of a restaurant's items.
#[derive(Debug, Clone, Deserialize)]
pub struct MenuPatch {
    /// What to do with the items.
    pub op: PatchOp,
    /// Menus to add to or remove from; empty or absent for `Delete`.
    #[serde(default)]
    pub days: Option<Vec<Weekday>>,
    /// Target items. Items of other restaurants are ignored.
    pub ids: Vec<i32>,
}

impl MenuPatch {
    /// Check that `days` fits the operation.
    ///
    /// `add` and `remove` need at least one day; `delete` takes none.
    pub fn validate(&self) -> AppResult<()> {
        let has_days = self.days.as_ref().is_some_and(|d| !d.is_empty());

        match self.op {
            PatchOp::Add | PatchOp::Remove if !has_days => Err(AppError::Validation(
                "days are required for add and remove".to_string(),
            )),
            PatchOp::Delete if has_days => Err(AppError::Validation(
                "days must be omitted for delete".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn days(&self) -> &[Weekday] {
        self.days.as_deref().unwrap_or_default()
    }
}

impl MenuService {
    /// Create a new menu service.
    #[must_use]
    pub const fn new(menu_repo: MenuRepository, restaurant_repo: RestaurantRepository) -> Self {
        Self {
            menu_repo,
            restaurant_repo,
        }
    }

    /// List a restaurant's items in creation order.
    ///
    /// With `include_all` every item is returned; otherwise the items on the
    /// menu of `day`, or with no day the items that are on no menu at all.
    pub async fn list_items(
        &self,
        restaurant_id: i32,
        day: Option<Weekday>,
        include_all: bool,
    ) -> AppResult<Vec<item::Model>> {
        let filter = match (include_all, day) {
            (true, _) => ItemFilter::All,
            (false, Some(day)) => ItemFilter::Day(day),
            (false, None) => ItemFilter::Unassigned,
        };

        self.menu_repo.find_items(restaurant_id, filter).await
    }

    /// Create items and put them on the menus of `days`.
    ///
    /// Returns the created items in input order. With no days the items
    /// start out unassigned.
    pub async fn add_items(
        &self,
        restaurant_id: i32,
        items: Vec<NewItem>,
        days: &[Weekday],
    ) -> AppResult<Vec<item::Model>> {
        for item in &items {
            item.validate()?;
        }

        let models = items
            .into_iter()
            .map(|i| item::ActiveModel {
                name: Set(i.name),
                price: Set(i.price),
                description: Set(i.description),
                ..Default::default()
            })
            .collect();

        let created = self
            .menu_repo
            .create_items(restaurant_id, models, days)
            .await?;

        tracing::debug!(restaurant_id, count = created.len(), "Items created");
        Ok(created)
    }

    /// Delete a restaurant's items along with their menu associations.
    ///
    /// Ids of other restaurants are ignored. Returns the number of deleted
    /// items.
    pub async fn delete_items(&self, restaurant_id: i32, ids: &[i32]) -> AppResult<u64> {
        let deleted = self.menu_repo.delete_items(restaurant_id, ids).await?;
        tracing::debug!(restaurant_id, count = deleted, "Items deleted");
        Ok(deleted)
    }

    /// Apply a menu patch and return the number of rows it touched.
    ///
    /// The patch is validated before anything is written. Adding an existing
    /// association and removing a missing one are both no-ops.
    pub async fn patch_association(&self, restaurant_id: i32, patch: &MenuPatch) -> AppResult<u64> {
        patch.validate()?;

        match patch.op {
            PatchOp::Add => {
                self.restaurant_repo.get_by_id(restaurant_id).await?;
                self.menu_repo
                    .add_to_menus(restaurant_id, patch.days(), &patch.ids)
                    .await
            }
            PatchOp::Remove => {
                self.restaurant_repo.get_by_id(restaurant_id).await?;
                self.menu_repo
                    .remove_from_menus(restaurant_id, patch.days(), &patch.ids)
                    .await
            }
            PatchOp::Delete => self.delete_items(restaurant_id, &patch.ids).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn patch(op: PatchOp, days: Option<Vec<Weekday>>) -> MenuPatch {
        MenuPatch {
            op,
            days,
            ids: vec![1],
        }
    }

    fn service() -> MenuService {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        MenuService::new(
            MenuRepository::new(db.clone()),
            RestaurantRepository::new(db),
        )
    }

    #[test]
    fn test_add_requires_days() {
        assert!(patch(PatchOp::Add, None).validate().is_err());
        assert!(patch(PatchOp::Add, Some(vec![])).validate().is_err());
        assert!(patch(PatchOp::Add, Some(vec![Weekday::Monday])).validate().is_ok());
    }

    #[test]
    fn test_remove_requires_days() {
        assert!(matches!(
            patch(PatchOp::Remove, None).validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_delete_rejects_days() {
        assert!(patch(PatchOp::Delete, None).validate().is_ok());
        assert!(patch(PatchOp::Delete, Some(vec![])).validate().is_ok());
        assert!(matches!(
            patch(PatchOp::Delete, Some(vec![Weekday::Friday])).validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_patch_deserializes() {
        let patch: MenuPatch =
            serde_json::from_str(r#"{"op":"remove","days":["monday","friday"],"ids":[3,4]}"#)
                .unwrap();

        assert_eq!(patch.op, PatchOp::Remove);
        assert_eq!(patch.days, Some(vec![Weekday::Monday, Weekday::Friday]));
        assert_eq!(patch.ids, vec![3, 4]);
    }

    #[test]
    fn test_new_item_validation() {
        let item = NewItem {
            name: "Goulash".to_string(),
            price: 1_000_000,
            description: None,
        };
        assert!(item.validate().is_err());

        let item = NewItem {
            price: 1200,
            ..item
        };
        assert!(item.validate().is_ok());
    }

    #[tokio::test]
    async fn test_invalid_patch_touches_nothing() {
        // An empty mock fails any query, so reaching the database would error
        // with something other than a validation error.
        let result = service()
            .patch_association(1, &patch(PatchOp::Add, None))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_items_validates_first() {
        let items = vec![NewItem {
            name: String::new(),
            price: 100,
            description: None,
        }];

        let result = service().add_items(1, items, &[]).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
