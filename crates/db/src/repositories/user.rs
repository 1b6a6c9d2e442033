//! User repository.

use std::sync::Arc;

use crate::entities::{user, Role, User};
use lunch_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, SqlErr,
};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find users holding either the username or the email.
    pub async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> AppResult<Vec<user::Model>> {
        User::find()
            .filter(
                Condition::any()
                    .add(user::Column::Username.eq(username))
                    .add(user::Column::Email.eq(email)),
            )
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count users with a role.
    pub async fn count_by_role(&self, role: Role) -> AppResult<u64> {
        User::find()
            .filter(user::Column::Role.eq(role))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        let restaurant_id = match &model.restaurant_id {
            ActiveValue::Set(Some(id)) | ActiveValue::Unchanged(Some(id)) => *id,
            _ => 0,
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    AppError::Conflict("Username or email already registered".to_string())
                }
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                    AppError::NoSuchRestaurant(restaurant_id)
                }
                _ => AppError::Database(e.to_string()),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_user(id: i32, username: &str, role: Role) -> user::Model {
        user::Model {
            id,
            username: username.to_string(),
            password: "$argon2id$hash".to_string(),
            email: format!("{username}@email.com"),
            role,
            restaurant_id: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_username() {
        let user = create_test_user(2, "employee1", Role::Employee);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_by_username("employee1").await.unwrap();

        assert_eq!(result, Some(user));
    }

    #[tokio::test]
    async fn test_find_by_username_or_email() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_user(2, "employee1", Role::Employee),
                    create_test_user(3, "employee2", Role::Employee),
                ]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo
            .find_by_username_or_email("employee1", "employee2@email.com")
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
    }
}
