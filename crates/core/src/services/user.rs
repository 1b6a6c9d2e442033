//! User service.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lunch_common::{config::RootUserConfig, AppError, AppResult};
use lunch_db::{
    entities::{user, Role},
    repositories::UserRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use validator::{Validate, ValidationError};

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
}

/// Input for creating a new user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 3, max = 32), custom(function = "validate_username"))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,

    /// Role granted to the account.
    pub role: Role,

    /// Restaurant the user manages; required for restaurateurs.
    pub restaurant_id: Option<i32>,
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        Ok(())
    } else {
        Err(ValidationError::new("username_charset").with_message(
            "Username can only contain alphanumeric characters, underscores and hyphens".into(),
        ))
    }
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Register a user.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        if input.role == Role::Restaurateur && input.restaurant_id.is_none() {
            return Err(AppError::Validation(
                "restaurant_id is required for restaurateurs".to_string(),
            ));
        }

        let taken = self
            .user_repo
            .find_by_username_or_email(&input.username, &input.email)
            .await?;
        let username_taken = taken.iter().any(|u| u.username == input.username);
        let email_taken = taken.iter().any(|u| u.email == input.email);

        match (username_taken, email_taken) {
            (true, true) => {
                return Err(AppError::Conflict(
                    "Username and email already registered".to_string(),
                ));
            }
            (true, false) => {
                return Err(AppError::Conflict("Username already registered".to_string()));
            }
            (false, true) => {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
            (false, false) => {}
        }

        let model = user::ActiveModel {
            username: Set(input.username),
            password: Set(hash_password(&input.password)?),
            email: Set(input.email),
            role: Set(input.role),
            restaurant_id: Set(input.restaurant_id),
            ..Default::default()
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = user.id, role = ?user.role, "User created");

        Ok(user)
    }

    /// Get a user by username.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User: {username}")))
    }

    /// Authenticate a user by username and password.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password)? {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Create the configured administrator when there is no admin yet.
    ///
    /// Returns the created user, or `None` when nothing was done.
    pub async fn ensure_root_user(&self, root: &RootUserConfig) -> AppResult<Option<user::Model>> {
        if root.password.is_empty() {
            tracing::warn!("Root password is not configured, skipping root user bootstrap");
            return Ok(None);
        }

        if self.user_repo.count_by_role(Role::Admin).await? > 0 {
            return Ok(None);
        }

        let model = user::ActiveModel {
            username: Set(root.username.clone()),
            password: Set(hash_password(&root.password)?),
            email: Set(root.email.clone()),
            role: Set(Role::Admin),
            restaurant_id: Set(None),
            ..Default::default()
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(username = %user.username, "Root user created");

        Ok(Some(user))
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn input(username: &str, role: Role, restaurant_id: Option<i32>) -> CreateUserInput {
        CreateUserInput {
            username: username.to_string(),
            email: format!("{username}@email.com"),
            password: "secret".to_string(),
            role,
            restaurant_id,
        }
    }

    fn existing(username: &str, email: &str) -> user::Model {
        user::Model {
            id: 1,
            username: username.to_string(),
            password: String::new(),
            email: email.to_string(),
            role: Role::Employee,
            restaurant_id: None,
        }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("lunch_time_42").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("lunch_time_42", &hash).unwrap());
        assert!(!verify_password("dinner_time", &hash).unwrap());
    }

    #[test]
    fn test_username_charset() {
        assert!(input("good_name-1", Role::Employee, None).validate().is_ok());
        assert!(input("bad name", Role::Employee, None).validate().is_err());
        assert!(input("ab", Role::Employee, None).validate().is_err());
    }

    #[tokio::test]
    async fn test_restaurateur_requires_restaurant() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = UserService::new(UserRepository::new(db));

        let result = service.create(input("chef", Role::Restaurateur, None)).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_taken_email_is_reported() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing("someone", "newbie@email.com")]])
                .into_connection(),
        );
        let service = UserService::new(UserRepository::new(db));

        let result = service.create(input("newbie", Role::Employee, None)).await;

        match result {
            Err(AppError::Conflict(msg)) => assert_eq!(msg, "Email already registered"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_root_bootstrap_skipped_without_password() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = UserService::new(UserRepository::new(db));

        let created = service
            .ensure_root_user(&RootUserConfig::default())
            .await
            .unwrap();

        assert!(created.is_none());
    }
}
