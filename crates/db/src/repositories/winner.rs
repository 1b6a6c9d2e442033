//! Vote winner repository.

use std::sync::Arc;

use crate::entities::{restaurant, vote_winner, Restaurant, VoteWinner};
use crate::repositories::VoteTally;
use chrono::{NaiveDate, Utc};
use lunch_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};

/// Vote winner repository for database operations.
#[derive(Clone)]
pub struct WinnerRepository {
    db: Arc<DatabaseConnection>,
}

impl WinnerRepository {
    /// Create a new winner repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Store the winners of a voting date in one transaction.
    ///
    /// Fails with [`AppError::AlreadyComputed`] when any of the restaurants is
    /// already recorded for the date; nothing is written in that case.
    pub async fn create_many(
        &self,
        voting_date: NaiveDate,
        winners: &[VoteTally],
    ) -> AppResult<Vec<vote_winner::Model>> {
        let result: Result<_, DbErr> = async {
            let txn = self.db.begin().await?;

            let mut created = Vec::with_capacity(winners.len());
            for winner in winners {
                let model = vote_winner::ActiveModel {
                    restaurant_id: Set(winner.restaurant_id),
                    voting_date: Set(voting_date),
                    votes: Set(i32::try_from(winner.votes).unwrap_or(i32::MAX)),
                    created_at: Set(Utc::now().into()),
                    ..Default::default()
                };
                created.push(model.insert(&txn).await?);
            }

            txn.commit().await?;
            Ok(created)
        }
        .await;

        result.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::AlreadyComputed(voting_date),
            _ => AppError::Database(e.to_string()),
        })
    }

    /// Get the winners of a voting date with their restaurants.
    pub async fn find_by_date(
        &self,
        voting_date: NaiveDate,
    ) -> AppResult<Vec<(vote_winner::Model, Option<restaurant::Model>)>> {
        VoteWinner::find()
            .find_also_related(Restaurant)
            .filter(vote_winner::Column::VotingDate.eq(voting_date))
            .order_by_asc(vote_winner::Column::RestaurantId)
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

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 10, 26).unwrap()
    }

    fn create_test_winner(id: i32, restaurant_id: i32, votes: i32) -> vote_winner::Model {
        vote_winner::Model {
            id,
            restaurant_id,
            voting_date: date(),
            votes,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_date() {
        let winner = create_test_winner(1, 7, 4);
        let restaurant = restaurant::Model {
            id: 7,
            name: "Soup Kitchen".to_string(),
            description: None,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[(winner.clone(), restaurant.clone())]])
                .into_connection(),
        );

        let repo = WinnerRepository::new(db);
        let result = repo.find_by_date(date()).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].0, winner);
        assert_eq!(result[0].1.as_ref().map(|r| r.name.as_str()), Some("Soup Kitchen"));
    }

    #[tokio::test]
    async fn test_create_many_empty() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = WinnerRepository::new(db);
        let result = repo.create_many(date(), &[]).await.unwrap();

        assert!(result.is_empty());
    }
}
