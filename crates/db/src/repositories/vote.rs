//! Vote repository.

use std::sync::Arc;

use crate::entities::{restaurant, vote, Restaurant, Vote};
use chrono::{NaiveDate, Utc};
use lunch_common::{AppError, AppResult};
use sea_orm::{
    prelude::DateTimeWithTimeZone, sea_query::Expr, ActiveModelTrait, ColumnTrait,
    DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr,
};

/// Number of votes a restaurant got on a voting date.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct VoteTally {
    /// Restaurant voted for.
    pub restaurant_id: i32,
    /// Votes it received.
    pub votes: i64,
}

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a vote.
    ///
    /// The unique (user, date) index and the restaurant foreign key decide
    /// whether the vote is accepted; nothing is checked beforehand.
    pub async fn create(
        &self,
        user_id: i32,
        restaurant_id: i32,
        voting_date: NaiveDate,
    ) -> AppResult<vote::Model> {
        let model = vote::ActiveModel {
            user_id: Set(user_id),
            restaurant_id: Set(restaurant_id),
            voting_date: Set(voting_date),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateVote,
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                    AppError::NoSuchRestaurant(restaurant_id)
                }
                _ => AppError::Database(e.to_string()),
            })
    }

    /// Restaurant name and cast time of every vote of a user, oldest first.
    pub async fn find_history(
        &self,
        user_id: i32,
    ) -> AppResult<Vec<(String, DateTimeWithTimeZone)>> {
        Vote::find()
            .select_only()
            .column(restaurant::Column::Name)
            .column(vote::Column::CreatedAt)
            .inner_join(Restaurant)
            .filter(vote::Column::UserId.eq(user_id))
            .order_by_asc(vote::Column::Id)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count the votes per restaurant for a date.
    pub async fn tally(&self, voting_date: NaiveDate) -> AppResult<Vec<VoteTally>> {
        Vote::find()
            .select_only()
            .column(vote::Column::RestaurantId)
            .column_as(Expr::col(vote::Column::Id).count(), "votes")
            .filter(vote::Column::VotingDate.eq(voting_date))
            .group_by(vote::Column::RestaurantId)
            .order_by_asc(vote::Column::RestaurantId)
            .into_model::<VoteTally>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
    use std::collections::BTreeMap;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 10, 26).unwrap()
    }

    fn create_test_vote(id: i32, user_id: i32, restaurant_id: i32) -> vote::Model {
        vote::Model {
            id,
            user_id,
            restaurant_id,
            voting_date: date(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_create_vote() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_vote(1, 2, 3)]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let vote = repo.create(2, 3, date()).await.unwrap();

        assert_eq!(vote.user_id, 2);
        assert_eq!(vote.restaurant_id, 3);
        assert_eq!(vote.voting_date, date());
    }

    #[tokio::test]
    async fn test_create_vote_other_error_is_database_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Custom("connection reset".to_string())])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let result = repo.create(2, 3, date()).await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_tally() {
        let rows = vec![
            BTreeMap::from([
                ("restaurant_id", sea_orm::Value::Int(Some(1))),
                ("votes", sea_orm::Value::BigInt(Some(4))),
            ]),
            BTreeMap::from([
                ("restaurant_id", sea_orm::Value::Int(Some(2))),
                ("votes", sea_orm::Value::BigInt(Some(3))),
            ]),
        ];
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([rows])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let tally = repo.tally(date()).await.unwrap();

        assert_eq!(
            tally,
            vec![
                VoteTally { restaurant_id: 1, votes: 4 },
                VoteTally { restaurant_id: 2, votes: 3 },
            ]
        );
    }
}
