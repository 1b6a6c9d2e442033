//! Winner service: picks the day's most voted restaurants.

use chrono::NaiveDate;
use lunch_common::{AppError, AppResult};
use lunch_db::{
    entities::vote_winner,
    repositories::{VoteRepository, VoteTally, WinnerRepository},
};
use serde::Serialize;

/// A winning restaurant of a voting date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Winner {
    /// Winning restaurant.
    pub restaurant_id: i32,
    /// Display name of the restaurant.
    pub restaurant_name: String,
    /// Date the votes were cast on.
    pub voting_date: NaiveDate,
    /// Votes the restaurant received.
    pub votes: i32,
}

/// Winner service for business logic.
#[derive(Clone)]
pub struct WinnerService {
    vote_repo: VoteRepository,
    winner_repo: WinnerRepository,
}

/// Keep every restaurant whose vote count equals the highest one.
#[must_use]
pub fn select_winners(tallies: Vec<VoteTally>) -> Vec<VoteTally> {
    let Some(max) = tallies.iter().map(|t| t.votes).max() else {
        return Vec::new();
    };

    tallies.into_iter().filter(|t| t.votes == max).collect()
}

impl WinnerService {
    /// Create a new winner service.
    #[must_use]
    pub const fn new(vote_repo: VoteRepository, winner_repo: WinnerRepository) -> Self {
        Self {
            vote_repo,
            winner_repo,
        }
    }

    /// Compute and store the winners of `voting_date`.
    ///
    /// All restaurants sharing the highest count win. A date without votes
    /// has no winners and nothing is stored. Running this again for a date
    /// that already has winners stores nothing and returns the stored rows.
    pub async fn compute_winner(&self, voting_date: NaiveDate) -> AppResult<Vec<vote_winner::Model>> {
        let tallies = self.vote_repo.tally(voting_date).await?;
        let winners = select_winners(tallies);

        if winners.is_empty() {
            tracing::info!(%voting_date, "No votes, no winner");
            return Ok(Vec::new());
        }

        match self.winner_repo.create_many(voting_date, &winners).await {
            Ok(created) => {
                tracing::info!(
                    %voting_date,
                    winners = ?winners.iter().map(|w| (w.restaurant_id, w.votes)).collect::<Vec<_>>(),
                    "Winners computed"
                );
                Ok(created)
            }
            Err(AppError::AlreadyComputed(date)) => {
                tracing::warn!(voting_date = %date, "Winner already computed");
                let stored = self.winner_repo.find_by_date(date).await?;
                Ok(stored.into_iter().map(|(w, _)| w).collect())
            }
            Err(e) => {
                tracing::error!(%voting_date, error = %e, "Could not compute winner");
                Err(e)
            }
        }
    }

    /// Get the winners of `voting_date`, ordered by restaurant id.
    pub async fn get_winners(&self, voting_date: NaiveDate) -> AppResult<Vec<Winner>> {
        let rows = self.winner_repo.find_by_date(voting_date).await?;

        Ok(rows
            .into_iter()
            .map(|(winner, restaurant)| Winner {
                restaurant_id: winner.restaurant_id,
                restaurant_name: restaurant.map(|r| r.name).unwrap_or_default(),
                voting_date: winner.voting_date,
                votes: winner.votes,
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn tally(restaurant_id: i32, votes: i64) -> VoteTally {
        VoteTally {
            restaurant_id,
            votes,
        }
    }

    #[test]
    fn test_single_winner() {
        let winners = select_winners(vec![tally(1, 4), tally(2, 3), tally(3, 3)]);
        assert_eq!(winners, vec![tally(1, 4)]);
    }

    #[test]
    fn test_ties_all_win() {
        let winners = select_winners(vec![tally(1, 3), tally(2, 3), tally(3, 3), tally(4, 1)]);
        assert_eq!(winners, vec![tally(1, 3), tally(2, 3), tally(3, 3)]);
    }

    #[test]
    fn test_no_votes_no_winner() {
        assert!(select_winners(Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn test_compute_without_votes_writes_nothing() {
        let empty: Vec<BTreeMap<&str, sea_orm::Value>> = Vec::new();
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([empty])
                .into_connection(),
        );
        let service = WinnerService::new(
            VoteRepository::new(db.clone()),
            WinnerRepository::new(db.clone()),
        );

        let date = NaiveDate::from_ymd_opt(2023, 10, 26).unwrap();
        let winners = service.compute_winner(date).await.unwrap();
        assert!(winners.is_empty());
        drop(service);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert_eq!(log.len(), 1);
    }
}
