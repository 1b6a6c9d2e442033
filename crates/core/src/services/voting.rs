//! Voting service: one vote per user and voting date.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use lunch_common::{config::VotingConfig, AppError, AppResult};
use lunch_db::{entities::vote, repositories::VoteRepository};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;

/// The daily period in which votes are accepted.
///
/// Voting closes `margin` before `ends_at`, local time in `tz`.
#[derive(Debug, Clone, Copy)]
pub struct VotingWindow {
    ends_at: NaiveTime,
    margin: Duration,
    tz: Tz,
}

impl VotingWindow {
    /// Create a window closing `margin` before `ends_at` in `tz`.
    #[must_use]
    pub const fn new(ends_at: NaiveTime, margin: Duration, tz: Tz) -> Self {
        Self {
            ends_at,
            margin,
            tz,
        }
    }

    /// Build the window from configuration.
    pub fn from_config(config: &VotingConfig) -> AppResult<Self> {
        let margin = i64::try_from(config.end_margin_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| AppError::Config("voting.end_margin_secs is too large".to_string()))?;

        Ok(Self::new(config.ends_at, margin, config.tz()?))
    }

    /// Daily cutoff time.
    #[must_use]
    pub const fn ends_at(&self) -> NaiveTime {
        self.ends_at
    }

    /// Timezone the cutoff and voting dates are expressed in.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// Voting date `now` falls on.
    #[must_use]
    pub fn date_of<T: TimeZone>(&self, now: &DateTime<T>) -> NaiveDate {
        now.with_timezone(&self.tz).date_naive()
    }

    /// Current voting date.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.date_of(&Utc::now())
    }

    /// Whether a vote cast at `now` is still accepted.
    ///
    /// Voting closes once `now + margin` is past `ends_at`.
    #[must_use]
    pub fn is_open<T: TimeZone>(&self, now: &DateTime<T>) -> bool {
        let local = now.with_timezone(&self.tz).naive_local();
        let cutoff = local.date().and_time(self.ends_at);

        local + self.margin <= cutoff
    }
}

/// One past vote of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteHistoryEntry {
    /// Restaurant the vote went to.
    pub restaurant_name: String,
    /// When the vote was recorded.
    pub cast_at: DateTimeWithTimeZone,
}

/// Voting service for business logic.
#[derive(Clone)]
pub struct VotingService {
    vote_repo: VoteRepository,
    window: VotingWindow,
}

impl VotingService {
    /// Create a new voting service.
    #[must_use]
    pub const fn new(vote_repo: VoteRepository, window: VotingWindow) -> Self {
        Self { vote_repo, window }
    }

    /// Voting window the service enforces in [`Self::vote_now`].
    #[must_use]
    pub const fn window(&self) -> &VotingWindow {
        &self.window
    }

    /// Current voting date.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.window.today()
    }

    /// Record a vote of `user_id` for `restaurant_id` on `voting_date`.
    ///
    /// A second vote of the same user on the same date fails with
    /// [`AppError::DuplicateVote`]; an unknown restaurant with
    /// [`AppError::NoSuchRestaurant`].
    pub async fn cast_vote(
        &self,
        user_id: i32,
        restaurant_id: i32,
        voting_date: NaiveDate,
    ) -> AppResult<vote::Model> {
        let vote = self
            .vote_repo
            .create(user_id, restaurant_id, voting_date)
            .await?;

        tracing::debug!(user_id, restaurant_id, %voting_date, "Vote cast");
        Ok(vote)
    }

    /// Record a vote cast at `now`, provided the window is still open.
    pub async fn vote_now<T: TimeZone>(
        &self,
        user_id: i32,
        restaurant_id: i32,
        now: &DateTime<T>,
    ) -> AppResult<vote::Model> {
        if !self.window.is_open(now) {
            return Err(AppError::VotingClosed);
        }

        self.cast_vote(user_id, restaurant_id, self.window.date_of(now))
            .await
    }

    /// Every vote of a user, oldest first.
    pub async fn voting_history(&self, user_id: i32) -> AppResult<Vec<VoteHistoryEntry>> {
        let history = self.vote_repo.find_history(user_id).await?;

        Ok(history
            .into_iter()
            .map(|(restaurant_name, cast_at)| VoteHistoryEntry {
                restaurant_name,
                cast_at,
            })
            .collect())
    }
}
