//! Daily winner computation at the voting cutoff.

use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use lunch_common::{config::VotingConfig, AppError, AppResult};
use lunch_core::WinnerService;
use tokio::task::JoinHandle;

/// Scheduler configuration.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Local time the job fires at every day.
    pub ends_at: NaiveTime,
    /// Timezone `ends_at` is expressed in.
    pub timezone: Tz,
}

impl SchedulerConfig {
    /// Fire at the voting cutoff.
    pub fn from_voting(config: &VotingConfig) -> AppResult<Self> {
        Ok(Self {
            ends_at: config.ends_at,
            timezone: config.tz()?,
        })
    }
}

/// Executor of the daily winner job.
#[async_trait::async_trait]
pub trait WinnerJob: Send + Sync {
    /// Compute the winners of `voting_date`, returning how many there are.
    async fn compute_winner(&self, voting_date: NaiveDate) -> AppResult<usize>;
}

#[async_trait::async_trait]
impl WinnerJob for WinnerService {
    async fn compute_winner(&self, voting_date: NaiveDate) -> AppResult<usize> {
        Ok(Self::compute_winner(self, voting_date).await?.len())
    }
}

/// Next time strictly after `now` the local clock in `tz` reads `ends_at`.
///
/// Days where `ends_at` falls into a DST gap are skipped.
pub fn next_run(now: DateTime<Utc>, ends_at: NaiveTime, tz: Tz) -> AppResult<DateTime<Tz>> {
    let today = now.with_timezone(&tz).date_naive();

    (0..=2)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .filter_map(|day| tz.from_local_datetime(&day.and_time(ends_at)).earliest())
        .find(|run| run.with_timezone(&Utc) > now)
        .ok_or_else(|| AppError::Internal(format!("no cutoff time after {now}")))
}

/// Run the job for one voting date and log the outcome.
pub async fn run_job<E: WinnerJob + ?Sized>(executor: &E, voting_date: NaiveDate) {
    match executor.compute_winner(voting_date).await {
        Ok(0) => {
            tracing::info!(%voting_date, "No winner for voting date");
        }
        Ok(count) => {
            tracing::info!(%voting_date, count, "Winner job finished");
        }
        Err(e) => {
            tracing::error!(%voting_date, error = %e, "Winner job failed");
        }
    }
}

/// Spawn the daily winner job.
///
/// The task sleeps until the next cutoff, computes the winners of the voting
/// date that just closed, and repeats. Failed runs are logged and not retried.
pub fn run_scheduler<E: WinnerJob + 'static>(
    config: SchedulerConfig,
    executor: Arc<E>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let now = Utc::now();
            let run_at = match next_run(now, config.ends_at, config.timezone) {
                Ok(run_at) => run_at,
                Err(e) => {
                    tracing::error!(error = %e, "Cannot schedule winner job");
                    return;
                }
            };

            let delay = (run_at.with_timezone(&Utc) - now)
                .to_std()
                .unwrap_or_default();
            tracing::debug!(run_at = %run_at, ?delay, "Winner job scheduled");
            tokio::time::sleep(delay).await;

            run_job(executor.as_ref(), run_at.date_naive()).await;
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 10, day).unwrap()
    }

    #[test]
    fn test_next_run_later_today() {
        let now = Utc.with_ymd_and_hms(2023, 10, 26, 9, 0, 0).unwrap();
        let run = next_run(now, noon(), chrono_tz::UTC).unwrap();

        assert_eq!(run.date_naive(), date(26));
        assert_eq!(run.time(), noon());
    }

    #[test]
    fn test_next_run_after_cutoff_is_tomorrow() {
        let now = Utc.with_ymd_and_hms(2023, 10, 26, 12, 0, 0).unwrap();
        let run = next_run(now, noon(), chrono_tz::UTC).unwrap();

        assert_eq!(run.date_naive(), date(27));
    }

    #[test]
    fn test_next_run_in_timezone() {
        // 11:00 UTC is 13:00 in Budapest, past the local cutoff.
        let now = Utc.with_ymd_and_hms(2023, 10, 26, 11, 0, 0).unwrap();
        let run = next_run(now, noon(), chrono_tz::Europe::Budapest).unwrap();

        assert_eq!(run.date_naive(), date(27));
        assert_eq!(
            run.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2023, 10, 27, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_scheduler_config_from_voting() {
        let config = SchedulerConfig::from_voting(&VotingConfig::default()).unwrap();

        assert_eq!(config.ends_at, noon());
        assert_eq!(config.timezone, chrono_tz::UTC);
    }

    struct RecordingJob {
        dates: Mutex<Vec<NaiveDate>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl WinnerJob for RecordingJob {
        async fn compute_winner(&self, voting_date: NaiveDate) -> AppResult<usize> {
            self.dates.lock().unwrap().push(voting_date);
            if self.fail {
                Err(AppError::Database("connection reset".to_string()))
            } else {
                Ok(2)
            }
        }
    }

    #[tokio::test]
    async fn test_run_job_calls_executor() {
        let job = RecordingJob {
            dates: Mutex::new(Vec::new()),
            fail: false,
        };

        run_job(&job, date(26)).await;

        assert_eq!(*job.dates.lock().unwrap(), vec![date(26)]);
    }

    #[tokio::test]
    async fn test_run_job_swallows_failure() {
        let job = RecordingJob {
            dates: Mutex::new(Vec::new()),
            fail: true,
        };

        run_job(&job, date(26)).await;
        run_job(&job, date(27)).await;

        assert_eq!(job.dates.lock().unwrap().len(), 2);
    }
}
