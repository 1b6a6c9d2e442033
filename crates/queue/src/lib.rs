//! Background jobs for the lunch voting backend.
//!
//! - **Scheduler**: computes the day's winners once voting has closed

pub mod scheduler;

pub use scheduler::{next_run, run_job, run_scheduler, SchedulerConfig, WinnerJob};
