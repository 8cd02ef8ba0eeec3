//! # Daily Scheduler
//!
//! Fires a run at fixed local wall-clock times every day. Runs are awaited
//! one at a time, so two runs can never overlap; slots that pass while a
//! run is still going are skipped.

use crate::config::{ConfigResult, ConfigurationError, ScheduleConfig};
use crate::orchestration::RunOutcome;
use chrono::{Duration as ChronoDuration, Local, NaiveDateTime, NaiveTime};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySchedule {
    times: Vec<NaiveTime>,
}

impl DailySchedule {
    pub fn new(mut times: Vec<NaiveTime>) -> ConfigResult<Self> {
        if times.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "schedule.daily_times",
                "at least one daily run time",
            ));
        }
        times.sort_unstable();
        times.dedup();
        Ok(Self { times })
    }

    pub fn from_config(config: &ScheduleConfig) -> ConfigResult<Self> {
        Self::new(config.parsed_times()?)
    }

    pub fn times(&self) -> &[NaiveTime] {
        &self.times
    }

    /// First slot strictly after `now`, today or tomorrow
    pub fn next_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date();
        self.times
            .iter()
            .map(|time| today.and_time(*time))
            .find(|slot| *slot > now)
            .unwrap_or_else(|| (today + ChronoDuration::days(1)).and_time(self.times[0]))
    }

    /// Wait for each slot and run once per slot, forever.
    pub async fn run_forever<F, Fut>(&self, mut run: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RunOutcome>,
    {
        loop {
            let now = Local::now().naive_local();
            let next = self.next_after(now);
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            info!(next_run = %next, wait_seconds = wait.as_secs(), "Waiting for next scheduled run");
            tokio::time::sleep(wait).await;

            match run().await {
                RunOutcome::Completed(report) => info!(
                    total_new = report.total_new,
                    total_finalized = report.total_finalized,
                    "Scheduled run completed"
                ),
                RunOutcome::Aborted { phase, error } => {
                    warn!(phase = %phase, error = %error, "Scheduled run aborted")
                }
            }
        }
    }
}
