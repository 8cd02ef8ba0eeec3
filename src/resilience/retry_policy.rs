//! # Retry Policy
//!
//! Deterministic exponential backoff around any failable async operation.
//! The schedule doubles from the initial delay up to the cap, with no
//! jitter: 1s, 2s, 4s, 8s, ... capped at 60s under the defaults.
//!
//! A policy is a plain value. Call sites that need retries receive one
//! explicitly; every `execute` call starts from attempt one with the
//! initial delay.

use crate::config::RetryConfig;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1), Duration::from_secs(60))
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_secs(config.initial_delay_seconds),
            Duration::from_secs(config.max_delay_seconds),
        )
    }
}

impl RetryPolicy {
    /// A zero attempt budget is raised to one: the operation always runs.
    pub fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            max_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Waits taken between attempts if every attempt fails
    pub fn backoff_schedule(&self) -> Vec<Duration> {
        let mut delays = Vec::with_capacity(self.max_attempts.saturating_sub(1) as usize);
        let mut delay = self.initial_delay.min(self.max_delay);
        for _ in 1..self.max_attempts {
            delays.push(delay);
            delay = delay.saturating_mul(2).min(self.max_delay);
        }
        delays
    }

    /// Run `operation` until it succeeds or the attempt budget is spent.
    ///
    /// The final failure is returned unchanged.
    pub async fn execute<F, Fut, T, E>(&self, operation_name: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt = 0;
        let mut delay = self.initial_delay.min(self.max_delay);

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        error!(
                            operation = %operation_name,
                            attempts = attempt,
                            error = %e,
                            "All retry attempts failed"
                        );
                        return Err(e);
                    }

                    warn!(
                        operation = %operation_name,
                        attempt = attempt,
                        wait_seconds = delay.as_secs_f64(),
                        error = %e,
                        "Attempt failed, waiting before retrying"
                    );

                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2).min(self.max_delay);
                }
            }
        }
    }
}
