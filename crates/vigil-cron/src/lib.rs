// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cron scheduling for periodic alert batches.
//!
//! [`CronScheduler`] sleeps until the next occurrence of a cron expression,
//! runs a job, and repeats until its cancellation token fires. Jobs never
//! overlap: the next occurrence is computed after the previous job returns.

use std::future::Future;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use croner::Cron;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use vigil_core::VigilError;

/// Runs a job on a cron schedule.
pub struct CronScheduler {
    expression: String,
    cron: Cron,
    cancel: CancellationToken,
}

impl CronScheduler {
    /// Parse `expression` (standard five-field cron syntax).
    pub fn new(expression: &str, cancel: CancellationToken) -> Result<Self, VigilError> {
        let cron = Cron::from_str(expression).map_err(|e| {
            VigilError::Config(format!("invalid cron expression `{expression}`: {e}"))
        })?;
        Ok(Self {
            expression: expression.to_string(),
            cron,
            cancel,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First occurrence strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> Result<DateTime<Utc>, VigilError> {
        self.cron
            .find_next_occurrence(&after, false)
            .map_err(|e| VigilError::Internal(format!("no next occurrence for `{}`: {e}", self.expression)))
    }

    /// Run `job` at every occurrence until cancelled.
    ///
    /// The job receives the scheduled fire time.
    pub async fn run<F, Fut>(&self, mut job: F) -> Result<(), VigilError>
    where
        F: FnMut(DateTime<Utc>) -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut last_fired: Option<DateTime<Utc>> = None;

        loop {
            let now = Utc::now();
            let from = match last_fired {
                Some(last) if last > now => last,
                _ => now,
            };
            let next = self.next_after(from)?;
            let wait = (next - now).to_std().unwrap_or_default();
            debug!(schedule = %self.expression, %next, ?wait, "waiting for next run");

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!(schedule = %self.expression, "scheduler stopped");
                    return Ok(());
                }
                _ = tokio::time::sleep(wait) => {
                    info!(scheduled_for = %next, "scheduled run starting");
                    job(next).await;
                    last_fired = Some(next);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn rejects_invalid_expression() {
        let err = CronScheduler::new("every morning", CancellationToken::new()).err().unwrap();
        assert!(matches!(err, VigilError::Config(_)));
    }

    #[test]
    fn next_after_finds_daily_occurrence() {
        let scheduler = CronScheduler::new("0 6 * * *", CancellationToken::new()).unwrap();
        let base: DateTime<Utc> = "2026-03-01T07:30:00Z".parse().unwrap();
        let next = scheduler.next_after(base).unwrap();
        assert_eq!(next, "2026-03-02T06:00:00Z".parse::<DateTime<Utc>>().unwrap());

        let exact: DateTime<Utc> = "2026-03-02T06:00:00Z".parse().unwrap();
        assert!(scheduler.next_after(exact).unwrap() > exact);
    }

    #[tokio::test]
    async fn cancelled_scheduler_returns_immediately() {
        let cancel = CancellationToken::new();
        let scheduler = CronScheduler::new("0 6 * * *", cancel.clone()).unwrap();
        cancel.cancel();

        let mut runs = 0;
        scheduler
            .run(|_| {
                runs += 1;
                async {}
            })
            .await
            .unwrap();
        assert_eq!(runs, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn fires_successive_occurrences_until_cancelled() {
        let cancel = CancellationToken::new();
        let scheduler = CronScheduler::new("0 6 * * *", cancel.clone()).unwrap();
        let fired = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&fired);
        scheduler
            .run(move |at| {
                let mut times = sink.lock().unwrap();
                times.push(at);
                if times.len() == 3 {
                    cancel.cancel();
                }
                async {}
            })
            .await
            .unwrap();

        let times = fired.lock().unwrap();
        assert_eq!(times.len(), 3);
        assert!(times[0] < times[1] && times[1] < times[2]);
        assert_eq!((times[1] - times[0]).num_hours(), 24);
    }
}
