// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch driver: runs the tenant pipeline for every tenant with the alerting
//! capability enabled.
//!
//! Each tenant runs in its own task under a deadline, so a hung or panicking
//! tenant becomes one failed entry instead of stopping the batch. At most
//! `max_concurrent_tenants` run at once; results keep tenant order.

use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use vigil_core::VigilError;
use vigil_core::types::{OrganizationId, format_timestamp};

use crate::orchestrator::{AlertEngine, RunTally, TenantRunResult};

/// Digest of one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRunSummary {
    /// Batch start as an RFC 3339 UTC timestamp.
    pub started_at: String,
    pub duration_ms: u64,
    /// Number of tenants attempted.
    pub tenants: usize,
    /// Sum of per-tenant generated counts.
    pub generated: usize,
    /// Sum of per-tenant skipped counts.
    pub skipped: usize,
    /// Tenants whose result carries at least one error.
    pub failed_tenants: usize,
    /// Batch-level errors, e.g. the tenant listing failed.
    pub errors: Vec<String>,
    pub results: Vec<TenantRunResult>,
}

impl BatchRunSummary {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at: format_timestamp(started_at),
            duration_ms: 0,
            tenants: 0,
            generated: 0,
            skipped: 0,
            failed_tenants: 0,
            errors: Vec::new(),
            results: Vec::new(),
        }
    }

    fn absorb(&mut self, results: Vec<TenantRunResult>) {
        self.tenants = results.len();
        self.generated = results.iter().map(|r| r.generated).sum();
        self.skipped = results.iter().map(|r| r.skipped).sum();
        self.failed_tenants = results.iter().filter(|r| !r.is_ok()).count();
        self.results = results;
    }
}

impl AlertEngine {
    /// Run every enabled tenant as of now.
    pub async fn run_for_all_organizations(&self) -> BatchRunSummary {
        self.run_for_all_organizations_at(Utc::now()).await
    }

    /// Run every enabled tenant as of `now`.
    pub async fn run_for_all_organizations_at(&self, now: DateTime<Utc>) -> BatchRunSummary {
        let clock = Instant::now();
        let mut summary = BatchRunSummary::new(now);
        let capability = self.inner.resolver.capability();

        match self
            .inner
            .store
            .organizations_with_capability(capability)
            .await
        {
            Ok(organizations) => {
                info!(
                    tenants = organizations.len(),
                    workers = self.inner.max_concurrent_tenants,
                    "alert batch started"
                );
                let results = futures::stream::iter(
                    organizations
                        .into_iter()
                        .map(|org| self.run_isolated(org, now)),
                )
                .buffered(self.inner.max_concurrent_tenants)
                .collect::<Vec<_>>()
                .await;
                summary.absorb(results);
            }
            Err(e) => {
                error!(error = %e, "failed to list tenants, batch skipped");
                summary.errors.push(format!("listing tenants failed: {e}"));
            }
        }

        let elapsed = clock.elapsed();
        summary.duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

        #[cfg(feature = "prometheus")]
        vigil_prometheus::record_batch_duration(elapsed.as_secs_f64());

        info!(
            tenants = summary.tenants,
            generated = summary.generated,
            skipped = summary.skipped,
            failed_tenants = summary.failed_tenants,
            duration_ms = summary.duration_ms,
            "alert batch complete"
        );
        summary
    }

    /// One tenant in its own task, under the tenant deadline.
    ///
    /// Alerts committed before a timeout or panic stay counted in the entry.
    async fn run_isolated(&self, organization_id: OrganizationId, now: DateTime<Utc>) -> TenantRunResult {
        let engine = self.clone();
        let timeout = self.inner.tenant_timeout;
        let tally = RunTally::new(organization_id.clone());
        let task_tally = tally.clone();
        let org = organization_id.clone();

        let handle = tokio::spawn(async move {
            tokio::time::timeout(timeout, engine.run_tracked(&org, now, &task_tally)).await
        });

        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(_elapsed)) => {
                let partial = tally.snapshot();
                warn!(
                    org = %organization_id,
                    ?timeout,
                    generated = partial.generated,
                    "tenant run timed out"
                );
                tally.push_error(VigilError::Timeout { duration: timeout }.to_string());
            }
            Err(join_error) => {
                error!(org = %organization_id, error = %join_error, "tenant run panicked");
                let reason = if join_error.is_panic() {
                    "tenant run panicked"
                } else {
                    "tenant run cancelled"
                };
                tally.push_error(reason);
            }
        }
        tally.snapshot()
    }
}
