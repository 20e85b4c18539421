// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-tenant alert pipeline.
//!
//! Capability check, context load, open-alert seeding, then each active
//! category in turn: fetch candidates, drop duplicates, insert alerts and
//! enqueue their delivery rows. Failures are contained at the narrowest
//! scope that allows the rest of the run to continue and end up as strings
//! in [`TenantRunResult::errors`].

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use vigil_config::model::EngineConfig;
use vigil_core::types::{Channel, NewAlert, NewAlertLog, OrganizationId, format_timestamp};
use vigil_core::{ComplianceStore, VigilError};

use crate::candidate::{AlertCandidateItem, SourceParams};
use crate::dedup::DedupSet;
use crate::registry::{CategoryRegistry, ResolvedCategory};
use crate::sources;
use crate::tenant::{TenantAlertConfig, TenantConfigResolver};

/// Error reported for tenants whose alerting capability is off.
pub const CAPABILITY_NOT_ACTIVE: &str = "capability not active";

/// Outcome of one tenant run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRunResult {
    /// Tenant this run processed.
    pub organization_id: OrganizationId,
    /// Alerts newly written during the run.
    pub generated: usize,
    /// Candidates dropped as duplicates of an open alert.
    pub skipped: usize,
    /// Non-fatal problems, one per failed source, candidate or write.
    pub errors: Vec<String>,
}

impl TenantRunResult {
    pub fn new(organization_id: OrganizationId) -> Self {
        Self {
            organization_id,
            generated: 0,
            skipped: 0,
            errors: Vec::new(),
        }
    }


    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Counters of a tenant run in progress, shared with the batch driver so a
/// run cut off by its deadline still reports what it already wrote.
#[derive(Debug, Clone)]
pub(crate) struct RunTally(Arc<Mutex<TenantRunResult>>);

impl RunTally {
    pub(crate) fn new(organization_id: OrganizationId) -> Self {
        Self(Arc::new(Mutex::new(TenantRunResult::new(organization_id))))
    }

    fn update(&self, apply: impl FnOnce(&mut TenantRunResult)) {
        let mut result = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut result);
    }

    pub(crate) fn push_error(&self, error: impl Into<String>) {
        let error = error.into();
        self.update(|r| r.errors.push(error));
    }

    pub(crate) fn snapshot(&self) -> TenantRunResult {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[derive(Clone)]
pub(crate) struct EngineInner {
    pub(crate) store: Arc<dyn ComplianceStore>,
    pub(crate) resolver: TenantConfigResolver,
    pub(crate) registry: CategoryRegistry,
    pub(crate) renotify_window: TimeDelta,
    pub(crate) max_concurrent_tenants: usize,
    pub(crate) tenant_timeout: Duration,
}

/// The alert generation engine. Cheap to clone; clones share the store.
#[derive(Clone)]
pub struct AlertEngine {
    pub(crate) inner: Arc<EngineInner>,
}

impl AlertEngine {
    /// Build an engine over `store` using the `[engine]` configuration section.
    pub fn new(store: Arc<dyn ComplianceStore>, config: &EngineConfig) -> Self {
        let renotify_window =
            TimeDelta::try_days(config.missing_renotify_days).unwrap_or(TimeDelta::MAX);
        Self {
            inner: Arc::new(EngineInner {
                store,
                resolver: TenantConfigResolver::new(
                    config.capability.clone(),
                    &config.default_thresholds,
                ),
                registry: CategoryRegistry::new(&config.disabled_categories),
                renotify_window,
                max_concurrent_tenants: config.max_concurrent_tenants.max(1),
                tenant_timeout: Duration::from_secs(config.tenant_timeout_secs),
            }),
        }
    }

    /// Override the per-tenant deadline.
    pub fn with_tenant_timeout(self, timeout: Duration) -> Self {
        self.rebuild(|inner| inner.tenant_timeout = timeout)
    }

    /// Override how many tenants run at the same time.
    pub fn with_max_concurrent_tenants(self, workers: usize) -> Self {
        self.rebuild(|inner| inner.max_concurrent_tenants = workers.max(1))
    }

    fn rebuild(self, apply: impl FnOnce(&mut EngineInner)) -> Self {
        let mut next = EngineInner::clone(&self.inner);
        apply(&mut next);
        Self {
            inner: Arc::new(next),
        }
    }

    pub fn store(&self) -> &Arc<dyn ComplianceStore> {
        &self.inner.store
    }

    /// Run the pipeline for one tenant as of now.
    pub async fn run_for_organization(&self, organization_id: &OrganizationId) -> TenantRunResult {
        self.run_for_organization_at(organization_id, Utc::now()).await
    }

    /// Run the pipeline for one tenant as of `now`. "Today" is the UTC date of `now`.
    pub async fn run_for_organization_at(
        &self,
        organization_id: &OrganizationId,
        now: DateTime<Utc>,
    ) -> TenantRunResult {
        let tally = RunTally::new(organization_id.clone());
        self.run_tracked(organization_id, now, &tally).await;
        tally.snapshot()
    }

    /// Run the pipeline, accumulating into `tally` as work is committed.
    pub(crate) async fn run_tracked(
        &self,
        organization_id: &OrganizationId,
        now: DateTime<Utc>,
        tally: &RunTally,
    ) {
        if let Err(e) = self.run_pipeline(organization_id, now, tally).await {
            warn!(org = %organization_id, error = %e, "tenant run aborted");
            tally.push_error(e.to_string());
        }

        let result = tally.snapshot();

        #[cfg(feature = "prometheus")]
        vigil_prometheus::record_tenant_run(if result.is_ok() { "ok" } else { "error" });

        info!(
            org = %organization_id,
            generated = result.generated,
            skipped = result.skipped,
            errors = result.errors.len(),
            "tenant run complete"
        );
    }

    async fn run_pipeline(
        &self,
        organization_id: &OrganizationId,
        now: DateTime<Utc>,
        tally: &RunTally,
    ) -> Result<(), VigilError> {
        let store = self.inner.store.as_ref();

        if !self
            .inner
            .resolver
            .capability_enabled(store, organization_id)
            .await?
        {
            debug!(org = %organization_id, "alert capability not active");
            tally.push_error(CAPABILITY_NOT_ACTIVE);
            return Ok(());
        }

        let tenant = self.inner.resolver.resolve(store, organization_id).await?;
        let categories = self
            .inner
            .registry
            .active_categories(store, &tenant.country_code)
            .await?;
        if categories.is_empty() {
            return Err(VigilError::MissingContext(format!(
                "no active alert categories for country {}",
                tenant.country_code
            )));
        }

        let open = store.open_alerts(organization_id).await?;
        let mut dedup = DedupSet::from_open_alerts(&open, self.inner.renotify_window);
        debug!(org = %organization_id, open = dedup.len(), categories = categories.len(), "tenant context loaded");

        let params = SourceParams::new(now.date_naive(), tenant.thresholds.clone());

        for category in &categories {
            let slug = category.slug();
            let items = match sources::fetch_items(store, organization_id, slug, &params).await {
                Ok(items) => items,
                Err(e) => {
                    warn!(org = %organization_id, category = %slug, error = %e, "source failed");
                    #[cfg(feature = "prometheus")]
                    vigil_prometheus::record_source_failure(slug.as_ref());
                    tally.push_error(e.to_string());
                    continue;
                }
            };

            for item in items {
                self.process_candidate(&tenant, category, item, now, &mut dedup, tally)
                    .await;
            }
        }

        Ok(())
    }

    async fn process_candidate(
        &self,
        tenant: &TenantAlertConfig,
        category: &ResolvedCategory,
        item: AlertCandidateItem,
        now: DateTime<Utc>,
        dedup: &mut DedupSet,
        tally: &RunTally,
    ) {
        let slug = category.slug();

        if dedup.is_duplicate(&item, now) {
            debug!(category = %slug, subject = %item.subject.name(), "duplicate candidate skipped");
            tally.update(|r| r.skipped += 1);
            #[cfg(feature = "prometheus")]
            vigil_prometheus::record_skipped(slug.as_ref());
            return;
        }

        let created_at = format_timestamp(now);
        let alert = NewAlert {
            organization_id: tenant.organization_id.clone(),
            category_type: category.category_type(),
            title: item.title.clone(),
            description: item.description.clone(),
            expiry_date: item.expiry_date,
            subject: item.subject.clone(),
            created_at: created_at.clone(),
        };

        if let Err(e) = self.inner.store.insert_alert(&alert).await {
            warn!(category = %slug, subject = %item.subject.name(), error = %e, "alert insert failed");
            tally.push_error(format!("{slug}: insert alert for {} failed: {e}", item.subject.name()));
            return;
        }

        dedup.record(&item, now);
        tally.update(|r| r.generated += 1);
        #[cfg(feature = "prometheus")]
        vigil_prometheus::record_generated(slug.as_ref());
        debug!(category = %slug, title = %item.title, "alert generated");

        let Some((channel, recipient)) = delivery_target(tenant, category) else {
            debug!(category = %slug, "no permitted channel with a recipient, nothing enqueued");
            return;
        };

        let entry = NewAlertLog {
            organization_id: tenant.organization_id.clone(),
            category: slug,
            channel,
            recipient: recipient.to_string(),
            message_summary: item.title.clone(),
            related_entity_type: item.related_entity_type().to_string(),
            related_entity_id: item.source_id.clone(),
            expiry_date: item.expiry_date,
            days_remaining: item.days_remaining,
            created_at,
        };

        if let Err(e) = self.inner.store.insert_alert_log(&entry).await {
            warn!(category = %slug, %channel, error = %e, "delivery log insert failed");
            tally.push_error(format!(
                "{slug}: enqueue {channel} delivery for {} failed: {e}",
                item.subject.name()
            ));
        }
    }
}

/// First channel, in priority order, permitted by tenant and category that has a recipient.
pub fn delivery_target<'a>(
    tenant: &'a TenantAlertConfig,
    category: &ResolvedCategory,
) -> Option<(Channel, &'a str)> {
    Channel::PRIORITY.into_iter().find_map(|channel| {
        if tenant.channel_enabled(channel) && category.notifies(channel) {
            tenant.recipient(channel).map(|r| (channel, r))
        } else {
            None
        }
    })
}
