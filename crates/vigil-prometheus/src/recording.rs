// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any recorder (Prometheus, statsd, etc.)
//! can collect these metrics. Without an installed recorder every call is a no-op.

use metrics::{describe_counter, describe_histogram};

/// Register all Vigil metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "vigil_alerts_generated_total",
        "Alerts inserted, by category slug"
    );
    describe_counter!(
        "vigil_alerts_skipped_total",
        "Candidates suppressed as duplicates, by category slug"
    );
    describe_counter!(
        "vigil_source_failures_total",
        "Source adapter failures, by category slug"
    );
    describe_counter!(
        "vigil_tenant_runs_total",
        "Per-tenant pipeline runs, by outcome"
    );
    describe_histogram!(
        "vigil_batch_duration_seconds",
        "Wall time of one batch over all tenants"
    );
}

/// Record a newly inserted alert.
pub fn record_generated(category: &str) {
    metrics::counter!("vigil_alerts_generated_total", "category" => category.to_string())
        .increment(1);
}

/// Record a candidate suppressed by deduplication.
pub fn record_skipped(category: &str) {
    metrics::counter!("vigil_alerts_skipped_total", "category" => category.to_string())
        .increment(1);
}

/// Record a failed source adapter call.
pub fn record_source_failure(category: &str) {
    metrics::counter!("vigil_source_failures_total", "category" => category.to_string())
        .increment(1);
}

/// Record one tenant run. `outcome` is `ok` or `error`.
pub fn record_tenant_run(outcome: &'static str) {
    metrics::counter!("vigil_tenant_runs_total", "outcome" => outcome).increment(1);
}

/// Record the duration of a whole batch.
pub fn record_batch_duration(seconds: f64) {
    metrics::histogram!("vigil_batch_duration_seconds").record(seconds);
}
