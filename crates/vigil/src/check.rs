// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vigil check` command implementation.
//!
//! Verifies that the loaded configuration is usable: the database opens and
//! migrates, the storage health check passes, and the schedule parses.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use chrono::Utc;
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use vigil_alerts::CATALOG_VERSION;
use vigil_config::model::VigilConfig;
use vigil_core::types::HealthStatus;
use vigil_core::{PluginAdapter, StorageAdapter, TenantStore, VigilError};
use vigil_cron::CronScheduler;

/// Status of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `vigil check` command.
///
/// Returns an error when any check fails, so scripts can rely on the exit code.
pub async fn run_check(config: &VigilConfig, plain: bool) -> Result<(), VigilError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let results = collect_checks(config).await;

    println!();
    println!("  vigil check");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    for result in &results {
        if result.status == CheckStatus::Fail {
            fail_count += 1;
        }
        println!("{}", render_line(result, use_color));
    }
    println!();

    if fail_count > 0 {
        let word = if fail_count == 1 { "check" } else { "checks" };
        println!("  {fail_count} {word} failed.");
        println!();
        return Err(VigilError::Internal(format!("{fail_count} {word} failed")));
    }

    println!("  All checks passed.");
    println!();
    Ok(())
}

/// Run every check in order. The tenant check needs an open database and is
/// skipped when the database check fails.
pub async fn collect_checks(config: &VigilConfig) -> Vec<CheckResult> {
    let mut results = vec![check_configuration(config)];

    let start = Instant::now();
    match crate::open_storage(config).await {
        Ok(storage) => {
            results.push(match storage.health_check().await {
                Ok(HealthStatus::Healthy) => CheckResult::new(
                    "Database",
                    CheckStatus::Pass,
                    format!("migrated and healthy ({})", config.storage.database_path),
                    start,
                ),
                Ok(HealthStatus::Degraded(reason)) => {
                    CheckResult::new("Database", CheckStatus::Warn, reason, start)
                }
                Ok(HealthStatus::Unhealthy(reason)) => {
                    CheckResult::new("Database", CheckStatus::Fail, reason, start)
                }
                Err(e) => CheckResult::new("Database", CheckStatus::Fail, e.to_string(), start),
            });

            let start = Instant::now();
            results.push(
                match storage
                    .organizations_with_capability(&config.engine.capability)
                    .await
                {
                    Ok(orgs) if orgs.is_empty() => CheckResult::new(
                        "Tenants",
                        CheckStatus::Warn,
                        format!("no tenant has `{}` enabled", config.engine.capability),
                        start,
                    ),
                    Ok(orgs) => CheckResult::new(
                        "Tenants",
                        CheckStatus::Pass,
                        format!("{} with `{}` enabled", orgs.len(), config.engine.capability),
                        start,
                    ),
                    Err(e) => CheckResult::new("Tenants", CheckStatus::Fail, e.to_string(), start),
                },
            );

            if let Err(e) = storage.close().await {
                tracing::warn!(error = %e, "closing storage after check failed");
            }
        }
        Err(e) => results.push(CheckResult::new(
            "Database",
            CheckStatus::Fail,
            e.to_string(),
            start,
        )),
    }

    results.push(check_schedule(config));
    results
}

fn check_configuration(config: &VigilConfig) -> CheckResult {
    let start = Instant::now();
    CheckResult::new(
        "Configuration",
        CheckStatus::Pass,
        format!(
            "valid (catalog v{CATALOG_VERSION}, {} default thresholds, {} worker(s))",
            config.engine.default_thresholds.len(),
            config.engine.max_concurrent_tenants
        ),
        start,
    )
}

fn check_schedule(config: &VigilConfig) -> CheckResult {
    let start = Instant::now();
    if !config.schedule.enabled {
        return CheckResult::new("Schedule", CheckStatus::Warn, "disabled", start);
    }
    let next = CronScheduler::new(&config.schedule.cron, CancellationToken::new())
        .and_then(|scheduler| scheduler.next_after(Utc::now()));
    match next {
        Ok(next) => CheckResult::new(
            "Schedule",
            CheckStatus::Pass,
            format!("`{}`, next run {}", config.schedule.cron, next.format("%F %R UTC")),
            start,
        ),
        Err(e) => CheckResult::new("Schedule", CheckStatus::Fail, e.to_string(), start),
    }
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    match (&result.status, use_color) {
        (CheckStatus::Pass, true) => format!(
            "    {} {:<16} {} ({duration_ms}ms)",
            "✓".green(),
            result.name,
            result.message
        ),
        (CheckStatus::Warn, true) => format!(
            "    {} {:<16} {} ({duration_ms}ms)",
            "!".yellow(),
            result.name,
            result.message.yellow()
        ),
        (CheckStatus::Fail, true) => format!(
            "    {} {:<16} {} ({duration_ms}ms)",
            "✗".red(),
            result.name,
            result.message.red()
        ),
        (CheckStatus::Pass, false) => format!(
            "    [OK]   {:<16} {} ({duration_ms}ms)",
            result.name, result.message
        ),
        (CheckStatus::Warn, false) => format!(
            "    [WARN] {:<16} {} ({duration_ms}ms)",
            result.name, result.message
        ),
        (CheckStatus::Fail, false) => format!(
            "    [FAIL] {:<16} {} ({duration_ms}ms)",
            result.name, result.message
        ),
    }
}
