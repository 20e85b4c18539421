// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vigil run` command implementation.
//!
//! Runs one batch (or one tenant) against the configured database and prints
//! the digest. Per-tenant failures are part of the digest, not the exit code.

use std::fmt::Write as _;
use std::io::IsTerminal;

use colored::Colorize;
use tracing::info;
use vigil_alerts::{AlertEngine, BatchRunSummary, TenantRunResult};
use vigil_config::model::VigilConfig;
use vigil_core::types::OrganizationId;
use vigil_core::{StorageAdapter, VigilError};

/// Run the `vigil run` command.
pub async fn run_batch(
    config: &VigilConfig,
    org: Option<String>,
    json: bool,
) -> Result<(), VigilError> {
    let storage = crate::open_storage(config).await?;
    let engine = AlertEngine::new(storage.clone(), &config.engine);
    let use_color = std::io::stdout().is_terminal();

    let output = match org {
        Some(org) => {
            let result = engine
                .run_for_organization(&OrganizationId::from(org))
                .await;
            info!(
                organization = %result.organization_id,
                generated = result.generated,
                skipped = result.skipped,
                "single tenant run finished"
            );
            if json {
                to_json(&result)?
            } else {
                render_tenant(&result, use_color)
            }
        }
        None => {
            let summary = engine.run_for_all_organizations().await;
            if json {
                to_json(&summary)?
            } else {
                render_summary(&summary, use_color)
            }
        }
    };

    println!("{output}");
    storage.close().await
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, VigilError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| VigilError::Internal(format!("failed to serialize digest: {e}")))
}

/// Human-readable batch digest.
pub fn render_summary(summary: &BatchRunSummary, use_color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "  vigil run ({})", summary.started_at);
    let _ = writeln!(out, "  {}", "-".repeat(50));

    for result in &summary.results {
        out.push_str(&render_tenant(result, use_color));
        out.push('\n');
    }
    for error in &summary.errors {
        let line = if use_color {
            format!("    {} {}", "✗".red(), error.red())
        } else {
            format!("    [FAIL] {error}")
        };
        let _ = writeln!(out, "{line}");
    }

    let _ = writeln!(out);
    let _ = write!(
        out,
        "  {} tenant(s), {} generated, {} skipped, {} failed ({}ms)",
        summary.tenants,
        summary.generated,
        summary.skipped,
        summary.failed_tenants,
        summary.duration_ms
    );
    out
}

/// One line per tenant, followed by its errors.
pub fn render_tenant(result: &TenantRunResult, use_color: bool) -> String {
    let counts = format!(
        "generated {:>3}  skipped {:>3}",
        result.generated, result.skipped
    );
    let mut out = if result.is_ok() {
        if use_color {
            format!("    {} {:<24} {counts}", "✓".green(), result.organization_id)
        } else {
            format!("    [OK]   {:<24} {counts}", result.organization_id)
        }
    } else if use_color {
        format!("    {} {:<24} {counts}", "!".yellow(), result.organization_id)
    } else {
        format!("    [WARN] {:<24} {counts}", result.organization_id)
    };

    for error in &result.errors {
        let _ = write!(out, "\n           - {error}");
    }
    out
}
