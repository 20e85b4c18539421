// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vigil serve` command implementation.
//!
//! Opens storage, optionally starts the Prometheus exporter, then runs the
//! alert batch on the configured cron schedule until SIGINT or SIGTERM.

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use vigil_alerts::{AlertEngine, BatchRunSummary};
use vigil_config::model::VigilConfig;
use vigil_core::{StorageAdapter, VigilError};
use vigil_cron::CronScheduler;

use crate::shutdown;

#[cfg(feature = "prometheus")]
use vigil_config::model::PrometheusConfig;
#[cfg(feature = "prometheus")]
use vigil_prometheus::PrometheusAdapter;

/// Runs the `vigil serve` command.
pub async fn run_serve(config: VigilConfig) -> Result<(), VigilError> {
    info!(service = %config.service.name, "starting vigil serve");

    #[cfg(feature = "prometheus")]
    let _metrics = start_metrics(&config.prometheus)?;

    let storage = crate::open_storage(&config).await?;
    let engine = AlertEngine::new(storage.clone(), &config.engine);
    let cancel = shutdown::install_signal_handler();

    if config.schedule.run_on_start {
        run_scheduled(&engine, Utc::now()).await;
    }

    if config.schedule.enabled {
        let scheduler = CronScheduler::new(&config.schedule.cron, cancel.clone())?;
        info!(
            schedule = scheduler.expression(),
            next = %scheduler.next_after(Utc::now())?,
            "alert schedule started"
        );
        scheduler
            .run(|at| {
                let engine = engine.clone();
                async move {
                    run_scheduled(&engine, at).await;
                }
            })
            .await?;
    } else {
        info!("schedule disabled, waiting for shutdown signal");
        cancel.cancelled().await;
    }

    storage.close().await?;
    info!("vigil serve shutdown complete");
    Ok(())
}

/// Run one batch and log its digest.
async fn run_scheduled(engine: &AlertEngine, scheduled_for: DateTime<Utc>) -> BatchRunSummary {
    let summary = engine.run_for_all_organizations().await;

    for error in &summary.errors {
        warn!(%scheduled_for, error = %error, "batch error");
    }
    info!(
        %scheduled_for,
        tenants = summary.tenants,
        generated = summary.generated,
        skipped = summary.skipped,
        failed_tenants = summary.failed_tenants,
        duration_ms = summary.duration_ms,
        "scheduled batch finished"
    );
    summary
}

#[cfg(feature = "prometheus")]
fn start_metrics(config: &PrometheusConfig) -> Result<Option<PrometheusAdapter>, VigilError> {
    if !config.enabled {
        return Ok(None);
    }
    let addr = config.listen_address.parse::<std::net::SocketAddr>().map_err(|e| {
        VigilError::Config(format!(
            "invalid prometheus.listen_address `{}`: {e}",
            config.listen_address
        ))
    })?;
    PrometheusAdapter::with_http_listener(addr).map(Some)
}
