// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus metrics adapter for the Vigil alert engine.
//!
//! Uses the metrics-rs facade with the Prometheus exporter. The engine
//! records through the helpers in [`recording`]; `vigil serve` installs the
//! recorder and, when configured, an HTTP listener serving `/metrics`.

pub mod recording;

use std::net::SocketAddr;

use async_trait::async_trait;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use vigil_core::{HealthStatus, PluginAdapter, VigilError};

pub use recording::{
    record_batch_duration, record_generated, record_skipped, record_source_failure,
    record_tenant_run, register_metrics,
};

/// Prometheus metrics adapter.
///
/// Installs the Prometheus recorder and exposes a handle for rendering
/// metrics in Prometheus text format.
pub struct PrometheusAdapter {
    handle: PrometheusHandle,
    listen_address: Option<SocketAddr>,
}

impl PrometheusAdapter {
    /// Install the recorder without an HTTP listener.
    ///
    /// Only one recorder can be installed per process. Returns an error if a
    /// recorder is already installed.
    pub fn new() -> Result<Self, VigilError> {
        let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
            VigilError::Internal(format!("failed to install Prometheus recorder: {e}"))
        })?;

        recording::register_metrics();
        tracing::info!("prometheus metrics recorder installed");

        Ok(Self {
            handle,
            listen_address: None,
        })
    }

    /// Install the recorder and serve `/metrics` on `addr`.
    ///
    /// Must be called from within a Tokio runtime; the listener runs as a
    /// spawned task for the rest of the process.
    pub fn with_http_listener(addr: SocketAddr) -> Result<Self, VigilError> {
        let (recorder, exporter) = PrometheusBuilder::new()
            .with_http_listener(addr)
            .build()
            .map_err(|e| VigilError::Internal(format!("failed to build Prometheus exporter: {e}")))?;
        let handle = recorder.handle();

        metrics::set_global_recorder(recorder).map_err(|e| {
            VigilError::Internal(format!("failed to install Prometheus recorder: {e}"))
        })?;

        tokio::spawn(async move {
            if let Err(e) = exporter.await {
                tracing::warn!(error = ?e, "prometheus exporter stopped");
            }
        });

        recording::register_metrics();
        tracing::info!(%addr, "prometheus exporter listening");

        Ok(Self {
            handle,
            listen_address: Some(addr),
        })
    }

    /// Get a reference to the Prometheus handle for rendering.
    pub fn handle(&self) -> &PrometheusHandle {
        &self.handle
    }

    /// Address of the HTTP listener, when one was started.
    pub fn listen_address(&self) -> Option<SocketAddr> {
        self.listen_address
    }

    /// Render all collected metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

#[async_trait]
impl PluginAdapter for PrometheusAdapter {
    fn name(&self) -> &str {
        "prometheus"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, VigilError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), VigilError> {
        Ok(())
    }
}
