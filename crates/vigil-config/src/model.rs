// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Vigil alert engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Vigil configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VigilConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Alert engine policy defaults and batch limits.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Cron schedule for `vigil serve`.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Prometheus exporter settings.
    #[serde(default)]
    pub prometheus: PrometheusConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Name reported in logs.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "vigil".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("vigil").join("vigil.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("vigil.db"))
        .to_string_lossy()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Alert engine configuration.
///
/// `default_thresholds` applies to tenants without an explicit policy row.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Capability flag name that gates alert processing per tenant.
    #[serde(default = "default_capability")]
    pub capability: String,

    /// Day offsets before expiry at which date-based alerts fire.
    #[serde(default = "default_thresholds")]
    pub default_thresholds: Vec<i64>,

    /// Window in days during which an open missing-record alert suppresses a new one.
    #[serde(default = "default_missing_renotify_days")]
    pub missing_renotify_days: i64,

    /// Maximum number of tenants processed at the same time. 1 runs sequentially.
    #[serde(default = "default_max_concurrent_tenants")]
    pub max_concurrent_tenants: usize,

    /// Deadline for one tenant's pipeline, in seconds.
    #[serde(default = "default_tenant_timeout_secs")]
    pub tenant_timeout_secs: u64,

    /// Category slugs never processed, regardless of the category table.
    #[serde(default)]
    pub disabled_categories: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capability: default_capability(),
            default_thresholds: default_thresholds(),
            missing_renotify_days: default_missing_renotify_days(),
            max_concurrent_tenants: default_max_concurrent_tenants(),
            tenant_timeout_secs: default_tenant_timeout_secs(),
            disabled_categories: Vec::new(),
        }
    }
}

fn default_capability() -> String {
    "alerts".to_string()
}

fn default_thresholds() -> Vec<i64> {
    vec![30, 14, 7, 3, 1, 0]
}

fn default_missing_renotify_days() -> i64 {
    7
}

fn default_max_concurrent_tenants() -> usize {
    1
}

fn default_tenant_timeout_secs() -> u64 {
    300
}

/// Cron schedule configuration for the long-running service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Run the batch on a schedule when serving.
    #[serde(default = "default_schedule_enabled")]
    pub enabled: bool,

    /// Cron expression (five fields, UTC).
    #[serde(default = "default_cron")]
    pub cron: String,

    /// Run one batch immediately at startup, before the first scheduled tick.
    #[serde(default)]
    pub run_on_start: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: default_schedule_enabled(),
            cron: default_cron(),
            run_on_start: false,
        }
    }
}

fn default_schedule_enabled() -> bool {
    true
}

fn default_cron() -> String {
    "0 6 * * *".to_string()
}

/// Prometheus metrics exporter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PrometheusConfig {
    /// Expose a `/metrics` scrape endpoint while serving.
    #[serde(default)]
    pub enabled: bool,

    /// Socket address the exporter listens on.
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_address: default_listen_address(),
        }
    }
}

fn default_listen_address() -> String {
    "127.0.0.1:9464".to_string()
}
