// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as a parseable cron expression or a known category slug.

use std::str::FromStr;

use strum::IntoEnumIterator;
use vigil_core::CategorySlug;

use crate::diagnostic::{ConfigError, suggest_key};
use crate::model::VigilConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &VigilConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.engine.capability.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "engine.capability must not be empty".to_string(),
        });
    }

    if config.engine.default_thresholds.is_empty() {
        errors.push(ConfigError::Validation {
            message: "engine.default_thresholds must contain at least one day offset".to_string(),
        });
    }

    for days in config.engine.default_thresholds.iter().filter(|d| **d < 0) {
        errors.push(ConfigError::Validation {
            message: format!("engine.default_thresholds must be non-negative, got {days}"),
        });
    }

    if config.engine.missing_renotify_days < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "engine.missing_renotify_days must be at least 1, got {}",
                config.engine.missing_renotify_days
            ),
        });
    }

    if config.engine.max_concurrent_tenants == 0 {
        errors.push(ConfigError::Validation {
            message: "engine.max_concurrent_tenants must be at least 1".to_string(),
        });
    }

    if config.engine.tenant_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "engine.tenant_timeout_secs must be at least 1".to_string(),
        });
    }

    let known: Vec<String> = CategorySlug::iter().map(|s| s.to_string()).collect();
    let known_refs: Vec<&str> = known.iter().map(String::as_str).collect();
    for slug in &config.engine.disabled_categories {
        if CategorySlug::from_str(slug).is_err() {
            errors.push(ConfigError::UnknownCategory {
                slug: slug.clone(),
                suggestion: suggest_key(slug, &known_refs),
                valid_slugs: known_refs.join(", "),
            });
        }
    }

    if config.schedule.enabled {
        if let Err(e) = croner::Cron::from_str(&config.schedule.cron) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "schedule.cron `{}` is not a valid cron expression: {e}",
                    config.schedule.cron
                ),
            });
        }
    }

    if config.prometheus.enabled
        && config
            .prometheus
            .listen_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "prometheus.listen_address `{}` is not a valid socket address",
                config.prometheus.listen_address
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
