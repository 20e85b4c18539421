// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Vigil alert engine.

use thiserror::Error;

/// The primary error type used across all Vigil store traits and engine operations.
#[derive(Debug, Error)]
pub enum VigilError {
    /// Configuration errors (invalid TOML, missing required fields, bad cron expression).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, row decoding).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A source adapter could not read its domain records.
    #[error("source {category} failed: {source}")]
    Source {
        category: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Tenant context required by the pipeline is absent (organization row, categories).
    #[error("{0}")]
    MissingContext(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VigilError {
    /// Wrap any error as a storage error.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        VigilError::Storage {
            source: Box::new(err),
        }
    }
}
