// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage lifecycle trait and the combined store bound used by the engine.

use async_trait::async_trait;

use crate::error::VigilError;
use crate::traits::adapter::PluginAdapter;
use crate::traits::alert::AlertStore;
use crate::traits::source::SourceStore;
use crate::traits::tenant::TenantStore;

/// Lifecycle of a persistence backend.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), VigilError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), VigilError>;
}

/// Everything the alert engine reads from and writes to.
pub trait ComplianceStore: TenantStore + AlertStore + SourceStore {}

impl<T> ComplianceStore for T where T: TenantStore + AlertStore + SourceStore {}
