// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store trait definitions.
//!
//! Backends implement [`PluginAdapter`] plus the data traits and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod alert;
pub mod source;
pub mod storage;
pub mod tenant;

pub use adapter::PluginAdapter;
pub use alert::AlertStore;
pub use source::SourceStore;
pub use storage::{ComplianceStore, StorageAdapter};
pub use tenant::TenantStore;
