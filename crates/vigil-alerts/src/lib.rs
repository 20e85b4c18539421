// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alert generation engine.
//!
//! Scans each tenant's compliance records, applies the tenant's notification
//! policy, suppresses conditions that already have an open alert and writes
//! new `alerts` rows plus one queued `alert_logs` delivery row per alert.
//! Repeated runs over unchanged data write nothing.
//!
//! Entry points are [`AlertEngine::run_for_organization`] and
//! [`AlertEngine::run_for_all_organizations`].

pub mod batch;
pub mod candidate;
pub mod dedup;
pub mod orchestrator;
pub mod registry;
pub mod sources;
pub mod tenant;

pub use batch::BatchRunSummary;
pub use candidate::{AlertCandidateItem, SourceParams};
pub use dedup::DedupSet;
pub use orchestrator::{AlertEngine, CAPABILITY_NOT_ACTIVE, TenantRunResult};
pub use registry::{CATALOG_VERSION, CategoryRegistry, ResolvedCategory, SourceKind};
pub use tenant::{TenantAlertConfig, TenantConfigResolver};
