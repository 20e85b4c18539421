// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alert and delivery-log persistence. Insert-only from the engine's side.

use async_trait::async_trait;

use crate::error::VigilError;
use crate::types::{Alert, AlertLog, NewAlert, NewAlertLog, OrganizationId};

#[async_trait]
pub trait AlertStore: Send + Sync {
    /// All alerts of the tenant that are still in `active` status.
    async fn open_alerts(&self, organization_id: &OrganizationId) -> Result<Vec<Alert>, VigilError>;

    /// Insert a new `active` alert. Returns the new row id.
    async fn insert_alert(&self, alert: &NewAlert) -> Result<i64, VigilError>;

    /// Enqueue a delivery-log row in `queued` status. Returns the new row id.
    async fn insert_alert_log(&self, entry: &NewAlertLog) -> Result<i64, VigilError>;

    /// Delivery-log rows of the tenant, oldest first.
    async fn alert_logs(&self, organization_id: &OrganizationId)
    -> Result<Vec<AlertLog>, VigilError>;
}
