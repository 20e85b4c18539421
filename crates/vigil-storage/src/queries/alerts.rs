// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alert rows and the delivery-log queue.
//!
//! The engine only ever inserts here. Status transitions belong to the
//! platform and the delivery worker.

use rusqlite::params;
use vigil_core::VigilError;
use vigil_core::types::{Alert, AlertLog, DeliveryStatus, NewAlert, NewAlertLog, OrganizationId};

use super::parse_text;
use crate::database::{Database, map_tr_err};

/// Alerts of the tenant still in `active` status, oldest first.
pub async fn open_alerts(
    db: &Database,
    organization_id: &OrganizationId,
) -> Result<Vec<Alert>, VigilError> {
    let org = organization_id.as_str().to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, organization_id, category_type, title, description, expiry_date,
                        subject_name, item_name, status, created_at
                 FROM alerts
                 WHERE organization_id = ?1 AND status = 'active'
                 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![org], |row| {
                Ok(Alert {
                    id: row.get(0)?,
                    organization_id: OrganizationId(row.get(1)?),
                    category_type: parse_text(2, row.get(2)?)?,
                    title: row.get(3)?,
                    description: row.get(4)?,
                    expiry_date: row.get(5)?,
                    subject_name: row.get(6)?,
                    item_name: row.get(7)?,
                    status: parse_text(8, row.get(8)?)?,
                    created_at: row.get(9)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert an `active` alert and return its row id.
pub async fn insert_alert(db: &Database, alert: &NewAlert) -> Result<i64, VigilError> {
    let alert = alert.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO alerts (organization_id, category_type, title, description,
                                     expiry_date, subject_name, item_name, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'active', ?8)",
                params![
                    alert.organization_id.as_str(),
                    alert.category_type.as_ref(),
                    alert.title,
                    alert.description,
                    alert.expiry_date,
                    alert.subject.subject_name(),
                    alert.subject.item_name(),
                    alert.created_at,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Enqueue a delivery-log row in `queued` status and return its row id.
pub async fn insert_alert_log(db: &Database, entry: &NewAlertLog) -> Result<i64, VigilError> {
    let entry = entry.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO alert_logs (organization_id, category, channel, recipient,
                                         message_summary, related_entity_type, related_entity_id,
                                         expiry_date, days_remaining, delivery_status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    entry.organization_id.as_str(),
                    entry.category.as_ref(),
                    entry.channel.as_ref(),
                    entry.recipient,
                    entry.message_summary,
                    entry.related_entity_type,
                    entry.related_entity_id,
                    entry.expiry_date,
                    entry.days_remaining,
                    DeliveryStatus::Queued.as_ref(),
                    entry.created_at,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Delivery-log rows of the tenant, oldest first.
pub async fn alert_logs(
    db: &Database,
    organization_id: &OrganizationId,
) -> Result<Vec<AlertLog>, VigilError> {
    let org = organization_id.as_str().to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, organization_id, category, channel, recipient, message_summary,
                        related_entity_type, related_entity_id, expiry_date, days_remaining,
                        delivery_status, created_at
                 FROM alert_logs
                 WHERE organization_id = ?1
                 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![org], |row| {
                Ok(AlertLog {
                    id: row.get(0)?,
                    organization_id: OrganizationId(row.get(1)?),
                    category: row.get(2)?,
                    channel: parse_text(3, row.get(3)?)?,
                    recipient: row.get(4)?,
                    message_summary: row.get(5)?,
                    related_entity_type: row.get(6)?,
                    related_entity_id: row.get(7)?,
                    expiry_date: row.get(8)?,
                    days_remaining: row.get(9)?,
                    delivery_status: parse_text(10, row.get(10)?)?,
                    created_at: row.get(11)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
