// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the store traits, the storage backend and the engine.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Identifier of a tenant (organization). All domain data is partitioned by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationId(pub String);

impl OrganizationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrganizationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for OrganizationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// A notification channel an alert can be delivered through.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Whatsapp,
    Sms,
}

impl Channel {
    /// Delivery preference order when more than one channel is permitted.
    pub const PRIORITY: [Channel; 3] = [Channel::Email, Channel::Whatsapp, Channel::Sms];
}

/// Lifecycle of a persisted alert. Only `Active` is ever written by the engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Active,
    Resolved,
    Dismissed,
}

/// Coarse storage bucket of an alert. Many category slugs collapse into one type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CategoryType {
    Medical,
    Training,
    Equipment,
    Other,
}

/// Fine-grained alert condition understood by this engine.
///
/// This enum is the allow-list: category rows whose slug does not parse into
/// one of these variants are never processed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CategorySlug {
    MedicalExpiry,
    MedicalMissing,
    TrainingExpiry,
    TrainingMissing,
    CertificationExpiry,
    CertificationMissing,
    EquipmentVerificationExpiry,
    EquipmentAuthorizationExpiry,
}

/// Capability flag gating whether a tenant is processed at all.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CapabilityStatus {
    Active,
    Trial,
    Inactive,
}

impl CapabilityStatus {
    /// Only active and trial tenants receive alerts.
    pub fn permits_processing(self) -> bool {
        matches!(self, CapabilityStatus::Active | CapabilityStatus::Trial)
    }
}

/// Status of a delivery-log row. The engine only writes `Queued`; the
/// external delivery worker moves rows on from there.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Queued,
    Sent,
    Failed,
}

/// The two training record families tracked per employee.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TrainingKind {
    Training,
    Certification,
}

/// Which equipment date an expiry source looks at.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EquipmentCheck {
    Verification,
    Authorization,
}

/// Who or what an alert is about. Employee conditions are subject-scoped,
/// equipment conditions item-scoped; never both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum AlertSubject {
    Employee(String),
    Equipment(String),
}

impl AlertSubject {
    pub fn subject_name(&self) -> Option<&str> {
        match self {
            AlertSubject::Employee(name) => Some(name),
            AlertSubject::Equipment(_) => None,
        }
    }

    pub fn item_name(&self) -> Option<&str> {
        match self {
            AlertSubject::Employee(_) => None,
            AlertSubject::Equipment(name) => Some(name),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            AlertSubject::Employee(name) | AlertSubject::Equipment(name) => name,
        }
    }
}

// --- Tenant reference data ---

/// An organization row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub country_code: String,
    pub email: Option<String>,
}

/// A tenant's explicit alerting policy row (`alert_settings`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertPolicy {
    pub organization_id: OrganizationId,
    /// Day offsets before expiry at which to alert, as stored.
    pub alert_days: Vec<i64>,
    pub email_enabled: bool,
    pub sms_enabled: bool,
    pub whatsapp_enabled: bool,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

/// An `alert_categories` reference row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertCategory {
    /// Raw slug as stored; may name a category this engine does not know.
    pub slug: String,
    pub country_code: String,
    pub notify_email: bool,
    pub notify_sms: bool,
    pub notify_whatsapp: bool,
    pub is_active: bool,
}

// --- Alerts ---

/// A persisted alert row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub organization_id: OrganizationId,
    pub category_type: CategoryType,
    pub title: String,
    pub description: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub subject_name: Option<String>,
    pub item_name: Option<String>,
    pub status: AlertStatus,
    /// ISO 8601 UTC timestamp, e.g. `2026-03-01T06:00:00.000Z`.
    pub created_at: String,
}

/// An alert about to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAlert {
    pub organization_id: OrganizationId,
    pub category_type: CategoryType,
    pub title: String,
    pub description: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub subject: AlertSubject,
    pub created_at: String,
}

/// A persisted delivery-log row (`alert_logs`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertLog {
    pub id: i64,
    pub organization_id: OrganizationId,
    pub category: String,
    pub channel: Channel,
    pub recipient: String,
    pub message_summary: String,
    pub related_entity_type: String,
    pub related_entity_id: String,
    pub expiry_date: Option<NaiveDate>,
    pub days_remaining: Option<i64>,
    pub delivery_status: DeliveryStatus,
    pub created_at: String,
}

/// A delivery-log row about to be enqueued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAlertLog {
    pub organization_id: OrganizationId,
    pub category: CategorySlug,
    pub channel: Channel,
    pub recipient: String,
    pub message_summary: String,
    pub related_entity_type: String,
    pub related_entity_id: String,
    pub expiry_date: Option<NaiveDate>,
    pub days_remaining: Option<i64>,
    pub created_at: String,
}

// --- Domain source records ---

/// An active employee of a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub full_name: String,
}

/// The latest medical exam of an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalExamRecord {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub exam_type: String,
    pub expiry_date: NaiveDate,
}

/// The latest training or certification record of an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub kind: TrainingKind,
    pub course_name: String,
    pub expiry_date: NaiveDate,
}

/// A piece of equipment with one of its due dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    pub id: String,
    pub name: String,
    pub serial_number: Option<String>,
    pub check: EquipmentCheck,
    pub due_date: NaiveDate,
}

/// Format a UTC timestamp the way every `created_at` column stores it.
pub fn format_timestamp(ts: chrono::DateTime<chrono::Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parse a stored `created_at` value back into a UTC timestamp.
pub fn parse_timestamp(value: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&chrono::Utc))
        .or_else(|| {
            // SQLite `datetime('now')` style: `2026-03-01 06:00:00`.
            chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}
