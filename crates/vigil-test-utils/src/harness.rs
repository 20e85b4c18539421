// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` opens a migrated SQLite database in a temp directory and
//! offers seeding helpers for every table the engine reads, plus raw
//! inspection of what it wrote.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Value;
use vigil_config::model::{StorageConfig, VigilConfig};
use vigil_core::types::{CategoryType, TrainingKind, format_timestamp};
use vigil_core::{ComplianceStore, StorageAdapter, VigilError};
use vigil_storage::SqliteStorage;

/// Every category slug known to the engine, as seeded by [`TestHarness::add_all_categories`].
pub const ALL_CATEGORIES: [&str; 8] = [
    "medical_expiry",
    "medical_missing",
    "training_expiry",
    "training_missing",
    "certification_expiry",
    "certification_missing",
    "equipment_verification_expiry",
    "equipment_authorization_expiry",
];

/// A temp database plus seeding helpers.
pub struct TestHarness {
    // Dropped last: removes the database file.
    _temp_dir: tempfile::TempDir,
    storage: Arc<SqliteStorage>,
    config: VigilConfig,
}

impl TestHarness {
    /// Create a harness with a fresh, migrated database.
    pub async fn new() -> Result<Self, VigilError> {
        let temp_dir = tempfile::TempDir::new().map_err(VigilError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = VigilConfig::default();
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };

        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;

        Ok(Self {
            _temp_dir: temp_dir,
            storage: Arc::new(storage),
            config,
        })
    }

    /// Configuration pointing at the harness database.
    pub fn config(&self) -> &VigilConfig {
        &self.config
    }

    pub fn storage(&self) -> Arc<SqliteStorage> {
        Arc::clone(&self.storage)
    }

    /// The storage as the engine sees it.
    pub fn store(&self) -> Arc<dyn ComplianceStore> {
        self.storage.clone()
    }

    async fn execute(&self, sql: &'static str, params: Vec<Value>) -> Result<(), VigilError> {
        self.storage
            .database()?
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(sql, rusqlite::params_from_iter(params))?;
                Ok(())
            })
            .await
            .map_err(VigilError::storage)
    }

    /// Run arbitrary SQL, e.g. to flip an alert's status.
    pub async fn execute_sql(&self, sql: &str) -> Result<(), VigilError> {
        let sql = sql.to_string();
        self.storage
            .database()?
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch(&sql)?;
                Ok(())
            })
            .await
            .map_err(VigilError::storage)
    }

    /// Number of rows in `table` for `organization_id`.
    pub async fn count_rows(&self, table: &str, organization_id: &str) -> Result<i64, VigilError> {
        let sql = format!("SELECT COUNT(*) FROM {table} WHERE organization_id = ?1");
        let org = organization_id.to_string();
        self.storage
            .database()?
            .connection()
            .call(move |conn| -> Result<i64, rusqlite::Error> {
                conn.query_row(&sql, [org], |row| row.get(0))
            })
            .await
            .map_err(VigilError::storage)
    }

    // --- Tenant reference data ---

    pub async fn add_organization(
        &self,
        id: &str,
        country_code: &str,
        email: Option<&str>,
    ) -> Result<(), VigilError> {
        self.execute(
            "INSERT INTO organizations (id, name, country_code, email) VALUES (?1, ?2, ?3, ?4)",
            vec![
                text(id),
                text(&format!("Organization {id}")),
                text(country_code),
                opt_text(email),
            ],
        )
        .await
    }

    /// Set the `alerts` capability flag (`active`, `trial` or `inactive`).
    pub async fn set_capability(&self, organization_id: &str, status: &str) -> Result<(), VigilError> {
        self.execute(
            "INSERT INTO tenant_capabilities (organization_id, capability, status)
             VALUES (?1, 'alerts', ?2)
             ON CONFLICT (organization_id, capability) DO UPDATE SET status = excluded.status",
            vec![text(organization_id), text(status)],
        )
        .await
    }

    /// Organization with the `alerts` capability active.
    pub async fn add_tenant(&self, id: &str, country_code: &str, email: Option<&str>) -> Result<(), VigilError> {
        self.add_organization(id, country_code, email).await?;
        self.set_capability(id, "active").await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn set_policy(
        &self,
        organization_id: &str,
        alert_days: &[i64],
        email_enabled: bool,
        sms_enabled: bool,
        whatsapp_enabled: bool,
        contact_email: Option<&str>,
        contact_phone: Option<&str>,
    ) -> Result<(), VigilError> {
        let days = format!(
            "[{}]",
            alert_days
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(",")
        );
        self.execute(
            "INSERT INTO alert_settings (organization_id, alert_days, email_enabled, sms_enabled,
                                         whatsapp_enabled, contact_email, contact_phone)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            vec![
                text(organization_id),
                Value::Text(days),
                flag(email_enabled),
                flag(sms_enabled),
                flag(whatsapp_enabled),
                opt_text(contact_email),
                opt_text(contact_phone),
            ],
        )
        .await
    }

    pub async fn add_category(
        &self,
        slug: &str,
        country_code: &str,
        notify_email: bool,
        notify_sms: bool,
        notify_whatsapp: bool,
    ) -> Result<(), VigilError> {
        self.execute(
            "INSERT INTO alert_categories (slug, country_code, notify_email, notify_sms,
                                           notify_whatsapp, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, 1)",
            vec![
                text(slug),
                text(country_code),
                flag(notify_email),
                flag(notify_sms),
                flag(notify_whatsapp),
            ],
        )
        .await
    }

    /// Every known category for `country_code`, email only.
    pub async fn add_all_categories(&self, country_code: &str) -> Result<(), VigilError> {
        for slug in ALL_CATEGORIES {
            self.add_category(slug, country_code, true, false, false).await?;
        }
        Ok(())
    }

    // --- Domain records ---

    pub async fn add_employee(&self, organization_id: &str, id: &str, full_name: &str) -> Result<(), VigilError> {
        self.execute(
            "INSERT INTO employees (id, organization_id, full_name, is_active) VALUES (?1, ?2, ?3, 1)",
            vec![text(id), text(organization_id), text(full_name)],
        )
        .await
    }

    pub async fn deactivate_employee(&self, id: &str) -> Result<(), VigilError> {
        self.execute(
            "UPDATE employees SET is_active = 0 WHERE id = ?1",
            vec![text(id)],
        )
        .await
    }

    pub async fn add_medical_exam(
        &self,
        organization_id: &str,
        id: &str,
        employee_id: &str,
        expiry_date: Option<NaiveDate>,
    ) -> Result<(), VigilError> {
        self.execute(
            "INSERT INTO medical_exams (id, organization_id, employee_id, exam_type, expiry_date)
             VALUES (?1, ?2, ?3, 'periodic', ?4)",
            vec![text(id), text(organization_id), text(employee_id), opt_date(expiry_date)],
        )
        .await
    }

    pub async fn add_training(
        &self,
        organization_id: &str,
        id: &str,
        employee_id: &str,
        kind: TrainingKind,
        course_name: &str,
        expiry_date: Option<NaiveDate>,
    ) -> Result<(), VigilError> {
        self.execute(
            "INSERT INTO trainings (id, organization_id, employee_id, kind, course_name, expiry_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            vec![
                text(id),
                text(organization_id),
                text(employee_id),
                text(kind.as_ref()),
                text(course_name),
                opt_date(expiry_date),
            ],
        )
        .await
    }

    pub async fn add_equipment(
        &self,
        organization_id: &str,
        id: &str,
        name: &str,
        next_verification_date: Option<NaiveDate>,
        authorization_expiry_date: Option<NaiveDate>,
    ) -> Result<(), VigilError> {
        self.execute(
            "INSERT INTO equipment (id, organization_id, name, next_verification_date,
                                    authorization_expiry_date, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, 1)",
            vec![
                text(id),
                text(organization_id),
                text(name),
                opt_date(next_verification_date),
                opt_date(authorization_expiry_date),
            ],
        )
        .await
    }

    // --- Existing alerts ---

    /// Insert an open alert with a controlled `created_at`.
    pub async fn add_open_alert(
        &self,
        organization_id: &str,
        category_type: CategoryType,
        subject_name: &str,
        expiry_date: Option<NaiveDate>,
        created_at: DateTime<Utc>,
    ) -> Result<(), VigilError> {
        self.execute(
            "INSERT INTO alerts (organization_id, category_type, title, expiry_date,
                                 subject_name, status, created_at)
             VALUES (?1, ?2, 'seeded alert', ?3, ?4, 'active', ?5)",
            vec![
                text(organization_id),
                text(category_type.as_ref()),
                opt_date(expiry_date),
                text(subject_name),
                Value::Text(format_timestamp(created_at)),
            ],
        )
        .await
    }
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn opt_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, text)
}

fn opt_date(value: Option<NaiveDate>) -> Value {
    value.map_or(Value::Null, |d| Value::Text(d.format("%F").to_string()))
}

fn flag(value: bool) -> Value {
    Value::Integer(i64::from(value))
}
