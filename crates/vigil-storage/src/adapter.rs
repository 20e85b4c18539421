// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of every store trait the engine depends on.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::OnceCell;
use tracing::debug;

use vigil_config::model::StorageConfig;
use vigil_core::types::{
    Alert, AlertCategory, AlertLog, AlertPolicy, CapabilityStatus, Employee, EquipmentCheck,
    EquipmentRecord, MedicalExamRecord, NewAlert, NewAlertLog, Organization, OrganizationId,
    TrainingKind, TrainingRecord,
};
use vigil_core::{
    AlertStore, HealthStatus, PluginAdapter, SourceStore, StorageAdapter, TenantStore, VigilError,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wrap an already opened database.
    pub fn from_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::new_with(Some(db)),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    pub fn database(&self) -> Result<&Database, VigilError> {
        self.db.get().ok_or_else(|| VigilError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    fn db(&self) -> Result<&Database, VigilError> {
        self.database()
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, VigilError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), VigilError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), VigilError> {
        let path = self.config.database_path.clone();
        let db = Database::open_with(&path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| VigilError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), VigilError> {
        self.db()?.checkpoint().await
    }
}

#[async_trait]
impl TenantStore for SqliteStorage {
    async fn capability_status(
        &self,
        organization_id: &OrganizationId,
        capability: &str,
    ) -> Result<Option<CapabilityStatus>, VigilError> {
        queries::tenants::capability_status(self.db()?, organization_id, capability).await
    }

    async fn organizations_with_capability(
        &self,
        capability: &str,
    ) -> Result<Vec<OrganizationId>, VigilError> {
        queries::tenants::organizations_with_capability(self.db()?, capability).await
    }

    async fn get_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Option<Organization>, VigilError> {
        queries::tenants::get_organization(self.db()?, organization_id).await
    }

    async fn get_alert_policy(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Option<AlertPolicy>, VigilError> {
        queries::tenants::get_alert_policy(self.db()?, organization_id).await
    }

    async fn active_alert_categories(
        &self,
        country_code: &str,
    ) -> Result<Vec<AlertCategory>, VigilError> {
        queries::tenants::active_alert_categories(self.db()?, country_code).await
    }
}

#[async_trait]
impl AlertStore for SqliteStorage {
    async fn open_alerts(&self, organization_id: &OrganizationId) -> Result<Vec<Alert>, VigilError> {
        queries::alerts::open_alerts(self.db()?, organization_id).await
    }

    async fn insert_alert(&self, alert: &NewAlert) -> Result<i64, VigilError> {
        queries::alerts::insert_alert(self.db()?, alert).await
    }

    async fn insert_alert_log(&self, entry: &NewAlertLog) -> Result<i64, VigilError> {
        queries::alerts::insert_alert_log(self.db()?, entry).await
    }

    async fn alert_logs(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<AlertLog>, VigilError> {
        queries::alerts::alert_logs(self.db()?, organization_id).await
    }
}

#[async_trait]
impl SourceStore for SqliteStorage {
    async fn active_employees(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<Employee>, VigilError> {
        queries::sources::active_employees(self.db()?, organization_id).await
    }

    async fn expiring_medical_exams(
        &self,
        organization_id: &OrganizationId,
        until: NaiveDate,
    ) -> Result<Vec<MedicalExamRecord>, VigilError> {
        queries::sources::expiring_medical_exams(self.db()?, organization_id, until).await
    }

    async fn employees_with_valid_medical_exam(
        &self,
        organization_id: &OrganizationId,
        today: NaiveDate,
    ) -> Result<HashSet<String>, VigilError> {
        queries::sources::employees_with_valid_medical_exam(self.db()?, organization_id, today)
            .await
    }

    async fn expiring_trainings(
        &self,
        organization_id: &OrganizationId,
        kind: TrainingKind,
        until: NaiveDate,
    ) -> Result<Vec<TrainingRecord>, VigilError> {
        queries::sources::expiring_trainings(self.db()?, organization_id, kind, until).await
    }

    async fn employees_with_valid_training(
        &self,
        organization_id: &OrganizationId,
        kind: TrainingKind,
        today: NaiveDate,
    ) -> Result<HashSet<String>, VigilError> {
        queries::sources::employees_with_valid_training(self.db()?, organization_id, kind, today)
            .await
    }

    async fn expiring_equipment(
        &self,
        organization_id: &OrganizationId,
        check: EquipmentCheck,
        until: NaiveDate,
    ) -> Result<Vec<EquipmentRecord>, VigilError> {
        queries::sources::expiring_equipment(self.db()?, organization_id, check, until).await
    }
}
