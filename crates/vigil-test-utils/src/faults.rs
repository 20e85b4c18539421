// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fault-injecting store wrapper.
//!
//! `FaultyStore` delegates to an inner store and, per configuration, fails
//! named operations, fails alert inserts for one subject, delays or panics
//! for one tenant. Faults are fixed at construction.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use vigil_core::types::{
    Alert, AlertCategory, AlertLog, AlertPolicy, CapabilityStatus, Employee, EquipmentCheck,
    EquipmentRecord, MedicalExamRecord, NewAlert, NewAlertLog, Organization, OrganizationId,
    TrainingKind, TrainingRecord,
};
use vigil_core::{AlertStore, ComplianceStore, SourceStore, TenantStore, VigilError};

/// Store wrapper that injects failures.
pub struct FaultyStore {
    inner: Arc<dyn ComplianceStore>,
    failing_operations: HashSet<&'static str>,
    failing_subjects: HashSet<String>,
    panicking_tenants: HashSet<OrganizationId>,
    delayed_tenants: HashMap<OrganizationId, Duration>,
    delayed_operations: HashMap<&'static str, Duration>,
}

impl FaultyStore {
    pub fn new(inner: Arc<dyn ComplianceStore>) -> Self {
        Self {
            inner,
            failing_operations: HashSet::new(),
            failing_subjects: HashSet::new(),
            panicking_tenants: HashSet::new(),
            delayed_tenants: HashMap::new(),
            delayed_operations: HashMap::new(),
        }
    }

    /// Fail every call of the store method named `operation`, e.g. `"expiring_equipment"`.
    pub fn fail_operation(mut self, operation: &'static str) -> Self {
        self.failing_operations.insert(operation);
        self
    }

    /// Fail alert inserts whose subject or item name is `name`.
    pub fn fail_insert_for(mut self, name: &str) -> Self {
        self.failing_subjects.insert(name.to_string());
        self
    }

    /// Panic on the first store call made for `organization_id`.
    pub fn panic_for(mut self, organization_id: &str) -> Self {
        self.panicking_tenants.insert(organization_id.into());
        self
    }

    /// Sleep before every store call made for `organization_id`.
    pub fn delay_for(mut self, organization_id: &str, delay: Duration) -> Self {
        self.delayed_tenants.insert(organization_id.into(), delay);
        self
    }

    /// Sleep before every call of the store method named `operation`.
    pub fn delay_operation(mut self, operation: &'static str, delay: Duration) -> Self {
        self.delayed_operations.insert(operation, delay);
        self
    }

    async fn gate(
        &self,
        operation: &'static str,
        organization_id: Option<&OrganizationId>,
    ) -> Result<(), VigilError> {
        if let Some(org) = organization_id {
            if self.panicking_tenants.contains(org) {
                panic!("injected panic for {org}");
            }
            if let Some(delay) = self.delayed_tenants.get(org) {
                tokio::time::sleep(*delay).await;
            }
        }
        if let Some(delay) = self.delayed_operations.get(operation) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_operations.contains(operation) {
            return Err(injected(operation));
        }
        Ok(())
    }
}

fn injected(operation: &str) -> VigilError {
    VigilError::storage(std::io::Error::other(format!(
        "injected failure in {operation}"
    )))
}

#[async_trait]
impl TenantStore for FaultyStore {
    async fn capability_status(
        &self,
        organization_id: &OrganizationId,
        capability: &str,
    ) -> Result<Option<CapabilityStatus>, VigilError> {
        self.gate("capability_status", Some(organization_id)).await?;
        self.inner.capability_status(organization_id, capability).await
    }

    async fn organizations_with_capability(
        &self,
        capability: &str,
    ) -> Result<Vec<OrganizationId>, VigilError> {
        self.gate("organizations_with_capability", None).await?;
        self.inner.organizations_with_capability(capability).await
    }

    async fn get_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Option<Organization>, VigilError> {
        self.gate("get_organization", Some(organization_id)).await?;
        self.inner.get_organization(organization_id).await
    }

    async fn get_alert_policy(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Option<AlertPolicy>, VigilError> {
        self.gate("get_alert_policy", Some(organization_id)).await?;
        self.inner.get_alert_policy(organization_id).await
    }

    async fn active_alert_categories(
        &self,
        country_code: &str,
    ) -> Result<Vec<AlertCategory>, VigilError> {
        self.gate("active_alert_categories", None).await?;
        self.inner.active_alert_categories(country_code).await
    }
}

#[async_trait]
impl AlertStore for FaultyStore {
    async fn open_alerts(&self, organization_id: &OrganizationId) -> Result<Vec<Alert>, VigilError> {
        self.gate("open_alerts", Some(organization_id)).await?;
        self.inner.open_alerts(organization_id).await
    }

    async fn insert_alert(&self, alert: &NewAlert) -> Result<i64, VigilError> {
        self.gate("insert_alert", Some(&alert.organization_id)).await?;
        if self.failing_subjects.contains(alert.subject.name()) {
            return Err(injected("insert_alert"));
        }
        self.inner.insert_alert(alert).await
    }

    async fn insert_alert_log(&self, entry: &NewAlertLog) -> Result<i64, VigilError> {
        self.gate("insert_alert_log", Some(&entry.organization_id)).await?;
        self.inner.insert_alert_log(entry).await
    }

    async fn alert_logs(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<AlertLog>, VigilError> {
        self.gate("alert_logs", Some(organization_id)).await?;
        self.inner.alert_logs(organization_id).await
    }
}

#[async_trait]
impl SourceStore for FaultyStore {
    async fn active_employees(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<Employee>, VigilError> {
        self.gate("active_employees", Some(organization_id)).await?;
        self.inner.active_employees(organization_id).await
    }

    async fn expiring_medical_exams(
        &self,
        organization_id: &OrganizationId,
        until: NaiveDate,
    ) -> Result<Vec<MedicalExamRecord>, VigilError> {
        self.gate("expiring_medical_exams", Some(organization_id)).await?;
        self.inner.expiring_medical_exams(organization_id, until).await
    }

    async fn employees_with_valid_medical_exam(
        &self,
        organization_id: &OrganizationId,
        today: NaiveDate,
    ) -> Result<HashSet<String>, VigilError> {
        self.gate("employees_with_valid_medical_exam", Some(organization_id))
            .await?;
        self.inner
            .employees_with_valid_medical_exam(organization_id, today)
            .await
    }

    async fn expiring_trainings(
        &self,
        organization_id: &OrganizationId,
        kind: TrainingKind,
        until: NaiveDate,
    ) -> Result<Vec<TrainingRecord>, VigilError> {
        self.gate("expiring_trainings", Some(organization_id)).await?;
        self.inner.expiring_trainings(organization_id, kind, until).await
    }

    async fn employees_with_valid_training(
        &self,
        organization_id: &OrganizationId,
        kind: TrainingKind,
        today: NaiveDate,
    ) -> Result<HashSet<String>, VigilError> {
        self.gate("employees_with_valid_training", Some(organization_id))
            .await?;
        self.inner
            .employees_with_valid_training(organization_id, kind, today)
            .await
    }

    async fn expiring_equipment(
        &self,
        organization_id: &OrganizationId,
        check: EquipmentCheck,
        until: NaiveDate,
    ) -> Result<Vec<EquipmentRecord>, VigilError> {
        self.gate("expiring_equipment", Some(organization_id)).await?;
        self.inner.expiring_equipment(organization_id, check, until).await
    }
}
