// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read access to the domain tables the source adapters scan.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::VigilError;
use crate::types::{
    Employee, EquipmentCheck, EquipmentRecord, MedicalExamRecord, OrganizationId, TrainingKind,
    TrainingRecord,
};

#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Active employees of the tenant.
    async fn active_employees(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<Employee>, VigilError>;

    /// Latest medical exam per active employee, when it expires on or before `until`.
    async fn expiring_medical_exams(
        &self,
        organization_id: &OrganizationId,
        until: NaiveDate,
    ) -> Result<Vec<MedicalExamRecord>, VigilError>;

    /// Ids of employees holding a medical exam still valid on `today`.
    async fn employees_with_valid_medical_exam(
        &self,
        organization_id: &OrganizationId,
        today: NaiveDate,
    ) -> Result<HashSet<String>, VigilError>;

    /// Latest record of `kind` per active employee, when it expires on or before `until`.
    async fn expiring_trainings(
        &self,
        organization_id: &OrganizationId,
        kind: TrainingKind,
        until: NaiveDate,
    ) -> Result<Vec<TrainingRecord>, VigilError>;

    /// Ids of employees holding a record of `kind` still valid on `today`.
    async fn employees_with_valid_training(
        &self,
        organization_id: &OrganizationId,
        kind: TrainingKind,
        today: NaiveDate,
    ) -> Result<HashSet<String>, VigilError>;

    /// Active equipment whose `check` date falls on or before `until`.
    async fn expiring_equipment(
        &self,
        organization_id: &OrganizationId,
        check: EquipmentCheck,
        until: NaiveDate,
    ) -> Result<Vec<EquipmentRecord>, VigilError>;
}
