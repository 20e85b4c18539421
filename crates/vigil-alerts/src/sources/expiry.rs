// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Date-based sources: a record is a candidate when its days remaining hit a
//! threshold exactly, or when it is already overdue.

use vigil_core::types::{
    AlertSubject, CategorySlug, EquipmentCheck, OrganizationId, TrainingKind,
};
use vigil_core::{SourceStore, VigilError};

use super::expiry_phrase;
use crate::candidate::{AlertCandidateItem, SourceParams};
use crate::registry;

pub async fn medical<S>(
    store: &S,
    organization_id: &OrganizationId,
    params: &SourceParams,
) -> Result<Vec<AlertCandidateItem>, VigilError>
where
    S: SourceStore + ?Sized,
{
    let records = store
        .expiring_medical_exams(organization_id, params.horizon())
        .await?;

    Ok(records
        .into_iter()
        .filter_map(|exam| {
            let days = params.days_until(exam.expiry_date);
            params.qualifies(days).then(|| {
                candidate(
                    CategorySlug::MedicalExpiry,
                    exam.id,
                    AlertSubject::Employee(exam.employee_name),
                    format!("Exam type: {}. Expiry date: {}.", exam.exam_type, exam.expiry_date),
                    exam.expiry_date,
                    days,
                )
            })
        })
        .collect())
}

pub async fn training<S>(
    store: &S,
    organization_id: &OrganizationId,
    kind: TrainingKind,
    params: &SourceParams,
) -> Result<Vec<AlertCandidateItem>, VigilError>
where
    S: SourceStore + ?Sized,
{
    let category = match kind {
        TrainingKind::Training => CategorySlug::TrainingExpiry,
        TrainingKind::Certification => CategorySlug::CertificationExpiry,
    };
    let records = store
        .expiring_trainings(organization_id, kind, params.horizon())
        .await?;

    Ok(records
        .into_iter()
        .filter_map(|record| {
            let days = params.days_until(record.expiry_date);
            params.qualifies(days).then(|| {
                candidate(
                    category,
                    record.id,
                    AlertSubject::Employee(record.employee_name),
                    format!("Course: {}. Expiry date: {}.", record.course_name, record.expiry_date),
                    record.expiry_date,
                    days,
                )
            })
        })
        .collect())
}

pub async fn equipment<S>(
    store: &S,
    organization_id: &OrganizationId,
    check: EquipmentCheck,
    params: &SourceParams,
) -> Result<Vec<AlertCandidateItem>, VigilError>
where
    S: SourceStore + ?Sized,
{
    let category = match check {
        EquipmentCheck::Verification => CategorySlug::EquipmentVerificationExpiry,
        EquipmentCheck::Authorization => CategorySlug::EquipmentAuthorizationExpiry,
    };
    let records = store
        .expiring_equipment(organization_id, check, params.horizon())
        .await?;

    Ok(records
        .into_iter()
        .filter_map(|item| {
            let days = params.days_until(item.due_date);
            params.qualifies(days).then(|| {
                let description = match &item.serial_number {
                    Some(serial) => format!("Serial number: {serial}. Due date: {}.", item.due_date),
                    None => format!("Due date: {}.", item.due_date),
                };
                candidate(
                    category,
                    item.id,
                    AlertSubject::Equipment(item.name),
                    description,
                    item.due_date,
                    days,
                )
            })
        })
        .collect())
}

fn candidate(
    category: CategorySlug,
    source_id: String,
    subject: AlertSubject,
    description: String,
    expiry_date: chrono::NaiveDate,
    days_remaining: i64,
) -> AlertCandidateItem {
    let label = registry::entry(category).label;
    AlertCandidateItem {
        source_id,
        category,
        title: format!("{label} {}: {}", expiry_phrase(days_remaining), subject.name()),
        description: Some(description),
        expiry_date: Some(expiry_date),
        subject,
        days_remaining: Some(days_remaining),
    }
}
