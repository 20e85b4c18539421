// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Presence sources: every active employee without a valid record is a candidate.

use vigil_core::types::{AlertSubject, CategorySlug, Employee, OrganizationId, TrainingKind};
use vigil_core::{SourceStore, VigilError};

use crate::candidate::{AlertCandidateItem, SourceParams};

pub async fn medical<S>(
    store: &S,
    organization_id: &OrganizationId,
    params: &SourceParams,
) -> Result<Vec<AlertCandidateItem>, VigilError>
where
    S: SourceStore + ?Sized,
{
    let employees = store.active_employees(organization_id).await?;
    let covered = store
        .employees_with_valid_medical_exam(organization_id, params.today)
        .await?;

    Ok(employees
        .into_iter()
        .filter(|e| !covered.contains(&e.id))
        .map(|e| candidate(CategorySlug::MedicalMissing, "medical exam", e))
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
    let (category, noun) = match kind {
        TrainingKind::Training => (CategorySlug::TrainingMissing, "training"),
        TrainingKind::Certification => (CategorySlug::CertificationMissing, "certification"),
    };
    let employees = store.active_employees(organization_id).await?;
    let covered = store
        .employees_with_valid_training(organization_id, kind, params.today)
        .await?;

    Ok(employees
        .into_iter()
        .filter(|e| !covered.contains(&e.id))
        .map(|e| candidate(category, noun, e))
        .collect())
}

fn candidate(category: CategorySlug, noun: &str, employee: Employee) -> AlertCandidateItem {
    AlertCandidateItem {
        source_id: employee.id,
        category,
        title: format!("Missing {noun}: {}", employee.full_name),
        description: Some(format!("No valid {noun} on record.")),
        expiry_date: None,
        subject: AlertSubject::Employee(employee.full_name),
        days_remaining: None,
    }
}
