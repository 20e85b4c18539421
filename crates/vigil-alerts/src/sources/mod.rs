// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source adapters: one per category, each a pure read over the tenant's records.
//!
//! An empty result means nothing to alert on. A read failure is returned as
//! [`VigilError::Source`] naming the category.

pub mod expiry;
pub mod missing;

use vigil_core::types::{CategorySlug, OrganizationId};
use vigil_core::{SourceStore, VigilError};

use crate::candidate::{AlertCandidateItem, SourceParams};
use crate::registry::{self, SourceKind};

/// Run the source behind `category` for one tenant.
pub async fn fetch_items<S>(
    store: &S,
    organization_id: &OrganizationId,
    category: CategorySlug,
    params: &SourceParams,
) -> Result<Vec<AlertCandidateItem>, VigilError>
where
    S: SourceStore + ?Sized,
{
    let entry = registry::entry(category);
    let result = match entry.source {
        SourceKind::MedicalExpiry => expiry::medical(store, organization_id, params).await,
        SourceKind::MedicalMissing => missing::medical(store, organization_id, params).await,
        SourceKind::TrainingExpiry(kind) => {
            expiry::training(store, organization_id, kind, params).await
        }
        SourceKind::TrainingMissing(kind) => {
            missing::training(store, organization_id, kind, params).await
        }
        SourceKind::EquipmentExpiry(check) => {
            expiry::equipment(store, organization_id, check, params).await
        }
    };

    result.map_err(|e| VigilError::Source {
        category: category.to_string(),
        source: Box::new(e),
    })
}

/// "expires in 7 days", "expires today", "expired 5 days ago".
pub(crate) fn expiry_phrase(days_remaining: i64) -> String {
    match days_remaining {
        0 => "expires today".to_string(),
        1 => "expires in 1 day".to_string(),
        d if d > 1 => format!("expires in {d} days"),
        -1 => "expired 1 day ago".to_string(),
        d => format!("expired {} days ago", d.unsigned_abs()),
    }
}
