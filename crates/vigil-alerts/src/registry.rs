// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Category catalog and per-country category resolution.
//!
//! The catalog maps every [`CategorySlug`] the engine understands to its
//! coarse [`CategoryType`], the source that produces its candidates and the
//! wording used in titles. Category rows whose slug is not in the catalog
//! are ignored.

use std::collections::HashSet;
use std::str::FromStr;

use strum::IntoEnumIterator;
use tracing::{debug, warn};
use vigil_core::types::{AlertCategory, CategorySlug, CategoryType, Channel, EquipmentCheck, TrainingKind};
use vigil_core::{TenantStore, VigilError};

/// Bumped whenever a slug is added to or removed from the catalog.
pub const CATALOG_VERSION: u32 = 1;

/// Which query family produces candidates for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    MedicalExpiry,
    MedicalMissing,
    TrainingExpiry(TrainingKind),
    TrainingMissing(TrainingKind),
    EquipmentExpiry(EquipmentCheck),
}

/// One catalog row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub slug: CategorySlug,
    pub category_type: CategoryType,
    pub source: SourceKind,
    /// Capitalized noun used in titles, e.g. "Medical exam".
    pub label: &'static str,
    /// Entity the delivery log points at.
    pub related_entity_type: &'static str,
}

/// Catalog row for `slug`.
pub const fn entry(slug: CategorySlug) -> CatalogEntry {
    use CategorySlug::*;

    let (category_type, source, label, related_entity_type) = match slug {
        MedicalExpiry => (
            CategoryType::Medical,
            SourceKind::MedicalExpiry,
            "Medical exam",
            "medical_exam",
        ),
        MedicalMissing => (
            CategoryType::Medical,
            SourceKind::MedicalMissing,
            "Medical exam",
            "employee",
        ),
        TrainingExpiry => (
            CategoryType::Training,
            SourceKind::TrainingExpiry(TrainingKind::Training),
            "Training",
            "training",
        ),
        TrainingMissing => (
            CategoryType::Training,
            SourceKind::TrainingMissing(TrainingKind::Training),
            "Training",
            "employee",
        ),
        CertificationExpiry => (
            CategoryType::Training,
            SourceKind::TrainingExpiry(TrainingKind::Certification),
            "Certification",
            "certification",
        ),
        CertificationMissing => (
            CategoryType::Training,
            SourceKind::TrainingMissing(TrainingKind::Certification),
            "Certification",
            "employee",
        ),
        EquipmentVerificationExpiry => (
            CategoryType::Equipment,
            SourceKind::EquipmentExpiry(EquipmentCheck::Verification),
            "Equipment verification",
            "equipment",
        ),
        EquipmentAuthorizationExpiry => (
            CategoryType::Equipment,
            SourceKind::EquipmentExpiry(EquipmentCheck::Authorization),
            "Equipment authorization",
            "equipment",
        ),
    };

    CatalogEntry {
        slug,
        category_type,
        source,
        label,
        related_entity_type,
    }
}

/// Every catalog row, in slug declaration order.
pub fn catalog() -> impl Iterator<Item = CatalogEntry> {
    CategorySlug::iter().map(entry)
}

/// An active category row the engine knows how to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCategory {
    pub entry: CatalogEntry,
    pub notify_email: bool,
    pub notify_sms: bool,
    pub notify_whatsapp: bool,
}

impl ResolvedCategory {
    pub fn slug(&self) -> CategorySlug {
        self.entry.slug
    }

    pub fn category_type(&self) -> CategoryType {
        self.entry.category_type
    }

    /// Whether this category allows delivery over `channel`.
    pub fn notifies(&self, channel: Channel) -> bool {
        match channel {
            Channel::Email => self.notify_email,
            Channel::Sms => self.notify_sms,
            Channel::Whatsapp => self.notify_whatsapp,
        }
    }
}

/// Resolves the categories processed for a tenant's country.
#[derive(Debug, Clone, Default)]
pub struct CategoryRegistry {
    disabled: HashSet<CategorySlug>,
}

impl CategoryRegistry {
    /// Build from the engine's `disabled_categories` list.
    pub fn new(disabled_categories: &[String]) -> Self {
        let disabled = disabled_categories
            .iter()
            .filter_map(|raw| match CategorySlug::from_str(raw) {
                Ok(slug) => Some(slug),
                Err(_) => {
                    warn!(slug = %raw, "ignoring unknown disabled category");
                    None
                }
            })
            .collect();
        Self { disabled }
    }

    pub fn is_disabled(&self, slug: CategorySlug) -> bool {
        self.disabled.contains(&slug)
    }

    /// Active categories for `country_code`, in catalog order.
    pub async fn active_categories<S>(
        &self,
        store: &S,
        country_code: &str,
    ) -> Result<Vec<ResolvedCategory>, VigilError>
    where
        S: TenantStore + ?Sized,
    {
        let rows = store.active_alert_categories(country_code).await?;
        Ok(self.resolve(rows))
    }

    /// Intersect category rows with the catalog, dropping disabled and inactive ones.
    pub fn resolve(&self, rows: Vec<AlertCategory>) -> Vec<ResolvedCategory> {
        let mut resolved: Vec<ResolvedCategory> = rows
            .into_iter()
            .filter(|row| row.is_active)
            .filter_map(|row| {
                let Ok(slug) = CategorySlug::from_str(&row.slug) else {
                    debug!(slug = %row.slug, country = %row.country_code, "skipping category outside catalog");
                    return None;
                };
                if self.is_disabled(slug) {
                    debug!(%slug, "skipping category disabled by configuration");
                    return None;
                }
                Some(ResolvedCategory {
                    entry: entry(slug),
                    notify_email: row.notify_email,
                    notify_sms: row.notify_sms,
                    notify_whatsapp: row.notify_whatsapp,
                })
            })
            .collect();

        resolved.sort_by_key(|c| c.slug());
        resolved.dedup_by_key(|c| c.slug());
        resolved
    }
}
