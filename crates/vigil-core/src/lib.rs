// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Vigil alert engine.
//!
//! This crate provides the store trait definitions, the error type and the
//! domain types shared by the storage backend, the engine and the binary.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::VigilError;
pub use types::{
    AlertStatus, CapabilityStatus, CategorySlug, CategoryType, Channel, HealthStatus,
    OrganizationId,
};

pub use traits::{
    AlertStore, ComplianceStore, PluginAdapter, SourceStore, StorageAdapter, TenantStore,
};

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;
    use crate::types::{AlertSubject, format_timestamp, parse_timestamp};

    #[test]
    fn vigil_error_displays_context() {
        let err = VigilError::Source {
            category: "equipment_verification_expiry".into(),
            source: Box::new(std::io::Error::other("disk gone")),
        };
        assert_eq!(
            err.to_string(),
            "source equipment_verification_expiry failed: disk gone"
        );

        let missing = VigilError::MissingContext("organization org-1 not found".into());
        assert_eq!(missing.to_string(), "organization org-1 not found");

        let timeout = VigilError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        assert!(timeout.to_string().contains("30s"));
    }

    #[test]
    fn category_slugs_parse_from_snake_case() {
        assert_eq!(
            CategorySlug::from_str("medical_expiry").unwrap(),
            CategorySlug::MedicalExpiry
        );
        assert_eq!(
            CategorySlug::from_str("equipment_authorization_expiry").unwrap(),
            CategorySlug::EquipmentAuthorizationExpiry
        );
        assert_eq!(CategorySlug::CertificationMissing.to_string(), "certification_missing");
    }

    #[test]
    fn unknown_category_slug_is_rejected() {
        assert!(CategorySlug::from_str("fire_extinguisher_expiry").is_err());
        assert!(CategorySlug::from_str("Medical_Expiry").is_err());
    }

    #[test]
    fn every_slug_round_trips_through_display() {
        for slug in CategorySlug::iter() {
            assert_eq!(CategorySlug::from_str(&slug.to_string()).unwrap(), slug);
        }
    }

    #[test]
    fn capability_gate() {
        assert!(CapabilityStatus::Active.permits_processing());
        assert!(CapabilityStatus::Trial.permits_processing());
        assert!(!CapabilityStatus::Inactive.permits_processing());
    }

    #[test]
    fn alert_subject_is_either_subject_or_item() {
        let employee = AlertSubject::Employee("Ana".into());
        assert_eq!(employee.subject_name(), Some("Ana"));
        assert_eq!(employee.item_name(), None);

        let item = AlertSubject::Equipment("Forklift 3".into());
        assert_eq!(item.subject_name(), None);
        assert_eq!(item.item_name(), Some("Forklift 3"));
        assert_eq!(item.name(), "Forklift 3");
    }

    #[test]
    fn channel_priority_starts_with_email() {
        assert_eq!(Channel::PRIORITY[0], Channel::Email);
        assert_eq!(Channel::from_str("whatsapp").unwrap(), Channel::Whatsapp);
    }

    #[test]
    fn parses_sqlite_default_timestamps() {
        let ts = parse_timestamp("2026-03-01 06:00:00").unwrap();
        assert_eq!(format_timestamp(ts), "2026-03-01T06:00:00.000Z");
        assert!(parse_timestamp("yesterday").is_none());
    }

    proptest::proptest! {
        #[test]
        fn stored_timestamps_parse_back(secs in 0i64..4_102_444_800i64) {
            let ts = chrono::DateTime::from_timestamp(secs, 0).unwrap();
            proptest::prop_assert_eq!(parse_timestamp(&format_timestamp(ts)), Some(ts));
        }
    }
}
