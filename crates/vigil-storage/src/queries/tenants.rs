// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tenant reference data: capability flags, organizations, policies, categories.

use rusqlite::types::Type;
use rusqlite::{OptionalExtension, params};
use vigil_core::VigilError;
use vigil_core::types::{AlertCategory, AlertPolicy, CapabilityStatus, Organization, OrganizationId};

use super::parse_text;
use crate::database::{Database, map_tr_err};

/// Status of `capability` for one tenant.
pub async fn capability_status(
    db: &Database,
    organization_id: &OrganizationId,
    capability: &str,
) -> Result<Option<CapabilityStatus>, VigilError> {
    let org = organization_id.as_str().to_string();
    let capability = capability.to_string();
    db.connection()
        .call(move |conn| {
            let status: Option<String> = conn
                .query_row(
                    "SELECT status FROM tenant_capabilities
                     WHERE organization_id = ?1 AND capability = ?2",
                    params![org, capability],
                    |row| row.get(0),
                )
                .optional()?;
            status.map(|s| parse_text(0, s)).transpose()
        })
        .await
        .map_err(map_tr_err)
}

/// Ids of tenants whose `capability` is active or in trial.
pub async fn organizations_with_capability(
    db: &Database,
    capability: &str,
) -> Result<Vec<OrganizationId>, VigilError> {
    let capability = capability.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT o.id FROM organizations o
                 JOIN tenant_capabilities c ON c.organization_id = o.id
                 WHERE c.capability = ?1 AND c.status IN ('active', 'trial')
                 ORDER BY o.id",
            )?;
            let rows = stmt.query_map(params![capability], |row| {
                Ok(OrganizationId(row.get::<_, String>(0)?))
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_organization(
    db: &Database,
    organization_id: &OrganizationId,
) -> Result<Option<Organization>, VigilError> {
    let org = organization_id.as_str().to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, name, country_code, email FROM organizations WHERE id = ?1",
                params![org],
                |row| {
                    Ok(Organization {
                        id: OrganizationId(row.get(0)?),
                        name: row.get(1)?,
                        country_code: row.get(2)?,
                        email: row.get(3)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// The tenant's `alert_settings` row. `alert_days` is stored as a JSON array.
pub async fn get_alert_policy(
    db: &Database,
    organization_id: &OrganizationId,
) -> Result<Option<AlertPolicy>, VigilError> {
    let org = organization_id.as_str().to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT organization_id, alert_days, email_enabled, sms_enabled,
                        whatsapp_enabled, contact_email, contact_phone
                 FROM alert_settings WHERE organization_id = ?1",
                params![org],
                |row| {
                    let raw_days: String = row.get(1)?;
                    let alert_days: Vec<i64> = serde_json::from_str(&raw_days).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e))
                    })?;
                    Ok(AlertPolicy {
                        organization_id: OrganizationId(row.get(0)?),
                        alert_days,
                        email_enabled: row.get(2)?,
                        sms_enabled: row.get(3)?,
                        whatsapp_enabled: row.get(4)?,
                        contact_email: row.get(5)?,
                        contact_phone: row.get(6)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Active category rows for a country, ordered by slug.
pub async fn active_alert_categories(
    db: &Database,
    country_code: &str,
) -> Result<Vec<AlertCategory>, VigilError> {
    let country_code = country_code.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT slug, country_code, notify_email, notify_sms, notify_whatsapp, is_active
                 FROM alert_categories
                 WHERE country_code = ?1 AND is_active = 1
                 ORDER BY slug",
            )?;
            let rows = stmt.query_map(params![country_code], |row| {
                Ok(AlertCategory {
                    slug: row.get(0)?,
                    country_code: row.get(1)?,
                    notify_email: row.get(2)?,
                    notify_sms: row.get(3)?,
                    notify_whatsapp: row.get(4)?,
                    is_active: row.get(5)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn seeded_db(dir: &tempfile::TempDir) -> Database {
        let path = dir.path().join("tenants.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch(
                    "INSERT INTO organizations (id, name, country_code, email) VALUES
                        ('org-a', 'Acme', 'CL', 'ops@acme.test'),
                        ('org-b', 'Beta', 'CL', NULL),
                        ('org-c', 'Gamma', 'PE', NULL);
                     INSERT INTO tenant_capabilities (organization_id, capability, status) VALUES
                        ('org-a', 'alerts', 'active'),
                        ('org-b', 'alerts', 'inactive'),
                        ('org-c', 'alerts', 'trial'),
                        ('org-b', 'reports', 'active');
                     INSERT INTO alert_settings (organization_id, alert_days, sms_enabled, contact_phone)
                        VALUES ('org-a', '[30, 7, 0]', 1, '+56911111111');
                     INSERT INTO alert_categories (slug, country_code, notify_email, notify_sms, is_active) VALUES
                        ('medical_expiry', 'CL', 1, 1, 1),
                        ('training_missing', 'CL', 1, 0, 0),
                        ('fire_drill', 'CL', 1, 0, 1),
                        ('medical_expiry', 'PE', 1, 0, 1);",
                )?;
                Ok(())
            })
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn capability_status_reads_flag_rows() {
        let dir = tempdir().unwrap();
        let db = seeded_db(&dir).await;

        let a = capability_status(&db, &"org-a".into(), "alerts").await.unwrap();
        assert_eq!(a, Some(CapabilityStatus::Active));
        let b = capability_status(&db, &"org-b".into(), "alerts").await.unwrap();
        assert_eq!(b, Some(CapabilityStatus::Inactive));
        let none = capability_status(&db, &"org-c".into(), "reports").await.unwrap();
        assert_eq!(none, None);
    }

    #[tokio::test]
    async fn only_active_and_trial_tenants_are_listed() {
        let dir = tempdir().unwrap();
        let db = seeded_db(&dir).await;

        let orgs = organizations_with_capability(&db, "alerts").await.unwrap();
        assert_eq!(orgs, vec![OrganizationId::from("org-a"), OrganizationId::from("org-c")]);
    }

    #[tokio::test]
    async fn policy_row_decodes_alert_days() {
        let dir = tempdir().unwrap();
        let db = seeded_db(&dir).await;

        let policy = get_alert_policy(&db, &"org-a".into()).await.unwrap().unwrap();
        assert_eq!(policy.alert_days, vec![30, 7, 0]);
        assert!(policy.email_enabled);
        assert!(policy.sms_enabled);
        assert!(!policy.whatsapp_enabled);
        assert_eq!(policy.contact_phone.as_deref(), Some("+56911111111"));

        assert!(get_alert_policy(&db, &"org-b".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_alert_days_is_a_storage_error() {
        let dir = tempdir().unwrap();
        let db = seeded_db(&dir).await;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO alert_settings (organization_id, alert_days) VALUES ('org-b', 'thirty')",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let err = get_alert_policy(&db, &"org-b".into()).await.unwrap_err();
        assert!(matches!(err, VigilError::Storage { .. }));
    }

    #[tokio::test]
    async fn organization_lookup() {
        let dir = tempdir().unwrap();
        let db = seeded_db(&dir).await;

        let org = get_organization(&db, &"org-a".into()).await.unwrap().unwrap();
        assert_eq!(org.name, "Acme");
        assert_eq!(org.email.as_deref(), Some("ops@acme.test"));
        assert!(get_organization(&db, &"org-z".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn categories_are_filtered_by_country_and_active_flag() {
        let dir = tempdir().unwrap();
        let db = seeded_db(&dir).await;

        let cl = active_alert_categories(&db, "CL").await.unwrap();
        let slugs: Vec<_> = cl.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["fire_drill", "medical_expiry"]);
        assert!(cl[1].notify_sms);

        let pe = active_alert_categories(&db, "PE").await.unwrap();
        assert_eq!(pe.len(), 1);
        assert!(!pe[0].notify_sms);
    }
}
