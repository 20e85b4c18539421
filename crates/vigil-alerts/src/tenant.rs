// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-tenant alerting policy with defaults.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;
use vigil_core::types::{AlertPolicy, Channel, Organization, OrganizationId};
use vigil_core::{TenantStore, VigilError};

/// Read-only snapshot of a tenant's policy for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantAlertConfig {
    pub organization_id: OrganizationId,
    /// Selects which catalog categories apply to the tenant.
    pub country_code: String,
    /// Recipient for email delivery.
    pub contact_email: Option<String>,
    /// Recipient for SMS and WhatsApp delivery.
    pub contact_phone: Option<String>,
    /// Days-before-expiry at which dated items alert, deduplicated.
    pub thresholds: BTreeSet<i64>,
    /// Per-channel enablement from the tenant policy.
    pub channels: BTreeMap<Channel, bool>,
}

impl TenantAlertConfig {
    pub fn channel_enabled(&self, channel: Channel) -> bool {
        self.channels.get(&channel).copied().unwrap_or(false)
    }

    /// Recipient address for `channel`, if the tenant has one.
    pub fn recipient(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Email => self.contact_email.as_deref(),
            Channel::Sms | Channel::Whatsapp => self.contact_phone.as_deref(),
        }
    }
}

/// Loads tenant policy, falling back to engine defaults.
#[derive(Debug, Clone)]
pub struct TenantConfigResolver {
    capability: String,
    default_thresholds: BTreeSet<i64>,
}

impl TenantConfigResolver {
    pub fn new(capability: impl Into<String>, default_thresholds: &[i64]) -> Self {
        Self {
            capability: capability.into(),
            default_thresholds: normalize_thresholds(default_thresholds),
        }
    }

    pub fn capability(&self) -> &str {
        &self.capability
    }

    /// Whether the tenant's capability flag permits processing. A missing flag does not.
    pub async fn capability_enabled<S>(
        &self,
        store: &S,
        organization_id: &OrganizationId,
    ) -> Result<bool, VigilError>
    where
        S: TenantStore + ?Sized,
    {
        let status = store
            .capability_status(organization_id, &self.capability)
            .await?;
        Ok(status.is_some_and(|s| s.permits_processing()))
    }

    /// Load the organization and its policy.
    pub async fn resolve<S>(
        &self,
        store: &S,
        organization_id: &OrganizationId,
    ) -> Result<TenantAlertConfig, VigilError>
    where
        S: TenantStore + ?Sized,
    {
        let organization = store
            .get_organization(organization_id)
            .await?
            .ok_or_else(|| {
                VigilError::MissingContext(format!("organization {organization_id} not found"))
            })?;
        let policy = store.get_alert_policy(organization_id).await?;
        Ok(self.build(organization, policy))
    }

    /// Combine an organization row and an optional policy row.
    pub fn build(&self, organization: Organization, policy: Option<AlertPolicy>) -> TenantAlertConfig {
        let org_email = non_blank(organization.email);

        let Some(policy) = policy else {
            debug!(org = %organization.id, "no alert policy, using defaults");
            return TenantAlertConfig {
                organization_id: organization.id,
                country_code: organization.country_code,
                contact_email: org_email,
                contact_phone: None,
                thresholds: self.default_thresholds.clone(),
                channels: BTreeMap::from([
                    (Channel::Email, true),
                    (Channel::Sms, false),
                    (Channel::Whatsapp, false),
                ]),
            };
        };

        let mut thresholds = normalize_thresholds(&policy.alert_days);
        if thresholds.is_empty() {
            thresholds = self.default_thresholds.clone();
        }

        TenantAlertConfig {
            organization_id: organization.id,
            country_code: organization.country_code,
            contact_email: non_blank(policy.contact_email).or(org_email),
            contact_phone: non_blank(policy.contact_phone),
            thresholds,
            channels: BTreeMap::from([
                (Channel::Email, policy.email_enabled),
                (Channel::Sms, policy.sms_enabled),
                (Channel::Whatsapp, policy.whatsapp_enabled),
            ]),
        }
    }
}

/// Drop negatives and duplicates.
pub fn normalize_thresholds(days: &[i64]) -> BTreeSet<i64> {
    days.iter().copied().filter(|d| *d >= 0).collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(email: Option<&str>) -> Organization {
        Organization {
            id: "org-a".into(),
            name: "Acme".into(),
            country_code: "CL".into(),
            email: email.map(str::to_string),
        }
    }

    fn policy(days: Vec<i64>) -> AlertPolicy {
        AlertPolicy {
            organization_id: "org-a".into(),
            alert_days: days,
            email_enabled: true,
            sms_enabled: true,
            whatsapp_enabled: false,
            contact_email: None,
            contact_phone: Some("+56911111111".into()),
        }
    }

    fn resolver() -> TenantConfigResolver {
        TenantConfigResolver::new("alerts", &[30, 14, 7, 3, 1, 0])
    }

    #[test]
    fn defaults_apply_without_policy() {
        let config = resolver().build(org(Some("ops@acme.test")), None);
        assert_eq!(config.thresholds, BTreeSet::from([0, 1, 3, 7, 14, 30]));
        assert!(config.channel_enabled(Channel::Email));
        assert!(!config.channel_enabled(Channel::Sms));
        assert!(!config.channel_enabled(Channel::Whatsapp));
        assert_eq!(config.recipient(Channel::Email), Some("ops@acme.test"));
        assert_eq!(config.recipient(Channel::Sms), None);
    }

    #[test]
    fn policy_thresholds_are_normalized() {
        let config = resolver().build(org(None), Some(policy(vec![7, 30, 7, -2, 0])));
        assert_eq!(config.thresholds, BTreeSet::from([0, 7, 30]));
    }

    #[test]
    fn empty_policy_thresholds_fall_back_to_defaults() {
        let config = resolver().build(org(None), Some(policy(vec![-1])));
        assert_eq!(config.thresholds.len(), 6);
    }

    #[test]
    fn policy_contact_email_falls_back_to_organization() {
        let mut p = policy(vec![7]);
        p.contact_email = Some("   ".into());
        let config = resolver().build(org(Some("ops@acme.test")), Some(p));
        assert_eq!(config.recipient(Channel::Email), Some("ops@acme.test"));
        assert_eq!(config.recipient(Channel::Whatsapp), Some("+56911111111"));
        assert!(config.channel_enabled(Channel::Sms));
    }
}
