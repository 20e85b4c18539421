// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read access to tenant reference data: organizations, capability flags,
//! alerting policy and the alert category table.

use async_trait::async_trait;

use crate::error::VigilError;
use crate::types::{AlertCategory, AlertPolicy, CapabilityStatus, Organization, OrganizationId};

#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Status of `capability` for the tenant, or `None` when no flag row exists.
    async fn capability_status(
        &self,
        organization_id: &OrganizationId,
        capability: &str,
    ) -> Result<Option<CapabilityStatus>, VigilError>;

    /// Tenants whose `capability` is active or in trial, ordered by id.
    async fn organizations_with_capability(
        &self,
        capability: &str,
    ) -> Result<Vec<OrganizationId>, VigilError>;

    async fn get_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Option<Organization>, VigilError>;

    /// The explicit policy row, or `None` when the tenant never configured one.
    async fn get_alert_policy(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Option<AlertPolicy>, VigilError>;

    /// Active category rows for a country, whatever their slug.
    async fn active_alert_categories(
        &self,
        country_code: &str,
    ) -> Result<Vec<AlertCategory>, VigilError>;
}
