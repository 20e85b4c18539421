// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch driver tests: tenant enumeration, isolation, deadlines and digests.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use vigil_alerts::AlertEngine;
use vigil_core::ComplianceStore;
use vigil_core::types::OrganizationId;
use vigil_test_utils::{FaultyStore, TestHarness};

fn now() -> DateTime<Utc> {
    "2026-03-01T06:00:00Z".parse().unwrap()
}

/// Three enabled tenants with one employee each and no medical exams,
/// plus one tenant whose capability is off.
async fn three_tenants() -> TestHarness {
    let harness = TestHarness::new().await.unwrap();
    harness
        .add_category("medical_missing", "CL", true, false, false)
        .await
        .unwrap();
    for (org, employee) in [("org-a", "Ana"), ("org-b", "Bruno"), ("org-c", "Carla")] {
        harness
            .add_tenant(org, "CL", Some("ops@example.test"))
            .await
            .unwrap();
        harness
            .add_employee(org, &format!("{org}-e1"), employee)
            .await
            .unwrap();
    }
    harness.add_organization("org-x", "CL", None).await.unwrap();
    harness.set_capability("org-x", "inactive").await.unwrap();
    harness
        .add_employee("org-x", "org-x-e1", "Xavier")
        .await
        .unwrap();
    harness
}

fn faulty_engine(harness: &TestHarness, store: FaultyStore) -> AlertEngine {
    let store: Arc<dyn ComplianceStore> = Arc::new(store);
    AlertEngine::new(store, &harness.config().engine)
}

fn ids(engine_results: &[vigil_alerts::TenantRunResult]) -> Vec<&str> {
    engine_results
        .iter()
        .map(|r| r.organization_id.as_str())
        .collect()
}

#[tokio::test]
async fn batch_runs_every_enabled_tenant_in_order() {
    let harness = three_tenants().await;
    let engine = AlertEngine::new(harness.store(), &harness.config().engine);

    let summary = engine.run_for_all_organizations_at(now()).await;
    assert_eq!(ids(&summary.results), vec!["org-a", "org-b", "org-c"]);
    assert_eq!(summary.tenants, 3);
    assert_eq!(summary.generated, 3);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.failed_tenants, 0);
    assert!(summary.errors.is_empty());
    assert_eq!(harness.count_rows("alerts", "org-x").await.unwrap(), 0);
}

#[tokio::test]
async fn repeated_batches_are_idempotent() {
    let harness = three_tenants().await;
    let engine = AlertEngine::new(harness.store(), &harness.config().engine);

    engine.run_for_all_organizations_at(now()).await;
    let second = engine.run_for_all_organizations_at(now()).await;
    assert_eq!(second.generated, 0);
    assert_eq!(second.skipped, 3);
    for org in ["org-a", "org-b", "org-c"] {
        assert_eq!(harness.count_rows("alerts", org).await.unwrap(), 1);
        assert_eq!(harness.count_rows("alert_logs", org).await.unwrap(), 1);
    }
}

#[tokio::test]
async fn concurrent_batch_keeps_tenant_order() {
    let harness = three_tenants().await;
    let engine = AlertEngine::new(harness.store(), &harness.config().engine)
        .with_max_concurrent_tenants(3);

    let summary = engine.run_for_all_organizations_at(now()).await;
    assert_eq!(ids(&summary.results), vec!["org-a", "org-b", "org-c"]);
    assert_eq!(summary.generated, 3);
}

#[tokio::test]
async fn panicking_tenant_becomes_a_failed_entry() {
    let harness = three_tenants().await;
    let store = FaultyStore::new(harness.store()).panic_for("org-b");
    let engine = faulty_engine(&harness, store);

    let summary = engine.run_for_all_organizations_at(now()).await;
    assert_eq!(summary.tenants, 3);
    assert_eq!(summary.failed_tenants, 1);
    assert_eq!(summary.generated, 2);

    let b = &summary.results[1];
    assert_eq!(b.organization_id, OrganizationId::from("org-b"));
    assert_eq!(b.errors, vec!["tenant run panicked".to_string()]);
}

#[tokio::test]
async fn slow_tenant_hits_the_deadline() {
    let harness = three_tenants().await;
    let store = FaultyStore::new(harness.store()).delay_for("org-c", Duration::from_secs(5));
    let engine = faulty_engine(&harness, store).with_tenant_timeout(Duration::from_millis(100));

    let summary = engine.run_for_all_organizations_at(now()).await;
    assert_eq!(summary.failed_tenants, 1);
    let c = &summary.results[2];
    assert_eq!(c.generated, 0);
    assert!(c.errors[0].contains("timed out"), "got {:?}", c.errors);
    assert!(summary.results[0].is_ok());
}

#[tokio::test]
async fn timed_out_tenant_reports_alerts_already_written() {
    let harness = three_tenants().await;
    // Alerts commit, then the delivery row insert stalls past the deadline.
    let store = FaultyStore::new(harness.store())
        .delay_operation("insert_alert_log", Duration::from_secs(5));
    let engine = faulty_engine(&harness, store).with_tenant_timeout(Duration::from_millis(200));

    let summary = engine.run_for_all_organizations_at(now()).await;
    assert_eq!(summary.failed_tenants, 3);
    assert_eq!(summary.generated, 3);
    for result in &summary.results {
        assert_eq!(result.generated, 1, "{result:?}");
        assert!(result.errors[0].contains("timed out"), "got {:?}", result.errors);
        assert_eq!(
            harness
                .count_rows("alerts", result.organization_id.as_str())
                .await
                .unwrap(),
            1
        );
    }
}

#[tokio::test]
async fn listing_failure_yields_an_empty_digest() {
    let harness = three_tenants().await;
    let store = FaultyStore::new(harness.store()).fail_operation("organizations_with_capability");
    let engine = faulty_engine(&harness, store);

    let summary = engine.run_for_all_organizations_at(now()).await;
    assert!(summary.results.is_empty());
    assert_eq!(summary.tenants, 0);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].starts_with("listing tenants failed"));
}

#[tokio::test]
async fn summary_serializes_for_json_output() {
    let harness = three_tenants().await;
    let engine = AlertEngine::new(harness.store(), &harness.config().engine);

    let summary = engine.run_for_all_organizations_at(now()).await;
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["generated"], 3);
    assert_eq!(json["results"][0]["organization_id"], "org-a");
    assert_eq!(json["started_at"], "2026-03-01T06:00:00.000Z");
}
