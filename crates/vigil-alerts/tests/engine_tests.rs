// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tenant pipeline tests against a real SQLite store.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use vigil_alerts::{AlertEngine, CAPABILITY_NOT_ACTIVE};
use vigil_core::types::{CategoryType, Channel, DeliveryStatus, OrganizationId, TrainingKind};
use vigil_core::{AlertStore, ComplianceStore};
use vigil_test_utils::{FaultyStore, TestHarness};

fn now() -> DateTime<Utc> {
    "2026-03-01T06:00:00Z".parse().unwrap()
}

fn day(offset: i64) -> NaiveDate {
    now().date_naive() + TimeDelta::days(offset)
}

fn org() -> OrganizationId {
    OrganizationId::from("org-a")
}

fn engine(harness: &TestHarness) -> AlertEngine {
    AlertEngine::new(harness.store(), &harness.config().engine)
}

fn engine_over(harness: &TestHarness, store: FaultyStore) -> AlertEngine {
    let store: Arc<dyn ComplianceStore> = Arc::new(store);
    AlertEngine::new(store, &harness.config().engine)
}

/// Tenant org-a (CL) with thresholds {30, 7, 0}, email only, and `categories` enabled.
async fn tenant(categories: &[&str]) -> TestHarness {
    let harness = TestHarness::new().await.unwrap();
    harness
        .add_tenant("org-a", "CL", Some("ops@acme.test"))
        .await
        .unwrap();
    harness
        .set_policy("org-a", &[30, 7, 0], true, false, false, None, None)
        .await
        .unwrap();
    for slug in categories {
        harness.add_category(slug, "CL", true, false, false).await.unwrap();
    }
    harness
}

#[tokio::test]
async fn medical_exam_expiring_at_threshold_generates_alert_and_log() {
    let harness = tenant(&["medical_expiry"]).await;
    harness.add_employee("org-a", "e1", "E").await.unwrap();
    harness
        .add_medical_exam("org-a", "m1", "e1", Some(day(7)))
        .await
        .unwrap();

    let result = engine(&harness).run_for_organization_at(&org(), now()).await;
    assert_eq!(result.generated, 1, "errors: {:?}", result.errors);
    assert_eq!(result.skipped, 0);
    assert!(result.errors.is_empty());

    let store = harness.store();
    let alerts = store.open_alerts(&org()).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].subject_name.as_deref(), Some("E"));
    assert_eq!(alerts[0].item_name, None);
    assert_eq!(alerts[0].expiry_date, Some(day(7)));
    assert_eq!(alerts[0].category_type, CategoryType::Medical);
    assert_eq!(alerts[0].title, "Medical exam expires in 7 days: E");

    let logs = store.alert_logs(&org()).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].channel, Channel::Email);
    assert_eq!(logs[0].delivery_status, DeliveryStatus::Queued);
    assert_eq!(logs[0].recipient, "ops@acme.test");
    assert_eq!(logs[0].category, "medical_expiry");
    assert_eq!(logs[0].related_entity_type, "medical_exam");
    assert_eq!(logs[0].related_entity_id, "m1");
    assert_eq!(logs[0].days_remaining, Some(7));
}

#[tokio::test]
async fn second_run_over_unchanged_data_is_a_no_op() {
    let harness = tenant(&["medical_expiry"]).await;
    harness.add_employee("org-a", "e1", "E").await.unwrap();
    harness
        .add_medical_exam("org-a", "m1", "e1", Some(day(7)))
        .await
        .unwrap();
    let engine = engine(&harness);

    let first = engine.run_for_organization_at(&org(), now()).await;
    assert_eq!(first.generated, 1);

    let second = engine.run_for_organization_at(&org(), now()).await;
    assert_eq!(second.generated, 0);
    assert_eq!(second.skipped, 1);
    assert!(second.errors.is_empty());

    assert_eq!(harness.count_rows("alerts", "org-a").await.unwrap(), 1);
    assert_eq!(harness.count_rows("alert_logs", "org-a").await.unwrap(), 1);
}

#[tokio::test]
async fn changed_expiry_date_raises_a_new_alert() {
    let harness = tenant(&["medical_expiry"]).await;
    harness.add_employee("org-a", "e1", "E").await.unwrap();
    harness
        .add_medical_exam("org-a", "m1", "e1", Some(day(7)))
        .await
        .unwrap();
    harness
        .add_open_alert("org-a", CategoryType::Medical, "E", Some(day(30)), now())
        .await
        .unwrap();

    let result = engine(&harness).run_for_organization_at(&org(), now()).await;
    assert_eq!(result.generated, 1);
    assert_eq!(result.skipped, 0);
    assert_eq!(harness.count_rows("alerts", "org-a").await.unwrap(), 2);
}

#[tokio::test]
async fn overdue_records_bypass_thresholds() {
    let harness = tenant(&["medical_expiry"]).await;
    harness.add_employee("org-a", "e1", "Ana Perez").await.unwrap();
    harness
        .add_medical_exam("org-a", "m1", "e1", Some(day(-5)))
        .await
        .unwrap();

    let result = engine(&harness).run_for_organization_at(&org(), now()).await;
    assert_eq!(result.generated, 1);

    let alerts = harness.store().open_alerts(&org()).await.unwrap();
    assert_eq!(alerts[0].title, "Medical exam expired 5 days ago: Ana Perez");
    let logs = harness.store().alert_logs(&org()).await.unwrap();
    assert_eq!(logs[0].days_remaining, Some(-5));
}

#[tokio::test]
async fn days_between_thresholds_or_beyond_the_horizon_are_ignored() {
    let harness = TestHarness::new().await.unwrap();
    harness.add_tenant("org-a", "CL", Some("ops@acme.test")).await.unwrap();
    harness
        .add_category("medical_expiry", "CL", true, false, false)
        .await
        .unwrap();
    harness.add_employee("org-a", "e1", "Ana").await.unwrap();
    harness.add_employee("org-a", "e2", "Bruno").await.unwrap();
    harness
        .add_medical_exam("org-a", "m1", "e1", Some(day(45)))
        .await
        .unwrap();
    harness
        .add_medical_exam("org-a", "m2", "e2", Some(day(6)))
        .await
        .unwrap();

    // No policy row: default thresholds {30, 14, 7, 3, 1, 0}.
    let result = engine(&harness).run_for_organization_at(&org(), now()).await;
    assert_eq!(result.generated, 0);
    assert_eq!(result.skipped, 0);
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn renewed_exam_silences_its_predecessor() {
    let harness = tenant(&["medical_expiry"]).await;
    harness.add_employee("org-a", "e1", "Ana").await.unwrap();
    harness
        .add_medical_exam("org-a", "m1", "e1", Some(day(7)))
        .await
        .unwrap();
    harness
        .add_medical_exam("org-a", "m2", "e1", Some(day(372)))
        .await
        .unwrap();

    let result = engine(&harness).run_for_organization_at(&org(), now()).await;
    assert_eq!(result.generated, 0);
}

#[tokio::test]
async fn inactive_employees_are_not_alerted() {
    let harness = tenant(&["medical_expiry", "medical_missing"]).await;
    harness.add_employee("org-a", "e1", "Ana").await.unwrap();
    harness
        .add_medical_exam("org-a", "m1", "e1", Some(day(7)))
        .await
        .unwrap();
    harness.deactivate_employee("e1").await.unwrap();

    let result = engine(&harness).run_for_organization_at(&org(), now()).await;
    assert_eq!(result.generated, 0);
}

#[tokio::test]
async fn missing_record_alert_renotifies_after_the_window() {
    let harness = tenant(&["medical_missing"]).await;
    harness.add_employee("org-a", "e1", "Ana").await.unwrap();
    harness
        .add_open_alert(
            "org-a",
            CategoryType::Medical,
            "Ana",
            None,
            now() - TimeDelta::days(10),
        )
        .await
        .unwrap();

    let result = engine(&harness).run_for_organization_at(&org(), now()).await;
    assert_eq!(result.generated, 1);
    assert_eq!(result.skipped, 0);

    let alerts = harness.store().open_alerts(&org()).await.unwrap();
    let latest = alerts.last().unwrap();
    assert_eq!(latest.title, "Missing medical exam: Ana");
    assert_eq!(latest.expiry_date, None);
}

#[tokio::test]
async fn recent_missing_record_alert_suppresses() {
    let harness = tenant(&["medical_missing"]).await;
    harness.add_employee("org-a", "e1", "Ana").await.unwrap();
    harness
        .add_open_alert(
            "org-a",
            CategoryType::Medical,
            "Ana",
            None,
            now() - TimeDelta::days(2),
        )
        .await
        .unwrap();

    let result = engine(&harness).run_for_organization_at(&org(), now()).await;
    assert_eq!(result.generated, 0);
    assert_eq!(result.skipped, 1);
}

#[tokio::test]
async fn valid_record_means_nothing_is_missing() {
    let harness = tenant(&["medical_missing", "training_missing", "certification_missing"]).await;
    harness.add_employee("org-a", "e1", "Ana").await.unwrap();
    harness
        .add_medical_exam("org-a", "m1", "e1", Some(day(100)))
        .await
        .unwrap();
    harness
        .add_training("org-a", "t1", "e1", TrainingKind::Training, "First aid", None)
        .await
        .unwrap();

    let result = engine(&harness).run_for_organization_at(&org(), now()).await;
    // Only the certification is missing.
    assert_eq!(result.generated, 1, "errors: {:?}", result.errors);
    let alerts = harness.store().open_alerts(&org()).await.unwrap();
    assert_eq!(alerts[0].title, "Missing certification: Ana");
    assert_eq!(alerts[0].category_type, CategoryType::Training);
}

#[tokio::test]
async fn failing_source_is_isolated_to_its_category() {
    let harness = tenant(&[
        "medical_expiry",
        "training_expiry",
        "equipment_verification_expiry",
    ])
    .await;
    harness.add_employee("org-a", "e1", "Ana").await.unwrap();
    harness
        .add_medical_exam("org-a", "m1", "e1", Some(day(7)))
        .await
        .unwrap();
    harness
        .add_training(
            "org-a",
            "t1",
            "e1",
            TrainingKind::Training,
            "Confined spaces",
            Some(day(30)),
        )
        .await
        .unwrap();
    harness
        .add_equipment("org-a", "q1", "Forklift 3", Some(day(0)), None)
        .await
        .unwrap();

    let store = FaultyStore::new(harness.store()).fail_operation("expiring_equipment");
    let result = engine_over(&harness, store)
        .run_for_organization_at(&org(), now())
        .await;

    assert_eq!(result.generated, 2);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("equipment_verification_expiry"));
    assert!(!result.errors[0].contains("medical"));
}

#[tokio::test]
async fn failed_insert_is_isolated_to_its_candidate() {
    let harness = tenant(&["medical_missing"]).await;
    harness.add_employee("org-a", "e1", "Ana").await.unwrap();
    harness.add_employee("org-a", "e2", "Bruno").await.unwrap();

    let store = FaultyStore::new(harness.store()).fail_insert_for("Ana");
    let result = engine_over(&harness, store)
        .run_for_organization_at(&org(), now())
        .await;

    assert_eq!(result.generated, 1);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("medical_missing:"));
    assert!(result.errors[0].contains("Ana"));
    assert_eq!(harness.count_rows("alerts", "org-a").await.unwrap(), 1);
}

#[tokio::test]
async fn failed_log_insert_keeps_the_alert() {
    let harness = tenant(&["medical_missing"]).await;
    harness.add_employee("org-a", "e1", "Ana").await.unwrap();

    let store = FaultyStore::new(harness.store()).fail_operation("insert_alert_log");
    let result = engine_over(&harness, store)
        .run_for_organization_at(&org(), now())
        .await;

    assert_eq!(result.generated, 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(harness.count_rows("alerts", "org-a").await.unwrap(), 1);
    assert_eq!(harness.count_rows("alert_logs", "org-a").await.unwrap(), 0);
}

#[tokio::test]
async fn tenant_level_failure_becomes_a_result_entry() {
    let harness = tenant(&["medical_missing"]).await;
    harness.add_employee("org-a", "e1", "Ana").await.unwrap();

    let store = FaultyStore::new(harness.store()).fail_operation("open_alerts");
    let result = engine_over(&harness, store)
        .run_for_organization_at(&org(), now())
        .await;

    assert_eq!(result.generated, 0);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("injected failure in open_alerts"));
}

#[tokio::test]
async fn inactive_capability_short_circuits() {
    let harness = tenant(&["medical_missing"]).await;
    harness.add_employee("org-a", "e1", "Ana").await.unwrap();
    harness.set_capability("org-a", "inactive").await.unwrap();

    let result = engine(&harness).run_for_organization_at(&org(), now()).await;
    assert_eq!(result.generated, 0);
    assert_eq!(result.skipped, 0);
    assert_eq!(result.errors, vec![CAPABILITY_NOT_ACTIVE.to_string()]);
    assert_eq!(harness.count_rows("alerts", "org-a").await.unwrap(), 0);
    assert_eq!(harness.count_rows("alert_logs", "org-a").await.unwrap(), 0);
}

#[tokio::test]
async fn absent_capability_flag_does_not_permit_processing() {
    let harness = TestHarness::new().await.unwrap();
    harness.add_organization("org-a", "CL", None).await.unwrap();

    let result = engine(&harness).run_for_organization_at(&org(), now()).await;
    assert_eq!(result.errors, vec![CAPABILITY_NOT_ACTIVE.to_string()]);
}

#[tokio::test]
async fn trial_tenants_are_processed() {
    let harness = tenant(&["medical_missing"]).await;
    harness.set_capability("org-a", "trial").await.unwrap();
    harness.add_employee("org-a", "e1", "Ana").await.unwrap();

    let result = engine(&harness).run_for_organization_at(&org(), now()).await;
    assert_eq!(result.generated, 1);
}

#[tokio::test]
async fn country_without_categories_is_missing_context() {
    let harness = TestHarness::new().await.unwrap();
    harness.add_tenant("org-a", "PE", None).await.unwrap();
    harness.add_all_categories("CL").await.unwrap();

    let result = engine(&harness).run_for_organization_at(&org(), now()).await;
    assert_eq!(result.generated, 0);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("no active alert categories"));
}

#[tokio::test]
async fn unknown_category_slugs_are_ignored() {
    let harness = tenant(&["fire_drill_expiry", "medical_missing"]).await;
    harness.add_employee("org-a", "e1", "Ana").await.unwrap();

    let result = engine(&harness).run_for_organization_at(&org(), now()).await;
    assert_eq!(result.generated, 1);
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn disabled_categories_are_not_processed() {
    let harness = tenant(&["medical_missing", "training_missing"]).await;
    harness.add_employee("org-a", "e1", "Ana").await.unwrap();

    let mut config = harness.config().engine.clone();
    config.disabled_categories = vec!["training_missing".to_string()];
    let engine = AlertEngine::new(harness.store(), &config);

    let result = engine.run_for_organization_at(&org(), now()).await;
    assert_eq!(result.generated, 1);
    let alerts = harness.store().open_alerts(&org()).await.unwrap();
    assert_eq!(alerts[0].category_type, CategoryType::Medical);
}

#[tokio::test]
async fn training_and_certification_collide_within_one_run() {
    let harness = tenant(&["training_expiry", "certification_expiry"]).await;
    harness.add_employee("org-a", "e1", "Ana").await.unwrap();
    harness
        .add_training("org-a", "t1", "e1", TrainingKind::Training, "Rigging", Some(day(7)))
        .await
        .unwrap();
    harness
        .add_training(
            "org-a",
            "t2",
            "e1",
            TrainingKind::Certification,
            "Crane operator",
            Some(day(7)),
        )
        .await
        .unwrap();

    let result = engine(&harness).run_for_organization_at(&org(), now()).await;
    assert_eq!(result.generated, 1);
    assert_eq!(result.skipped, 1);
}

#[tokio::test]
async fn expiring_training_does_not_hide_missing_certification() {
    let harness = tenant(&["training_expiry", "certification_missing"]).await;
    harness.add_employee("org-a", "e1", "Ana").await.unwrap();
    harness
        .add_training("org-a", "t1", "e1", TrainingKind::Training, "Rigging", Some(day(7)))
        .await
        .unwrap();

    let result = engine(&harness).run_for_organization_at(&org(), now()).await;
    assert_eq!(result.generated, 2, "errors: {:?}", result.errors);
    assert_eq!(result.skipped, 0);

    let alerts = harness.store().open_alerts(&org()).await.unwrap();
    let mut titles: Vec<_> = alerts.iter().map(|a| a.title.as_str()).collect();
    titles.sort();
    assert_eq!(
        titles,
        ["Missing certification: Ana", "Training expires in 7 days: Ana"]
    );

    let again = engine(&harness).run_for_organization_at(&org(), now()).await;
    assert_eq!(again.generated, 0);
    assert_eq!(again.skipped, 2);
}

#[tokio::test]
async fn equipment_alerts_are_item_scoped() {
    let harness = tenant(&[
        "equipment_verification_expiry",
        "equipment_authorization_expiry",
    ])
    .await;
    harness
        .add_equipment("org-a", "q1", "Crane 1", Some(day(30)), Some(day(-1)))
        .await
        .unwrap();

    let result = engine(&harness).run_for_organization_at(&org(), now()).await;
    assert_eq!(result.generated, 2, "errors: {:?}", result.errors);

    let alerts = harness.store().open_alerts(&org()).await.unwrap();
    for alert in &alerts {
        assert_eq!(alert.item_name.as_deref(), Some("Crane 1"));
        assert_eq!(alert.subject_name, None);
        assert_eq!(alert.category_type, CategoryType::Equipment);
    }
    let titles: Vec<_> = alerts.iter().map(|a| a.title.as_str()).collect();
    assert!(titles.contains(&"Equipment verification expires in 30 days: Crane 1"));
    assert!(titles.contains(&"Equipment authorization expired 1 day ago: Crane 1"));
}

#[tokio::test]
async fn delivery_falls_back_to_phone_channels_in_priority_order() {
    let harness = TestHarness::new().await.unwrap();
    harness.add_tenant("org-a", "CL", Some("ops@acme.test")).await.unwrap();
    harness
        .set_policy("org-a", &[7], false, true, true, None, Some("+56911111111"))
        .await
        .unwrap();
    harness
        .add_category("medical_missing", "CL", true, true, false)
        .await
        .unwrap();
    harness.add_employee("org-a", "e1", "Ana").await.unwrap();

    let result = engine(&harness).run_for_organization_at(&org(), now()).await;
    assert_eq!(result.generated, 1);

    let logs = harness.store().alert_logs(&org()).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].channel, Channel::Sms);
    assert_eq!(logs[0].recipient, "+56911111111");
    assert_eq!(logs[0].related_entity_type, "employee");
    assert_eq!(logs[0].related_entity_id, "e1");
    assert_eq!(logs[0].days_remaining, None);
}

#[tokio::test]
async fn alert_without_reachable_channel_has_no_log() {
    let harness = TestHarness::new().await.unwrap();
    harness.add_tenant("org-a", "CL", None).await.unwrap();
    harness
        .add_category("medical_missing", "CL", true, false, false)
        .await
        .unwrap();
    harness.add_employee("org-a", "e1", "Ana").await.unwrap();

    let result = engine(&harness).run_for_organization_at(&org(), now()).await;
    assert_eq!(result.generated, 1);
    assert!(result.errors.is_empty());
    assert_eq!(harness.count_rows("alert_logs", "org-a").await.unwrap(), 0);
}

#[tokio::test]
async fn resolved_alerts_do_not_suppress() {
    let harness = tenant(&["medical_expiry"]).await;
    harness.add_employee("org-a", "e1", "E").await.unwrap();
    harness
        .add_medical_exam("org-a", "m1", "e1", Some(day(7)))
        .await
        .unwrap();
    let engine = engine(&harness);

    assert_eq!(engine.run_for_organization_at(&org(), now()).await.generated, 1);
    harness
        .execute_sql("UPDATE alerts SET status = 'dismissed'")
        .await
        .unwrap();
    assert_eq!(engine.run_for_organization_at(&org(), now()).await.generated, 1);
}
