//! Tests for store queries that the engine relies on.

#[path = "../common/mod.rs"]
mod common;
use common::*;

use license_server::id::EntityType;

fn insert(conn: &rusqlite::Connection, id: &str, plan: Plan, created_at: i64) -> License {
    let license = License {
        id: id.to_string(),
        email: "a@x.com".to_string(),
        plan,
        status: LicenseStatus::Active,
        max_activations: plan.max_activations(),
        created_at,
        deactivated_at: None,
    };
    queries::insert_license(conn, &license).unwrap();
    license
}

#[test]
fn test_duplicate_key_is_unique_violation() {
    let conn = setup_test_db();
    let license = insert(&conn, "LIC-DUP", Plan::Free, 1);

    let err = queries::insert_license(&conn, &license).unwrap_err();
    assert!(queries::is_unique_violation(&err));
}

#[test]
fn test_duplicate_device_rejected_by_schema() {
    let conn = setup_test_db();
    insert(&conn, "LIC-A", Plan::ProAnnual, 1);

    queries::insert_activation(&conn, &queries::new_activation("LIC-A", "d1", None)).unwrap();
    let dup = queries::insert_activation(&conn, &queries::new_activation("LIC-A", "d1", None));
    assert!(dup.is_err(), "UNIQUE(license_id, device_id) must hold");
}

#[test]
fn test_activation_requires_existing_license() {
    let conn = setup_test_db();
    let orphan = queries::insert_activation(&conn, &queries::new_activation("LIC-GHOST", "d1", None));
    assert!(orphan.is_err(), "foreign key should reject activations for unknown licenses");
}

#[test]
fn test_verification_snapshot() {
    let conn = setup_test_db();
    insert(&conn, "LIC-A", Plan::ProAnnual, 1);

    assert_eq!(queries::get_verification_snapshot(&conn, "LIC-NONE", "d1").unwrap(), None);
    assert_eq!(
        queries::get_verification_snapshot(&conn, "LIC-A", "d1").unwrap(),
        Some((LicenseStatus::Active, false))
    );

    queries::insert_activation(&conn, &queries::new_activation("LIC-A", "d1", None)).unwrap();
    assert_eq!(
        queries::get_verification_snapshot(&conn, "LIC-A", "d1").unwrap(),
        Some((LicenseStatus::Active, true))
    );

    queries::delete_activations_for_license(&conn, "LIC-A").unwrap();
    queries::mark_license_deactivated(&conn, "LIC-A", 2).unwrap();
    assert_eq!(
        queries::get_verification_snapshot(&conn, "LIC-A", "d1").unwrap(),
        Some((LicenseStatus::Deactivated, false))
    );
}

#[test]
fn test_mark_license_deactivated_only_once() {
    let conn = setup_test_db();
    insert(&conn, "LIC-A", Plan::Free, 1);

    assert!(queries::mark_license_deactivated(&conn, "LIC-A", 10).unwrap());
    assert!(!queries::mark_license_deactivated(&conn, "LIC-A", 20).unwrap());

    let stored = queries::get_license(&conn, "LIC-A").unwrap().unwrap();
    assert_eq!(stored.deactivated_at, Some(10));
}

#[test]
fn test_list_licenses_newest_first() {
    let conn = setup_test_db();
    insert(&conn, "LIC-OLD", Plan::Free, 100);
    insert(&conn, "LIC-NEW", Plan::Free, 300);
    insert(&conn, "LIC-MID", Plan::Free, 200);

    let (items, total) = queries::list_licenses_paginated(&conn, 10, 0).unwrap();
    assert_eq!(total, 3);
    let ids: Vec<&str> = items.iter().map(|s| s.license.id.as_str()).collect();
    assert_eq!(ids, ["LIC-NEW", "LIC-MID", "LIC-OLD"]);
}

#[test]
fn test_corrupt_enum_column_is_an_error() {
    let conn = setup_test_db();
    conn.execute(
        "INSERT INTO licenses (id, email, plan, status, max_activations, created_at)
         VALUES ('LIC-BAD', 'a@x.com', 'platinum', 'active', 1, 0)",
        [],
    )
    .unwrap();

    assert!(queries::get_license(&conn, "LIC-BAD").is_err());
}

#[test]
fn test_verification_log_counts_and_purge() {
    let audit = setup_test_audit_db();
    let now = queries::now();

    queries::create_verification_log(&audit, "LIC-A", "d1", None, &VerificationResult::valid()).unwrap();
    let entry = queries::create_verification_log(
        &audit,
        "LIC-A",
        "d2",
        Some("10.0.0.1"),
        &VerificationResult::invalid(VerifyFailure::NotActivated),
    )
    .unwrap();
    assert!(entry.id.starts_with(EntityType::VerificationLog.prefix()));

    // Backdate one entry past the retention window
    audit
        .execute(
            "UPDATE verification_log SET timestamp = ?1 WHERE id = ?2",
            rusqlite::params![now - 100 * 86400, entry.id],
        )
        .unwrap();

    assert_eq!(queries::count_verifications_since(&audit, now - 7 * 86400).unwrap(), 1);
    assert_eq!(queries::purge_old_verification_logs(&audit, 90).unwrap(), 1);
    assert_eq!(queries::list_verification_logs_for_license(&audit, "LIC-A").unwrap().len(), 1);
}

#[test]
fn test_purge_with_huge_retention_keeps_everything() {
    let audit = setup_test_audit_db();
    queries::create_verification_log(&audit, "LIC-A", "d1", None, &VerificationResult::valid()).unwrap();

    // Window arithmetic saturates instead of overflowing
    assert_eq!(queries::purge_old_verification_logs(&audit, i64::MAX).unwrap(), 0);
    assert_eq!(queries::list_verification_logs_for_license(&audit, "LIC-A").unwrap().len(), 1);
}
