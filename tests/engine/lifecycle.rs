//! Tests for create / activate / verify / release through the engine.

#[path = "../common/mod.rs"]
mod common;
use common::*;

#[test]
fn test_pro_lifetime_scenario() {
    let env = setup();

    let license = env.create_license("a@x.com", Plan::ProLifetime);
    assert_eq!(license.status, LicenseStatus::Active);
    assert_eq!(license.max_activations, 3);
    assert_eq!(license.email, "a@x.com");

    env.engine.activate(&license.id, "d1", None).unwrap();
    assert_eq!(env.activation_count(&license.id), 1);

    env.engine.activate(&license.id, "d1", None).unwrap();
    assert_eq!(env.activation_count(&license.id), 1, "re-activation must not consume a seat");

    env.engine.activate(&license.id, "d2", None).unwrap();
    env.engine.activate(&license.id, "d3", None).unwrap();
    assert_eq!(env.activation_count(&license.id), 3);

    let err = env.engine.activate(&license.id, "d4", None).unwrap_err();
    assert!(matches!(err, AppError::ActivationLimitExceeded { max: 3 }));
    assert_eq!(env.activation_count(&license.id), 3);

    let outcome = env.engine.deactivate(&license.id, &admin_proof()).unwrap();
    assert!(outcome.changed);
    assert_eq!(outcome.released, 3);
    assert_eq!(env.activation_count(&license.id), 0);

    let stored = queries::get_license(&env.conn(), &license.id).unwrap().unwrap();
    assert_eq!(stored.status, LicenseStatus::Deactivated);
    assert!(stored.deactivated_at.is_some());

    let result = env.engine.verify(&license.id, "d1", None).unwrap();
    assert!(!result.valid);
    assert_eq!(result.reason, Some(VerifyFailure::Deactivated));
}

#[test]
fn test_create_uses_plan_table() {
    let env = setup();
    for plan in [
        Plan::Free,
        Plan::Trial,
        Plan::ProMonthly,
        Plan::ProAnnual,
        Plan::ProLifetime,
        Plan::EnterpriseAnnual,
        Plan::EnterpriseLifetime,
    ] {
        let license = env.create_license("a@x.com", plan);
        assert_eq!(license.max_activations, plan.max_activations(), "{:?}", plan);
        assert!(env.engine.key_generator().looks_like_key(&license.id));
    }
    assert_eq!(env.license_count(), 7);
}

#[test]
fn test_create_with_max_activations_override() {
    let env = setup();
    let mut input = create_input("a@x.com", Plan::Free);
    input.max_activations = Some(25);

    let license = env.engine.create(&input, Some(ADMIN_SECRET)).unwrap();
    assert_eq!(license.max_activations, 25);

    for bad in [0, MAX_ACTIVATIONS_CEILING + 1] {
        input.max_activations = Some(bad);
        let err = env.engine.create(&input, Some(ADMIN_SECRET)).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)), "override {bad} should be rejected");
    }
    assert_eq!(env.license_count(), 1);
}

#[test]
fn test_create_without_admin_secret_changes_nothing() {
    let env = setup();
    env.create_license("first@x.com", Plan::Free);

    for credential in [None, Some(""), Some("wrong"), Some("test-admin-secret ")] {
        let err = env
            .engine
            .create(&create_input("a@x.com", Plan::ProAnnual), credential)
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized), "{:?}", credential);
    }
    assert_eq!(env.license_count(), 1);
}

#[test]
fn test_create_rejected_when_no_secret_configured() {
    let env = setup_with(None, |engine| engine);
    for credential in [None, Some(""), Some(ADMIN_SECRET)] {
        let err = env
            .engine
            .create(&create_input("a@x.com", Plan::Free), credential)
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }
    assert_eq!(env.license_count(), 0);
}

#[test]
fn test_create_validates_input() {
    let env = setup();

    let err = env
        .engine
        .create(&create_input("not-an-email", Plan::Free), Some(ADMIN_SECRET))
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let mut input = create_input("a@x.com", Plan::Free);
    input.plan = "platinum".into();
    let err = env.engine.create(&input, Some(ADMIN_SECRET)).unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(ref msg) if msg.contains("platinum")));

    assert_eq!(env.license_count(), 0);
}

#[test]
fn test_unauthorized_checked_before_validation() {
    let env = setup();
    let err = env
        .engine
        .create(&create_input("not-an-email", Plan::Free), Some("wrong"))
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));
}

#[test]
fn test_custom_key_prefix() {
    let env = setup_with(Some(ADMIN_SECRET), |engine| {
        engine.with_key_generator(license_server::keygen::KeyGenerator::new("ACME"))
    });
    let license = env.create_license("a@x.com", Plan::Trial);
    assert!(license.id.starts_with("ACME-"));
}

#[test]
fn test_activate_unknown_license() {
    let env = setup();
    let err = env.engine.activate("LIC-NOPE", "d1", None).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn test_activate_rejects_blank_fields() {
    let env = setup();
    let license = env.create_license("a@x.com", Plan::ProAnnual);

    assert!(matches!(
        env.engine.activate("  ", "d1", None).unwrap_err(),
        AppError::InvalidInput(_)
    ));
    assert!(matches!(
        env.engine.activate(&license.id, "", None).unwrap_err(),
        AppError::InvalidInput(_)
    ));
    assert!(matches!(
        env.engine.activate(&license.id, &"d".repeat(257), None).unwrap_err(),
        AppError::InvalidInput(_)
    ));
    assert_eq!(env.activation_count(&license.id), 0);
}

#[test]
fn test_activate_accepts_lowercase_key() {
    let env = setup();
    let license = env.create_license("a@x.com", Plan::ProAnnual);

    let activation = env
        .engine
        .activate(&format!("  {}  ", license.id.to_lowercase()), "d1", Some("198.51.100.4"))
        .unwrap();
    assert_eq!(activation.license_id, license.id);
    assert_eq!(activation.ip_address.as_deref(), Some("198.51.100.4"));
    assert!(activation.id.starts_with("act_"));
}

#[test]
fn test_reactivation_returns_original_activation() {
    let env = setup();
    let license = env.create_license("a@x.com", Plan::Free);

    let first = env.engine.activate(&license.id, "d1", Some("10.0.0.1")).unwrap();
    let again = env.engine.activate(&license.id, "d1", Some("10.0.0.2")).unwrap();
    assert_eq!(first, again);

    // Free has one seat; the same device can keep re-activating at the limit
    for _ in 0..5 {
        env.engine.activate(&license.id, "d1", None).unwrap();
    }
    assert_eq!(env.activation_count(&license.id), 1);
}

#[test]
fn test_activate_deactivated_license() {
    let env = setup();
    let license = env.create_license("a@x.com", Plan::ProAnnual);
    env.engine.deactivate(&license.id, &admin_proof()).unwrap();

    let err = env.engine.activate(&license.id, "d1", None).unwrap_err();
    assert!(matches!(err, AppError::LicenseDeactivated));
    assert_eq!(env.activation_count(&license.id), 0);
}

#[test]
fn test_verify_reasons() {
    let env = setup();
    let license = env.create_license("a@x.com", Plan::ProAnnual);

    let unknown = env.engine.verify("LIC-NOPE", "d1", None).unwrap();
    assert_eq!(unknown, VerificationResult::invalid(VerifyFailure::NotFound));

    let not_activated = env.engine.verify(&license.id, "d1", None).unwrap();
    assert_eq!(not_activated, VerificationResult::invalid(VerifyFailure::NotActivated));

    env.engine.activate(&license.id, "d1", None).unwrap();
    assert_eq!(env.engine.verify(&license.id, "d1", None).unwrap(), VerificationResult::valid());
    assert_eq!(
        env.engine.verify(&license.id, "d2", None).unwrap(),
        VerificationResult::invalid(VerifyFailure::NotActivated),
        "another device on the same license is not covered"
    );
}

#[test]
fn test_verify_treats_overlong_ids_as_unknown() {
    let env = setup();
    let license = env.create_license("a@x.com", Plan::ProAnnual);
    env.engine.activate(&license.id, "d1", None).unwrap();

    assert_eq!(
        env.engine.verify(&"X".repeat(129), "d1", None).unwrap(),
        VerificationResult::invalid(VerifyFailure::NotFound)
    );
    assert_eq!(
        env.engine.verify(&license.id, &"d".repeat(257), None).unwrap(),
        VerificationResult::invalid(VerifyFailure::NotActivated)
    );

    // Blank fields are still malformed requests
    assert!(matches!(
        env.engine.verify("  ", "d1", None).unwrap_err(),
        AppError::InvalidInput(_)
    ));
    assert!(matches!(
        env.engine.verify(&license.id, "", None).unwrap_err(),
        AppError::InvalidInput(_)
    ));

    // Activation keeps its length caps
    assert!(matches!(
        env.engine.activate(&"X".repeat(129), "d1", None).unwrap_err(),
        AppError::InvalidInput(_)
    ));
}

#[test]
fn test_verify_does_not_mutate() {
    let env = setup();
    let license = env.create_license("a@x.com", Plan::ProAnnual);

    for _ in 0..3 {
        env.engine.verify(&license.id, "d1", None).unwrap();
    }
    assert_eq!(env.activation_count(&license.id), 0);

    let stored = queries::get_license(&env.conn(), &license.id).unwrap().unwrap();
    assert_eq!(stored, license);
}

#[test]
fn test_verify_writes_log_when_enabled() {
    let env = setup();
    let license = env.create_license("a@x.com", Plan::ProAnnual);
    env.engine.activate(&license.id, "d1", None).unwrap();

    env.engine.verify(&license.id, "d1", Some("203.0.113.9")).unwrap();
    env.engine.verify(&license.id, "d2", None).unwrap();

    let audit = env.audit.get().unwrap();
    let logs = queries::list_verification_logs_for_license(&audit, &license.id).unwrap();
    assert_eq!(logs.len(), 2);

    let valid = logs.iter().find(|l| l.device_id == "d1").unwrap();
    assert!(valid.valid);
    assert_eq!(valid.reason, None);
    assert_eq!(valid.ip_address.as_deref(), Some("203.0.113.9"));

    let invalid = logs.iter().find(|l| l.device_id == "d2").unwrap();
    assert!(!invalid.valid);
    assert_eq!(invalid.reason.as_deref(), Some("not_activated"));
}

#[test]
fn test_verify_skips_log_when_disabled() {
    let env = setup_with(Some(ADMIN_SECRET), |engine| engine.with_verification_log(false));
    let license = env.create_license("a@x.com", Plan::ProAnnual);

    env.engine.verify(&license.id, "d1", None).unwrap();

    let audit = env.audit.get().unwrap();
    assert!(queries::list_verification_logs_for_license(&audit, &license.id).unwrap().is_empty());
}

#[test]
fn test_release_frees_seat_for_new_device() {
    let env = setup();
    let license = env.create_license("a@x.com", Plan::ProMonthly);
    env.engine.activate(&license.id, "d1", None).unwrap();
    env.engine.activate(&license.id, "d2", None).unwrap();
    assert!(env.engine.activate(&license.id, "d3", None).is_err());

    let remaining = env.engine.release(&license.id, "d1").unwrap();
    assert_eq!(remaining, 1);

    env.engine.activate(&license.id, "d3", None).unwrap();
    assert_eq!(env.activation_count(&license.id), 2);

    let result = env.engine.verify(&license.id, "d1", None).unwrap();
    assert_eq!(result.reason, Some(VerifyFailure::NotActivated));

    let stored = queries::get_license(&env.conn(), &license.id).unwrap().unwrap();
    assert!(stored.is_active(), "release never changes license status");
}

#[test]
fn test_release_unknown_pairs() {
    let env = setup();
    let license = env.create_license("a@x.com", Plan::ProMonthly);

    assert!(matches!(
        env.engine.release("LIC-NOPE", "d1").unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        env.engine.release(&license.id, "d1").unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[test]
fn test_get_license_details() {
    let env = setup();
    let license = env.create_license("a@x.com", Plan::ProLifetime);
    env.engine.activate(&license.id, "d1", None).unwrap();
    env.engine.activate(&license.id, "d2", None).unwrap();

    let details = env.engine.get_license(&license.id, Some(ADMIN_SECRET)).unwrap();
    assert_eq!(details.license, license);
    let devices: Vec<&str> = details.activations.iter().map(|a| a.device_id.as_str()).collect();
    assert_eq!(devices.len(), 2);
    assert!(devices.contains(&"d1") && devices.contains(&"d2"));

    assert!(matches!(
        env.engine.get_license(&license.id, None).unwrap_err(),
        AppError::Unauthorized
    ));
    assert!(matches!(
        env.engine.get_license("LIC-NOPE", Some(ADMIN_SECRET)).unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[test]
fn test_list_licenses_paginates() {
    let env = setup();
    for i in 0..5 {
        env.create_license(&format!("user{i}@x.com"), Plan::Trial);
    }
    let first = env.create_license("z@x.com", Plan::ProAnnual);
    env.engine.activate(&first.id, "d1", None).unwrap();

    let listed = env
        .engine
        .list_licenses(Some(ADMIN_SECRET), &ListLicensesQuery::new(4, 0))
        .unwrap();
    assert_eq!(listed.total, 6);
    assert_eq!(listed.licenses.len(), 4);
    assert_eq!(listed.limit, 4);
    assert!(listed.has_more());

    let rest = env
        .engine
        .list_licenses(Some(ADMIN_SECRET), &ListLicensesQuery::new(4, 4))
        .unwrap();
    assert_eq!(rest.licenses.len(), 2);
    assert_eq!(rest.offset, 4);
    assert!(!rest.has_more());

    let all: Vec<_> = listed.licenses.iter().chain(rest.licenses.iter()).collect();
    let summary = all.iter().find(|s| s.license.id == first.id).unwrap();
    assert_eq!(summary.activation_count, 1);

    assert!(matches!(
        env.engine
            .list_licenses(None, &ListLicensesQuery::default())
            .unwrap_err(),
        AppError::Unauthorized
    ));
}

#[test]
fn test_stats() {
    let env = setup();
    let a = env.create_license("a@x.com", Plan::ProLifetime);
    let b = env.create_license("b@x.com", Plan::ProLifetime);
    env.create_license("c@x.com", Plan::Free);

    env.engine.activate(&a.id, "d1", None).unwrap();
    env.engine.activate(&a.id, "d2", None).unwrap();
    env.engine.activate(&b.id, "d1", None).unwrap();
    env.engine.deactivate(&b.id, &admin_proof()).unwrap();
    env.engine.verify(&a.id, "d1", None).unwrap();

    let stats = env.engine.stats(Some(ADMIN_SECRET)).unwrap();
    assert_eq!(stats.total_licenses, 3);
    assert_eq!(stats.active_licenses, 2);
    assert_eq!(stats.deactivated_licenses, 1);
    assert_eq!(stats.total_activations, 2);
    // b is deactivated, so only a counts toward its plan
    assert_eq!(stats.by_plan[&Plan::ProLifetime], 1);
    assert_eq!(stats.by_plan[&Plan::Free], 1);
    assert_eq!(stats.recent_verifications, 1);

    assert!(matches!(
        env.engine.stats(Some("nope")).unwrap_err(),
        AppError::Unauthorized
    ));
}
