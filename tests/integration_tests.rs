//! End-to-end scenarios and cross-cutting invariants for the audit engine.
//!
//! Scenarios S1-S6 exercise the orchestrator the way a caller would: build
//! an `AuditPayload`, run it through `run_audit`, and assert on the
//! resulting violations. The invariant tests at the bottom check the
//! properties the engine is expected to hold for any input, not just the
//! worked examples.

use std::collections::BTreeMap;

use metro2_audit_engine::{run_audit, AuditPayload, Inquiry, Tradeline};
use serde_json::json;

fn tradeline(pairs: &[(&str, &str)]) -> Tradeline {
    let mut fields = BTreeMap::new();
    for (k, v) in pairs {
        fields.insert(k.to_string(), json!(v));
    }
    Tradeline::new(fields)
}

fn violation_ids(tradeline: &Tradeline) -> Vec<&str> {
    tradeline.violations.iter().map(|v| v.id.as_str()).collect()
}

#[test]
fn s1_charged_off_with_new_payment() {
    let payload = AuditPayload {
        accounts: vec![tradeline(&[
            ("bureau", "Experian"),
            ("account_status", "Charge-Off"),
            ("date_of_last_payment", "02/01/2022"),
            ("date_of_first_delinquency", "01/01/2022"),
            ("balance", "$1,500"),
            ("last_reported", "07/01/2025"),
        ])],
        ..Default::default()
    };
    let audited = run_audit(payload);
    let ids = violation_ids(&audited.accounts[0]);
    assert!(ids.contains(&"LAST_PAYMENT_AFTER_DOFD"), "{ids:?}");
    assert!(ids.contains(&"balance_reporting_without_post_chargeoff_activity"), "{ids:?}");
}

#[test]
fn s2_closed_but_still_reporting_payment() {
    let payload = AuditPayload {
        accounts: vec![tradeline(&[
            ("account_status", "Closed"),
            ("payment_status", "Late 30 Days"),
            ("monthly_payment", "$35"),
            ("balance", "$56"),
            ("past_due", "$26"),
            ("credit_limit", "$425"),
            ("high_credit", "$457"),
            ("last_reported", "07/11/2025"),
        ])],
        ..Default::default()
    };
    let audited = run_audit(payload);
    let ids = violation_ids(&audited.accounts[0]);
    assert!(ids.contains(&"CLOSED_ACCOUNT_STILL_REPORTING_PAYMENT"), "{ids:?}");
    assert!(ids.contains(&"MISMATCH_BALANCE_ON_CLOSED"), "{ids:?}");
    assert!(ids.contains(&"HIGH_CREDIT_EXCEEDS_LIMIT"), "{ids:?}");
}

#[test]
fn s3_cross_bureau_balance_conflict() {
    let payload = AuditPayload {
        accounts: vec![
            tradeline(&[("creditor_name", "ALPHA BANK"), ("account_number", "1234****"), ("bureau", "TransUnion"), ("balance", "500")]),
            tradeline(&[("creditor_name", "ALPHA BANK"), ("account_number", "1234****"), ("bureau", "Experian"), ("balance", "650")]),
            tradeline(&[("creditor_name", "ALPHA BANK"), ("account_number", "1234****"), ("bureau", "Equifax"), ("balance", "500")]),
        ],
        ..Default::default()
    };
    let audited = run_audit(payload);
    for account in &audited.accounts {
        let ids = violation_ids(account);
        assert!(ids.contains(&"BALANCE_MISMATCH"), "{ids:?}");
        assert!(ids.contains(&"cross_bureau_balance_conflict"), "{ids:?}");
    }
}

#[test]
fn s4_authorized_user_miscoding() {
    let payload = AuditPayload {
        accounts: vec![tradeline(&[
            ("comments", "Authorized user on spouse's account"),
            ("ecoa_code", "Individual"),
        ])],
        ..Default::default()
    };
    let audited = run_audit(payload);
    let ids = violation_ids(&audited.accounts[0]);
    assert!(ids.contains(&"AU_COMMENT_ECOA_CONFLICT"), "{ids:?}");
    assert!(ids.contains(&"INCORRECT_ECOA_CODE_FOR_AUTHORIZED_USER"), "{ids:?}");
}

#[test]
fn s5_obsolete_derogatory() {
    let payload = AuditPayload {
        accounts: vec![tradeline(&[("account_status", "Collection"), ("date_of_first_delinquency", "01/01/2015")])],
        ..Default::default()
    };
    let audited = run_audit(payload);
    let ids = violation_ids(&audited.accounts[0]);
    assert!(ids.contains(&"DOFD_OBSOLETE_7Y"), "{ids:?}");
}

#[test]
fn s6_unlinked_inquiry() {
    let payload = AuditPayload {
        accounts: vec![tradeline(&[("creditor_name", "Alpha Bank")]), tradeline(&[("creditor_name", "Beta Credit")])],
        inquiries: vec![Inquiry {
            creditor_name: "Zeta Auto Finance".to_string(),
            date_of_inquiry: "03/12/2024".to_string(),
            credit_bureau: "Experian".to_string(),
            ..Default::default()
        }],
        ..Default::default()
    };
    let audited = run_audit(payload);
    assert_eq!(audited.inquiry_violations.len(), 1);
    assert_eq!(audited.inquiry_violations[0].id, "INQUIRY_NO_MATCH");
}

#[test]
fn high_utilization_flags_balance_over_ninety_percent_of_limit() {
    let payload = AuditPayload {
        accounts: vec![tradeline(&[("credit_limit", "1000"), ("balance", "950")])],
        ..Default::default()
    };
    let audited = run_audit(payload);
    assert!(violation_ids(&audited.accounts[0]).contains(&"HIGH_UTILIZATION"));
}

#[test]
fn dispute_pending_too_long_flags_unresolved_dispute_comment() {
    let payload = AuditPayload {
        accounts: vec![tradeline(&[("comments", "Consumer disputes this account")])],
        ..Default::default()
    };
    let audited = run_audit(payload);
    assert!(violation_ids(&audited.accounts[0]).contains(&"DISPUTE_PENDING_TOO_LONG"));

    let resolved_payload = AuditPayload {
        accounts: vec![tradeline(&[("comments", "Dispute resolved in consumer's favor")])],
        ..Default::default()
    };
    let resolved = run_audit(resolved_payload);
    assert!(!violation_ids(&resolved.accounts[0]).contains(&"DISPUTE_PENDING_TOO_LONG"));
}

// ---------------------------------------------------------------------
// Invariants (spec §8)
// ---------------------------------------------------------------------

#[test]
fn determinism_across_repeated_runs() {
    let make_payload = || AuditPayload {
        accounts: vec![tradeline(&[
            ("creditor_name", "Alpha Bank"),
            ("account_status", "current"),
            ("past_due", "50.00"),
            ("date_opened", "01/01/2020"),
        ])],
        ..Default::default()
    };

    let first = run_audit(make_payload());
    let second = run_audit(make_payload());
    let first_ids: Vec<_> = first.accounts[0].violations.iter().map(|v| v.id.clone()).collect();
    let second_ids: Vec<_> = second.accounts[0].violations.iter().map(|v| v.id.clone()).collect();
    assert_eq!(first_ids, second_ids);
}

#[test]
fn record_order_does_not_affect_each_records_own_violations() {
    let a = tradeline(&[("creditor_name", "Alpha Bank"), ("account_status", "current"), ("past_due", "50.00")]);
    let b = tradeline(&[("creditor_name", "Beta Credit"), ("account_status", "open"), ("balance", "0")]);

    let forward = run_audit(AuditPayload { accounts: vec![a.clone(), b.clone()], ..Default::default() });
    let reversed = run_audit(AuditPayload { accounts: vec![b, a], ..Default::default() });

    let forward_alpha_ids: Vec<_> = forward.accounts[0].violations.iter().map(|v| v.id.clone()).collect();
    let reversed_alpha_ids: Vec<_> = reversed.accounts[1].violations.iter().map(|v| v.id.clone()).collect();
    assert_eq!(forward_alpha_ids, reversed_alpha_ids);
}

#[test]
fn severity_closure_holds_for_every_violation() {
    let payload = AuditPayload {
        accounts: vec![tradeline(&[
            ("account_status", "Charge-Off"),
            ("balance", "0"),
            ("past_due", "10"),
            ("date_of_first_delinquency", "01/01/2010"),
        ])],
        ..Default::default()
    };
    let audited = run_audit(payload);
    for violation in &audited.accounts[0].violations {
        assert!(matches!(
            violation.severity,
            metro2_audit_engine::Severity::Minor | metro2_audit_engine::Severity::Moderate | metro2_audit_engine::Severity::Major
        ));
        assert!(!violation.fcra_section.is_empty());
    }
}

#[test]
fn absent_accounts_survive_untouched() {
    let mut absent = tradeline(&[("creditor_name", "Gamma Finance")]);
    absent.present = false;
    let payload = AuditPayload { accounts: vec![absent], ..Default::default() };
    let audited = run_audit(payload);
    assert_eq!(audited.accounts.len(), 1);
    assert!(!audited.accounts[0].present);
    assert!(audited.accounts[0].violations.is_empty());
}

#[test]
fn cross_bureau_rule_attaches_to_every_group_member() {
    let payload = AuditPayload {
        accounts: vec![
            tradeline(&[("creditor_name", "DELTA"), ("account_number", "999"), ("bureau", "TransUnion"), ("account_status", "open")]),
            tradeline(&[("creditor_name", "DELTA"), ("account_number", "999"), ("bureau", "Experian"), ("account_status", "current"), ("date_closed", "01/01/2023")]),
        ],
        ..Default::default()
    };
    let audited = run_audit(payload);
    let member_has = |idx: usize, id: &str| audited.accounts[idx].violations.iter().any(|v| v.id == id);
    if member_has(0, "OPEN_CLOSED_MISMATCH") {
        assert!(member_has(1, "OPEN_CLOSED_MISMATCH"));
    }
}
