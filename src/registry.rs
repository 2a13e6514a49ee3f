//! The built-in Rule Metadata Registry (C4, spec §4.4).
//!
//! A static rule-id → `{severity, fcra_section, category, requires[]}`
//! table. This is the single source of truth for severity and statute
//! citation — rule code (`rules/`) only ever asserts *that* a violation
//! occurred. Severity/section values here are grounded in the source's
//! `RULE_METADATA` table (`metro2/audit_rules.py`) where an id carries
//! over directly; the remaining ~55 ids the comprehensive rule set adds
//! are assigned the closest-matching FCRA furnisher/reinvestigation duty.
//!
//! If an externalized rulebook JSON is supplied (spec §6), its entries
//! overlay — but do not remove — these defaults; see
//! [`crate::EngineConfig::with_rulebook_json`].

use crate::types::{RuleMeta, RuleRegistry, Severity};

macro_rules! rules {
    ($registry:expr, $($id:literal => ($severity:expr, $section:expr)),+ $(,)?) => {
        $(
            $registry.insert($id, RuleMeta::new($severity, $section));
        )+
    };
}

/// Build the built-in registry covering every rule id named in spec
/// §4.6-§4.8.
pub fn default_registry() -> RuleRegistry {
    use Severity::{Major, Minor, Moderate};

    let mut r = RuleRegistry::new();

    rules!(r,
        // Required-field / baseline
        "missing_date_opened" => (Moderate, "FCRA §623(a)(1)"),
        "missing_account_number" => (Minor, "FCRA §623(a)(1)"),
        "missing_dofd" => (Moderate, "FCRA §623(a)(5)"),
        "REPORT_DATE_MISSING_OR_INVALID" => (Moderate, "FCRA §623(a)(2)"),

        // Status <-> amount contradictions
        "balance_status_conflict" => (Major, "FCRA §607(b)"),
        "CURRENT_STATUS_WITH_PAST_DUE" => (Major, "FCRA §607(b)"),
        "current_but_pastdue" => (Major, "FCRA §607(b)"),
        "ZERO_BALANCE_WITH_PAST_DUE" => (Moderate, "FCRA §607(b)"),
        "LATE_STATUS_NO_PAST_DUE" => (Moderate, "FCRA §607(b)"),
        "OPEN_ZERO_BALANCE" => (Minor, "FCRA §607(b)"),
        "collection_status_inconsistent" => (Major, "FCRA §607(b)"),
        "chargeoff_continues_reporting" => (Major, "FCRA §623(a)(2)"),
        "open_account_reported_in_collection" => (Major, "FCRA §607(b)"),
        "balance_reporting_without_post_chargeoff_activity" => (Moderate, "FCRA §623(a)(2)"),

        // Temporal invariants
        "date_order_sanity" => (Major, "FCRA §607(b)"),
        "ACCOUNT_OPENED_AFTER_LAST_PAYMENT_DATE" => (Major, "FCRA §607(b)"),
        "PAYMENT_REPORTED_AFTER_CLOSURE" => (Major, "FCRA §623(a)(2)"),
        "INACCURATE_LAST_PAYMENT_DATE" => (Moderate, "FCRA §607(b)"),
        "LAST_PAYMENT_AFTER_CHARGEOFF_DATE" => (Major, "FCRA §607(b)"),
        "LAST_PAYMENT_AFTER_DOFD" => (Major, "FCRA §623(a)(5)"),
        "dofd_precedes_date_opened" => (Major, "FCRA §623(a)(5)"),
        "DOFD_AFTER_LAST_PAYMENT" => (Major, "FCRA §623(a)(5)"),
        "PAYMENT_AFTER_PAYOFF_DATE" => (Moderate, "FCRA §607(b)"),
        "MISMATCH_LAST_REPORTED_BEFORE_ACTIVITY" => (Moderate, "FCRA §623(a)(2)"),
        "STALE_DATA" => (Moderate, "FCRA §623(a)(2)"),
        "STALE_ACTIVE_REPORTING" => (Moderate, "FCRA §623(a)(2)"),
        "NO_ACTIVITY_TOO_LONG_ACTIVE" => (Moderate, "FCRA §623(a)(2)"),
        "STAGNANT_ACCOUNT_NOT_UPDATED" => (Minor, "FCRA §623(a)(2)"),
        "PAYMENT_STALENESS_INCONSISTENT_WITH_STATUS" => (Minor, "FCRA §607(b)"),
        "DOFD_OBSOLETE_7Y" => (Major, "FCRA §605(a)"),
        "CLOSURE_DATE_EQUALS_DOFD" => (Moderate, "FCRA §623(a)(5)"),
        "DATE_OPENED_AFTER_CHARGEOFF" => (Major, "FCRA §607(b)"),
        "PAST_DUE_AFTER_CLOSURE_DATE" => (Moderate, "FCRA §607(b)"),
        "REAGING_WITHOUT_PROOF" => (Major, "FCRA §623(a)(5)"),
        "collection_reaging_detected" => (Major, "FCRA §623(a)(5)"),

        // Closed-account integrity
        "INCONSISTENT_ACCOUNT_STATUS_ON_CLOSED" => (Major, "FCRA §623(a)(1)"),
        "MISMATCH_BALANCE_ON_CLOSED" => (Major, "FCRA §623(a)(1)"),
        "CLOSED_ACCOUNT_STILL_REPORTING_PAYMENT" => (Major, "FCRA §623(a)(1)"),
        "INCONSISTENT_PAYMENT_RATING_ON_CLOSE" => (Moderate, "FCRA §623(a)(1)"),
        "INCONSISTENT_SPECIAL_COMMENT_ON_SETTLEMENT" => (Minor, "FCRA §607(b)"),
        "INCORRECT_PAYMENT_HISTORY_AFTER_CLOSURE" => (Major, "FCRA §623(a)(1)"),
        "REOPENED_ACCOUNT_NO_NEW_OPEN_DATE" => (Moderate, "FCRA §607(b)"),
        "EXTENDED_DELINQUENCY_BEYOND_MAX" => (Major, "FCRA §605(a)"),

        // Portfolio/ownership/collateral
        "INCORRECT_ECOA_CODE_FOR_AUTHORIZED_USER" => (Moderate, "FCRA §607(b)"),
        "AU_COMMENT_ECOA_CONFLICT" => (Moderate, "FCRA §607(b)"),
        "MISMATCH_PORTFOLIO_TYPE_VS_ACCOUNT_TYPE" => (Minor, "FCRA §607(b)"),
        "MISMATCH_COLLATERAL_INDICATOR" => (Minor, "FCRA §607(b)"),
        "HIGH_CREDIT_EXCEEDS_LIMIT" => (Moderate, "FCRA §607(b)"),
        "NON_ZERO_BALANCE_WITH_ZERO_HI_CREDIT" => (Moderate, "FCRA §607(b)"),
        "REVOLVING_ZERO_LIMIT_COMMENT" => (Minor, "FCRA §607(b)"),
        "INSTALLMENT_HAS_LIMIT" => (Minor, "FCRA §607(b)"),
        "REVOLVING_MISSING_LIMIT" => (Minor, "FCRA §607(b)"),
        "REVOLVING_WITH_TERMS" => (Minor, "FCRA §607(b)"),

        // Dispute hygiene
        "COMPLIANCE_CONDITION_CODE_MISSING_ON_DISPUTE" => (Moderate, "FCRA §611(a)(1)"),
        "failure_to_correct_after_dispute" => (Major, "FCRA §623(a)(3)"),
        "DISPUTE_FLAG_NOT_CLEARED_AFTER_RESOLUTION" => (Moderate, "FCRA §611(a)(1)"),
        "DISPUTE_COMMENT_NEEDS_XB" => (Moderate, "FCRA §611(a)(1)"),
        "consumer_denies_account_ownership" => (Major, "FCRA §623(a)(3)"),
        "post_dispute_update_no_correction" => (Major, "FCRA §623(a)(3)"),

        // Collection specifics
        "collection_high_credit_equals_balance" => (Minor, "FCRA §607(b)"),
        "duplicate_collection_account" => (Major, "FCRA §607(b)"),
        "furnisher_identity_unclear" => (Moderate, "FCRA §607(b)"),

        // Utilization & dispute pendency (SPEC_FULL §4.6 addition)
        "HIGH_UTILIZATION" => (Minor, "FCRA §607(b)"),
        "DISPUTE_PENDING_TOO_LONG" => (Major, "FCRA §623(a)(3)"),

        // Comment integrity
        "comment_field_conflict" => (Minor, "FCRA §607(b)"),

        // Group-scope (C7)
        "BALANCE_MISMATCH" => (Major, "FCRA §607(b)"),
        "cross_bureau_balance_conflict" => (Major, "FCRA §607(b)"),
        "STATUS_MISMATCH" => (Major, "FCRA §607(b)"),
        "OPEN_DATE_MISMATCH" => (Major, "FCRA §607(b)"),
        "open_date_mismatch" => (Major, "FCRA §607(b)"),
        "LAST_PAYMENT_MISMATCH_BETWEEN_BU" => (Major, "FCRA §607(b)"),
        "FIRST_DELINQUENCY_DATE_NOT_FROZEN" => (Major, "FCRA §623(a)(5)"),
        "fcra_dofd_invalid" => (Major, "FCRA §623(a)(5)"),
        "LAST_REPORTED_MISMATCH" => (Moderate, "FCRA §607(b)"),
        "ACCOUNT_TYPE_MISMATCH" => (Moderate, "FCRA §607(b)"),
        "OPEN_CLOSED_MISMATCH" => (Major, "FCRA §623(a)(1)"),
        "PAYMENT_HISTORY_MISMATCH" => (Major, "FCRA §607(b)"),
        "INCOMPLETE_BUREAU_REPORTING" => (Moderate, "FCRA §623(a)(1)"),
        "DUPLICATE_ACCOUNT" => (Major, "FCRA §607(b)"),
        "POSSIBLE_MISMATCHED_ACCOUNTS_ACROSS_BUREAUS" => (Major, "FCRA §607(b)"),

        // Personal-info & inquiry (C8)
        "NAME_MISMATCH" => (Moderate, "FCRA §607(b)"),
        "ADDRESS_MISMATCH" => (Moderate, "FCRA §607(b)"),
        "INQUIRY_NO_MATCH" => (Moderate, "FCRA §604(a)(3)(F)"),
    );

    r
}
