//! Single-Record Rules (C6): ~50 predicates evaluating one tradeline at a
//! time, executed in the fixed order below regardless of previous
//! firings — except where a rule explicitly consults
//! [`crate::violations::has`] to deduplicate (spec §4.5, §4.6).
//!
//! Grounded in the source's comprehensive rule module
//! (`metro2/audit_rules.py` and the `r_*` functions of
//! `metro2 (copy 1)/crm/metro2_audit_multi.py`), generalized to cover
//! every id spec §4.6 names.

use rust_decimal_macros::dec;
use serde_json::json;
use std::collections::BTreeSet;

use crate::grouping::group_by_account_number;
use crate::types::{AccountTypeBucket, Tradeline};
use crate::violations::has;

use super::RuleContext;

/// Cross-record facts needed by the two C6 rules that must see the whole
/// payload (`duplicate_collection_account`, `furnisher_identity_unclear`).
/// Computed once before the mutable single-record pass.
#[derive(Debug, Default)]
pub struct CrossRecordFacts {
    pub duplicate_collection_indices: BTreeSet<usize>,
    pub furnisher_unclear_indices: BTreeSet<usize>,
}

pub fn compute_cross_record_facts(accounts: &[Tradeline]) -> CrossRecordFacts {
    let mut facts = CrossRecordFacts::default();

    // duplicate_collection_account: multiple collection tradelines share
    // the same (original_creditor, balance) pair but different furnisher
    // (creditor_name) values.
    use std::collections::BTreeMap;
    let mut by_oc_balance: BTreeMap<(String, String), Vec<usize>> = BTreeMap::new();
    for (idx, account) in accounts.iter().enumerate() {
        if !account.present || !account.bucket().is_collection() {
            continue;
        }
        let oc = account.get_or_empty("original_creditor").trim().to_ascii_uppercase();
        if oc.is_empty() {
            continue;
        }
        let balance_key = account.money("balance").to_string();
        by_oc_balance.entry((oc, balance_key)).or_default().push(idx);
    }
    for members in by_oc_balance.values() {
        if members.len() < 2 {
            continue;
        }
        let furnishers: BTreeSet<String> =
            members.iter().map(|&idx| accounts[idx].creditor_name_upper()).collect();
        if furnishers.len() >= 2 {
            facts.duplicate_collection_indices.extend(members.iter().copied());
        }
    }

    // furnisher_identity_unclear: records sharing a canonical account
    // number have >= 2 distinct creditor names.
    for members in group_by_account_number(accounts).values() {
        let furnishers: BTreeSet<String> =
            members.iter().map(|&idx| accounts[idx].creditor_name_upper()).collect();
        if furnishers.len() >= 2 {
            facts.furnisher_unclear_indices.extend(members.iter().copied());
        }
    }

    facts
}

const DEROG_KEYWORDS: &[&str] = &["late", "collection", "charge", "derog"];
const CHARGE_COLLECTION_KEYWORDS: &[&str] = &["charge", "collection"];
const CLOSED_KEYWORDS: &[&str] = &["closed", "paid", "settled"];
const ACTIVE_KEYWORDS: &[&str] = &["open", "current", "active"];

fn any_keyword(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

/// Run every C6 predicate, in registration order, on one tradeline.
pub fn run_single_record_rules(idx: usize, t: &mut Tradeline, ctx: &RuleContext) {
    missing_date_opened(t, ctx);
    missing_account_number(t, ctx);
    missing_dofd(t, ctx);
    report_date_missing_or_invalid(t, ctx);

    balance_status_conflict(t, ctx);
    current_status_with_past_due(t, ctx);
    zero_balance_with_past_due(t, ctx);
    late_status_no_past_due(t, ctx);
    open_zero_balance(t, ctx);
    collection_status_inconsistent(t, ctx);
    chargeoff_continues_reporting(t, ctx);
    open_account_reported_in_collection(t, ctx);
    balance_reporting_without_post_chargeoff_activity(t, ctx);

    date_order_sanity(t, ctx);
    account_opened_after_last_payment(t, ctx);
    payment_reported_after_closure(t, ctx);
    inaccurate_last_payment_date(t, ctx);
    last_payment_after_chargeoff_date(t, ctx);
    last_payment_after_dofd(t, ctx);
    dofd_precedes_date_opened(t, ctx);
    dofd_after_last_payment(t, ctx);
    payment_after_payoff_date(t, ctx);
    mismatch_last_reported_before_activity(t, ctx);
    stale_data(t, ctx);
    stale_active_reporting(t, ctx);
    no_activity_too_long_active(t, ctx);
    stagnant_account_not_updated(t, ctx);
    payment_staleness_inconsistent_with_status(t, ctx);
    dofd_obsolete_7y(t, ctx);
    closure_date_equals_dofd(t, ctx);
    date_opened_after_chargeoff(t, ctx);
    past_due_after_closure_date(t, ctx);
    reaging_without_proof(t, ctx);
    collection_reaging_detected(t, ctx);

    inconsistent_account_status_on_closed(t, ctx);
    mismatch_balance_on_closed(t, ctx);
    closed_account_still_reporting_payment(t, ctx);
    inconsistent_payment_rating_on_close(t, ctx);
    inconsistent_special_comment_on_settlement(t, ctx);
    incorrect_payment_history_after_closure(t, ctx);
    reopened_account_no_new_open_date(t, ctx);
    extended_delinquency_beyond_max(t, ctx);

    incorrect_ecoa_code_for_authorized_user(t, ctx);
    mismatch_portfolio_type_vs_account_type(t, ctx);
    mismatch_collateral_indicator(t, ctx);
    high_credit_exceeds_limit(t, ctx);
    non_zero_balance_with_zero_hi_credit(t, ctx);
    revolving_zero_limit_comment(t, ctx);
    installment_has_limit(t, ctx);
    revolving_missing_limit(t, ctx);
    revolving_with_terms(t, ctx);

    compliance_condition_code_missing_on_dispute(t, ctx);
    failure_to_correct_after_dispute(t, ctx);
    dispute_flag_not_cleared_after_resolution(t, ctx);
    dispute_comment_needs_xb(t, ctx);
    consumer_denies_account_ownership(t, ctx);
    post_dispute_update_no_correction(t, ctx);

    collection_high_credit_equals_balance(t, ctx);
    duplicate_collection_account(idx, t, ctx);
    furnisher_identity_unclear(idx, t, ctx);

    high_utilization(t, ctx);
    dispute_pending_too_long(t, ctx);

    comment_field_conflict(t, ctx);
}

// ---------------------------------------------------------------------
// Required-field / baseline
// ---------------------------------------------------------------------

fn missing_date_opened(t: &mut Tradeline, ctx: &RuleContext) {
    if !t.has("date_opened") {
        ctx.builder.attach(t, "missing_date_opened", "Missing Date Opened");
    }
}

fn missing_account_number(t: &mut Tradeline, ctx: &RuleContext) {
    if !t.has("account_number") && t.has("last_reported") {
        ctx.builder.attach(t, "missing_account_number", "Missing account number on a live tradeline");
    }
}

fn missing_dofd(t: &mut Tradeline, ctx: &RuleContext) {
    if t.is_derogatory_status() && !t.has("date_of_first_delinquency") {
        ctx.builder.attach(t, "missing_dofd", "Derogatory account missing Date of First Delinquency");
    }
}

fn report_date_missing_or_invalid(t: &mut Tradeline, ctx: &RuleContext) {
    let raw = t.get("last_reported");
    let invalid = match raw {
        None => true,
        Some(_) => match t.date("last_reported") {
            None => true,
            Some(d) => d.as_naive() > ctx.today,
        },
    };
    if invalid {
        ctx.builder.attach(t, "REPORT_DATE_MISSING_OR_INVALID", "Last Reported date is missing, unparseable, or in the future");
    }
}

// ---------------------------------------------------------------------
// Status <-> amount contradictions
// ---------------------------------------------------------------------

fn balance_status_conflict(t: &mut Tradeline, ctx: &RuleContext) {
    let balance = t.money("balance");
    let status = t.account_status();
    let derog = any_keyword(&status, DEROG_KEYWORDS);
    let settled = any_keyword(&status, &["paid", "closed", "settled"]);
    if balance.is_zero() && derog {
        ctx.builder.attach(t, "balance_status_conflict", "Zero balance reported alongside a derogatory status");
    } else if !balance.is_zero() && settled {
        ctx.builder.attach(t, "balance_status_conflict", "Non-zero balance reported on a paid/closed/settled account");
    }
}

fn current_status_with_past_due(t: &mut Tradeline, ctx: &RuleContext) {
    let status = t.account_status();
    let past_due = t.money("past_due");
    if past_due.is_zero() {
        return;
    }
    if any_keyword(&status, &["current", "pays as agreed", "ok"]) {
        ctx.builder.attach(t, "CURRENT_STATUS_WITH_PAST_DUE", "Account marked current while reporting a past-due balance");
        ctx.builder.attach(t, "current_but_pastdue", "Account marked current while reporting a past-due balance");
    }
}

fn zero_balance_with_past_due(t: &mut Tradeline, ctx: &RuleContext) {
    let balance = t.money("balance");
    let past_due = t.money("past_due");
    if balance.le_within_tolerance(rust_decimal_macros::dec!(1)) && !past_due.is_zero() {
        ctx.builder.attach(t, "ZERO_BALANCE_WITH_PAST_DUE", "Balance is effectively zero but past-due amount reported");
    }
}

fn late_status_no_past_due(t: &mut Tradeline, ctx: &RuleContext) {
    let status = t.account_status();
    let past_due = t.money("past_due");
    if !past_due.is_zero() {
        return;
    }
    let late_keywords = ["late", "delinquent", "past due", "charge", "collection", "derog", "30", "60", "90"];
    if any_keyword(&status, &late_keywords) {
        ctx.builder.attach(t, "LATE_STATUS_NO_PAST_DUE", "Delinquent status reported without a supporting past-due amount");
    }
}

fn open_zero_balance(t: &mut Tradeline, ctx: &RuleContext) {
    let status = t.account_status();
    let balance = t.money("balance");
    if status.contains("open") && balance.is_zero() {
        ctx.builder.attach(t, "OPEN_ZERO_BALANCE", "Open account reporting a $0 balance");
    }
}

fn collection_status_inconsistent(t: &mut Tradeline, ctx: &RuleContext) {
    let status = t.account_status();
    let balance = t.money("balance");
    if t.bucket().is_collection() && status.contains("open") && !balance.is_zero() {
        ctx.builder.attach(t, "collection_status_inconsistent", "Collection account marked open while reporting a balance");
    }
}

/// `charge_off_date` is frequently never furnished separately from DOFD in
/// practice, so the charge-off anchor falls back to DOFD when the explicit
/// field is absent — the two rules below would otherwise never fire on the
/// large share of charge-off tradelines that only carry a DOFD.
fn charge_off_anchor(t: &Tradeline) -> Option<crate::types::DateValue> {
    t.date("charge_off_date").or_else(|| t.date("date_of_first_delinquency"))
}

fn chargeoff_continues_reporting(t: &mut Tradeline, ctx: &RuleContext) {
    let status = t.account_status();
    if !status.contains("charge") {
        return;
    }
    let Some(anchor) = charge_off_anchor(t) else { return };
    if t.payment_history_entries_after(anchor) >= 2 {
        ctx.builder.attach(t, "chargeoff_continues_reporting", "Payment history continues to be updated after charge-off");
    }
}

fn open_account_reported_in_collection(t: &mut Tradeline, ctx: &RuleContext) {
    let status = t.account_status();
    let payment_status = t.payment_status();
    if status.contains("open") && (t.bucket().is_collection() || any_keyword(&payment_status, &["collection", "charge"])) {
        ctx.builder.attach(t, "open_account_reported_in_collection", "Account reported both open and in collection/charge-off");
    }
}

fn balance_reporting_without_post_chargeoff_activity(t: &mut Tradeline, ctx: &RuleContext) {
    let status = t.account_status();
    let balance = t.money("balance");
    if !status.contains("charge") || balance.is_zero() {
        return;
    }
    let Some(anchor) = charge_off_anchor(t) else { return };
    if t.payment_history_entries_after(anchor) == 0 {
        ctx.builder.attach(
            t,
            "balance_reporting_without_post_chargeoff_activity",
            "Charge-off balance reported with no payment-history activity after the charge-off date",
        );
    }
}

// ---------------------------------------------------------------------
// Temporal invariants
// ---------------------------------------------------------------------

fn date_order_sanity(t: &mut Tradeline, ctx: &RuleContext) {
    let Some(opened) = t.date("date_opened") else { return };
    let mut bad_fields = Vec::new();
    for field in ["date_of_last_payment", "last_reported", "date_last_active", "date_closed"] {
        if let Some(d) = t.date(field) {
            if d < opened {
                bad_fields.push(field);
            }
        }
    }
    if !bad_fields.is_empty() {
        ctx.builder.attach_with(
            t,
            "date_order_sanity",
            format!("Dates {} occur before Date Opened", bad_fields.join(", ")),
            &[("fields", json!(bad_fields))],
        );
    }
}

fn account_opened_after_last_payment(t: &mut Tradeline, ctx: &RuleContext) {
    if let (Some(last_payment), Some(opened)) = (t.date("date_of_last_payment"), t.date("date_opened")) {
        if last_payment < opened {
            ctx.builder.attach(t, "ACCOUNT_OPENED_AFTER_LAST_PAYMENT_DATE", "Last payment date precedes Date Opened");
        }
    }
}

fn payment_reported_after_closure(t: &mut Tradeline, ctx: &RuleContext) {
    if let (Some(last_payment), Some(closed)) = (t.date("date_of_last_payment"), t.date("date_closed")) {
        if last_payment > closed {
            ctx.builder.attach(t, "PAYMENT_REPORTED_AFTER_CLOSURE", "Last payment date falls after Date Closed");
        }
    }
}

fn inaccurate_last_payment_date(t: &mut Tradeline, ctx: &RuleContext) {
    if let Some(last_payment) = t.date("date_of_last_payment") {
        if last_payment.as_naive() > ctx.today {
            ctx.builder.attach(t, "INACCURATE_LAST_PAYMENT_DATE", "Last payment date is in the future");
        }
    }
}

fn last_payment_after_chargeoff_date(t: &mut Tradeline, ctx: &RuleContext) {
    let status = t.account_status();
    if let (Some(last_payment), Some(charge_off)) = (t.date("date_of_last_payment"), t.date("charge_off_date")) {
        if last_payment > charge_off && any_keyword(&status, CHARGE_COLLECTION_KEYWORDS) {
            ctx.builder.attach(t, "LAST_PAYMENT_AFTER_CHARGEOFF_DATE", "Last payment reported after the charge-off date");
        }
    }
}

fn last_payment_after_dofd(t: &mut Tradeline, ctx: &RuleContext) {
    let status = t.account_status();
    if let (Some(last_payment), Some(dofd)) = (t.date("date_of_last_payment"), t.date("date_of_first_delinquency")) {
        if last_payment > dofd && any_keyword(&status, CHARGE_COLLECTION_KEYWORDS) {
            ctx.builder.attach(t, "LAST_PAYMENT_AFTER_DOFD", "Last payment reported after DOFD while account shows charge-off/collection");
        } else if last_payment <= dofd && !has(t, "LAST_PAYMENT_AFTER_DOFD") {
            // Softer finding: a payment on or before DOFD is consistent with a cure,
            // but is only worth flagging when the stronger contradiction above didn't fire.
            ctx.builder.attach(
                t,
                "PAYMENT_BEFORE_DELINQUENCY_IMPLIES_CURE",
                "Last payment on or before DOFD suggests the account may have cured",
            );
        }
    }
}

fn dofd_precedes_date_opened(t: &mut Tradeline, ctx: &RuleContext) {
    if let (Some(dofd), Some(opened)) = (t.date("date_of_first_delinquency"), t.date("date_opened")) {
        if dofd < opened {
            ctx.builder.attach(t, "dofd_precedes_date_opened", "DOFD precedes Date Opened");
        }
    }
}

fn dofd_after_last_payment(t: &mut Tradeline, ctx: &RuleContext) {
    if let (Some(dofd), Some(last_payment)) = (t.date("date_of_first_delinquency"), t.date("date_of_last_payment")) {
        if dofd > last_payment {
            ctx.builder.attach(t, "DOFD_AFTER_LAST_PAYMENT", "DOFD falls after the last reported payment");
        }
    }
}

fn payment_after_payoff_date(t: &mut Tradeline, ctx: &RuleContext) {
    let balance = t.money("balance");
    if !balance.is_zero() {
        return;
    }
    if let (Some(last_payment), Some(payoff)) = (t.date("date_of_last_payment"), t.date("payoff_date")) {
        if last_payment > payoff {
            ctx.builder.attach(t, "PAYMENT_AFTER_PAYOFF_DATE", "Last payment reported after the payoff date");
        }
    }
}

fn mismatch_last_reported_before_activity(t: &mut Tradeline, ctx: &RuleContext) {
    let Some(last_reported) = t.date("last_reported") else { return };
    for field in ["date_of_last_payment", "date_closed", "charge_off_date"] {
        if let Some(d) = t.date(field) {
            if d > last_reported {
                ctx.builder.attach_with(
                    t,
                    "MISMATCH_LAST_REPORTED_BEFORE_ACTIVITY",
                    format!("{field} postdates Last Reported"),
                    &[("field", json!(field))],
                );
            }
        }
    }
}

fn stale_data(t: &mut Tradeline, ctx: &RuleContext) {
    if let Some(last_reported) = t.date("last_reported") {
        if (ctx.today - last_reported.as_naive()).num_days() > ctx.config.stale_data_days {
            ctx.builder.attach(t, "STALE_DATA", "Account not updated within the expected reporting window");
        }
    }
}

fn stale_active_reporting(t: &mut Tradeline, ctx: &RuleContext) {
    let balance = t.money("balance");
    if balance.is_zero() {
        return;
    }
    let stale = match t.date("date_of_last_payment") {
        None => true,
        Some(d) => (ctx.today - d.as_naive()).num_days() > ctx.config.stale_active_years * 365,
    };
    if stale {
        ctx.builder.attach(t, "STALE_ACTIVE_REPORTING", "Account carries a balance but has no recent payment activity");
    }
}

fn no_activity_too_long_active(t: &mut Tradeline, ctx: &RuleContext) {
    let status = t.account_status();
    if !any_keyword(&status, ACTIVE_KEYWORDS) {
        return;
    }
    if let Some(last_payment) = t.date("date_of_last_payment") {
        if (ctx.today - last_payment.as_naive()).num_days() > ctx.config.stale_active_years * 365 {
            ctx.builder.attach(t, "NO_ACTIVITY_TOO_LONG_ACTIVE", "Active-status account shows no payment activity in years");
        }
    }
}

fn stagnant_account_not_updated(t: &mut Tradeline, ctx: &RuleContext) {
    let status = t.account_status();
    if !any_keyword(&status, &["current", "late"]) {
        return;
    }
    if let Some(last_payment) = t.date("date_of_last_payment") {
        if (ctx.today - last_payment.as_naive()).num_days() > ctx.config.stagnant_years * 365 {
            ctx.builder.attach(t, "STAGNANT_ACCOUNT_NOT_UPDATED", "Account status not updated in many years");
        }
    }
}

fn payment_staleness_inconsistent_with_status(t: &mut Tradeline, ctx: &RuleContext) {
    let status = t.account_status();
    if !status.contains("current") {
        return;
    }
    if let Some(last_payment) = t.date("date_of_last_payment") {
        if (ctx.today - last_payment.as_naive()).num_days() > ctx.config.payment_staleness_days {
            ctx.builder.attach(t, "PAYMENT_STALENESS_INCONSISTENT_WITH_STATUS", "Current status inconsistent with a stale last-payment date");
        }
    }
}

fn dofd_obsolete_7y(t: &mut Tradeline, ctx: &RuleContext) {
    let status = t.account_status();
    if !any_keyword(&status, &["charge", "collection", "late", "delinquent", "derog"]) {
        return;
    }
    if let Some(dofd) = t.date("date_of_first_delinquency") {
        if (ctx.today - dofd.as_naive()).num_days() > ctx.config.dofd_obsolescence_years * 365 {
            ctx.builder.attach(t, "DOFD_OBSOLETE_7Y", "Derogatory account older than the 7-year DOFD obsolescence window");
        }
    }
}

fn closure_date_equals_dofd(t: &mut Tradeline, ctx: &RuleContext) {
    if let (Some(closed), Some(dofd)) = (t.date("date_closed"), t.date("date_of_first_delinquency")) {
        if closed == dofd {
            ctx.builder.attach(t, "CLOSURE_DATE_EQUALS_DOFD", "Date Closed exactly matches DOFD");
        }
    }
}

fn date_opened_after_chargeoff(t: &mut Tradeline, ctx: &RuleContext) {
    if let (Some(opened), Some(charge_off)) = (t.date("date_opened"), t.date("charge_off_date")) {
        if opened > charge_off {
            ctx.builder.attach(t, "DATE_OPENED_AFTER_CHARGEOFF", "Date Opened falls after the charge-off date");
        }
    }
}

fn past_due_after_closure_date(t: &mut Tradeline, ctx: &RuleContext) {
    if let (Some(past_due_date), Some(closed)) = (t.date("past_due_date"), t.date("date_closed")) {
        if past_due_date > closed {
            ctx.builder.attach(t, "PAST_DUE_AFTER_CLOSURE_DATE", "Past-due date falls after Date Closed");
        }
    }
}

fn reaging_without_proof(t: &mut Tradeline, ctx: &RuleContext) {
    if let Some(dofd) = t.date("date_of_first_delinquency") {
        if (ctx.today - dofd.as_naive()).num_days() < ctx.config.reaging_window_days {
            ctx.builder.attach(t, "REAGING_WITHOUT_PROOF", "DOFD younger than expected for a derogatory account — possible re-aging");
        }
    }
}

fn collection_reaging_detected(t: &mut Tradeline, ctx: &RuleContext) {
    let dofd_changed = t.get_or_empty("dofd_changed_after_collection");
    if crate::coercion::is_boolish(&dofd_changed) && t.bucket().is_collection() {
        ctx.builder.attach(t, "collection_reaging_detected", "DOFD changed after the account entered collection status");
    }
}

// ---------------------------------------------------------------------
// Closed-account integrity
// ---------------------------------------------------------------------

fn inconsistent_account_status_on_closed(t: &mut Tradeline, ctx: &RuleContext) {
    let status = t.account_status();
    if t.has("date_closed") && any_keyword(&status, &["open", "current", "active"]) {
        ctx.builder.attach(t, "INCONSISTENT_ACCOUNT_STATUS_ON_CLOSED", "Date Closed present but status still reads open/current/active");
    }
}

fn closed_context(t: &Tradeline) -> bool {
    let status = t.account_status();
    t.has("date_closed") || any_keyword(&status, CLOSED_KEYWORDS)
}

fn mismatch_balance_on_closed(t: &mut Tradeline, ctx: &RuleContext) {
    if !closed_context(t) {
        return;
    }
    let balance = t.money("balance");
    let past_due = t.money("past_due");
    if !balance.is_zero() || !past_due.is_zero() {
        ctx.builder.attach(t, "MISMATCH_BALANCE_ON_CLOSED", "Closed/paid account still reports a balance or past-due amount");
    }
}

fn closed_account_still_reporting_payment(t: &mut Tradeline, ctx: &RuleContext) {
    if !closed_context(t) {
        return;
    }
    let payment_status = t.payment_status();
    let late_terms = ["late", "delin", "past due", "charge", "repos", "30", "60", "90", "120"];
    let monthly = t.money("monthly_payment");
    if any_keyword(&payment_status, &late_terms) || !monthly.is_zero() {
        ctx.builder.attach(t, "CLOSED_ACCOUNT_STILL_REPORTING_PAYMENT", "Closed account still reporting delinquent payment status or a scheduled payment");
    }
}

fn inconsistent_payment_rating_on_close(t: &mut Tradeline, ctx: &RuleContext) {
    if !closed_context(t) {
        return;
    }
    let rating = t.status("payment_rating");
    let numeric_positive = rating.chars().next().is_some_and(|c| c.is_ascii_digit() && c != '0');
    let derog_text = any_keyword(&rating, &["derog", "charge", "collection", "late"]);
    if numeric_positive || derog_text {
        ctx.builder.attach(t, "INCONSISTENT_PAYMENT_RATING_ON_CLOSE", "Closed account carries a non-zero or derogatory payment rating");
    }
}

fn inconsistent_special_comment_on_settlement(t: &mut Tradeline, ctx: &RuleContext) {
    let status = t.account_status();
    if !status.contains("settled") {
        return;
    }
    let comment = t.comments();
    if !any_keyword(&comment, &["settled", "settlement", "paid in full", "paid for less"]) {
        ctx.builder.attach(t, "INCONSISTENT_SPECIAL_COMMENT_ON_SETTLEMENT", "Status shows settled but comments don't reflect settlement language");
    }
}

fn incorrect_payment_history_after_closure(t: &mut Tradeline, ctx: &RuleContext) {
    let Some(closed) = t.date("date_closed") else { return };
    let has_entry_after = t
        .payment_history()
        .into_iter()
        .any(|(date, _)| date.is_some_and(|d| d > closed));
    if has_entry_after {
        ctx.builder.attach(t, "INCORRECT_PAYMENT_HISTORY_AFTER_CLOSURE", "Payment history contains entries dated after Date Closed");
    }
}

fn reopened_account_no_new_open_date(t: &mut Tradeline, ctx: &RuleContext) {
    let status = t.account_status();
    if status.contains("reopen") && !t.get_or_empty("date_reopened").chars().any(|c| c.is_ascii_digit()) {
        ctx.builder.attach(t, "REOPENED_ACCOUNT_NO_NEW_OPEN_DATE", "Status indicates reopening without a refreshed open date");
    }
}

fn extended_delinquency_beyond_max(t: &mut Tradeline, ctx: &RuleContext) {
    let raw = t.get_or_empty("days_past_due");
    if let Ok(days) = raw.trim().parse::<i64>() {
        if days > ctx.config.max_days_past_due {
            ctx.builder.attach(t, "EXTENDED_DELINQUENCY_BEYOND_MAX", "Reported days-past-due exceeds the plausible maximum");
        }
    }
}

// ---------------------------------------------------------------------
// Portfolio/ownership/collateral
// ---------------------------------------------------------------------

fn incorrect_ecoa_code_for_authorized_user(t: &mut Tradeline, ctx: &RuleContext) {
    let ownership = format!("{} {}", t.status("ownership_code"), t.status("account_designator"));
    let comments = t.comments();
    let au_language = any_keyword(&ownership, &["authorized user", "au"]) || any_keyword(&comments, &["authorized user"]);
    if !au_language {
        return;
    }
    let ecoa = t.ecoa_code();
    let au_valid = ["a", "au", "authorized user", "u"].contains(&ecoa.as_str());
    if !au_valid {
        ctx.builder.attach(t, "INCORRECT_ECOA_CODE_FOR_AUTHORIZED_USER", "Authorized-user relationship present without a matching ECOA code");
        if any_keyword(&comments, &["authorized user"]) {
            ctx.builder.attach(t, "AU_COMMENT_ECOA_CONFLICT", "Authorized user comment present without matching ECOA designator");
        }
    }
}

fn mismatch_portfolio_type_vs_account_type(t: &mut Tradeline, ctx: &RuleContext) {
    let portfolio = t.status("portfolio_type");
    let account_type = t.status("account_type");
    let bucket = |s: &str| -> Option<&'static str> {
        if s.contains("revolving") {
            Some("revolving")
        } else if s.contains("installment") {
            Some("installment")
        } else if s.contains("open") {
            Some("open")
        } else {
            None
        }
    };
    if let (Some(p), Some(a)) = (bucket(&portfolio), bucket(&account_type)) {
        if p != a {
            ctx.builder.attach(t, "MISMATCH_PORTFOLIO_TYPE_VS_ACCOUNT_TYPE", "Portfolio Type and Account Type disagree on shape (revolving/installment/open)");
        }
    }
}

fn mismatch_collateral_indicator(t: &mut Tradeline, ctx: &RuleContext) {
    let secured = t.status("secured_indicator");
    let collateral = t.get_or_empty("collateral");
    let secured_yes = crate::coercion::is_boolish(&secured) || secured.contains("secured") || secured == "yes";
    let secured_no = crate::coercion::is_falseyish(&secured) || secured.contains("unsecured");
    if secured_yes && collateral.trim().is_empty() {
        ctx.builder.attach(t, "MISMATCH_COLLATERAL_INDICATOR", "Secured indicator set with no collateral description");
    } else if secured_no && !collateral.trim().is_empty() {
        ctx.builder.attach(t, "MISMATCH_COLLATERAL_INDICATOR", "Collateral described on an account marked unsecured");
    }
}

fn high_credit_exceeds_limit(t: &mut Tradeline, ctx: &RuleContext) {
    let limit = t.money("credit_limit");
    let high_credit = t.money("high_credit");
    if !limit.is_zero() && high_credit.exceeds(limit) {
        ctx.builder.attach(t, "HIGH_CREDIT_EXCEEDS_LIMIT", "High Credit exceeds the reported Credit Limit");
    }
}

fn non_zero_balance_with_zero_hi_credit(t: &mut Tradeline, ctx: &RuleContext) {
    let bucket = t.bucket();
    if !matches!(bucket, AccountTypeBucket::Revolving | AccountTypeBucket::Open) {
        return;
    }
    let balance = t.money("balance");
    let high_credit = t.money("high_credit");
    let limit = t.money("credit_limit");
    if !balance.is_zero() && high_credit.max(limit).is_zero() {
        ctx.builder.attach(t, "NON_ZERO_BALANCE_WITH_ZERO_HI_CREDIT", "Balance reported with no High Credit or Credit Limit on file");
    }
}

fn revolving_zero_limit_comment(t: &mut Tradeline, ctx: &RuleContext) {
    if t.bucket() != AccountTypeBucket::Revolving {
        return;
    }
    let status = t.account_status();
    if status.contains("closed") {
        return;
    }
    let limit = t.money("credit_limit");
    let high_credit = t.money("high_credit");
    let comments = t.comments();
    if limit.is_zero() && !high_credit.is_zero() && comments.contains("high credit") {
        ctx.builder.attach(t, "REVOLVING_ZERO_LIMIT_COMMENT", "Open revolving account has $0 limit while comments cite High Credit as a proxy");
    }
}

fn installment_has_limit(t: &mut Tradeline, ctx: &RuleContext) {
    if t.bucket() != AccountTypeBucket::Installment {
        return;
    }
    let limit = t.money("credit_limit");
    if !limit.is_zero() {
        ctx.builder.attach_with(
            t,
            "INSTALLMENT_HAS_LIMIT",
            "Installment account reports a revolving-style credit limit",
            &[("credit_limit", json!(limit.to_string()))],
        );
    }
}

fn revolving_missing_limit(t: &mut Tradeline, ctx: &RuleContext) {
    if t.bucket() != AccountTypeBucket::Revolving {
        return;
    }
    let status = t.account_status();
    if any_keyword(&status, &["closed", "paid"]) {
        return;
    }
    let limit = t.money("credit_limit");
    let high_credit = t.money("high_credit");
    if limit.is_zero() && high_credit.is_zero() {
        ctx.builder.attach(t, "REVOLVING_MISSING_LIMIT", "Open revolving tradeline missing both Credit Limit and High Credit");
    }
}

fn revolving_with_terms(t: &mut Tradeline, ctx: &RuleContext) {
    if t.bucket() != AccountTypeBucket::Revolving {
        return;
    }
    for field in ["terms", "term", "loan_term", "months_terms", "scheduled_payment_term"] {
        let value = t.get_or_empty(field);
        if value.chars().any(|c| c.is_ascii_digit()) {
            ctx.builder.attach_with(
                t,
                "REVOLVING_WITH_TERMS",
                "Revolving account reports an installment-style term length",
                &[("field", json!(field))],
            );
            break;
        }
    }
}

// ---------------------------------------------------------------------
// Dispute hygiene
// ---------------------------------------------------------------------

const VALID_DISPUTE_CODES: &[&str] = &["XB", "XC", "XD", "XH", "XR", "XS"];

fn compliance_condition_code_missing_on_dispute(t: &mut Tradeline, ctx: &RuleContext) {
    if !t.dispute_flag_true() {
        return;
    }
    let code = t.compliance_condition_code();
    if !VALID_DISPUTE_CODES.contains(&code.as_str()) {
        ctx.builder.attach(t, "COMPLIANCE_CONDITION_CODE_MISSING_ON_DISPUTE", "Dispute flag set without a valid compliance condition code");
    }
}

fn failure_to_correct_after_dispute(t: &mut Tradeline, ctx: &RuleContext) {
    if !t.dispute_flag_true() {
        return;
    }
    if let Some(last_reported) = t.date("last_reported") {
        if (ctx.today - last_reported.as_naive()).num_days() > ctx.config.dispute_stale_days {
            ctx.builder.attach(t, "failure_to_correct_after_dispute", "Account under dispute has not been updated since");
        }
    }
}

fn dispute_flag_not_cleared_after_resolution(t: &mut Tradeline, ctx: &RuleContext) {
    if !t.dispute_flag_true() {
        return;
    }
    let status = t.account_status();
    if any_keyword(&status, &["paid", "resolved", "closed", "settled"]) {
        ctx.builder.attach(t, "DISPUTE_FLAG_NOT_CLEARED_AFTER_RESOLUTION", "Dispute flag still set on an account reported as resolved");
    }
}

fn dispute_comment_needs_xb(t: &mut Tradeline, ctx: &RuleContext) {
    let comments = t.comments();
    if !any_keyword(&comments, &["dispute", "investigation"]) {
        return;
    }
    let code = t.compliance_condition_code();
    if code != "XB" {
        ctx.builder.attach(t, "DISPUTE_COMMENT_NEEDS_XB", "Dispute language in comments requires the XB compliance code");
    }
}

fn consumer_denies_account_ownership(t: &mut Tradeline, ctx: &RuleContext) {
    let assertion = t.status("consumer_assertion");
    if assertion != "not_mine" {
        return;
    }
    if !t.has("ownership_proof") {
        ctx.builder.attach(t, "consumer_denies_account_ownership", "Consumer disputes ownership and no proof of ownership is on file");
    }
}

fn post_dispute_update_no_correction(t: &mut Tradeline, ctx: &RuleContext) {
    let prior_dispute = crate::coercion::is_boolish(&t.get_or_empty("prior_dispute"));
    if !prior_dispute {
        return;
    }
    let Some(dispute_date) = t.date("dispute_date") else { return };
    let Some(last_reported) = t.date("last_reported") else { return };
    if last_reported <= dispute_date {
        return;
    }
    let material_changed = t.get_or_empty("material_fields_changed");
    if crate::coercion::is_falseyish(&material_changed) {
        ctx.builder.attach(t, "post_dispute_update_no_correction", "Account reported again after a dispute with no material field corrected");
    }
}

// ---------------------------------------------------------------------
// Collection specifics
// ---------------------------------------------------------------------

fn collection_high_credit_equals_balance(t: &mut Tradeline, ctx: &RuleContext) {
    if !t.bucket().is_collection() {
        return;
    }
    let balance = t.money("balance");
    if balance.is_zero() {
        return;
    }
    let high_credit = t.money("high_credit");
    if balance.approx_eq(high_credit) {
        ctx.builder.attach(t, "collection_high_credit_equals_balance", "Collection balance exactly matches High Credit");
    }
}

fn duplicate_collection_account(idx: usize, t: &mut Tradeline, ctx: &RuleContext) {
    if ctx.duplicate_collection_indices.contains(&idx) {
        ctx.builder.attach(t, "duplicate_collection_account", "Same debt reported as a collection by more than one furnisher");
    }
}

fn furnisher_identity_unclear(idx: usize, t: &mut Tradeline, ctx: &RuleContext) {
    if ctx.furnisher_unclear_indices.contains(&idx) {
        ctx.builder.attach(t, "furnisher_identity_unclear", "Same account number reported under more than one furnisher name");
    }
}

// ---------------------------------------------------------------------
// Utilization & dispute pendency (SPEC_FULL §4.6 addition, grounded in
// `audit_high_utilization`/`audit_stale_disputes`,
// original_source/metro2/audit_rules.py:227-245)
// ---------------------------------------------------------------------

fn high_utilization(t: &mut Tradeline, ctx: &RuleContext) {
    let limit = t.money("credit_limit");
    if limit.is_zero() {
        return;
    }
    let balance = t.money("balance");
    if balance.as_decimal() > limit.as_decimal() * dec!(0.9) {
        ctx.builder.attach(t, "HIGH_UTILIZATION", "Account balance exceeds 90% of the reported credit limit");
    }
}

fn dispute_pending_too_long(t: &mut Tradeline, ctx: &RuleContext) {
    let comments = t.comments();
    if comments.contains("dispute") && !comments.contains("resolved") {
        ctx.builder.attach(t, "DISPUTE_PENDING_TOO_LONG", "Dispute notation present in comments without resolution");
    }
}

// ---------------------------------------------------------------------
// Comment integrity
// ---------------------------------------------------------------------

fn comment_field_conflict(t: &mut Tradeline, ctx: &RuleContext) {
    let comment = t.comments();
    let balance = t.money("balance");
    if comment.contains("collection") && !t.bucket().is_collection() {
        ctx.builder.attach(t, "comment_field_conflict", "Comment mentions collection but the account type bucket disagrees");
    }
    if (comment.contains("paid") || comment.contains("settled")) && !balance.is_zero() {
        ctx.builder.attach(t, "comment_field_conflict", "Comment claims paid/settled but a balance is still reported");
    }
}
