//! Group-Scope Rules (C7): cross-bureau checks over an [`AccountGroup`]
//! (spec §4.7). Every finding is attached to *every* member of the group —
//! a cross-bureau inconsistency is a defect in the reporting as a whole,
//! not in any one bureau's copy.
//!
//! Grounded in `metro2_audit_multi.py`'s `r_cross_bureau_field_mismatch`
//! and `r_duplicate_account`.

use std::collections::{BTreeMap, BTreeSet};

use crate::grouping::{group_by_creditor, AccountGroup};
use crate::types::{Bureau, Tradeline};

use super::RuleContext;

/// Run every C7 predicate over every account group, attaching findings to
/// each member tradeline.
pub fn run_group_scope_rules(accounts: &mut [Tradeline], groups: &[AccountGroup], ctx: &RuleContext) {
    for group in groups {
        if group.members.len() < 2 {
            continue;
        }
        balance_mismatch(accounts, group, ctx);
        status_mismatch(accounts, group, ctx);
        open_date_mismatch(accounts, group, ctx);
        last_payment_mismatch(accounts, group, ctx);
        dofd_not_frozen(accounts, group, ctx);
        last_reported_mismatch(accounts, group, ctx);
        account_type_mismatch(accounts, group, ctx);
        open_closed_mismatch(accounts, group, ctx);
        payment_history_mismatch(accounts, group, ctx);
        incomplete_bureau_reporting(accounts, group, ctx);
        duplicate_account(accounts, group, ctx);
    }

    possible_mismatched_accounts_across_bureaus(accounts, groups, ctx);
}

fn attach_to_all(accounts: &mut [Tradeline], group: &AccountGroup, ctx: &RuleContext, rule_id: &str, title: &str) {
    for &idx in &group.members {
        ctx.builder.attach(&mut accounts[idx], rule_id, title);
    }
}

fn balance_mismatch(accounts: &mut [Tradeline], group: &AccountGroup, ctx: &RuleContext) {
    let balances: Vec<_> = group.members.iter().map(|&idx| accounts[idx].money("balance")).collect();
    let Some(&max) = balances.iter().max() else { return };
    let Some(&min) = balances.iter().min() else { return };
    if max.exceeds(min) {
        attach_to_all(accounts, group, ctx, "BALANCE_MISMATCH", "Balance reported inconsistently across bureaus for the same account");
        attach_to_all(accounts, group, ctx, "cross_bureau_balance_conflict", "Balance reported inconsistently across bureaus for the same account");
    }
}

fn status_mismatch(accounts: &mut [Tradeline], group: &AccountGroup, ctx: &RuleContext) {
    let statuses: BTreeSet<String> = group.members.iter().map(|&idx| accounts[idx].account_status()).collect();
    if statuses.len() > 1 {
        attach_to_all(accounts, group, ctx, "STATUS_MISMATCH", "Account status reported differently across bureaus");
    }
}

fn open_date_mismatch(accounts: &mut [Tradeline], group: &AccountGroup, ctx: &RuleContext) {
    let values: BTreeSet<String> = group
        .members
        .iter()
        .filter_map(|&idx| accounts[idx].get("date_opened"))
        .map(|raw| raw.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    if values.len() > 1 {
        attach_to_all(accounts, group, ctx, "OPEN_DATE_MISMATCH", "Date Opened disagrees across bureaus");
        attach_to_all(accounts, group, ctx, "open_date_mismatch", "Date Opened disagrees across bureaus");
    }
}

fn last_payment_mismatch(accounts: &mut [Tradeline], group: &AccountGroup, ctx: &RuleContext) {
    let values: BTreeSet<_> = group.members.iter().filter_map(|&idx| accounts[idx].date("date_of_last_payment")).collect();
    if values.len() > 1 {
        attach_to_all(accounts, group, ctx, "LAST_PAYMENT_MISMATCH_BETWEEN_BU", "Last payment date disagrees across bureaus");
    }
}

fn dofd_not_frozen(accounts: &mut [Tradeline], group: &AccountGroup, ctx: &RuleContext) {
    let dates: BTreeSet<_> = group.members.iter().filter_map(|&idx| accounts[idx].date("date_of_first_delinquency")).collect();
    if dates.len() > 1 {
        attach_to_all(accounts, group, ctx, "FIRST_DELINQUENCY_DATE_NOT_FROZEN", "DOFD must stay fixed once set but disagrees across bureaus");
        attach_to_all(accounts, group, ctx, "fcra_dofd_invalid", "DOFD must stay fixed once set but disagrees across bureaus");
    }
}

fn last_reported_mismatch(accounts: &mut [Tradeline], group: &AccountGroup, ctx: &RuleContext) {
    // Missing is its own distinct value here (spec §4.7), unlike
    // `open_date_mismatch`/`last_payment_mismatch` above, which simply
    // ignore absent entries.
    let values: BTreeSet<Option<_>> = group.members.iter().map(|&idx| accounts[idx].date("last_reported")).collect();
    if values.len() > 1 {
        attach_to_all(accounts, group, ctx, "LAST_REPORTED_MISMATCH", "Last Reported date disagrees across bureaus");
    }
}

fn account_type_mismatch(accounts: &mut [Tradeline], group: &AccountGroup, ctx: &RuleContext) {
    let values: BTreeSet<String> = group
        .members
        .iter()
        .filter_map(|&idx| accounts[idx].get("account_type"))
        .map(|raw| raw.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    if values.len() > 1 {
        attach_to_all(accounts, group, ctx, "ACCOUNT_TYPE_MISMATCH", "Account type reported differently across bureaus");
    }
}

fn open_closed_mismatch(accounts: &mut [Tradeline], group: &AccountGroup, ctx: &RuleContext) {
    let any_closed = group.members.iter().any(|&idx| accounts[idx].has("date_closed"));
    let any_open = group
        .members
        .iter()
        .any(|&idx| accounts[idx].account_status().contains("open") || accounts[idx].account_status().contains("current"));
    if any_closed && any_open {
        attach_to_all(accounts, group, ctx, "OPEN_CLOSED_MISMATCH", "One bureau reports the account closed while another reports it open/current");
    }
}

fn payment_history_mismatch(accounts: &mut [Tradeline], group: &AccountGroup, ctx: &RuleContext) {
    let mut by_date: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for &idx in &group.members {
        for (date, status) in accounts[idx].payment_history() {
            let Some(date) = date else { continue };
            by_date.entry(date.to_string()).or_default().insert(status);
        }
    }
    if by_date.values().any(|statuses| statuses.len() > 1) {
        attach_to_all(accounts, group, ctx, "PAYMENT_HISTORY_MISMATCH", "Payment history disagrees across bureaus for the same reporting month");
    }
}

fn incomplete_bureau_reporting(accounts: &mut [Tradeline], group: &AccountGroup, ctx: &RuleContext) {
    let bureaus: BTreeSet<Bureau> = group.members.iter().filter_map(|&idx| accounts[idx].bureau()).collect();
    if (1..3).contains(&bureaus.len()) {
        attach_to_all(accounts, group, ctx, "INCOMPLETE_BUREAU_REPORTING", "Account is not reported to all three major bureaus");
    }
}

fn duplicate_account(accounts: &mut [Tradeline], group: &AccountGroup, ctx: &RuleContext) {
    let mut seen: BTreeSet<Bureau> = BTreeSet::new();
    let mut duplicated = false;
    for &idx in &group.members {
        if let Some(bureau) = accounts[idx].bureau() {
            if !seen.insert(bureau) {
                duplicated = true;
            }
        }
    }
    if duplicated {
        attach_to_all(accounts, group, ctx, "DUPLICATE_ACCOUNT", "The same account is reported more than once to the same bureau");
    }
}

/// Within one creditor, multiple account-number clusters with wildly
/// differing balances/open dates are more likely to be distinct accounts
/// mis-attributed to the same creditor than duplicates — a softer, advisory
/// finding separate from `DUPLICATE_ACCOUNT` (spec §4.7).
fn possible_mismatched_accounts_across_bureaus(accounts: &mut [Tradeline], groups: &[AccountGroup], ctx: &RuleContext) {
    let by_creditor = group_by_creditor(accounts);
    let mut group_creditors: BTreeMap<String, usize> = BTreeMap::new();
    for group in groups {
        *group_creditors.entry(group.creditor_name.clone()).or_insert(0) += 1;
    }

    for (creditor, indices) in by_creditor {
        if indices.len() < 2 {
            continue;
        }
        let partitions = group_creditors.get(&creditor).copied().unwrap_or(0);
        if partitions < 2 {
            continue;
        }
        for &idx in &indices {
            ctx.builder.attach(
                &mut accounts[idx],
                "POSSIBLE_MISMATCHED_ACCOUNTS_ACROSS_BUREAUS",
                "Multiple distinct account-number clusters under the same creditor name — verify these describe the same account",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::grouping::group_into_account_groups;
    use crate::types::RuleRegistry;
    use crate::violations::ViolationBuilder;
    use serde_json::json;
    use std::collections::BTreeMap as FieldMap;

    fn tl(pairs: &[(&str, &str)]) -> Tradeline {
        let mut fields = FieldMap::new();
        for (k, v) in pairs {
            fields.insert(k.to_string(), json!(v));
        }
        Tradeline::new(fields)
    }

    #[test]
    fn balance_disagreement_flags_every_member() {
        let mut accounts = vec![
            tl(&[("creditor_name", "ALPHA"), ("account_number", "1234"), ("bureau", "TransUnion"), ("balance", "100.00")]),
            tl(&[("creditor_name", "ALPHA"), ("account_number", "1234"), ("bureau", "Experian"), ("balance", "500.00")]),
        ];
        let groups = group_into_account_groups(&accounts, 80);
        let registry = RuleRegistry::new();
        let builder = ViolationBuilder::new(&registry);
        let config = EngineConfig::default();
        let duplicate = BTreeSet::new();
        let furnisher = BTreeSet::new();
        let ctx = RuleContext {
            today: chrono::NaiveDate::from_ymd_opt(2026, 7, 26).unwrap(),
            config: &config,
            builder: &builder,
            duplicate_collection_indices: &duplicate,
            furnisher_unclear_indices: &furnisher,
        };
        run_group_scope_rules(&mut accounts, &groups, &ctx);
        assert!(accounts[0].violations.iter().any(|v| v.id == "BALANCE_MISMATCH"));
        assert!(accounts[1].violations.iter().any(|v| v.id == "BALANCE_MISMATCH"));
    }

    #[test]
    fn open_date_mismatch_flags_close_but_distinct_dates() {
        let mut accounts = vec![
            tl(&[("creditor_name", "ALPHA"), ("account_number", "1234"), ("bureau", "TransUnion"), ("date_opened", "05/01/2023")]),
            tl(&[("creditor_name", "ALPHA"), ("account_number", "1234"), ("bureau", "Experian"), ("date_opened", "05/20/2023")]),
        ];
        let groups = group_into_account_groups(&accounts, 80);
        let registry = RuleRegistry::new();
        let builder = ViolationBuilder::new(&registry);
        let config = EngineConfig::default();
        let duplicate = BTreeSet::new();
        let furnisher = BTreeSet::new();
        let ctx = RuleContext {
            today: chrono::NaiveDate::from_ymd_opt(2026, 7, 26).unwrap(),
            config: &config,
            builder: &builder,
            duplicate_collection_indices: &duplicate,
            furnisher_unclear_indices: &furnisher,
        };
        run_group_scope_rules(&mut accounts, &groups, &ctx);
        assert!(accounts[0].violations.iter().any(|v| v.id == "OPEN_DATE_MISMATCH"));
    }

    #[test]
    fn last_reported_mismatch_treats_missing_as_a_distinct_value() {
        let mut accounts = vec![
            tl(&[("creditor_name", "ALPHA"), ("account_number", "1234"), ("bureau", "TransUnion"), ("last_reported", "07/01/2025")]),
            tl(&[("creditor_name", "ALPHA"), ("account_number", "1234"), ("bureau", "Experian")]),
        ];
        let groups = group_into_account_groups(&accounts, 80);
        let registry = RuleRegistry::new();
        let builder = ViolationBuilder::new(&registry);
        let config = EngineConfig::default();
        let duplicate = BTreeSet::new();
        let furnisher = BTreeSet::new();
        let ctx = RuleContext {
            today: chrono::NaiveDate::from_ymd_opt(2026, 7, 26).unwrap(),
            config: &config,
            builder: &builder,
            duplicate_collection_indices: &duplicate,
            furnisher_unclear_indices: &furnisher,
        };
        run_group_scope_rules(&mut accounts, &groups, &ctx);
        assert!(accounts[0].violations.iter().any(|v| v.id == "LAST_REPORTED_MISMATCH"));
    }

    #[test]
    fn account_type_mismatch_compares_raw_values_not_buckets() {
        // "Auto Loan" and "Auto" both fold to the same bucket, but differ
        // as raw strings, so this should still fire (spec §4.7: "distinct
        // account_type values", not distinct buckets).
        let mut accounts = vec![
            tl(&[("creditor_name", "ALPHA"), ("account_number", "1234"), ("bureau", "TransUnion"), ("account_type", "Auto Loan")]),
            tl(&[("creditor_name", "ALPHA"), ("account_number", "1234"), ("bureau", "Experian"), ("account_type", "Auto")]),
        ];
        let groups = group_into_account_groups(&accounts, 80);
        let registry = RuleRegistry::new();
        let builder = ViolationBuilder::new(&registry);
        let config = EngineConfig::default();
        let duplicate = BTreeSet::new();
        let furnisher = BTreeSet::new();
        let ctx = RuleContext {
            today: chrono::NaiveDate::from_ymd_opt(2026, 7, 26).unwrap(),
            config: &config,
            builder: &builder,
            duplicate_collection_indices: &duplicate,
            furnisher_unclear_indices: &furnisher,
        };
        run_group_scope_rules(&mut accounts, &groups, &ctx);
        assert!(accounts[0].violations.iter().any(|v| v.id == "ACCOUNT_TYPE_MISMATCH"));
    }

    #[test]
    fn incomplete_bureau_reporting_fires_despite_intra_bureau_duplicate() {
        // [TU, TU, EXP] has 2 distinct bureaus (< 3), so this must fire
        // even though the group has 3 members (spec §4.7: "1 <= distinct
        // bureaus < 3", not a comparison against member count).
        let mut accounts = vec![
            tl(&[("creditor_name", "ALPHA"), ("account_number", "1234"), ("bureau", "TransUnion")]),
            tl(&[("creditor_name", "ALPHA"), ("account_number", "1234"), ("bureau", "TransUnion")]),
            tl(&[("creditor_name", "ALPHA"), ("account_number", "1234"), ("bureau", "Experian")]),
        ];
        let groups = group_into_account_groups(&accounts, 80);
        let registry = RuleRegistry::new();
        let builder = ViolationBuilder::new(&registry);
        let config = EngineConfig::default();
        let duplicate = BTreeSet::new();
        let furnisher = BTreeSet::new();
        let ctx = RuleContext {
            today: chrono::NaiveDate::from_ymd_opt(2026, 7, 26).unwrap(),
            config: &config,
            builder: &builder,
            duplicate_collection_indices: &duplicate,
            furnisher_unclear_indices: &furnisher,
        };
        run_group_scope_rules(&mut accounts, &groups, &ctx);
        assert!(accounts[0].violations.iter().any(|v| v.id == "INCOMPLETE_BUREAU_REPORTING"));
    }

    #[test]
    fn single_member_group_is_skipped() {
        let mut accounts = vec![tl(&[("creditor_name", "SOLO"), ("account_number", "1")])];
        let groups = group_into_account_groups(&accounts, 80);
        let registry = RuleRegistry::new();
        let builder = ViolationBuilder::new(&registry);
        let config = EngineConfig::default();
        let duplicate = BTreeSet::new();
        let furnisher = BTreeSet::new();
        let ctx = RuleContext {
            today: chrono::NaiveDate::from_ymd_opt(2026, 7, 26).unwrap(),
            config: &config,
            builder: &builder,
            duplicate_collection_indices: &duplicate,
            furnisher_unclear_indices: &furnisher,
        };
        run_group_scope_rules(&mut accounts, &groups, &ctx);
        assert!(accounts[0].violations.is_empty());
    }
}
