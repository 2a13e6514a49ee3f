//! Account Key / Grouper (C3).
//!
//! Decides which per-bureau tradeline records describe the same
//! real-world account. A single key (creditor + account number) is
//! insufficient — bureaus mask account numbers differently or omit them —
//! so grouping uses a weighted pairwise similarity score instead (spec
//! §4.3).

use std::collections::BTreeMap;

use crate::types::{days_between, AccountTypeBucket, Tradeline};

/// Sentinel account-number key used for a partition whose first member
/// reported no account number at all.
pub const NO_ACCOUNT_NUMBER_SENTINEL: &str = "__NO_ACCOUNT_NUMBER__";

/// Minimum pairwise score for a record to join an existing partition
/// (spec §4.3, §9 — "a tuned constant; treat as a configuration value").
pub const DEFAULT_MATCH_THRESHOLD: i32 = 80;

/// A set of tradelines judged to describe one underlying account.
/// `members` holds indices into the original `accounts` slice so group
/// rules (C7) can attach violations back onto every member.
#[derive(Debug, Clone)]
pub struct AccountGroup {
    pub creditor_name: String,
    pub account_number: String,
    pub members: Vec<usize>,
}

/// Pairwise similarity score between two tradelines (spec §4.3).
///
/// Non-empty, *unequal* account numbers are a hard negative (-100): no
/// combination of the other positive signals (max 30 + 20 + 15 = 65) can
/// push the total back over the 80-point join threshold, so the
/// threshold check alone enforces "never group records with contradicting
/// account numbers" without a separate veto branch.
pub fn match_score(a: &Tradeline, b: &Tradeline) -> i32 {
    let mut score = 0;

    let acct_a = a.canonical_account_number();
    let acct_b = b.canonical_account_number();
    if !acct_a.is_empty() && !acct_b.is_empty() {
        score += if acct_a == acct_b { 80 } else { -100 };
    }

    if let (Some(opened_a), Some(opened_b)) = (a.date("date_opened"), b.date("date_opened")) {
        if days_between(opened_a.min(opened_b), opened_a.max(opened_b)) <= 30 {
            score += 30;
        }
    }

    if let (Some(reported_a), Some(reported_b)) = (a.date("last_reported"), b.date("last_reported")) {
        if days_between(reported_a.min(reported_b), reported_a.max(reported_b)) <= 60 {
            score += 20;
        }
    }

    if account_type_bucket(a) == account_type_bucket(b) {
        score += 15;
    }

    score
}

fn account_type_bucket(tradeline: &Tradeline) -> AccountTypeBucket {
    tradeline.bucket()
}

/// Partition every present tradeline into account groups.
///
/// Greedy and order-dependent (spec §4.3): tradelines are grouped per
/// creditor name (uppercased), then for each record within a creditor, the
/// best-scoring existing partition (by `max` pairwise score over its
/// current members) is joined if its score clears `threshold`; otherwise
/// the record starts a new partition.
pub fn group_into_account_groups(accounts: &[Tradeline], threshold: i32) -> Vec<AccountGroup> {
    let mut by_creditor: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (idx, account) in accounts.iter().enumerate() {
        if !account.present {
            continue;
        }
        by_creditor.entry(account.creditor_name_upper()).or_default().push(idx);
    }

    let mut groups = Vec::new();
    for (creditor_name, indices) in by_creditor {
        let mut partitions: Vec<Vec<usize>> = Vec::new();

        for idx in indices {
            let record = &accounts[idx];
            let mut best: Option<(usize, i32)> = None;
            for (p_index, partition) in partitions.iter().enumerate() {
                let score = partition
                    .iter()
                    .map(|&member_idx| match_score(record, &accounts[member_idx]))
                    .max()
                    .unwrap_or(i32::MIN);
                let is_better = match best {
                    Some((_, best_score)) => score > best_score,
                    None => true,
                };
                if is_better {
                    best = Some((p_index, score));
                }
            }

            match best {
                Some((p_index, score)) if score >= threshold => partitions[p_index].push(idx),
                _ => partitions.push(vec![idx]),
            }
        }

        for partition in partitions {
            let account_number = partition
                .first()
                .map(|&idx| accounts[idx].canonical_account_number())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| NO_ACCOUNT_NUMBER_SENTINEL.to_string());
            groups.push(AccountGroup { creditor_name: creditor_name.clone(), account_number, members: partition });
        }
    }

    groups
}

/// Group present tradelines by creditor name only (uppercased), ignoring
/// account number — used by `POSSIBLE_MISMATCHED_ACCOUNTS_ACROSS_BUREAUS`
/// (spec §4.7), which needs to see every account-number variant reported
/// under one creditor, not just the ones the §4.3 partitioner judged to be
/// the same account.
pub fn group_by_creditor(accounts: &[Tradeline]) -> BTreeMap<String, Vec<usize>> {
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (idx, account) in accounts.iter().enumerate() {
        if !account.present {
            continue;
        }
        groups.entry(account.creditor_name_upper()).or_default().push(idx);
    }
    groups
}

/// Group present tradelines by canonical account number only, ignoring
/// creditor name — used by `furnisher_identity_unclear` (spec §4.6), which
/// looks for the same account number reported under different furnisher
/// names.
pub fn group_by_account_number(accounts: &[Tradeline]) -> BTreeMap<String, Vec<usize>> {
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (idx, account) in accounts.iter().enumerate() {
        if !account.present {
            continue;
        }
        let acct = account.canonical_account_number();
        if acct.is_empty() {
            continue;
        }
        groups.entry(acct).or_default().push(idx);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn tl(pairs: &[(&str, &str)]) -> Tradeline {
        let mut fields = BTreeMap::new();
        for (k, v) in pairs {
            fields.insert(k.to_string(), json!(v));
        }
        Tradeline::new(fields)
    }

    #[test]
    fn matching_account_numbers_score_at_least_threshold() {
        let a = tl(&[("account_number", "1234"), ("creditor_name", "ALPHA")]);
        let b = tl(&[("account_number", "1234"), ("creditor_name", "ALPHA")]);
        assert!(match_score(&a, &b) >= DEFAULT_MATCH_THRESHOLD);
    }

    #[test]
    fn contradicting_account_numbers_never_group() {
        let a = tl(&[
            ("account_number", "1111"),
            ("creditor_name", "ALPHA"),
            ("date_opened", "01/01/2020"),
            ("last_reported", "01/01/2024"),
            ("account_type", "revolving"),
        ]);
        let b = tl(&[
            ("account_number", "2222"),
            ("creditor_name", "ALPHA"),
            ("date_opened", "01/02/2020"),
            ("last_reported", "01/02/2024"),
            ("account_type", "revolving"),
        ]);
        assert!(match_score(&a, &b) < DEFAULT_MATCH_THRESHOLD);
    }

    #[test]
    fn groups_respect_creditor_and_threshold() {
        let accounts = vec![
            tl(&[("creditor_name", "ALPHA BANK"), ("account_number", "1234"), ("bureau", "TransUnion")]),
            tl(&[("creditor_name", "ALPHA BANK"), ("account_number", "1234"), ("bureau", "Experian")]),
            tl(&[("creditor_name", "BETA CREDIT"), ("account_number", "9999"), ("bureau", "Equifax")]),
        ];
        let groups = group_into_account_groups(&accounts, DEFAULT_MATCH_THRESHOLD);
        assert_eq!(groups.len(), 2);
        let alpha_group = groups.iter().find(|g| g.creditor_name == "ALPHA BANK").unwrap();
        assert_eq!(alpha_group.members.len(), 2);
    }
}
