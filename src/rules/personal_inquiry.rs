//! Personal-Info & Inquiry Rules (C8, spec §4.8).
//!
//! These two rule families don't walk tradelines; `run_personal_info_rules`
//! scans the `personal_information` bureau map directly, and
//! `run_inquiry_rules` reconciles the inquiry list against creditor names
//! already present among the tradelines. Both return free-standing
//! violations rather than attaching to any one record — there's no single
//! tradeline a name mismatch or an unlinked inquiry "belongs" to.

use std::collections::BTreeSet;

use crate::types::{Inquiry, PersonalInfo, Tradeline, Violation};

use super::RuleContext;

/// `NAME_MISMATCH` / `ADDRESS_MISMATCH`: distinct case-folded values for
/// `name` / `address` across the bureaus that reported personal
/// information at all.
pub fn run_personal_info_rules(personal_information: &PersonalInfo, ctx: &RuleContext) -> Vec<Violation> {
    let mut violations = Vec::new();

    let names: BTreeSet<String> = personal_information
        .values()
        .filter_map(|fields| fields.get("name"))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();
    if names.len() > 1 {
        violations.push(ctx.builder.standalone("NAME_MISMATCH", "Consumer name reported differently across bureaus", &[]));
    }

    let addresses: BTreeSet<String> = personal_information
        .values()
        .filter_map(|fields| fields.get("address"))
        .map(|address| address.trim().to_ascii_lowercase())
        .filter(|address| !address.is_empty())
        .collect();
    if addresses.len() > 1 {
        violations.push(ctx.builder.standalone("ADDRESS_MISMATCH", "Consumer address reported differently across bureaus", &[]));
    }

    violations
}

/// `INQUIRY_NO_MATCH`: for each inquiry, if its creditor name (lowercased)
/// does not start with any tradeline creditor name (lowercased), emit a
/// violation. Deliberately a prefix test, not equality — inquiry labels are
/// frequently truncated versions of the furnisher's full name (spec §4.8,
/// §9).
pub fn run_inquiry_rules(inquiries: &[Inquiry], accounts: &[Tradeline], ctx: &RuleContext) -> Vec<Violation> {
    let creditor_names: Vec<String> = accounts
        .iter()
        .filter(|a| a.present)
        .map(|a| a.creditor_name().trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    let mut violations = Vec::new();
    for inquiry in inquiries {
        let inquiry_name = inquiry.creditor_name.trim().to_ascii_lowercase();
        if inquiry_name.is_empty() {
            continue;
        }
        let matched = creditor_names.iter().any(|creditor| inquiry_name.starts_with(creditor.as_str()));
        if !matched {
            violations.push(ctx.builder.standalone(
                "INQUIRY_NO_MATCH",
                format!("Inquiry from \"{}\" does not correspond to any reported tradeline", inquiry.creditor_name),
                &[
                    ("creditor_name", serde_json::json!(inquiry.creditor_name)),
                    ("date_of_inquiry", serde_json::json!(inquiry.date_of_inquiry)),
                    ("credit_bureau", serde_json::json!(inquiry.credit_bureau)),
                ],
            ));
        }
    }
    violations
}
