//! Field Normalizer (C2).
//!
//! Canonicalizes a tradeline's field names from whatever casing/punctuation
//! the upstream parser produced, fills canonical fields from a fixed
//! synonym table when the canonical key is absent or empty, and
//! canonicalizes bureau labels. Normalization is idempotent and
//! order-independent (spec §4.2 contract, tested below and in
//! `AuditPayload` property tests in `tests/`).

use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::types::{Bureau, Tradeline};

/// `(canonical_field, [synonym, ...])`. Non-exhaustive, mirrors spec §4.2.
///
/// Resolution of an ambiguity in the distilled spec (documented in
/// DESIGN.md): `monthly_payment` is treated as canonical per spec §3's data
/// model ("monthly_payment (aliased from scheduled_payment_amount and
/// siblings)"), with `scheduled_payment_amount` as one of its synonyms,
/// rather than the reverse direction spec §4.2's prose example suggests.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("account_number", &["account_#", "acct#", "acct_no", "account_no", "acct_number"]),
    ("balance", &["balance_amount", "current_balance"]),
    (
        "date_of_last_payment",
        &["date_last_payment", "last_payment_date", "last_payment"],
    ),
    (
        "date_of_first_delinquency",
        &["date_first_delinquency", "dofd"],
    ),
    (
        "monthly_payment",
        &["scheduled_payment_amount", "payment_amount", "regular_payment_amount"],
    ),
    ("bureau", &["credit_bureau"]),
    ("past_due", &["past_due_amount"]),
    ("high_credit", &["high_credit_amount"]),
    ("credit_limit", &["credit_limit_amount"]),
    ("account_type_detail", &["account_type_-_detail"]),
    ("ecoa_code", &["ecoa", "responsibility"]),
    ("original_creditor", &["original_creditor_name"]),
    ("comments", &["comment"]),
    ("special_comment", &["special_comments"]),
    ("date_of_first_delinquency", &["dofd_date"]),
    ("compliance_condition_code", &["ccc", "compliance_code"]),
];

/// Lowercase a field name and replace runs of non-alphanumeric characters
/// with `_`, matching spec §4.2's canonical-key derivation exactly.
pub fn canonical_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_sep = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }
    out.trim_matches('_').to_string()
}

fn is_blank(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Strip non-printing whitespace (anything `char::is_control` besides the
/// ASCII space that everyday values legitimately contain).
fn strip_non_printing(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::String(s) => {
            let cleaned: String = s.chars().filter(|c| !c.is_control() || *c == ' ').collect();
            JsonValue::String(cleaned)
        }
        other => other.clone(),
    }
}

/// Normalize a tradeline's fields in place (spec §4.2). Safe to call more
/// than once: re-running has no additional effect (idempotence, spec §8
/// invariant 2), and an alias copy never overwrites an already-present,
/// non-empty canonical key (invariant 3).
pub fn normalize_tradeline(tradeline: &mut Tradeline) {
    // Step 1: alias every key to its canonical form.
    let original_keys: Vec<(String, JsonValue)> = tradeline
        .fields
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let mut aliased: BTreeMap<String, JsonValue> = BTreeMap::new();
    for (key, value) in original_keys {
        let cleaned = strip_non_printing(&value);
        let canon = canonical_key(&key);
        if canon != key && !tradeline.fields.contains_key(&canon) {
            aliased.entry(canon).or_insert_with(|| cleaned.clone());
        }
        // The original key itself is also cleaned of non-printing whitespace.
        if let Some(slot) = tradeline.fields.get_mut(&key) {
            *slot = cleaned;
        }
    }
    for (key, value) in aliased {
        tradeline.fields.entry(key).or_insert(value);
    }

    // Step 2: synonym fill-in. A canonical key that is present and
    // non-empty is never overwritten (spec §8 invariant 3).
    for (canonical, synonyms) in SYNONYMS {
        let canonical_is_populated = tradeline
            .fields
            .get(*canonical)
            .is_some_and(|v| !is_blank(v));
        if canonical_is_populated {
            continue;
        }
        for synonym in *synonyms {
            if let Some(value) = tradeline.fields.get(*synonym) {
                if !is_blank(value) {
                    let value = value.clone();
                    tradeline.fields.insert(canonical.to_string(), value);
                    break;
                }
            }
        }
    }

    // Step 3: bureau label canonicalization.
    if let Some(JsonValue::String(raw)) = tradeline.fields.get("bureau").cloned() {
        if let Some(bureau) = Bureau::canonicalize(&raw) {
            tradeline
                .fields
                .insert("bureau".to_string(), JsonValue::String(bureau.label().to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tradeline_from(pairs: &[(&str, &str)]) -> Tradeline {
        let mut fields = BTreeMap::new();
        for (k, v) in pairs {
            fields.insert(k.to_string(), json!(v));
        }
        Tradeline::new(fields)
    }

    #[test]
    fn canonical_key_collapses_punctuation() {
        assert_eq!(canonical_key("Account #"), "account");
        assert_eq!(canonical_key("Date Opened:"), "date_opened");
        assert_eq!(canonical_key("ACCT_NO"), "acct_no");
    }

    #[test]
    fn synonym_fills_absent_canonical_field() {
        let mut t = tradeline_from(&[("date_last_payment", "01/01/2023")]);
        normalize_tradeline(&mut t);
        assert_eq!(t.get("date_of_last_payment").as_deref(), Some("01/01/2023"));
    }

    #[test]
    fn existing_canonical_field_is_never_overwritten() {
        let mut t = tradeline_from(&[
            ("date_of_last_payment", "02/02/2023"),
            ("date_last_payment", "01/01/2023"),
        ]);
        normalize_tradeline(&mut t);
        assert_eq!(t.get("date_of_last_payment").as_deref(), Some("02/02/2023"));
    }

    #[test]
    fn bureau_label_canonicalizes() {
        let mut t = tradeline_from(&[("bureau", " transunion ")]);
        normalize_tradeline(&mut t);
        assert_eq!(t.get("bureau").as_deref(), Some("TransUnion"));
    }

    #[test]
    fn normalization_is_idempotent() {
        let mut t = tradeline_from(&[("Account #", "1234"), ("Date Last Payment", "01/01/2023")]);
        normalize_tradeline(&mut t);
        let once = t.fields.clone();
        normalize_tradeline(&mut t);
        assert_eq!(t.fields, once);
    }
}
