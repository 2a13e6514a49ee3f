//! A single bureau's view of a single account (spec §3).

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::coercion::{is_boolish, normalize_status};

use super::{AccountTypeBucket, Bureau, DateValue, Money, Violation};

fn default_true() -> bool {
    true
}

/// Fields that feed the account-type bucket classifier (spec §4.3).
const BUCKET_FIELDS: &[&str] = &[
    "account_type",
    "account_type_detail",
    "payment_status",
    "account_status",
    "comments",
];

/// One bureau's reported view of one account.
///
/// `fields` is the canonical key → value map produced by the field
/// normalizer (C2): arbitrary upstream casing/aliasing has already been
/// collapsed by the time rules run (spec §9 — "duck-typed field access ...
/// becomes a canonical Tradeline record with optional fields"). Typed
/// accessors below parse on demand rather than storing redundant typed
/// copies, so normalization (which only ever adds aliases, never
/// overwrites) stays the single source of truth.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tradeline {
    #[serde(flatten)]
    pub fields: BTreeMap<String, JsonValue>,

    #[serde(default)]
    pub violations: Vec<Violation>,

    /// Whether this bureau actually reported the account. Accounts with
    /// `present == false` are filtered out before normalization/rules run
    /// (spec §4.9 step 1) but are not removed from the payload.
    #[serde(default = "default_true")]
    pub present: bool,
}

impl Tradeline {
    pub fn new(fields: BTreeMap<String, JsonValue>) -> Self {
        Tradeline { fields, violations: Vec::new(), present: true }
    }

    /// Raw string value of a canonical field, if present and non-empty.
    pub fn get(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            JsonValue::Null => None,
            JsonValue::String(s) if s.trim().is_empty() => None,
            JsonValue::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn get_or_empty(&self, key: &str) -> String {
        self.get(key).unwrap_or_default()
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn money(&self, key: &str) -> Money {
        Money::parse(&self.get_or_empty(key))
    }

    pub fn date(&self, key: &str) -> Option<DateValue> {
        DateValue::parse(&self.get(key)?)
    }

    pub fn status(&self, key: &str) -> String {
        normalize_status(&self.get_or_empty(key))
    }

    pub fn creditor_name(&self) -> String {
        self.get_or_empty("creditor_name")
    }

    pub fn creditor_name_upper(&self) -> String {
        self.creditor_name().trim().to_ascii_uppercase()
    }

    pub fn bureau(&self) -> Option<Bureau> {
        Bureau::canonicalize(&self.get_or_empty("bureau"))
    }

    /// Account number stripped of non-alphanumerics and uppercased (spec
    /// §3, §4.2). Empty if no account number was reported.
    pub fn canonical_account_number(&self) -> String {
        canonicalize_account_number(&self.get_or_empty("account_number"))
    }

    pub fn account_status(&self) -> String {
        self.status("account_status")
    }

    pub fn payment_status(&self) -> String {
        self.status("payment_status")
    }

    /// `comments` and `special_comment` concatenated and normalized, so a
    /// single keyword search covers whichever field a given furnisher used.
    pub fn comments(&self) -> String {
        let mut combined = self.get_or_empty("comments");
        let special = self.get_or_empty("special_comment");
        if !special.is_empty() {
            if !combined.is_empty() {
                combined.push(' ');
            }
            combined.push_str(&special);
        }
        normalize_status(&combined)
    }

    pub fn ecoa_code(&self) -> String {
        self.status("ecoa_code")
    }

    pub fn compliance_condition_code(&self) -> String {
        self.get_or_empty("compliance_condition_code").trim().to_ascii_uppercase()
    }

    pub fn dispute_flag_true(&self) -> bool {
        is_boolish(&self.get_or_empty("dispute_flag"))
    }

    /// The derived account-type bucket (spec §4.3), computed from the
    /// classification/status fields shared with the grouper.
    pub fn bucket(&self) -> AccountTypeBucket {
        let values: Vec<&str> = BUCKET_FIELDS
            .iter()
            .map(|field| self.fields.get(*field).and_then(|v| v.as_str()).unwrap_or(""))
            .collect();
        AccountTypeBucket::derive(&values)
    }

    pub fn is_derogatory_status(&self) -> bool {
        let status = self.account_status();
        let payment = self.payment_status();
        let keywords = ["late", "collection", "charge", "derog"];
        keywords.iter().any(|k| status.contains(k) || payment.contains(k)) || self.bucket().is_collection()
    }

    /// Payment history entries as `(date, status)` pairs, accepted either
    /// as a sequence of `{date, status}` objects or a mapping from date
    /// string to status string (spec §3).
    pub fn payment_history(&self) -> Vec<(Option<DateValue>, String)> {
        let Some(value) = self.fields.get("payment_history") else { return Vec::new() };
        match value {
            JsonValue::Array(entries) => entries
                .iter()
                .filter_map(|entry| {
                    let obj = entry.as_object()?;
                    let date = obj.get("date").and_then(|v| v.as_str()).and_then(DateValue::parse);
                    let status = obj
                        .get("status")
                        .and_then(|v| v.as_str())
                        .map(normalize_status)
                        .unwrap_or_default();
                    Some((date, status))
                })
                .collect(),
            JsonValue::Object(map) => map
                .iter()
                .map(|(date_str, status)| {
                    (
                        DateValue::parse(date_str),
                        status.as_str().map(normalize_status).unwrap_or_default(),
                    )
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn payment_history_entries_after(&self, cutoff: DateValue) -> usize {
        self.payment_history()
            .into_iter()
            .filter(|(date, _)| date.is_some_and(|d| d > cutoff))
            .count()
    }
}

/// Strip non-alphanumerics and uppercase, the shared account-number
/// canonicalization used by both the normalizer and the grouper.
pub fn canonicalize_account_number(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tl(pairs: &[(&str, &str)]) -> Tradeline {
        let mut fields = BTreeMap::new();
        for (k, v) in pairs {
            fields.insert(k.to_string(), json!(v));
        }
        Tradeline::new(fields)
    }

    #[test]
    fn canonical_account_number_strips_punctuation() {
        let t = tl(&[("account_number", "1234-****-5678")]);
        assert_eq!(t.canonical_account_number(), "12345678");
    }

    #[test]
    fn payment_history_accepts_both_shapes() {
        let mut fields = BTreeMap::new();
        fields.insert(
            "payment_history".to_string(),
            json!([{"date": "01/01/2023", "status": "OK"}, {"date": "02/01/2023", "status": "Late"}]),
        );
        let t = Tradeline::new(fields);
        assert_eq!(t.payment_history().len(), 2);

        let mut fields2 = BTreeMap::new();
        fields2.insert("payment_history".to_string(), json!({"01/01/2023": "OK"}));
        let t2 = Tradeline::new(fields2);
        assert_eq!(t2.payment_history().len(), 1);
    }

    #[test]
    fn present_defaults_to_true() {
        let t = tl(&[]);
        assert!(t.present);
    }
}
