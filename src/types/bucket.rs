//! Account-type bucket classification, shared by the grouper (C3) and rules
//! that need to reason about what kind of account a tradeline describes
//! (C6/C7) rather than re-deriving it per call site (SPEC_FULL §3).

use serde::{Deserialize, Serialize};

/// A coarse classification derived from keyword search over
/// `account_type`, `account_type_detail`, `payment_status`,
/// `account_status`, and `comments` (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountTypeBucket {
    StudentLoan,
    Collection,
    Auto,
    Mortgage,
    Installment,
    Revolving,
    Open,
    Undetermined,
}

impl AccountTypeBucket {
    /// Derive the bucket from the relevant free-text fields of a tradeline,
    /// in priority order: a collection notation always wins over a generic
    /// "installment"/"revolving" keyword since collections are frequently
    /// reported on repurposed account-type codes.
    pub fn derive(fields: &[&str]) -> Self {
        let haystack = fields.join(" ").to_ascii_lowercase();
        let has = |kw: &str| haystack.contains(kw);

        if has("collection") {
            AccountTypeBucket::Collection
        } else if has("student") || has("education") {
            AccountTypeBucket::StudentLoan
        } else if has("mortgage") || has("real estate") || has("heloc") {
            AccountTypeBucket::Mortgage
        } else if has("auto") || has("vehicle") || has("automobile") {
            AccountTypeBucket::Auto
        } else if has("installment") {
            AccountTypeBucket::Installment
        } else if has("revolving") || has("credit card") {
            AccountTypeBucket::Revolving
        } else if has("open") {
            AccountTypeBucket::Open
        } else {
            AccountTypeBucket::Undetermined
        }
    }

    pub fn is_collection(self) -> bool {
        matches!(self, AccountTypeBucket::Collection)
    }
}
