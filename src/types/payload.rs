//! The top-level audited payload (spec §3).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Inquiry, Tradeline, Violation};

/// `Bureau -> {field_name -> value}`, e.g. `personal_information["TransUnion"]["name"]`.
/// Keyed by the raw bureau label as received — canonicalization happens at
/// rule-evaluation time (C8), not on ingestion, since the label itself may
/// be one of the fields under audit.
pub type PersonalInfo = BTreeMap<String, BTreeMap<String, String>>;

/// The engine's complete input/output contract (spec §3, §6). The engine
/// mutates only `violations` on each tradeline and the two top-level
/// `*_violations` fields; every other part of an input payload is returned
/// unchanged (spec §5 "Mutation discipline").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditPayload {
    pub accounts: Vec<Tradeline>,
    #[serde(default)]
    pub inquiries: Vec<Inquiry>,
    #[serde(default)]
    pub personal_information: PersonalInfo,
    #[serde(default)]
    pub inquiry_violations: Vec<Violation>,
    #[serde(default)]
    pub personal_info_violations: Vec<Violation>,
}
