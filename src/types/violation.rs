//! The `Violation` record emitted by rules (spec §3) and its metadata
//! registry (C4, spec §4.4).

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, BTreeSet};

use super::Severity;

/// A single finding produced by a rule.
///
/// `id` is a stable ASCII identifier; downstream consumers (dispute-letter
/// templates, UI) dispatch on it by exact match, so renaming one is a
/// breaking change (spec §6). Duplicate-same-rule firings on the same
/// record are permitted — a rule may emit multiple findings with distinct
/// `extra` payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub id: String,
    pub title: String,
    pub severity: Severity,
    pub fcra_section: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub requires: Vec<String>,
    /// Rule-specific detail (e.g. the fields that disagreed, the bureau
    /// involved). Flattened alongside the fixed fields on serialization so
    /// the wire shape matches the rulebook's `extra{}` contract (spec §3).
    #[serde(flatten)]
    pub extra: BTreeMap<String, JsonValue>,
}

/// Default metadata applied when a rule fires with an id absent from the
/// registry (spec §4.4, §7): `{minor, "FCRA §607(b)"}`.
pub const DEFAULT_SEVERITY: Severity = Severity::Minor;
pub const DEFAULT_FCRA_SECTION: &str = "FCRA §607(b)";

/// Metadata describing one rule id: severity, statute section, optional
/// category, and advisory `requires` fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMeta {
    pub severity: Severity,
    pub fcra_section: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub requires: Vec<String>,
}

impl RuleMeta {
    pub fn new(severity: Severity, fcra_section: impl Into<String>) -> Self {
        RuleMeta {
            severity,
            fcra_section: fcra_section.into(),
            category: None,
            requires: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_requires(mut self, requires: &[&str]) -> Self {
        self.requires = requires.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// The static mapping rule-id → metadata (C4). A read-only singleton built
/// once at process start, optionally overlaid with an externalized
/// rulebook JSON (spec §6).
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    entries: BTreeMap<String, RuleMeta>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        RuleRegistry { entries: BTreeMap::new() }
    }

    pub fn insert(&mut self, rule_id: impl Into<String>, meta: RuleMeta) {
        self.entries.insert(rule_id.into(), meta);
    }

    /// Look up metadata for a rule id, falling back to the documented
    /// defaults (minor / §607(b)) when the id isn't registered.
    pub fn lookup(&self, rule_id: &str) -> RuleMeta {
        self.entries
            .get(rule_id)
            .cloned()
            .unwrap_or_else(|| RuleMeta::new(DEFAULT_SEVERITY, DEFAULT_FCRA_SECTION))
    }

    pub fn known_ids(&self) -> BTreeSet<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse an externalized rulebook JSON of the shape documented in spec
    /// §6: `{rule_id: {violation, severity, fcraSection, fieldsImpacted, rule?}}`.
    /// `severity` may be the string form (`"minor"`) or the legacy numeric
    /// scale (`3..5`) used by the source's pre-Metro-2 rule runner.
    pub fn from_rulebook_json(json: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawSeverity {
            Text(String),
            Numeric(i64),
        }

        #[derive(Deserialize)]
        struct RawEntry {
            #[serde(default)]
            severity: Option<RawSeverity>,
            #[serde(default, alias = "fcra_section")]
            #[serde(rename = "fcraSection")]
            fcra_section: Option<String>,
            #[serde(default)]
            category: Option<String>,
            #[serde(default, rename = "fieldsImpacted")]
            fields_impacted: Vec<String>,
        }

        let raw: BTreeMap<String, RawEntry> = serde_json::from_str(json)?;
        let mut registry = RuleRegistry::new();
        for (rule_id, entry) in raw {
            let severity = match entry.severity {
                Some(RawSeverity::Text(s)) => match s.to_ascii_lowercase().as_str() {
                    "major" => Severity::Major,
                    "moderate" => Severity::Moderate,
                    _ => Severity::Minor,
                },
                Some(RawSeverity::Numeric(n)) => match n {
                    5 => Severity::Major,
                    4 => Severity::Moderate,
                    _ => Severity::Minor,
                },
                None => DEFAULT_SEVERITY,
            };
            let mut meta = RuleMeta::new(
                severity,
                entry.fcra_section.unwrap_or_else(|| DEFAULT_FCRA_SECTION.to_string()),
            );
            meta.category = entry.category;
            meta.requires = entry.fields_impacted;
            registry.insert(rule_id, meta);
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_rule_gets_default_metadata() {
        let registry = RuleRegistry::new();
        let meta = registry.lookup("SOME_UNKNOWN_RULE");
        assert_eq!(meta.severity, Severity::Minor);
        assert_eq!(meta.fcra_section, "FCRA §607(b)");
    }

    #[test]
    fn rulebook_json_overlays_defaults() {
        let json = r#"{
            "BALANCE_MISMATCH": {"violation": "Balance mismatch", "severity": "major", "fcraSection": "FCRA §607(b)"},
            "LEGACY_CODE_3": {"violation": "legacy", "severity": 5, "fcraSection": "FCRA §611(a)(1)"}
        }"#;
        let registry = RuleRegistry::from_rulebook_json(json).unwrap();
        assert_eq!(registry.lookup("BALANCE_MISMATCH").severity, Severity::Major);
        assert_eq!(registry.lookup("LEGACY_CODE_3").severity, Severity::Major);
        assert_eq!(registry.lookup("UNSEEN").severity, Severity::Minor);
    }
}
