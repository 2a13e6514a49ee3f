//! Violation Builder (C5).
//!
//! `attach` appends a `Violation` to a record's violation list, filling in
//! severity/FCRA-section/category/requires from the metadata registry
//! (C4) so rule code only ever asserts *that* something fired, never *how
//! severe* it is (spec §4.5). `has` lets a rule consult whether another
//! rule already fired on the same record, used by the handful of rules
//! that deliberately suppress a softer finding once a stronger one has
//! landed (spec §4.5 — e.g. `LAST_PAYMENT_AFTER_DOFD` suppresses
//! `PAYMENT_BEFORE_DELINQUENCY_IMPLIES_CURE`).

use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::types::{RuleRegistry, Tradeline, Violation};

/// Binds rule evaluation to the process-wide rule metadata registry.
/// Cheap to construct; held for the duration of one audit.
pub struct ViolationBuilder<'a> {
    registry: &'a RuleRegistry,
}

impl<'a> ViolationBuilder<'a> {
    pub fn new(registry: &'a RuleRegistry) -> Self {
        ViolationBuilder { registry }
    }

    fn build(&self, rule_id: &str, title: impl Into<String>, extra: BTreeMap<String, JsonValue>) -> Violation {
        let meta = self.registry.lookup(rule_id);
        Violation {
            id: rule_id.to_string(),
            title: title.into(),
            severity: meta.severity,
            fcra_section: meta.fcra_section,
            category: meta.category,
            requires: meta.requires,
            extra,
        }
    }

    /// Attach a bare violation (no extra detail) to a record.
    pub fn attach(&self, record: &mut Tradeline, rule_id: &str, title: impl Into<String>) {
        let violation = self.build(rule_id, title, BTreeMap::new());
        record.violations.push(violation);
    }

    /// Attach a violation carrying rule-specific detail fields.
    pub fn attach_with(
        &self,
        record: &mut Tradeline,
        rule_id: &str,
        title: impl Into<String>,
        extra: &[(&str, JsonValue)],
    ) {
        let map: BTreeMap<String, JsonValue> =
            extra.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        let violation = self.build(rule_id, title, map);
        record.violations.push(violation);
    }

    /// A free-standing violation not attached to any one record (inquiry
    /// and personal-info findings, spec §4.8).
    pub fn standalone(&self, rule_id: &str, title: impl Into<String>, extra: &[(&str, JsonValue)]) -> Violation {
        let map: BTreeMap<String, JsonValue> =
            extra.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        self.build(rule_id, title, map)
    }
}

/// Whether `rule_id` has already fired on this record.
pub fn has(record: &Tradeline, rule_id: &str) -> bool {
    record.violations.iter().any(|v| v.id == rule_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RuleMeta, Severity};
    use std::collections::BTreeMap as Map;

    #[test]
    fn attach_fills_metadata_from_registry() {
        let mut registry = RuleRegistry::new();
        registry.insert("TEST_RULE", RuleMeta::new(Severity::Major, "FCRA §607(b)"));
        let builder = ViolationBuilder::new(&registry);
        let mut record = Tradeline::new(Map::new());
        builder.attach(&mut record, "TEST_RULE", "Test violation");
        assert_eq!(record.violations.len(), 1);
        assert_eq!(record.violations[0].severity, Severity::Major);
        assert!(has(&record, "TEST_RULE"));
        assert!(!has(&record, "OTHER_RULE"));
    }

    #[test]
    fn unregistered_rule_gets_defaults() {
        let registry = RuleRegistry::new();
        let builder = ViolationBuilder::new(&registry);
        let mut record = Tradeline::new(Map::new());
        builder.attach(&mut record, "UNREGISTERED", "Something happened");
        assert_eq!(record.violations[0].severity, Severity::Minor);
        assert_eq!(record.violations[0].fcra_section, "FCRA §607(b)");
    }

    #[test]
    fn duplicate_same_rule_firings_are_permitted() {
        let registry = RuleRegistry::new();
        let builder = ViolationBuilder::new(&registry);
        let mut record = Tradeline::new(Map::new());
        builder.attach_with(&mut record, "DATE_ORDER_SANITY", "Bad date A", &[("field", serde_json::json!("date_closed"))]);
        builder.attach_with(&mut record, "DATE_ORDER_SANITY", "Bad date B", &[("field", serde_json::json!("last_reported"))]);
        assert_eq!(record.violations.len(), 2);
    }
}
