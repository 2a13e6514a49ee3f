//! Audit Orchestrator (C9).
//!
//! The single entry point that ties C1-C8 together into the fixed
//! six-step sequence spec §4.9 names: filter present accounts, normalize,
//! run single-record and group-scope rules in a fixed registration order,
//! run personal-info and inquiry rules once each, and write the two
//! top-level `*_violations` lists. Given the same payload the orchestrator
//! produces byte-identical violation sets in identical order every time.
//!
//! # Usage
//!
//! ```rust,ignore
//! use metro2_audit_engine::{run_audit, AuditPayload};
//!
//! let audited = run_audit(payload);
//! println!("{} accounts audited", audited.accounts.len());
//! ```

use crate::config::EngineConfig;
use crate::grouping::group_into_account_groups;
use crate::normalize::normalize_tradeline;
use crate::rules::{compute_cross_record_facts, run_group_scope_rules, run_inquiry_rules, run_personal_info_rules, run_single_record_rules, RuleContext};
use crate::types::AuditPayload;
use crate::violations::ViolationBuilder;
use crate::AuditError;

/// Run a full audit with the default [`EngineConfig`].
///
/// See [`run_audit_with_config`] to override match thresholds or staleness
/// windows, or to supply an externalized rulebook overlay.
pub fn run_audit(payload: AuditPayload) -> AuditPayload {
    run_audit_with_config(payload, EngineConfig::default())
}

/// Run a full audit with a caller-supplied [`EngineConfig`].
///
/// Never fails: unparseable fields simply don't satisfy the rules that
/// depend on them (spec §7 — "the engine never raises"). The only failure
/// mode for this crate is malformed JSON at the FFI boundary, handled by
/// [`run_audit_json`].
pub fn run_audit_with_config(mut payload: AuditPayload, config: EngineConfig) -> AuditPayload {
    log::info!("metro2 audit starting: {} accounts, {} inquiries", payload.accounts.len(), payload.inquiries.len());
    let start = std::time::Instant::now();

    let today = chrono::Local::now().date_naive();

    // Step 1 + 2: normalize every account that's actually present. Absent
    // accounts are left untouched in place, never removed (spec §4.9).
    for account in payload.accounts.iter_mut() {
        if account.present {
            normalize_tradeline(account);
        }
    }

    let facts = compute_cross_record_facts(&payload.accounts);
    let groups = group_into_account_groups(&payload.accounts, config.match_threshold);
    let builder = ViolationBuilder::new(&config.registry);
    let ctx = RuleContext {
        today,
        config: &config,
        builder: &builder,
        duplicate_collection_indices: &facts.duplicate_collection_indices,
        furnisher_unclear_indices: &facts.furnisher_unclear_indices,
    };

    // Step 3: single-record rules, then group-scope rules, in that fixed
    // order. Ordering within a record follows each rule function's own
    // internal dispatch order (see `rules::single_record::run_single_record_rules`).
    for (idx, account) in payload.accounts.iter_mut().enumerate() {
        if account.present {
            run_single_record_rules(idx, account, &ctx);
        }
    }
    run_group_scope_rules(&mut payload.accounts, &groups, &ctx);

    // Step 4 + 5: personal-info and inquiry rules run once each, over the
    // whole payload rather than per-record.
    let personal_info_violations = run_personal_info_rules(&payload.personal_information, &ctx);
    let inquiry_violations = run_inquiry_rules(&payload.inquiries, &payload.accounts, &ctx);

    // Step 6: write the two top-level violation lists and return.
    payload.personal_info_violations = personal_info_violations;
    payload.inquiry_violations = inquiry_violations;

    let duration_ms = start.elapsed().as_millis() as u64;
    log::info!(
        "metro2 audit completed in {}ms: {} tradeline violations, {} inquiry violations, {} personal-info violations",
        duration_ms,
        payload.accounts.iter().map(|a| a.violations.len()).sum::<usize>(),
        payload.inquiry_violations.len(),
        payload.personal_info_violations.len(),
    );

    payload
}

/// Run an audit from a JSON-encoded payload (FFI/API convenience).
///
/// This is the one place in the engine where [`AuditError`] can surface:
/// deserializing the input or serializing the output. Rule evaluation
/// itself never fails (spec §7).
pub fn run_audit_json(payload_json: &str) -> Result<String, AuditError> {
    let payload: AuditPayload = serde_json::from_str(payload_json).map_err(AuditError::deserialize)?;
    let audited = run_audit(payload);
    serde_json::to_string(&audited).map_err(AuditError::serialize)
}

/// Run an audit from a JSON-encoded payload, overlaying an externalized
/// rulebook JSON (spec §6) onto the default registry first.
pub fn run_audit_json_with_rulebook(payload_json: &str, rulebook_json: &str) -> Result<String, AuditError> {
    let payload: AuditPayload = serde_json::from_str(payload_json).map_err(AuditError::deserialize)?;
    let config = EngineConfig::default().with_rulebook_json(rulebook_json);
    let audited = run_audit_with_config(payload, config);
    serde_json::to_string(&audited).map_err(AuditError::serialize)
}

/// Get engine version information.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Get engine build information.
pub fn engine_info() -> EngineInfo {
    EngineInfo {
        version: env!("CARGO_PKG_VERSION"),
        name: env!("CARGO_PKG_NAME"),
        features: get_enabled_features(),
    }
}

/// Engine build information.
#[derive(Debug, Clone)]
pub struct EngineInfo {
    pub version: &'static str,
    pub name: &'static str,
    pub features: Vec<&'static str>,
}

fn get_enabled_features() -> Vec<&'static str> {
    let mut features = vec![];
    #[cfg(feature = "audit_trace")]
    features.push("audit_trace");
    #[cfg(feature = "strict_validation")]
    features.push("strict_validation");
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tradeline;
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
    fn engine_version_is_non_empty() {
        assert!(!engine_version().is_empty());
    }

    #[test]
    fn engine_info_reports_package_name() {
        let info = engine_info();
        assert_eq!(info.name, "metro2-audit-engine");
    }

    #[test]
    fn run_audit_normalizes_and_fires_rules() {
        let payload = AuditPayload {
            accounts: vec![tl(&[
                ("creditor_name", "Alpha Bank"),
                ("account_status", "current"),
                ("past_due", "150.00"),
                ("date_opened", "01/01/2020"),
            ])],
            ..Default::default()
        };
        let audited = run_audit(payload);
        assert!(audited.accounts[0].violations.iter().any(|v| v.id == "CURRENT_STATUS_WITH_PAST_DUE"));
    }

    #[test]
    fn absent_accounts_are_skipped_but_retained() {
        let mut account = tl(&[("creditor_name", "Beta Credit")]);
        account.present = false;
        let payload = AuditPayload { accounts: vec![account], ..Default::default() };
        let audited = run_audit(payload);
        assert_eq!(audited.accounts.len(), 1);
        assert!(audited.accounts[0].violations.is_empty());
    }

    #[test]
    fn run_audit_json_round_trips() {
        let payload_json = r#"{"accounts":[{"creditor_name":"Alpha Bank"}],"inquiries":[],"personal_information":{}}"#;
        let result = run_audit_json(payload_json);
        assert!(result.is_ok());
    }

    #[test]
    fn run_audit_json_reports_deserialize_errors() {
        let result = run_audit_json("not json");
        assert!(result.is_err());
    }
}
