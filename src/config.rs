//! Engine configuration (ambient, SPEC_FULL §2).
//!
//! Carries the tunable constants spec §9's Open Questions call out as
//! configuration rather than hard-coded magic numbers: the grouping
//! match-score threshold, and the staleness/obsolescence windows used
//! throughout C6/C7. Defaults match the values named in spec §4.3 and
//! §4.6.

use crate::types::RuleRegistry;

/// Tunable windows and thresholds for one audit run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum pairwise match score (spec §4.3) for two tradelines to be
    /// placed in the same account group. Default 80.
    pub match_threshold: i32,
    /// `STALE_DATA`: days since `last_reported` before a tradeline is
    /// considered stale. Default 365.
    pub stale_data_days: i64,
    /// `STALE_ACTIVE_REPORTING` / `NO_ACTIVITY_TOO_LONG_ACTIVE`: years since
    /// last payment on an active-status account. Default 3.
    pub stale_active_years: i64,
    /// `STAGNANT_ACCOUNT_NOT_UPDATED`: years since last payment on a
    /// current/late account. Default 5.
    pub stagnant_years: i64,
    /// `PAYMENT_STALENESS_INCONSISTENT_WITH_STATUS`: days since last
    /// payment on a "current" account. Default 120.
    pub payment_staleness_days: i64,
    /// `DOFD_OBSOLETE_7Y`: years from DOFD before a derogatory item is
    /// past the statutory obsolescence window. Default 7.
    pub dofd_obsolescence_years: i64,
    /// `REAGING_WITHOUT_PROOF`: a DOFD younger than this many days is
    /// suspicious. Default 180.
    pub reaging_window_days: i64,
    /// `EXTENDED_DELINQUENCY_BEYOND_MAX`: maximum plausible days-past-due.
    /// Default 180.
    pub max_days_past_due: i64,
    /// `failure_to_correct_after_dispute`: days since `last_reported`
    /// after a dispute flag before "no update" is flagged. Default 30.
    pub dispute_stale_days: i64,
    /// The rule metadata registry for this run: the built-in registry
    /// (`registry::default_registry`), optionally overlaid by an
    /// externalized rulebook JSON (spec §6).
    pub registry: RuleRegistry,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            match_threshold: 80,
            stale_data_days: 365,
            stale_active_years: 3,
            stagnant_years: 5,
            payment_staleness_days: 120,
            dofd_obsolescence_years: 7,
            reaging_window_days: 180,
            max_days_past_due: 180,
            dispute_stale_days: 30,
            registry: crate::registry::default_registry(),
        }
    }
}

impl EngineConfig {
    /// Overlay an externalized rulebook JSON (spec §6) onto the built-in
    /// registry. If the rulebook is missing or fails to parse, the engine
    /// falls back to defaults and emits no error (spec §7).
    pub fn with_rulebook_json(mut self, json: &str) -> Self {
        match RuleRegistry::from_rulebook_json(json) {
            Ok(overlay) => {
                for id in overlay.known_ids() {
                    self.registry.insert(id.clone(), overlay.lookup(&id));
                }
            }
            Err(err) => {
                log::warn!("rulebook JSON failed to parse, falling back to built-in defaults: {err}");
            }
        }
        self
    }
}
