//! The rule engine: C6 (single-record), C7 (group-scope), and C8
//! (personal-info & inquiry) predicates, plus the shared evaluation
//! context they run under.

pub mod group_scope;
pub mod personal_inquiry;
pub mod single_record;

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::config::EngineConfig;
use crate::violations::ViolationBuilder;

/// Read-only context threaded through every rule invocation: today's date
/// (for staleness/obsolescence windows), the tunable config, the shared
/// violation builder, and a couple of cross-record fact sets computed once
/// up front so the handful of C6 rules that need whole-payload visibility
/// (`duplicate_collection_account`, `furnisher_identity_unclear`) don't
/// need a second mutable borrow of `accounts` while rules run.
pub struct RuleContext<'a> {
    pub today: NaiveDate,
    pub config: &'a EngineConfig,
    pub builder: &'a ViolationBuilder<'a>,
    pub duplicate_collection_indices: &'a BTreeSet<usize>,
    pub furnisher_unclear_indices: &'a BTreeSet<usize>,
}

pub use group_scope::run_group_scope_rules;
pub use personal_inquiry::{run_inquiry_rules, run_personal_info_rules};
pub use single_record::{compute_cross_record_facts, run_single_record_rules, CrossRecordFacts};
