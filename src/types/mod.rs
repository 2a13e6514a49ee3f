//! Data model for the Metro-2 / FCRA compliance audit engine.
//!
//! # Module Organization
//!
//! - `bureau` - the closed `{TransUnion, Experian, Equifax}` enumeration
//! - `money` - non-negative fixed-point currency (C1)
//! - `date` - calendar-date parsing across Metro-2's many formats (C1)
//! - `bucket` - the account-type bucket classifier shared by C3/C6/C7
//! - `severity` - violation severity bands, ordered for C10's sort
//! - `violation` - `Violation`, `RuleMeta`, and the `RuleRegistry` (C4)
//! - `tradeline` - one bureau's view of one account, and its typed accessors
//! - `inquiry` - a recorded third-party file access
//! - `payload` - the top-level `AuditPayload` and `PersonalInfo` map

pub mod bucket;
pub mod bureau;
pub mod date;
pub mod inquiry;
pub mod money;
pub mod payload;
pub mod severity;
pub mod tradeline;
pub mod violation;

pub use bucket::AccountTypeBucket;
pub use bureau::Bureau;
pub use date::{days_between, days_since, is_stale, DateValue};
pub use inquiry::Inquiry;
pub use money::Money;
pub use payload::{AuditPayload, PersonalInfo};
pub use severity::Severity;
pub use tradeline::{canonicalize_account_number, Tradeline};
pub use violation::{RuleMeta, RuleRegistry, Violation, DEFAULT_FCRA_SECTION, DEFAULT_SEVERITY};
