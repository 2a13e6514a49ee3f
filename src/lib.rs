//! # Metro-2 / FCRA Compliance Audit Engine
//!
//! A pure Rust rules engine for auditing normalized consumer credit
//! reports against Metro-2 reporting conventions and FCRA furnisher
//! duties. Provides deterministic, precise findings for:
//!
//! - **Field coercion** - lossy bureau-export strings become typed money,
//!   dates, and statuses without ever aborting an audit
//! - **Cross-bureau grouping** - deciding which per-bureau tradelines
//!   describe the same underlying account
//! - **~70 rule predicates** - single-record, group-scope, and
//!   personal-info/inquiry checks, each tagged with a stable id, severity,
//!   and FCRA statute section
//!
//! ## Architecture
//!
//! ```text
//! AuditPayload -> normalize (C2)
//!              -> group accounts (C3)
//!              -> single-record rules (C6)
//!              -> group-scope rules (C7)
//!              -> personal-info & inquiry rules (C8)
//!              -> AuditPayload (violations attached)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use metro2_audit_engine::{run_audit, AuditPayload};
//!
//! let audited = run_audit(payload);
//! for account in &audited.accounts {
//!     for violation in &account.violations {
//!         println!("{}: {}", violation.id, violation.title);
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod coercion;
pub mod config;
pub mod engine;
pub mod grouping;
pub mod normalize;
pub mod registry;
pub mod rules;
pub mod summary;
pub mod types;
pub mod violations;

use thiserror::Error;

/// Errors surfaced only at the JSON/FFI boundary (spec §7 — "the engine
/// never raises" during rule evaluation; the only failure modes are
/// malformed input/output serialization).
#[derive(Error, Debug)]
pub enum AuditError {
    /// The input JSON did not deserialize into an `AuditPayload`.
    #[error("failed to parse audit payload: {message}")]
    Deserialize {
        /// The underlying `serde_json` error message.
        message: String,
    },
    /// The audited payload failed to serialize back to JSON.
    #[error("failed to serialize audit result: {message}")]
    Serialize {
        /// The underlying `serde_json` error message.
        message: String,
    },
}

impl AuditError {
    /// Wrap a `serde_json` deserialization failure.
    pub fn deserialize(err: serde_json::Error) -> Self {
        AuditError::Deserialize { message: err.to_string() }
    }

    /// Wrap a `serde_json` serialization failure.
    pub fn serialize(err: serde_json::Error) -> Self {
        AuditError::Serialize { message: err.to_string() }
    }
}

/// `Result` alias for fallible operations at the audit engine's JSON boundary.
pub type AuditResult<T> = Result<T, AuditError>;

// Re-export the data model.
pub use types::{
    AccountTypeBucket, AuditPayload, Bureau, DateValue, Inquiry, Money, PersonalInfo, RuleMeta, RuleRegistry, Severity, Tradeline, Violation,
};

// Re-export the orchestrator.
pub use engine::{engine_info, engine_version, run_audit, run_audit_json, run_audit_json_with_rulebook, run_audit_with_config, EngineInfo};

pub use config::EngineConfig;
pub use summary::{render_summary, AuditSummary, InquirySummaryEntry, PersonalInfoSummaryEntry, TradelineSummaryEntry};

/// Prelude module for convenient imports.
pub mod prelude {
    //! Commonly used types and functions.
    //!
    //! ```rust,ignore
    //! use metro2_audit_engine::prelude::*;
    //! ```

    pub use crate::config::EngineConfig;
    pub use crate::engine::{run_audit, run_audit_json, run_audit_with_config};
    pub use crate::types::{AuditPayload, Money, Severity, Tradeline, Violation};
    pub use crate::{AuditError, AuditResult};
}
