//! Summary Renderer (C10, spec §4.10).
//!
//! Turns an audited [`AuditPayload`] into a structured report: a
//! personal-info section, one entry per tradeline (creditor, bureau,
//! balance, status, violation list), and an inquiry section. Within each
//! entry, violations are sorted severity-descending (major -> moderate ->
//! minor); ties keep the rule-dispatch order they were attached in, since
//! `sort_by_key` is stable.

use std::cmp::Reverse;

use crate::types::{AuditPayload, Money, Severity, Violation};

/// One tradeline's worth of summary detail.
#[derive(Debug, Clone)]
pub struct TradelineSummaryEntry {
    /// The furnisher/creditor name as reported.
    pub creditor_name: String,
    /// The reporting bureau, if it canonicalized.
    pub bureau: Option<String>,
    /// The reported balance.
    pub balance: Money,
    /// The normalized account status.
    pub account_status: String,
    /// Violations for this tradeline, severity-descending.
    pub violations: Vec<Violation>,
}

/// One bureau's personal-information block, unchanged save for being
/// lifted out of the raw map for rendering.
#[derive(Debug, Clone)]
pub struct PersonalInfoSummaryEntry {
    /// The bureau label as received.
    pub bureau: String,
    /// The reported name, if any.
    pub name: Option<String>,
    /// The reported address, if any.
    pub address: Option<String>,
}

/// One inquiry entry as rendered in the report.
#[derive(Debug, Clone)]
pub struct InquirySummaryEntry {
    /// The inquiring creditor's name.
    pub creditor_name: String,
    /// The date of the inquiry, as reported.
    pub date_of_inquiry: String,
    /// The bureau that recorded the inquiry.
    pub credit_bureau: String,
}

/// The full structured report produced from one audited payload.
#[derive(Debug, Clone)]
pub struct AuditSummary {
    /// Per-bureau personal-information entries.
    pub personal_information: Vec<PersonalInfoSummaryEntry>,
    /// One entry per tradeline, in the order they appear in the payload.
    pub tradelines: Vec<TradelineSummaryEntry>,
    /// Every recorded inquiry.
    pub inquiries: Vec<InquirySummaryEntry>,
    /// Standalone violations not attached to any one tradeline.
    pub personal_info_violations: Vec<Violation>,
    /// Standalone inquiry-reconciliation violations.
    pub inquiry_violations: Vec<Violation>,
}

fn sorted_violations(violations: &[Violation]) -> Vec<Violation> {
    let mut sorted = violations.to_vec();
    sorted.sort_by_key(|v| Reverse(v.severity));
    sorted
}

/// Render a structured report from an audited payload (spec §4.10). Does
/// not itself run the audit — call [`crate::run_audit`] first.
pub fn render_summary(payload: &AuditPayload) -> AuditSummary {
    let personal_information = payload
        .personal_information
        .iter()
        .map(|(bureau, fields)| PersonalInfoSummaryEntry {
            bureau: bureau.clone(),
            name: fields.get("name").cloned(),
            address: fields.get("address").cloned(),
        })
        .collect();

    let tradelines = payload
        .accounts
        .iter()
        .filter(|account| account.present)
        .map(|account| TradelineSummaryEntry {
            creditor_name: account.creditor_name(),
            bureau: account.bureau().map(|b| b.label().to_string()),
            balance: account.money("balance"),
            account_status: account.account_status(),
            violations: sorted_violations(&account.violations),
        })
        .collect();

    let inquiries = payload
        .inquiries
        .iter()
        .map(|inquiry| InquirySummaryEntry {
            creditor_name: inquiry.creditor_name.clone(),
            date_of_inquiry: inquiry.date_of_inquiry.clone(),
            credit_bureau: inquiry.credit_bureau.clone(),
        })
        .collect();

    AuditSummary {
        personal_information,
        tradelines,
        inquiries,
        personal_info_violations: sorted_violations(&payload.personal_info_violations),
        inquiry_violations: sorted_violations(&payload.inquiry_violations),
    }
}
