//! Calendar date parsing (C1: Value Coercion).
//!
//! Metro-2 date fields arrive in a grab-bag of formats depending on which
//! bureau or furnisher produced them. [`DateValue::parse`] tries a fixed,
//! ordered list of formats (spec §4.1) and never errors — anything it can't
//! place becomes "absent" (`None` from the caller's point of view), and
//! rules that depend on the value simply don't fire (spec §7).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar date with no time-of-day component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateValue(NaiveDate);

const SENTINELS: &[&str] = &["-", "--", "n/a", "na", "not reported"];

/// `strptime`-style formats tried in order after the ISO8601 fast path.
/// Formats without a day component (`%b %Y`, `%B %Y`) are handled specially
/// since `chrono::NaiveDate` requires a day to parse.
const DAY_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%m/%d/%y",
    "%Y-%m-%d",
    "%m-%d-%Y",
    "%Y%m%d",
    "%b %d, %Y",
    "%B %d, %Y",
];

const MONTH_YEAR_FORMATS: &[&str] = &["%b %Y", "%B %Y"];

impl DateValue {
    pub fn new(date: NaiveDate) -> Self {
        DateValue(date)
    }

    pub fn as_naive(self) -> NaiveDate {
        self.0
    }

    /// Parse a bureau date string. Returns `None` ("absent") for sentinel
    /// strings, blank input, or anything none of the ordered formats match.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if SENTINELS.contains(&trimmed.to_ascii_lowercase().as_str()) {
            return None;
        }

        if let Some(date) = Self::parse_iso8601(trimmed) {
            return Some(DateValue(date));
        }

        // A timestamp with a `T` or embedded space separator: retry just the
        // date portion against the short (dateonly) formats.
        let date_portion = trimmed
            .split(['T', ' '])
            .next()
            .unwrap_or(trimmed);

        for fmt in DAY_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
                return Some(DateValue(date));
            }
            if date_portion != trimmed {
                if let Ok(date) = NaiveDate::parse_from_str(date_portion, fmt) {
                    return Some(DateValue(date));
                }
            }
        }

        for fmt in MONTH_YEAR_FORMATS {
            let padded = format!("01 {trimmed}");
            let padded_fmt = format!("%d {fmt}");
            if let Ok(date) = NaiveDate::parse_from_str(&padded, &padded_fmt) {
                return Some(DateValue(date));
            }
        }

        None
    }

    /// ISO8601 with optional offset, truncated to the date portion.
    /// `Z` is normalized to `+00:00` and a missing colon in the offset
    /// (`+0000`) is repaired before delegating to `DateTime::parse_from_rfc3339`.
    fn parse_iso8601(raw: &str) -> Option<NaiveDate> {
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(date);
        }

        let mut candidate = raw.to_string();
        if candidate.ends_with('Z') {
            candidate.truncate(candidate.len() - 1);
            candidate.push_str("+00:00");
        }
        if let Some(offset_start) = find_offset_start(&candidate) {
            let (dt_part, offset_part) = candidate.split_at(offset_start);
            if offset_part.len() == 5 && !offset_part.contains(':') {
                candidate = format!("{dt_part}{}:{}", &offset_part[..3], &offset_part[3..]);
            }
        }

        chrono::DateTime::parse_from_rfc3339(&candidate)
            .ok()
            .map(|dt| dt.date_naive())
    }
}

/// Find the byte index where a `+HH:MM`/`+HHMM` timezone offset begins,
/// searching from the `T` separator onward so we don't mistake a `-` in the
/// date portion (`2023-05-15`) for an offset sign.
fn find_offset_start(s: &str) -> Option<usize> {
    let t_index = s.find('T')?;
    s[t_index..]
        .find(['+', '-'])
        .map(|idx| t_index + idx)
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Whole-day difference helpers used throughout the rule set.
pub fn days_between(earlier: DateValue, later: DateValue) -> i64 {
    (later.as_naive() - earlier.as_naive()).num_days()
}

pub fn days_since(today: NaiveDate, date: DateValue) -> i64 {
    (today - date.as_naive()).num_days()
}

pub fn is_stale(today: NaiveDate, date: DateValue, years: i64) -> bool {
    days_since(today, date) > years * 365
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso8601_and_slash_format_agree() {
        let iso = DateValue::parse("2023-05-15T00:00:00Z").unwrap();
        let slash = DateValue::parse("05/15/2023").unwrap();
        assert_eq!(iso, slash);
    }

    #[test]
    fn sentinels_parse_to_absent() {
        for s in ["-", "--", "n/a", "NA", "Not Reported", "", "  "] {
            assert_eq!(DateValue::parse(s), None, "expected absent for {s:?}");
        }
    }

    #[test]
    fn month_year_only_formats_parse() {
        assert!(DateValue::parse("Jan 2020").is_some());
        assert!(DateValue::parse("January 2020").is_some());
    }

    #[test]
    fn offset_repair_handles_missing_colon() {
        let a = DateValue::parse("2023-05-15T10:00:00+0000").unwrap();
        let b = DateValue::parse("2023-05-15").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn staleness_helpers() {
        let today = NaiveDate::from_ymd_opt(2026, 7, 26).unwrap();
        let same_day = DateValue::new(today);
        assert_eq!(days_since(today, same_day), 0);
        assert!(!is_stale(today, same_day, 2));

        let two_years_and_a_day_ago = DateValue::new(today - chrono::Duration::days(2 * 365 + 1));
        assert!(is_stale(today, two_years_and_a_day_ago, 2));
    }
}
