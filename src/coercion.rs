//! Status/comment normalization and boolean coercion (C1: Value Coercion).
//!
//! These are the non-numeric, non-date halves of value coercion: lowercase
//! + whitespace collapse for free-text status fields (spec §4.1, no
//! lemmatization — rules use substring tests like `"charge" in status`),
//! and a permissive true/false reading of heterogeneous dispute-flag
//! sources.

/// Lowercase, trim, and collapse internal whitespace. Used on
/// `account_status`, `payment_status`, `comments`, and similar free-text
/// fields before any keyword search.
pub fn normalize_status(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

const TRUE_ISH: &[&str] = &["true", "1", "yes", "y", "open", "active", "dispute"];
const FALSE_ISH: &[&str] = &["false", "0", "no", "n"];

/// Permissive truthiness used to interpret dispute flags from heterogeneous
/// sources. Anything not in the false-ish set reads as true-ish.
pub fn is_falseyish(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    FALSE_ISH.contains(&lowered.as_str()) || raw.trim() == "False"
}

/// Strict boolean coercion: true only for a recognized true-ish token,
/// false for everything else (including unrecognized tokens).
pub fn is_boolish(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    TRUE_ISH.contains(&lowered.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_status_collapses_whitespace_and_case() {
        assert_eq!(normalize_status("  Charge   OFF  "), "charge off");
    }

    #[test]
    fn boolish_recognizes_truthy_tokens() {
        for tok in ["true", "1", "yes", "y", "open", "active", "dispute", "TRUE", " Yes "] {
            assert!(is_boolish(tok), "expected {tok:?} to be true-ish");
        }
        assert!(!is_boolish("maybe"));
        assert!(!is_boolish(""));
    }

    #[test]
    fn falseyish_recognizes_false_tokens() {
        for tok in ["false", "0", "no", "n", "False"] {
            assert!(is_falseyish(tok), "expected {tok:?} to be false-ish");
        }
        assert!(!is_falseyish("true"));
        assert!(!is_falseyish("maybe"));
    }
}
