//! Violation severity bands.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a violation is. Ordered `Major > Moderate > Minor` so C10's
/// severity-descending sort (spec §4.10) is a plain `sort_by_key` rather than
/// a bespoke comparator duplicated at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Moderate,
    Major,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Minor => "minor",
            Severity::Moderate => "moderate",
            Severity::Major => "major",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_major_highest() {
        let mut severities = vec![Severity::Minor, Severity::Major, Severity::Moderate];
        severities.sort();
        assert_eq!(severities, vec![Severity::Minor, Severity::Moderate, Severity::Major]);
    }
}
