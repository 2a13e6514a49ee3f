//! Credit bureau enumeration and label canonicalization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three national consumer reporting agencies.
///
/// Canonicalized from any case/whitespace variant a furnisher or bureau
/// export happens to use (`"transunion"`, `" TransUnion "`, `"TRANSUNION"`
/// all resolve to [`Bureau::TransUnion`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Bureau {
    TransUnion,
    Experian,
    Equifax,
}

impl Bureau {
    /// Canonicalize a free-form bureau label. Returns `None` if the label
    /// doesn't match one of the three bureaus under any known variant.
    pub fn canonicalize(label: &str) -> Option<Self> {
        let key: String = label
            .trim()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "transunion" | "tu" => Some(Bureau::TransUnion),
            "experian" | "exp" => Some(Bureau::Experian),
            "equifax" | "eqf" | "efx" => Some(Bureau::Equifax),
            _ => None,
        }
    }

    /// Canonical display label, e.g. `"TransUnion"`.
    pub fn label(self) -> &'static str {
        match self {
            Bureau::TransUnion => "TransUnion",
            Bureau::Experian => "Experian",
            Bureau::Equifax => "Equifax",
        }
    }
}

impl fmt::Display for Bureau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_case_and_whitespace_variants() {
        assert_eq!(Bureau::canonicalize("transunion"), Some(Bureau::TransUnion));
        assert_eq!(Bureau::canonicalize("TRANSUNION"), Some(Bureau::TransUnion));
        assert_eq!(Bureau::canonicalize(" TransUnion "), Some(Bureau::TransUnion));
        assert_eq!(Bureau::canonicalize("Experian"), Some(Bureau::Experian));
        assert_eq!(Bureau::canonicalize("EQUIFAX"), Some(Bureau::Equifax));
    }

    #[test]
    fn rejects_unknown_labels() {
        assert_eq!(Bureau::canonicalize("innovis"), None);
        assert_eq!(Bureau::canonicalize(""), None);
    }

    #[test]
    fn label_round_trips() {
        assert_eq!(Bureau::TransUnion.label(), "TransUnion");
        assert_eq!(Bureau::canonicalize(Bureau::TransUnion.label()), Some(Bureau::TransUnion));
    }
}
