//! Monetary value parsing and representation (C1: Value Coercion).
//!
//! Bureau exports are lossy — a balance field might read `"$1,234.56"`,
//! `"1234.56"`, `"N/A"`, or nothing at all. [`Money::parse`] never fails:
//! anything it can't make sense of becomes `0.00` rather than aborting the
//! audit, per spec §4.1 and §7 ("a parse failure yields 0.00 rather than an
//! error").

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A non-negative fixed-point monetary amount, rounded to 2 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

/// Comparisons between amounts tolerate a 1-cent gap (spec §1: "currency
/// values are compared with a fixed tolerance (1 cent)").
pub const TOLERANCE: Decimal = dec!(0.01);

impl Money {
    pub const ZERO: Money = Money(dec!(0));

    #[inline]
    pub fn from_decimal(value: Decimal) -> Self {
        Money(value.round_dp(2))
    }

    /// Parse a bureau-export money string, tolerant of currency glyphs,
    /// thousands separators, and sign noise.
    ///
    /// Algorithm (spec §4.1): strip everything but digits, `.`, `+`, `-`.
    /// Empty, a lone sign, or a lone dot parses to `0.00`; so does any other
    /// failure to parse the remainder as a fixed-point number.
    pub fn parse(raw: &str) -> Self {
        let stripped: String = raw
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-'))
            .collect();

        if stripped.is_empty() || stripped == "+" || stripped == "-" || stripped == "." {
            return Money::ZERO;
        }

        match stripped.parse::<Decimal>() {
            Ok(value) => Money(value.round_dp(2)),
            Err(_) => Money::ZERO,
        }
    }

    #[inline]
    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == dec!(0)
    }

    /// True if `self <= threshold`, allowing for the 1-cent comparison tolerance.
    #[inline]
    pub fn le_within_tolerance(self, threshold: Decimal) -> bool {
        self.0 <= threshold + TOLERANCE
    }

    /// True if `self > other` by more than the 1-cent tolerance.
    #[inline]
    pub fn exceeds(self, other: Money) -> bool {
        self.0 > other.0 + TOLERANCE
    }

    /// Approximate equality within the 1-cent tolerance.
    #[inline]
    pub fn approx_eq(self, other: Money) -> bool {
        (self.0 - other.0).abs() <= TOLERANCE
    }

    #[inline]
    pub fn max(self, other: Money) -> Money {
        if self.0 >= other.0 { self } else { other }
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::ZERO
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money::from_decimal(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money::from_decimal(self.0 - rhs.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_currency_formatted_strings() {
        assert_eq!(Money::parse("$1,234.56").as_decimal(), dec!(1234.56));
        assert_eq!(Money::parse("1234.56").as_decimal(), dec!(1234.56));
        assert_eq!(Money::parse("$0.00").as_decimal(), dec!(0));
    }

    #[test]
    fn unparseable_values_fall_back_to_zero() {
        assert_eq!(Money::parse("-"), Money::ZERO);
        assert_eq!(Money::parse(""), Money::ZERO);
        assert_eq!(Money::parse("."), Money::ZERO);
        assert_eq!(Money::parse("n/a"), Money::ZERO);
        assert_eq!(Money::parse("+"), Money::ZERO);
    }

    #[test]
    fn tolerance_absorbs_one_cent_noise() {
        let a = Money::parse("100.00");
        let b = Money::parse("100.01");
        assert!(a.approx_eq(b));
        assert!(!a.exceeds(b));
        let c = Money::parse("100.02");
        assert!(c.exceeds(a));
    }
}
