use std::{fmt, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::EntryError;

/// Dollar amount backed by a `Decimal`, so a suggested donation can be
/// exactly half of an odd-cent purchase.
///
/// Only `Display` and [`fixed`](Self::fixed) round (two decimals). Sums go
/// through [`checked_add`](Self::checked_add) and
/// [`checked_sum`](Self::checked_sum) since the decimal range is finite.
///
/// # Examples
///
/// ```rust
/// use engine::Amount;
///
/// let amount: Amount = "12.345".parse().unwrap();
/// assert_eq!(amount.to_string(), "$12.35");
/// assert_eq!(amount.fixed(), "12.35");
/// assert_eq!(amount.half().value().to_string(), "6.1725");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator):
///
/// ```rust
/// use engine::Amount;
///
/// assert_eq!("10,5".parse::<Amount>().unwrap().fixed(), "10.50");
/// assert!("ten".parse::<Amount>().is_err());
/// assert!("NaN".parse::<Amount>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    #[must_use]
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the exact decimal value.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` if the amount is strictly greater than 0.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Exactly 50% of the amount.
    #[must_use]
    pub fn half(self) -> Amount {
        Amount(self.0 * Decimal::new(5, 1))
    }

    /// Two-decimal rendering without currency symbol (`"20.00"`).
    #[must_use]
    pub fn fixed(self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("{rounded:.2}")
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Sum of `amounts`, or `None` if it leaves the decimal range.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Amount>) -> Option<Amount> {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |total, amount| total.checked_add(amount))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fixed = self.fixed();
        match fixed.strip_prefix('-') {
            Some(abs) => write!(f, "-${abs}"),
            None => write!(f, "${fixed}"),
        }
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Amount> for Decimal {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl FromStr for Amount {
    type Err = EntryError;

    /// Parses a decimal string.
    ///
    /// Accepts `.` or `,` as decimal separator, surrounding whitespace and an
    /// optional leading `+`/`-`. Sign is kept: positivity is checked by
    /// [`validation::parse_positive_amount`](crate::validation::parse_positive_amount).
    ///
    /// Validation rules:
    /// - rejects empty strings
    /// - rejects anything but digits and a single separator (so no `NaN`,
    ///   `inf`, exponents or trailing text)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EntryError::InvalidAmount("empty amount".to_string());
        let invalid = || EntryError::InvalidAmount(format!("\"{}\" is not a number", s.trim()));

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest = rest.trim().replace(',', ".");
        if rest.is_empty() {
            return Err(empty());
        }

        let mut parts = rest.split('.');
        let units = parts.next().ok_or_else(invalid)?;
        let fraction = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }
        if units.is_empty() && fraction.is_none_or(str::is_empty) {
            return Err(invalid());
        }
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if !all_digits(units) || !fraction.is_none_or(all_digits) {
            return Err(invalid());
        }

        let normalized = match fraction {
            Some(frac) if !frac.is_empty() => {
                let units = if units.is_empty() { "0" } else { units };
                format!("{units}.{frac}")
            }
            _ => units.to_string(),
        };
        let value = Decimal::from_str(&normalized)
            .map_err(|_| EntryError::InvalidAmount("amount too large".to_string()))?;

        Ok(Amount(if negative { -value } else { value }))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn display_formats_dollars() {
        assert_eq!(Amount::ZERO.to_string(), "$0.00");
        assert_eq!(Amount::new(dec!(0.1)).to_string(), "$0.10");
        assert_eq!(Amount::new(dec!(20)).to_string(), "$20.00");
        assert_eq!(Amount::new(dec!(0.005)).to_string(), "$0.01");
        assert_eq!(Amount::new(dec!(-5)).to_string(), "-$5.00");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<Amount>().unwrap().value(), dec!(10));
        assert_eq!("10.5".parse::<Amount>().unwrap().value(), dec!(10.5));
        assert_eq!("10,50".parse::<Amount>().unwrap().value(), dec!(10.50));
        assert_eq!(".5".parse::<Amount>().unwrap().value(), dec!(0.5));
        assert_eq!("7.".parse::<Amount>().unwrap().value(), dec!(7));
        assert_eq!("-0.01".parse::<Amount>().unwrap().value(), dec!(-0.01));
        assert_eq!("  +2.30 ".parse::<Amount>().unwrap().value(), dec!(2.30));
    }

    #[test]
    fn parse_rejects_garbage() {
        for input in ["", "  ", "-", ".", "abc", "12abc", "1.2.3", "NaN", "inf", "1e3", "$5"] {
            assert!(input.parse::<Amount>().is_err(), "{input:?} should not parse");
        }
    }

    #[test]
    fn half_is_exact() {
        let odd_cent: Amount = "0.01".parse().unwrap();
        assert_eq!(odd_cent.half().value(), dec!(0.005));
        assert_eq!(odd_cent.half().fixed(), "0.01");
    }

    #[test]
    fn sums_stop_at_the_decimal_range() {
        let parts = [dec!(12.5), dec!(0.25), dec!(7)].map(Amount::new);
        assert_eq!(Amount::checked_sum(parts).unwrap().value(), dec!(19.75));
        assert_eq!(Amount::checked_sum(Vec::new()), Some(Amount::ZERO));

        let max = Amount::new(Decimal::MAX);
        assert_eq!(max.checked_add(Amount::new(dec!(1))), None);
        assert_eq!(Amount::checked_sum([max, max]), None);
    }
}
