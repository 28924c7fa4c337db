use std::{
    fmt,
    ops::Neg,
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::EngineError;

/// Number of fractional digits kept for every amount.
pub const MONEY_SCALE: u32 = 4;

const UNIT: i64 = 10_i64.pow(MONEY_SCALE);

/// Signed money amount stored as an integer count of ten-thousandths.
///
/// Every balance, transaction amount and monthly limit in the engine is a
/// `Money`, so arithmetic is exact: `19.9999` is stored as `199_999` and read
/// back as `19.9999`.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(123_400);
/// assert_eq!(amount.minor(), 123_400);
/// assert_eq!(amount.to_string(), "12.3400");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 4 decimals):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().minor(), 100_000);
/// assert_eq!("10,5".parse::<Money>().unwrap().minor(), 105_000);
/// assert!("12.34567".parse::<Money>().is_err());
/// ```
///
/// There are no `+`/`-` operators; sums go through [`Money::checked_add`] and
/// [`Money::checked_sub`] so an overflow is always reported:
///
/// ```compile_fail
/// use engine::Money;
///
/// let _ = Money::new(i64::MAX) + Money::new(1);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from ten-thousandths.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Creates an amount with no fractional part, `None` on overflow.
    #[must_use]
    pub const fn from_units(units: i64) -> Option<Self> {
        match units.checked_mul(UNIT) {
            Some(minor) => Some(Self(minor)),
            None => None,
        }
    }

    /// Returns the raw value in ten-thousandths.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let unit = UNIT.unsigned_abs();
        let whole = abs / unit;
        let frac = abs % unit;
        write!(f, "{sign}{whole}.{frac:04}")
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal string.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    /// At most four fractional digits are allowed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount(format!("invalid amount: {s}"));
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

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
        if rest.is_empty() {
            return Err(empty());
        }

        let (whole_str, frac_str) = match rest.split_once(['.', ',']) {
            Some((whole, frac)) => (whole, frac),
            None => (rest, ""),
        };

        if whole_str.is_empty() || !whole_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if !frac_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac_str.len() > MONEY_SCALE as usize {
            return Err(EngineError::InvalidAmount("too many decimals".to_string()));
        }

        let whole: i64 = whole_str.parse().map_err(|_| overflow())?;
        let frac: i64 = if frac_str.is_empty() {
            0
        } else {
            let padding = MONEY_SCALE - frac_str.len() as u32;
            frac_str.parse::<i64>().map_err(|_| invalid())? * 10_i64.pow(padding)
        };

        let total = whole
            .checked_mul(UNIT)
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(overflow)?;

        Ok(Money(if negative { -total } else { total }))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct MoneyVisitor;

impl de::Visitor<'_> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal string or an integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Money::from_units(v).ok_or_else(|| E::custom("amount too large"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        i64::try_from(v)
            .ok()
            .and_then(Money::from_units)
            .ok_or_else(|| E::custom("amount too large"))
    }

    fn visit_f64<E: de::Error>(self, _v: f64) -> Result<Money, E> {
        Err(E::custom("fractional amounts must be sent as strings"))
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_keeps_four_decimals() {
        assert_eq!(Money::new(0).to_string(), "0.0000");
        assert_eq!(Money::new(1).to_string(), "0.0001");
        assert_eq!(Money::new(5_000).to_string(), "0.5000");
        assert_eq!(Money::new(199_999).to_string(), "19.9999");
        assert_eq!(Money::new(-5_000).to_string(), "-0.5000");
        assert_eq!(Money::new(1_005_000_000).to_string(), "100500.0000");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<Money>().unwrap().minor(), 100_000);
        assert_eq!("10.5".parse::<Money>().unwrap().minor(), 105_000);
        assert_eq!("10,50".parse::<Money>().unwrap().minor(), 105_000);
        assert_eq!("-0.0001".parse::<Money>().unwrap().minor(), -1);
        assert_eq!("+1.00".parse::<Money>().unwrap().minor(), 10_000);
        assert_eq!("  2.30 ".parse::<Money>().unwrap().minor(), 23_000);
        assert_eq!("7.".parse::<Money>().unwrap().minor(), 70_000);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<Money>().is_err());
        assert!("-".parse::<Money>().is_err());
        assert!(".5".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
        assert!("1e3".parse::<Money>().is_err());
        assert!("12.34567".parse::<Money>().is_err());
        assert!("99999999999999999999".parse::<Money>().is_err());
    }

    #[test]
    fn exact_value_survives_text_form() {
        let amount: Money = "19.9999".parse().unwrap();
        assert_eq!(amount.minor(), 199_999);
        assert_eq!(amount.to_string(), "19.9999");
        assert_ne!(amount, "20".parse().unwrap());
    }

    #[test]
    fn serde_uses_strings_and_rejects_floats() {
        let amount: Money = serde_json::from_str("\"19.9999\"").unwrap();
        assert_eq!(amount.minor(), 199_999);
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"19.9999\"");

        let whole: Money = serde_json::from_str("42").unwrap();
        assert_eq!(whole.minor(), 420_000);

        assert!(serde_json::from_str::<Money>("19.99").is_err());
    }

    #[test]
    fn checked_ops_detect_overflow() {
        assert!(Money::new(i64::MAX).checked_add(Money::new(1)).is_none());
        assert!(Money::new(i64::MIN).checked_sub(Money::new(1)).is_none());
        assert_eq!(
            Money::new(100).checked_sub(Money::new(30)),
            Some(Money::new(70))
        );
    }
}
