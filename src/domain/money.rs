//! Exact money amounts as reported by the backend.
//!
//! The backend encodes decimals loosely: as `{"$numberDecimal": "12.50"}`,
//! as plain strings, or as JSON numbers. All of them parse into [`Money`],
//! which stores hundredths in an `i64`.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

const SCALE: i64 = 100;

/// Amount in hundredths of the currency unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parse a decimal string such as `"12"`, `"-3.5"` or `"0.125"`.
    ///
    /// Digits beyond the second fractional place round half away from zero.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let invalid = |reason: &str| DomainError::InvalidAmount {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let (negative, unsigned) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((w, f)) => (w, f),
            None => (unsigned, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("no digits"));
        }
        if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid("unexpected character"));
        }

        let overflow = || DomainError::AmountOverflow(input.to_string());

        let mut cents: i64 = 0;
        for b in whole.bytes() {
            cents = cents
                .checked_mul(10)
                .and_then(|c| c.checked_add(i64::from(b - b'0')))
                .ok_or_else(overflow)?;
        }
        cents = cents.checked_mul(SCALE).ok_or_else(overflow)?;

        let mut digits = fraction.bytes().map(|b| i64::from(b - b'0'));
        let tenths = digits.next().unwrap_or(0);
        let hundredths = digits.next().unwrap_or(0);
        let round_up = digits.next().is_some_and(|d| d >= 5);

        cents = cents
            .checked_add(tenths * 10 + hundredths + i64::from(round_up))
            .ok_or_else(overflow)?;

        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl FromStr for Money {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / SCALE as u64, abs % SCALE as u64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

/// Every wire encoding the backend has been seen to use for decimals.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Decimal {
        #[serde(rename = "$numberDecimal")]
        number_decimal: String,
    },
    Text(String),
    Integer(i64),
    Float(f64),
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawAmount::deserialize(deserializer)? {
            RawAmount::Decimal { number_decimal } => {
                Money::parse(&number_decimal).map_err(de::Error::custom)
            }
            RawAmount::Text(text) => Money::parse(&text).map_err(de::Error::custom),
            RawAmount::Integer(units) => units
                .checked_mul(SCALE)
                .map(Money)
                .ok_or_else(|| de::Error::custom(DomainError::AmountOverflow(units.to_string()))),
            RawAmount::Float(value) => {
                let cents = (value * SCALE as f64).round();
                if !cents.is_finite() || cents.abs() >= i64::MAX as f64 {
                    return Err(de::Error::custom(DomainError::AmountOverflow(
                        value.to_string(),
                    )));
                }
                Ok(Money(cents as i64))
            }
        }
    }
}

/// Serialised in the backend's own `$numberDecimal` form so snapshots round-trip.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("$numberDecimal", &self.to_string())?;
        map.end()
    }
}
