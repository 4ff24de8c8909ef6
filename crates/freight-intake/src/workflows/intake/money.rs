use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Exact NZD amount held as whole cents.
///
/// Serialized as a two-fraction-digit decimal string (`"197.00"`). Deserialization accepts
/// that form or a whole-dollar integer; binary floats are refused so rounding drift never
/// enters a quote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "MoneyRepr", into = "String")]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub const fn from_dollars(dollars: i64) -> Self {
        Money(dollars * 100)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Apply a whole-number percentage, rounding half away from zero to the cent.
    pub fn percent(self, rate: u32) -> Money {
        let scaled = self.0 * i64::from(rate);
        let quotient = scaled / 100;
        let remainder = scaled % 100;
        let rounded = if remainder.abs() * 2 >= 100 {
            quotient + scaled.signum()
        } else {
            quotient
        };
        Money(rounded)
    }

    /// Decimal form without currency marker, e.g. `412.85`.
    pub fn to_decimal_string(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }

    pub fn parse(raw: &str) -> Result<Money, MoneyParseError> {
        let cleaned: String = raw
            .trim()
            .trim_start_matches("NZD")
            .trim()
            .trim_start_matches('$')
            .chars()
            .filter(|ch| *ch != ',')
            .collect();

        let (negative, digits) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };

        let well_formed = !whole.is_empty()
            && whole.chars().all(|ch| ch.is_ascii_digit())
            && fraction.len() <= 2
            && fraction.chars().all(|ch| ch.is_ascii_digit());
        if !well_formed {
            return Err(MoneyParseError(raw.to_string()));
        }

        let whole: i64 = whole
            .parse()
            .map_err(|_| MoneyParseError(raw.to_string()))?;
        let fraction_cents = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().unwrap_or(0) * 10,
            _ => fraction.parse::<i64>().unwrap_or(0),
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|value| value.checked_add(fraction_cents))
            .ok_or_else(|| MoneyParseError(raw.to_string()))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NZD ${}", self.to_decimal_string())
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl From<Money> for String {
    fn from(value: Money) -> Self {
        value.to_decimal_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MoneyRepr {
    Text(String),
    WholeDollars(i64),
}

impl TryFrom<MoneyRepr> for Money {
    type Error = MoneyParseError;

    fn try_from(value: MoneyRepr) -> Result<Self, Self::Error> {
        match value {
            MoneyRepr::Text(raw) => Money::parse(&raw),
            MoneyRepr::WholeDollars(dollars) => dollars
                .checked_mul(100)
                .map(Money)
                .ok_or_else(|| MoneyParseError(dollars.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not an amount with at most two decimal places")]
pub struct MoneyParseError(String);
