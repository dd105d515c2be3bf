//! Amount type for signed monetary values.
//!
//! `Amount` wraps `Decimal`. It parses values that may carry a dollar sign and thousands
//! separators, and displays itself the way the dashboard shows money, e.g. `-$1,234.50`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, Neg};
use std::str::FromStr;

/// A signed dollar amount. Positive is income, negative is an expense.
///
/// # Examples
///
/// ```
/// # use finance_dashboard::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("-$1,000.5").unwrap();
/// assert!(amount.is_negative());
/// assert_eq!(amount.to_string(), "-$1,000.50");
/// ```
///
/// Zero is neither income nor expense:
/// ```
/// # use finance_dashboard::model::Amount;
/// # use std::str::FromStr;
/// let zero = Amount::from_str("0.00").unwrap();
/// assert!(!zero.is_positive());
/// assert!(!zero.is_negative());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// The largest magnitude a single amount may have: one trillion dollars. Sums of any
    /// realistic number of such amounts stay far inside `Decimal`'s range.
    pub const MAX_MAGNITUDE: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Strictly less than zero.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    pub fn abs(&self) -> Amount {
        Amount(self.0.abs())
    }
}

/// An error that can occur when parsing a string into an `Amount`.
#[derive(Debug, Clone)]
pub enum AmountError {
    Empty,
    /// A second sign, e.g. `--50` or `-$-20`.
    MisplacedSign,
    Invalid(rust_decimal::Error),
    OutOfRange,
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => f.write_str("an amount is required"),
            AmountError::MisplacedSign => {
                f.write_str("not a number (a sign may only appear once, at the start)")
            }
            AmountError::Invalid(e) => write!(f, "not a number ({e})"),
            AmountError::OutOfRange => write!(
                f,
                "out of range (the largest accepted amount is {})",
                Amount(Amount::MAX_MAGNITUDE)
            ),
        }
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AmountError::Invalid(e) => Some(e),
            _ => None,
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        // "-$50.00", "$50.00", "-50.00", "+50.00" and "50.00" are all accepted.
        let (negative, unsigned) = if let Some(rest) = trimmed.strip_prefix('-') {
            (true, rest)
        } else {
            (false, trimmed.strip_prefix('+').unwrap_or(trimmed))
        };
        let digits = unsigned.strip_prefix('$').unwrap_or(unsigned).replace(',', "");
        if digits.is_empty() {
            return Err(AmountError::Empty);
        }
        // Decimal accepts a sign of its own, which would flip "--50" into income.
        if digits.starts_with(['-', '+']) {
            return Err(AmountError::MisplacedSign);
        }

        let value = Decimal::from_str(&digits).map_err(AmountError::Invalid)?;
        if value > Amount::MAX_MAGNITUDE {
            return Err(AmountError::OutOfRange);
        }
        Ok(Amount(if negative { -value } else { value }))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let magnitude = self.0.abs().round_dp(2);
        write!(
            f,
            "{sign}${}",
            format_num::format_num!(",.2", magnitude.to_f64().unwrap_or_default())
        )
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Self::Output {
        Amount(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Serialized as the plain decimal string, e.g. `"-50.00"`, so that no precision is lost.
impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}
