//! # Money Module
//!
//! Provides the `Money` type used for product prices.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Prices live in memory and in SQLite as i64 cents.                    │
//! │    Only the canonical mapping (JSON) uses a decimal number, and it is   │
//! │    rounded back to the nearest cent on the way in.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use inventory_core::money::Money;
//!
//! let price = Money::from_cents(1099);
//! assert_eq!(price.to_string(), "10.99");
//!
//! let parsed: Money = "10.99".parse().unwrap();
//! assert_eq!(parsed, price);
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{ValidationError, ValidationResult};

/// Largest magnitude accepted from a decimal number (keeps `* 100` inside i64).
const MAX_MAJOR_UNITS: f64 = 90_000_000_000_000_000.0 / 100.0;

/// Largest price, in cents, that survives the major-unit float round trip
/// of the canonical mapping exactly (2^50).
pub const MAX_PRICE_CENTS: i64 = 1 << 50;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// Signed so that a negative input can be represented long enough to be
/// rejected by validation with a useful message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use inventory_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a decimal amount in major units, rounding to the nearest cent.
    pub fn from_major_f64(amount: f64) -> ValidationResult<Self> {
        if !amount.is_finite() || amount.abs() > MAX_MAJOR_UNITS {
            return Err(ValidationError::invalid_format(
                "price",
                "must be a finite decimal number",
            ));
        }
        Ok(Money((amount * 100.0).round() as i64))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the amount in major units as a float (serialization only).
    #[inline]
    pub fn as_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Reads a price out of a canonical mapping value.
    ///
    /// Accepts a JSON number (major units) or a decimal string.
    pub fn from_json_value(value: &Value) -> ValidationResult<Self> {
        match value {
            Value::Number(n) => {
                if let Some(whole) = n.as_i64() {
                    whole
                        .checked_mul(100)
                        .map(Money)
                        .ok_or_else(|| ValidationError::invalid_format("price", "out of range"))
                } else {
                    let amount = n.as_f64().ok_or_else(|| {
                        ValidationError::invalid_format("price", "must be a decimal number")
                    })?;
                    Money::from_major_f64(amount)
                }
            }
            Value::String(s) => s.parse(),
            _ => Err(ValidationError::type_mismatch("price", "a number")),
        }
    }

    /// Canonical JSON representation: a number in major units.
    pub fn to_json_value(&self) -> Value {
        Value::from(self.as_major_f64())
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses a decimal string exactly (no float round trip).
///
/// More than two fractional digits are rounded half-up on the third digit.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ValidationError::invalid_format("price", format!("'{}' is not a decimal", s));

        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };

        let mut frac_digits = fraction.bytes().map(|b| (b - b'0') as i64);
        let tens = frac_digits.next().unwrap_or(0);
        let ones = frac_digits.next().unwrap_or(0);
        let round_up = frac_digits.next().map(|d| d >= 5).unwrap_or(false);

        let mut cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(tens * 10 + ones))
            .ok_or_else(invalid)?;
        if round_up {
            cents = cents.checked_add(1).ok_or_else(invalid)?;
        }

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal form, e.g. `10.99` or `-5.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_major_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Money::from_json_value(&value).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
