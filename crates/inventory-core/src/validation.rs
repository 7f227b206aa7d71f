//! # Validation Module
//!
//! Field-level rules for products, and typed readers that pull values out
//! of a canonical field mapping.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller                                                       │
//! │  └── Converts raw text into typed JSON values                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: ProductFactory + Product setters                             │
//! │  ├── Type checks (read_* below)                                        │
//! │  └── THIS MODULE: non-negative price/stock/warranty, dates, codes      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Storage                                                      │
//! │  ├── PRIMARY KEY on code                                               │
//! │  └── Foreign keys on extension tables                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use inventory_core::validation::{validate_code, validate_non_negative};
//!
//! assert!(validate_code("SKU-1").is_ok());
//! assert!(validate_non_negative("stock", -1).is_err());
//! ```

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::{ValidationError, ValidationResult};
use crate::money::{Money, MAX_PRICE_CENTS};

/// Date format used for food expiration dates everywhere.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Field Rules
// =============================================================================

/// Validates a product code.
///
/// ## Rules
/// - Must not be empty or whitespace
pub fn validate_code(code: &str) -> ValidationResult<()> {
    if code.trim().is_empty() {
        return Err(ValidationError::required("code"));
    }
    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty or whitespace
pub fn validate_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::required("name"));
    }
    Ok(())
}

/// Rejects negative integers (stock, warranty).
///
/// ## Example
/// ```rust
/// use inventory_core::validation::validate_non_negative;
///
/// assert!(validate_non_negative("stock", 0).is_ok());
/// assert!(validate_non_negative("warranty", -2).is_err());
/// ```
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::negative(field));
    }
    Ok(())
}

/// Rejects negative prices and prices above [`MAX_PRICE_CENTS`].
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::negative("price"));
    }
    if price.cents() > MAX_PRICE_CENTS {
        return Err(ValidationError::invalid_format(
            "price",
            format!("must not exceed {}", Money::from_cents(MAX_PRICE_CENTS)),
        ));
    }
    Ok(())
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(field: &str, value: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        ValidationError::invalid_format(field, format!("'{}' is not a YYYY-MM-DD date", value))
    })
}

// =============================================================================
// Mapping Readers
// =============================================================================
// A missing key and an explicit null are treated the same way.

fn present<'a>(fields: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    match fields.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value),
    }
}

/// Reads a required string field.
pub fn read_string(fields: &Map<String, Value>, field: &str) -> ValidationResult<String> {
    match present(fields, field) {
        None => Err(ValidationError::required(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ValidationError::type_mismatch(field, "a string")),
    }
}

/// Reads a string field that falls back to `default` when absent.
pub fn read_string_or(
    fields: &Map<String, Value>,
    field: &str,
    default: &str,
) -> ValidationResult<String> {
    match present(fields, field) {
        None => Ok(default.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ValidationError::type_mismatch(field, "a string")),
    }
}

/// Reads a nullable string field.
pub fn read_optional_string(
    fields: &Map<String, Value>,
    field: &str,
) -> ValidationResult<Option<String>> {
    match present(fields, field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ValidationError::type_mismatch(field, "a string or null")),
    }
}

/// Reads an integer field, falling back to `default` when absent.
///
/// Floats with no fractional part (`5.0`) are accepted as integers.
pub fn read_integer(
    fields: &Map<String, Value>,
    field: &str,
    default: i64,
) -> ValidationResult<i64> {
    match present(fields, field) {
        None => Ok(default),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                _ => Err(ValidationError::type_mismatch(field, "an integer")),
            }
        }
        Some(_) => Err(ValidationError::type_mismatch(field, "an integer")),
    }
}

/// Reads a boolean field, falling back to `default` when absent.
///
/// SQLite hands booleans back as `0`/`1`; both coerce.
pub fn read_bool(fields: &Map<String, Value>, field: &str, default: bool) -> ValidationResult<bool> {
    match present(fields, field) {
        None => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(ValidationError::type_mismatch(field, "a boolean")),
        },
        Some(_) => Err(ValidationError::type_mismatch(field, "a boolean")),
    }
}

/// Reads a nullable `YYYY-MM-DD` date. An empty string counts as absent.
pub fn read_date(
    fields: &Map<String, Value>,
    field: &str,
) -> ValidationResult<Option<NaiveDate>> {
    match present(fields, field) {
        None => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => parse_date(field, s).map(Some),
        Some(_) => Err(ValidationError::type_mismatch(field, "a YYYY-MM-DD string")),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test fixture must be an object"),
        }
    }

    #[test]
    fn test_validate_code() {
        assert!(validate_code("A-1").is_ok());
        assert_eq!(validate_code("  "), Err(ValidationError::required("code")));
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("stock", 0).is_ok());
        assert!(validate_non_negative("stock", 12).is_ok());
        assert_eq!(
            validate_non_negative("stock", -1),
            Err(ValidationError::negative("stock"))
        );
    }

    #[test]
    fn test_validate_price_bounds() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(MAX_PRICE_CENTS)).is_ok());
        assert_eq!(
            validate_price(Money::from_cents(-1)),
            Err(ValidationError::negative("price"))
        );
        assert!(matches!(
            validate_price(Money::from_cents(MAX_PRICE_CENTS + 1)),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("expiration_date", "2024-02-29").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(parse_date("expiration_date", "2023-02-29").is_err());
        assert!(parse_date("expiration_date", "31/12/2024").is_err());
    }

    #[test]
    fn test_read_string_variants() {
        let f = fields(json!({"code": "X", "name": 3, "color": null}));
        assert_eq!(read_string(&f, "code").unwrap(), "X");
        assert!(matches!(
            read_string(&f, "name"),
            Err(ValidationError::TypeMismatch { .. })
        ));
        assert!(matches!(
            read_string(&f, "missing"),
            Err(ValidationError::Required { .. })
        ));
        assert_eq!(read_optional_string(&f, "color").unwrap(), None);
        assert_eq!(read_string_or(&f, "size", "").unwrap(), "");
    }

    #[test]
    fn test_read_integer() {
        let f = fields(json!({"stock": 4, "warranty": 2.0, "bad": 1.5, "text": "4"}));
        assert_eq!(read_integer(&f, "stock", 0).unwrap(), 4);
        assert_eq!(read_integer(&f, "warranty", 0).unwrap(), 2);
        assert_eq!(read_integer(&f, "missing", 7).unwrap(), 7);
        assert!(read_integer(&f, "bad", 0).is_err());
        assert!(read_integer(&f, "text", 0).is_err());
    }

    #[test]
    fn test_read_bool_coerces_integers() {
        let f = fields(json!({"a": true, "b": 0, "c": 1, "d": 2, "e": "yes"}));
        assert!(read_bool(&f, "a", false).unwrap());
        assert!(!read_bool(&f, "b", true).unwrap());
        assert!(read_bool(&f, "c", false).unwrap());
        assert!(read_bool(&f, "d", false).is_err());
        assert!(read_bool(&f, "e", false).is_err());
        assert!(read_bool(&f, "missing", true).unwrap());
    }

    #[test]
    fn test_read_date() {
        let f = fields(json!({"d": "2025-01-31", "empty": "", "bad": "tomorrow"}));
        assert_eq!(
            read_date(&f, "d").unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31)
        );
        assert_eq!(read_date(&f, "empty").unwrap(), None);
        assert_eq!(read_date(&f, "missing").unwrap(), None);
        assert!(matches!(
            read_date(&f, "bad"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }
}
