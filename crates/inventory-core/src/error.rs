//! # Error Types
//!
//! Domain-specific error types for inventory-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  inventory-core errors (this file)                                     │
//! │  ├── CoreError        - Factory / lookup errors                        │
//! │  └── ValidationError  - Bad field value at construction or mutation    │
//! │                                                                         │
//! │  inventory-store errors (separate crate)                               │
//! │  └── StoreError       - File, database and not-found failures          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → caller               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Every validation error names the offending field
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The `product_type` tag does not name a known variant.
    ///
    /// ## When This Occurs
    /// - Factory receives a mapping with an unknown `product_type`
    /// - A stored row carries a tag this build doesn't understand
    #[error("Invalid product type: '{0}'")]
    InvalidProductType(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Field validation errors.
///
/// Raised by product constructors and setters. A failed setter leaves the
/// product untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is below zero.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Invalid format (e.g., malformed date, unparseable price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value has the wrong JSON type.
    #[error("{field} must be {expected}")]
    TypeMismatch { field: String, expected: String },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub(crate) fn negative(field: &str) -> Self {
        ValidationError::Negative {
            field: field.to_string(),
        }
    }

    pub(crate) fn type_mismatch(field: &str, expected: &str) -> Self {
        ValidationError::TypeMismatch {
            field: field.to_string(),
            expected: expected.to_string(),
        }
    }

    pub(crate) fn invalid_format(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("code").to_string(), "code is required");
        assert_eq!(
            ValidationError::negative("price").to_string(),
            "price cannot be negative"
        );
        assert_eq!(
            ValidationError::type_mismatch("available", "a boolean").to_string(),
            "available must be a boolean"
        );
    }

    #[test]
    fn test_invalid_type_message() {
        let err = CoreError::InvalidProductType("furniture".to_string());
        assert_eq!(err.to_string(), "Invalid product type: 'furniture'");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("code").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
