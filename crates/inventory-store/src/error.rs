//! # Storage Error Types
//!
//! Error types shared by every repository backend.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error / io::Error / serde_json::Error / CoreError               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds context and categorization            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller displays the message                                           │
//! │                                                                         │
//! │  Recovered locally (never surfaced):                                   │
//! │  • missing / corrupt JSON file  → empty store                          │
//! │  • failed relational reads      → absent / empty                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use inventory_core::{CoreError, ValidationError};
use thiserror::Error;

/// Repository operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found in storage.
    ///
    /// ## When This Occurs
    /// - `update` on a code that was never added
    /// - `delete` on a code that is already gone
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Stored or supplied `product_type` is unknown.
    #[error("Invalid product type: '{0}'")]
    InvalidProductType(String),

    /// A stored record failed product validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The JSON file could not be read or written.
    #[error("File access failed for {path}: {source}")]
    FileAccess {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding failed.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - File permissions issue
    /// - Disk full
    /// - Malformed connection options
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The database refused access (permission / authorization).
    #[error("Access to the database was denied: {0}")]
    InvalidCredentials(String),

    /// The database does not exist and creation was not requested.
    ///
    /// Callers may retry with `create_if_missing` enabled.
    #[error("Database does not exist: {0}")]
    DatabaseMissing(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal storage error.
    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a FileAccess error.
    pub fn file_access(path: impl Into<String>, source: std::io::Error) -> Self {
        StoreError::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// Checks if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// True for failures of the storage medium itself, as opposed to bad data.
    ///
    /// Relational reads degrade to "absent" on these.
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            StoreError::ConnectionFailed(_)
                | StoreError::QueryFailed(_)
                | StoreError::TransactionFailed(_)
                | StoreError::PoolExhausted
                | StoreError::Internal(_)
        )
    }
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidProductType(tag) => StoreError::InvalidProductType(tag),
            CoreError::Validation(err) => StoreError::Validation(err),
        }
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → StoreError::NotFound
/// sqlx::Error::Database       → QueryFailed (message kept)
/// sqlx::Error::PoolTimedOut   → StoreError::PoolExhausted
/// sqlx::Error::PoolClosed     → StoreError::ConnectionFailed
/// Other                       → StoreError::Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::not_found("Record", "unknown"),
            sqlx::Error::Database(db_err) => StoreError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,
            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),
            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

/// Result type for repository operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = StoreError::not_found("Product", "E-1");
        assert_eq!(err.to_string(), "Product not found: E-1");
        assert!(err.is_not_found());
        assert!(!err.is_storage_failure());
    }

    #[test]
    fn test_core_errors_convert() {
        let err: StoreError = CoreError::InvalidProductType("boat".into()).into();
        assert!(matches!(err, StoreError::InvalidProductType(tag) if tag == "boat"));

        let err: StoreError = CoreError::Validation(ValidationError::Negative {
            field: "stock".into(),
        })
        .into();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn test_sqlx_errors_convert() {
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::PoolExhausted
        ));
        assert!(StoreError::from(sqlx::Error::PoolClosed).is_storage_failure());
    }
}
