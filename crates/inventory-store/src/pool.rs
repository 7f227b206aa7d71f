//! # Database Pool Management
//!
//! Connection pool creation and configuration for the SQLite backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  open_repository(StoreConfig)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) ← Configure pool settings                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await                                           │
//! │       ├── file missing and creation off?  → StoreError::DatabaseMissing│
//! │       ├── access refused?                 → InvalidCredentials         │
//! │       ├── create pool                                                   │
//! │       └── run migrations (schema creation is idempotent)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.products() → SqlProductRepository                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Connection Settings
//! - WAL journal for file databases (readers don't block the writer)
//! - NORMAL synchronous
//! - Foreign keys ON, so extension rows cascade with their product

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::migrations;
use crate::repository::sql::SqlProductRepository;

/// Path that selects a private in-memory database.
const IN_MEMORY_PATH: &str = ":memory:";

// SQLite primary result codes used to classify connection failures.
const SQLITE_PERM: i32 = 3;
const SQLITE_READONLY: i32 = 8;
const SQLITE_CANTOPEN: i32 = 14;
const SQLITE_AUTH: i32 = 23;

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust
/// use inventory_store::DbConfig;
///
/// let config = DbConfig::new("./data/inventory.db")
///     .max_connections(5)
///     .create_if_missing(true);
/// assert!(config.create_if_missing);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,

    /// Whether a missing database file may be created.
    /// Default: false
    pub create_if_missing: bool,
}

impl DbConfig {
    /// Creates a configuration for the database file at `path`.
    ///
    /// The file is NOT created unless [`DbConfig::create_if_missing`] is set.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
            create_if_missing: false,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Sets whether a missing database file is created.
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// Every pool built from this config sees its own empty database.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
            create_if_missing: true,
        }
    }

    /// True when this config points at `:memory:`.
    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_PATH
    }

    fn connect_options(&self) -> StoreResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(self.create_if_missing)
                // WAL mode: readers don't block the writer
                .journal_mode(SqliteJournalMode::Wal)
        };

        Ok(options
            .synchronous(SqliteSynchronous::Normal)
            // SQLite has them disabled by default; cascades depend on them
            .foreign_keys(true))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Database handle owning the connection pool.
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Database {
    /// Opens (and optionally creates) the database, then runs migrations.
    ///
    /// ## Returns
    /// * `Ok(Database)` - Ready-to-use handle, schema present
    /// * `Err(StoreError::DatabaseMissing)` - File absent, creation disabled
    /// * `Err(StoreError::InvalidCredentials)` - Access refused
    /// * `Err(StoreError::ConnectionFailed)` - Anything else
    pub async fn new(config: DbConfig) -> StoreResult<Self> {
        info!(
            path = %config.database_path.display(),
            create_if_missing = config.create_if_missing,
            "Initializing database connection"
        );

        if !config.is_in_memory() {
            prepare_location(&config).await?;
        }

        let connect_options = config.connect_options()?;
        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(classify_connect_error)?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs database migrations.
    pub async fn run_migrations(&self) -> StoreResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the product repository backed by this pool.
    pub fn products(&self) -> SqlProductRepository {
        SqlProductRepository::new(self.pool.clone())
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, all repository operations will fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

/// Checks the database file before connecting.
///
/// SQLite only reports "unable to open", so absence and permission
/// problems are told apart here.
async fn prepare_location(config: &DbConfig) -> StoreResult<()> {
    let path = config.database_path.as_path();
    let location = path.display().to_string();

    match tokio::fs::try_exists(path).await {
        Ok(true) => return Ok(()),
        Ok(false) => {}
        Err(err) if err.kind() == ErrorKind::PermissionDenied => {
            return Err(StoreError::InvalidCredentials(location));
        }
        Err(err) => return Err(StoreError::ConnectionFailed(format!("{}: {}", location, err))),
    }

    if !config.create_if_missing {
        warn!(path = %location, "Database file does not exist");
        return Err(StoreError::DatabaseMissing(location));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_parent(parent).await?;
    }
    Ok(())
}

async fn create_parent(parent: &Path) -> StoreResult<()> {
    tokio::fs::create_dir_all(parent).await.map_err(|err| {
        let location = parent.display().to_string();
        if err.kind() == ErrorKind::PermissionDenied {
            StoreError::InvalidCredentials(location)
        } else {
            StoreError::ConnectionFailed(format!("{}: {}", location, err))
        }
    })
}

/// Maps a pool connection failure onto the storage error taxonomy.
fn classify_connect_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) => {
            let primary_code = db_err
                .code()
                .and_then(|code| code.parse::<i32>().ok())
                .map(|code| code & 0xff);
            let message = db_err.message().to_string();
            match primary_code {
                Some(SQLITE_CANTOPEN) => StoreError::DatabaseMissing(message),
                Some(SQLITE_PERM | SQLITE_READONLY | SQLITE_AUTH) => {
                    StoreError::InvalidCredentials(message)
                }
                _ => StoreError::ConnectionFailed(message),
            }
        }
        sqlx::Error::Io(io_err) if io_err.kind() == ErrorKind::PermissionDenied => {
            StoreError::InvalidCredentials(io_err.to_string())
        }
        sqlx::Error::Io(io_err) if io_err.kind() == ErrorKind::NotFound => {
            StoreError::DatabaseMissing(io_err.to_string())
        }
        _ => StoreError::ConnectionFailed(err.to_string()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("inventory-{}", uuid::Uuid::new_v4()))
            .join("catalog.db")
    }

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .create_if_missing(true);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(config.create_if_missing);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_missing_database_is_reported() {
        let path = temp_db_path();
        let err = Database::new(DbConfig::new(&path)).await.unwrap_err();
        assert!(matches!(err, StoreError::DatabaseMissing(_)));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_create_if_missing_builds_schema() {
        let path = temp_db_path();
        let db = Database::new(DbConfig::new(&path).create_if_missing(true))
            .await
            .unwrap();
        assert!(path.exists());

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN \
             ('products', 'electronics', 'food', 'clothing') ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();
        assert_eq!(tables, vec!["clothing", "electronics", "food", "products"]);
        db.close().await;

        // Existing file opens without the create flag
        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert!(db.health_check().await);
        db.close().await;

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[tokio::test]
    async fn test_closed_pool_is_unhealthy() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.health_check().await);
    }
}
