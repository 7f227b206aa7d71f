//! # Storage Configuration
//!
//! Selects the repository backend and where it keeps its data.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Explicit overrides (e.g. seed --backend / --path)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. Environment variables                                              │
//! │     INVENTORY_BACKEND   = list | map | json | sqlite                   │
//! │     INVENTORY_JSON_PATH = products.json                                │
//! │     INVENTORY_DB_PATH   = inventory.db                                 │
//! │     INVENTORY_CREATE_DB = true | false                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. Defaults (StoreConfig::default)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Environment variable naming the backend.
pub const ENV_BACKEND: &str = "INVENTORY_BACKEND";
/// Environment variable for the JSON document path.
pub const ENV_JSON_PATH: &str = "INVENTORY_JSON_PATH";
/// Environment variable for the SQLite database path.
pub const ENV_DB_PATH: &str = "INVENTORY_DB_PATH";
/// Environment variable allowing the database to be created.
pub const ENV_CREATE_DB: &str = "INVENTORY_CREATE_DB";

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown storage backend: '{0}' (expected list, map, json or sqlite)")]
    UnknownBackend(String),

    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: String, value: String },
}

// =============================================================================
// Storage Backend
// =============================================================================

/// Which repository implementation to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Sequence of mappings held in memory.
    List,

    /// Code-keyed mapping held in memory.
    Map,

    /// Single JSON document on disk.
    #[default]
    Json,

    /// SQLite base + extension tables.
    Sqlite,
}

impl StorageBackend {
    /// True when data outlives the process.
    pub fn is_persistent(&self) -> bool {
        matches!(self, StorageBackend::Json | StorageBackend::Sqlite)
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::List => write!(f, "list"),
            StorageBackend::Map => write!(f, "map"),
            StorageBackend::Json => write!(f, "json"),
            StorageBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "list" | "memory" => Ok(StorageBackend::List),
            "map" | "dict" => Ok(StorageBackend::Map),
            "json" | "file" => Ok(StorageBackend::Json),
            "sqlite" | "sql" | "mysql" | "relational" => Ok(StorageBackend::Sqlite),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

// =============================================================================
// Store Configuration
// =============================================================================

/// Repository selection and locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StorageBackend,

    /// JSON document path (json backend).
    pub json_path: PathBuf,

    /// Database file path (sqlite backend).
    pub database_path: PathBuf,

    /// Create the database when it does not exist yet.
    pub create_database: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            backend: StorageBackend::default(),
            json_path: PathBuf::from("products.json"),
            database_path: PathBuf::from("inventory.db"),
            create_database: true,
        }
    }
}

impl StoreConfig {
    /// Creates a config for `backend` with default paths.
    pub fn new(backend: StorageBackend) -> Self {
        StoreConfig {
            backend,
            ..StoreConfig::default()
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// Unset variables keep their defaults; set but invalid ones fail.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = StoreConfig::default();

        if let Some(backend) = lookup(ENV_BACKEND) {
            config.backend = backend.parse()?;
        }

        if let Some(path) = lookup(ENV_JSON_PATH).filter(|p| !p.trim().is_empty()) {
            config.json_path = PathBuf::from(path);
        }

        if let Some(path) = lookup(ENV_DB_PATH).filter(|p| !p.trim().is_empty()) {
            config.database_path = PathBuf::from(path);
        }

        if let Some(flag) = lookup(ENV_CREATE_DB) {
            config.create_database = parse_flag(ENV_CREATE_DB, &flag)?;
        }

        debug!(backend = %config.backend, "Storage configuration loaded");
        Ok(config)
    }

    /// Sets the backend.
    pub fn backend(mut self, backend: StorageBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Points the active backend at `path` (JSON file or database file).
    ///
    /// In-memory backends ignore it.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        match self.backend {
            StorageBackend::Sqlite => self.database_path = path.into(),
            _ => self.json_path = path.into(),
        }
        self
    }

    /// Sets whether a missing database may be created.
    pub fn create_database(mut self, create: bool) -> Self {
        self.create_database = create;
        self
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_backend_aliases() {
        assert_eq!("memory".parse::<StorageBackend>(), Ok(StorageBackend::List));
        assert_eq!("dict".parse::<StorageBackend>(), Ok(StorageBackend::Map));
        assert_eq!("FILE".parse::<StorageBackend>(), Ok(StorageBackend::Json));
        assert_eq!("mysql".parse::<StorageBackend>(), Ok(StorageBackend::Sqlite));
        assert_eq!(
            "redis".parse::<StorageBackend>(),
            Err(ConfigError::UnknownBackend("redis".into()))
        );
    }

    #[test]
    fn test_backend_display_round_trips() {
        for backend in [
            StorageBackend::List,
            StorageBackend::Map,
            StorageBackend::Json,
            StorageBackend::Sqlite,
        ] {
            assert_eq!(backend.to_string().parse::<StorageBackend>(), Ok(backend));
        }
        assert!(StorageBackend::Sqlite.is_persistent());
        assert!(!StorageBackend::Map.is_persistent());
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.backend, StorageBackend::Json);
        assert!(config.create_database);
    }

    #[test]
    fn test_lookup_overrides() {
        let config = StoreConfig::from_lookup(lookup(&[
            (ENV_BACKEND, "sqlite"),
            (ENV_DB_PATH, "/var/lib/inventory/catalog.db"),
            (ENV_CREATE_DB, "no"),
        ]))
        .unwrap();

        assert_eq!(config.backend, StorageBackend::Sqlite);
        assert_eq!(
            config.database_path,
            PathBuf::from("/var/lib/inventory/catalog.db")
        );
        assert!(!config.create_database);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            StoreConfig::from_lookup(lookup(&[(ENV_BACKEND, "tape")])),
            Err(ConfigError::UnknownBackend(_))
        ));
        assert!(matches!(
            StoreConfig::from_lookup(lookup(&[(ENV_CREATE_DB, "maybe")])),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_path_targets_active_backend() {
        let config = StoreConfig::new(StorageBackend::Sqlite).path("a.db");
        assert_eq!(config.database_path, PathBuf::from("a.db"));
        assert_eq!(config.json_path, PathBuf::from("products.json"));

        let config = StoreConfig::new(StorageBackend::Json).path("b.json");
        assert_eq!(config.json_path, PathBuf::from("b.json"));
    }
}
