//! # inventory-store: Repository Layer for the Inventory Catalog
//!
//! Persists [`inventory_core::Product`]s behind one async contract with four
//! interchangeable backends.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Inventory Catalog Data Flow                         │
//! │                                                                         │
//! │  Caller (menu / seed binary)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 inventory-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    config     │    │  repository   │    │   Database   │  │   │
//! │  │   │               │    │               │    │  (pool.rs)   │  │   │
//! │  │   │ StoreConfig   │───►│ open_repo..() │───►│ SqlitePool   │  │   │
//! │  │   │ StorageBackend│    │ list / map    │    │ migrations   │  │   │
//! │  │   │               │    │ json / sql    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                 │                               │
//! │       ▼                                 ▼                               │
//! │  products.json                     inventory.db                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Backend selection and paths (env driven)
//! - [`repository`] - The `ProductRepository` trait and its backends
//! - [`pool`] - SQLite connection pool
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use inventory_store::{open_repository, StoreConfig};
//!
//! let repo = open_repository(&StoreConfig::from_env()?).await?;
//! repo.add(&product).await?;
//! for (code, product) in repo.list().await? {
//!     println!("{code}: {product}");
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, StorageBackend, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::{
    open_repository, JsonProductRepository, ListProductRepository, MapProductRepository,
    ProductMap, ProductRepository, SqlProductRepository,
};
