//! # Repository Module
//!
//! The storage contract for products and its four implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Contract, Four Backends                          │
//! │                                                                         │
//! │  Caller                                                                │
//! │       │  repo.add(&product) / get / list / update / delete             │
//! │       ▼                                                                 │
//! │  dyn ProductRepository  ◄── open_repository(&StoreConfig)              │
//! │       │                                                                 │
//! │       ├── ListProductRepository    Vec<mapping>        (memory.rs)     │
//! │       ├── MapProductRepository     IndexMap<code, ..>  (memory.rs)     │
//! │       ├── JsonProductRepository    products.json       (json.rs)       │
//! │       └── SqlProductRepository     SQLite tables       (sql.rs)        │
//! │                                                                         │
//! │  Every backend stores canonical mappings and reads back through        │
//! │  ProductFactory, so all four return identical products.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Contract
//!
//! | Operation | Present code              | Absent code            |
//! |-----------|---------------------------|------------------------|
//! | `add`     | `Ok(false)`, unchanged    | stored, `Ok(true)`     |
//! | `get`     | `Ok(Some(product))`       | `Ok(None)`             |
//! | `update`  | replaced                  | `StoreError::NotFound` |
//! | `delete`  | removed                   | `StoreError::NotFound` |

use async_trait::async_trait;
use indexmap::IndexMap;
use inventory_core::{Product, ProductFactory};
use tracing::info;

use crate::config::{StorageBackend, StoreConfig};
use crate::error::{StoreError, StoreResult};
use crate::pool::{Database, DbConfig};

pub mod json;
pub mod memory;
pub mod sql;

pub use json::JsonProductRepository;
pub use memory::{ListProductRepository, MapProductRepository};
pub use sql::SqlProductRepository;

/// Products keyed by code, in storage order.
pub type ProductMap = IndexMap<String, Product>;

/// Storage contract shared by every backend.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Stores `product` unless its code is already present.
    ///
    /// Returns `Ok(false)` (and leaves the store untouched) for a duplicate.
    async fn add(&self, product: &Product) -> StoreResult<bool>;

    /// Looks a product up by code. Absence is not an error.
    async fn get(&self, code: &str) -> StoreResult<Option<Product>>;

    /// All products in storage order.
    async fn list(&self) -> StoreResult<ProductMap>;

    /// Replaces the stored product with the same code.
    async fn update(&self, product: &Product) -> StoreResult<()>;

    /// Removes the product with `code`.
    async fn delete(&self, code: &str) -> StoreResult<()>;

    /// Type tags this repository can store.
    fn product_types(&self) -> Vec<&'static str> {
        ProductFactory.product_types()
    }
}

/// Builds the repository selected by `config`.
///
/// For SQLite, a missing database is created when `create_database` is set.
///
/// ## Example
/// ```rust,no_run
/// use inventory_store::{open_repository, StorageBackend, StoreConfig};
///
/// # async fn run() -> inventory_store::StoreResult<()> {
/// let config = StoreConfig::new(StorageBackend::Sqlite).path("inventory.db");
/// let repo = open_repository(&config).await?;
/// println!("{} products", repo.list().await?.len());
/// # Ok(())
/// # }
/// ```
pub async fn open_repository(config: &StoreConfig) -> StoreResult<Box<dyn ProductRepository>> {
    info!(backend = %config.backend, "Opening product repository");

    let repository: Box<dyn ProductRepository> = match config.backend {
        StorageBackend::List => Box::new(ListProductRepository::new()),
        StorageBackend::Map => Box::new(MapProductRepository::new()),
        StorageBackend::Json => Box::new(JsonProductRepository::new(&config.json_path)),
        StorageBackend::Sqlite => Box::new(open_database(config).await?.products()),
    };

    Ok(repository)
}

async fn open_database(config: &StoreConfig) -> StoreResult<Database> {
    match Database::new(DbConfig::new(&config.database_path)).await {
        Err(StoreError::DatabaseMissing(path)) if config.create_database => {
            info!(path = %path, "Database does not exist, creating it");
            Database::new(DbConfig::new(&config.database_path).create_if_missing(true)).await
        }
        other => other,
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;
    use inventory_core::{Money, NewProduct, Product, ProductDetails};
    use std::path::PathBuf;

    pub fn generic() -> Product {
        NewProduct::new("G-100", "Notebook", Money::from_cents(350))
            .description("A5 ruled")
            .stock(40)
            .build()
            .unwrap()
    }

    pub fn electronic() -> Product {
        NewProduct::new("E-200", "Headphones", Money::from_cents(8_999))
            .stock(3)
            .details(ProductDetails::Electronic { warranty: 2 })
            .build()
            .unwrap()
    }

    pub fn food() -> Product {
        NewProduct::new("F-300", "Yogurt", Money::from_cents(120))
            .stock(25)
            .details(ProductDetails::Food {
                expiration_date: NaiveDate::from_ymd_opt(2026, 11, 30),
            })
            .build()
            .unwrap()
    }

    pub fn clothing() -> Product {
        NewProduct::new("C-400", "Rain jacket", Money::from_cents(5_450))
            .stock(0)
            .details(ProductDetails::Clothing {
                size: "L".into(),
                color: Some("yellow".into()),
            })
            .build()
            .unwrap()
    }

    pub fn all() -> Vec<Product> {
        vec![generic(), electronic(), food(), clothing()]
    }

    pub fn temp_path(extension: &str) -> PathBuf {
        std::env::temp_dir().join(format!("inventory-{}.{}", uuid::Uuid::new_v4(), extension))
    }
}

// =============================================================================
// Contract Tests (all backends)
// =============================================================================
