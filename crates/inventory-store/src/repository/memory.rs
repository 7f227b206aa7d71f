//! # In-Memory Repositories
//!
//! Two process-local backends with the same behavior and different
//! containers:
//!
//! ```text
//! ListProductRepository   Mutex<Vec<ProductFields>>              linear scan by code
//! MapProductRepository    Mutex<IndexMap<String, ProductFields>> keyed by code
//! ```
//!
//! Both keep canonical mappings rather than live products and rebuild each
//! product through [`ProductFactory`] on read. Locks are never held across
//! an `.await`.

use async_trait::async_trait;
use indexmap::IndexMap;
use inventory_core::{Product, ProductFactory, ProductFields};
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use super::{ProductMap, ProductRepository};
use crate::error::{StoreError, StoreResult};

fn poisoned() -> StoreError {
    StoreError::Internal("in-memory storage lock poisoned".to_string())
}

fn record_code(fields: &ProductFields) -> Option<&str> {
    fields.get("code").and_then(Value::as_str)
}

// =============================================================================
// List Backend
// =============================================================================

/// Products kept as a sequence of mappings.
#[derive(Debug, Default)]
pub struct ListProductRepository {
    storage: Mutex<Vec<ProductFields>>,
    factory: ProductFactory,
}

impl ListProductRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository holding `products`. Later duplicates are skipped.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let mut storage: Vec<ProductFields> = Vec::new();
        for product in products {
            if !storage.iter().any(|r| record_code(r) == Some(product.code())) {
                storage.push(product.to_fields());
            }
        }
        ListProductRepository {
            storage: Mutex::new(storage),
            factory: ProductFactory,
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Vec<ProductFields>>> {
        self.storage.lock().map_err(|_| poisoned())
    }

    fn position(storage: &[ProductFields], code: &str) -> Option<usize> {
        storage.iter().position(|r| record_code(r) == Some(code))
    }
}

#[async_trait]
impl ProductRepository for ListProductRepository {
    async fn add(&self, product: &Product) -> StoreResult<bool> {
        debug!(code = %product.code(), "Adding product to list storage");
        let mut storage = self.lock()?;
        if Self::position(&storage, product.code()).is_some() {
            debug!(code = %product.code(), "Code already present, add skipped");
            return Ok(false);
        }
        storage.push(product.to_fields());
        Ok(true)
    }

    async fn get(&self, code: &str) -> StoreResult<Option<Product>> {
        let storage = self.lock()?;
        match Self::position(&storage, code) {
            Some(index) => Ok(Some(self.factory.create_product(&storage[index])?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> StoreResult<ProductMap> {
        let storage = self.lock()?;
        let mut products = ProductMap::with_capacity(storage.len());
        for fields in storage.iter() {
            let product = self.factory.create_product(fields)?;
            products.insert(product.code().to_string(), product);
        }
        Ok(products)
    }

    async fn update(&self, product: &Product) -> StoreResult<()> {
        debug!(code = %product.code(), "Updating product in list storage");
        let mut storage = self.lock()?;
        let index = Self::position(&storage, product.code())
            .ok_or_else(|| StoreError::not_found("Product", product.code()))?;
        storage[index] = product.to_fields();
        Ok(())
    }

    async fn delete(&self, code: &str) -> StoreResult<()> {
        debug!(code = %code, "Deleting product from list storage");
        let mut storage = self.lock()?;
        let index = Self::position(&storage, code)
            .ok_or_else(|| StoreError::not_found("Product", code))?;
        storage.remove(index);
        Ok(())
    }
}

// =============================================================================
// Map Backend
// =============================================================================

/// Products kept in an insertion-ordered map keyed by code.
#[derive(Debug, Default)]
pub struct MapProductRepository {
    storage: Mutex<IndexMap<String, ProductFields>>,
    factory: ProductFactory,
}

impl MapProductRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository holding `products`. Later duplicates are skipped.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let mut storage = IndexMap::new();
        for product in products {
            storage
                .entry(product.code().to_string())
                .or_insert_with(|| product.to_fields());
        }
        MapProductRepository {
            storage: Mutex::new(storage),
            factory: ProductFactory,
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, IndexMap<String, ProductFields>>> {
        self.storage.lock().map_err(|_| poisoned())
    }
}

#[async_trait]
impl ProductRepository for MapProductRepository {
    async fn add(&self, product: &Product) -> StoreResult<bool> {
        debug!(code = %product.code(), "Adding product to map storage");
        let mut storage = self.lock()?;
        if storage.contains_key(product.code()) {
            debug!(code = %product.code(), "Code already present, add skipped");
            return Ok(false);
        }
        storage.insert(product.code().to_string(), product.to_fields());
        Ok(true)
    }

    async fn get(&self, code: &str) -> StoreResult<Option<Product>> {
        let storage = self.lock()?;
        match storage.get(code) {
            Some(fields) => Ok(Some(self.factory.create_product(fields)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> StoreResult<ProductMap> {
        let storage = self.lock()?;
        let mut products = ProductMap::with_capacity(storage.len());
        for (code, fields) in storage.iter() {
            products.insert(code.clone(), self.factory.create_product(fields)?);
        }
        Ok(products)
    }

    async fn update(&self, product: &Product) -> StoreResult<()> {
        debug!(code = %product.code(), "Updating product in map storage");
        let mut storage = self.lock()?;
        match storage.get_mut(product.code()) {
            Some(fields) => {
                *fields = product.to_fields();
                Ok(())
            }
            None => Err(StoreError::not_found("Product", product.code())),
        }
    }

    async fn delete(&self, code: &str) -> StoreResult<()> {
        debug!(code = %code, "Deleting product from map storage");
        let mut storage = self.lock()?;
        storage
            .shift_remove(code)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("Product", code))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;

    #[tokio::test]
    async fn test_seeded_list_skips_duplicates() {
        let mut renamed = fixtures::generic();
        renamed.set_name("Second notebook").unwrap();

        let repo = ListProductRepository::with_products(vec![
            fixtures::generic(),
            fixtures::food(),
            renamed,
        ]);

        let products = repo.list().await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products["G-100"].name(), "Notebook");
    }

    #[tokio::test]
    async fn test_seeded_map_skips_duplicates() {
        let mut renamed = fixtures::food();
        renamed.set_name("Other yogurt").unwrap();

        let repo = MapProductRepository::with_products(vec![fixtures::food(), renamed]);
        assert_eq!(
            repo.get("F-300").await.unwrap().map(|p| p.name().to_string()),
            Some("Yogurt".to_string())
        );
    }

    #[tokio::test]
    async fn test_map_delete_keeps_remaining_order() {
        let repo = MapProductRepository::with_products(fixtures::all());
        repo.delete("G-100").await.unwrap();

        let codes: Vec<String> = repo.list().await.unwrap().into_keys().collect();
        assert_eq!(codes, vec!["E-200", "F-300", "C-400"]);
    }

    #[tokio::test]
    async fn test_stored_mapping_is_a_snapshot() {
        let repo = ListProductRepository::new();
        let mut product = fixtures::electronic();
        repo.add(&product).await.unwrap();

        // Mutating the caller's copy does not touch storage
        product.set_stock(0).unwrap();
        let stored = repo.get(product.code()).await.unwrap().unwrap();
        assert_eq!(stored.stock(), 3);
        assert!(stored.available());
    }
}
