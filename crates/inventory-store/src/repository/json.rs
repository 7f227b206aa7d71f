//! # JSON File Repository
//!
//! Persists the catalog as one JSON object keyed by product code.
//!
//! ## Read-Modify-Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  every operation                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  load()  ── file missing ──► {}            (debug!)                     │
//! │       │  ── not valid JSON ► {}            (warn!, self-healing)        │
//! │       │  ── unreadable ────► StoreError::FileAccess                     │
//! │       ▼                                                                 │
//! │  rekey() ── each record filed under its own "code"   (warn! on drift)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  document: IndexMap<code, mapping>                                      │
//! │       │                                                                 │
//! │       ▼  (mutations only)                                               │
//! │  save()  ── pretty rewrite to a sibling temp file, then rename          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is cached between calls, so an external edit of the file is
//! visible to the next operation. There is no cross-process locking, but a
//! reader never observes a half-written file.
//!
//! ## File Format
//! ```json
//! {
//!     "E-1": {
//!         "code": "E-1",
//!         "name": "Radio",
//!         "price": 25.5,
//!         "description": null,
//!         "stock": 2,
//!         "available": true,
//!         "product_type": "electronic",
//!         "warranty": 1
//!     }
//! }
//! ```

use async_trait::async_trait;
use indexmap::IndexMap;
use inventory_core::{Product, ProductFactory, ProductFields};
use serde::Serialize;
use std::io::ErrorKind;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{ProductMap, ProductRepository};
use crate::error::{StoreError, StoreResult};

/// On-disk document: code → canonical mapping.
type Document = IndexMap<String, ProductFields>;

/// Repository backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonProductRepository {
    path: PathBuf,
    factory: ProductFactory,
}

impl JsonProductRepository {
    /// Creates a repository for the file at `path`. The file need not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonProductRepository {
            path: path.into(),
            factory: ProductFactory,
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> StoreResult<Document> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Product file not found, starting empty");
                return Ok(Document::new());
            }
            Err(err) => {
                return Err(StoreError::file_access(self.path.display().to_string(), err));
            }
        };

        match serde_json::from_slice::<Document>(&bytes) {
            Ok(document) => Ok(self.rekey(document)),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Product file is not a valid catalog, treating it as empty"
                );
                Ok(Document::new())
            }
        }
    }

    /// Files every record under its own `code`.
    ///
    /// A hand-edited file may key a record differently from the code it
    /// carries. The record's code wins; on a clash the first record is kept.
    fn rekey(&self, document: Document) -> Document {
        let mut rekeyed = Document::with_capacity(document.len());
        for (key, fields) in document {
            let code = match fields.get("code").and_then(|v| v.as_str()) {
                Some(code) => code.to_string(),
                None => key.clone(),
            };
            if code != key {
                warn!(
                    path = %self.path.display(),
                    key = %key,
                    code = %code,
                    "Record key differs from its code, using the code"
                );
            }
            if rekeyed.contains_key(&code) {
                warn!(path = %self.path.display(), code = %code, "Duplicate code, keeping the first record");
                continue;
            }
            rekeyed.insert(code, fields);
        }
        rekeyed
    }

    /// Sibling path the document is written to before being renamed over
    /// the real file.
    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(".");
        name.push(self.path.file_name().unwrap_or_else(|| OsStr::new("catalog")));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn save(&self, document: &Document) -> StoreResult<()> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        document.serialize(&mut serializer)?;

        let location = self.path.display().to_string();
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| StoreError::file_access(location.clone(), err))?;
        }

        // Same directory, so the rename replaces the file in one step
        let temp = self.temp_path();
        if let Err(err) = tokio::fs::write(&temp, buffer).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(StoreError::file_access(location, err));
        }
        if let Err(err) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(StoreError::file_access(location, err));
        }

        debug!(path = %location, count = document.len(), "Product file written");
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for JsonProductRepository {
    async fn add(&self, product: &Product) -> StoreResult<bool> {
        debug!(code = %product.code(), path = %self.path.display(), "Adding product");
        let mut document = self.load().await?;
        if document.contains_key(product.code()) {
            debug!(code = %product.code(), "Code already present, add skipped");
            return Ok(false);
        }
        document.insert(product.code().to_string(), product.to_fields());
        self.save(&document).await?;
        Ok(true)
    }

    async fn get(&self, code: &str) -> StoreResult<Option<Product>> {
        let document = self.load().await?;
        match document.get(code) {
            Some(fields) => Ok(Some(self.factory.create_product(fields)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> StoreResult<ProductMap> {
        let document = self.load().await?;
        let mut products = ProductMap::with_capacity(document.len());
        for (code, fields) in &document {
            products.insert(code.clone(), self.factory.create_product(fields)?);
        }
        Ok(products)
    }

    async fn update(&self, product: &Product) -> StoreResult<()> {
        debug!(code = %product.code(), path = %self.path.display(), "Updating product");
        let mut document = self.load().await?;
        match document.get_mut(product.code()) {
            Some(fields) => *fields = product.to_fields(),
            None => return Err(StoreError::not_found("Product", product.code())),
        }
        self.save(&document).await
    }

    async fn delete(&self, code: &str) -> StoreResult<()> {
        debug!(code = %code, path = %self.path.display(), "Deleting product");
        let mut document = self.load().await?;
        if document.shift_remove(code).is_none() {
            return Err(StoreError::not_found("Product", code));
        }
        self.save(&document).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_file_is_empty_and_untouched() {
        let path = fixtures::temp_path("json");
        let repo = JsonProductRepository::new(&path);

        assert!(repo.list().await.unwrap().is_empty());
        assert_eq!(repo.get("anything").await.unwrap(), None);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_self_heals() {
        let path = fixtures::temp_path("json");
        std::fs::write(&path, "{ this is not json").unwrap();
        let repo = JsonProductRepository::new(&path);

        assert!(repo.list().await.unwrap().is_empty());
        assert!(repo.add(&fixtures::generic()).await.unwrap());

        let on_disk: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk["G-100"]["name"], json!("Notebook"));

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_external_rewrite_visible_on_next_call() {
        let path = fixtures::temp_path("json");
        let repo = JsonProductRepository::new(&path);
        repo.add(&fixtures::generic()).await.unwrap();

        let replacement = json!({
            "F-9": {
                "code": "F-9", "name": "Bread", "price": 2.4, "description": null,
                "stock": 12, "available": true, "product_type": "food",
                "expiration_date": "2026-10-20"
            }
        });
        std::fs::write(&path, serde_json::to_string(&replacement).unwrap()).unwrap();

        assert_eq!(repo.get("G-100").await.unwrap(), None);
        let bread = repo.get("F-9").await.unwrap().unwrap();
        assert_eq!(bread.name(), "Bread");
        assert_eq!(bread.price().cents(), 240);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_file_is_pretty_snapshot_in_field_order() {
        let path = fixtures::temp_path("json");
        let repo = JsonProductRepository::new(&path);
        repo.add(&fixtures::electronic()).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n        \"code\": \"E-200\""));

        let code_at = text.find("\"code\"").unwrap();
        let type_at = text.find("\"product_type\"").unwrap();
        let warranty_at = text.find("\"warranty\"").unwrap();
        assert!(code_at < type_at && type_at < warranty_at);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_parent_directories_created() {
        let dir = std::env::temp_dir().join(format!("inventory-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("products.json");
        let repo = JsonProductRepository::new(&path);

        repo.add(&fixtures::clothing()).await.unwrap();
        assert!(path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_unusable_path_is_file_access_error() {
        // A directory cannot be read or written as the catalog file
        let dir = std::env::temp_dir().join(format!("inventory-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let repo = JsonProductRepository::new(&dir);

        let err = repo.add(&fixtures::generic()).await.unwrap_err();
        assert!(matches!(err, StoreError::FileAccess { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_records_filed_under_their_own_code() {
        let path = fixtures::temp_path("json");
        let edited = json!({
            "OLD": {
                "code": "NEW", "name": "Lamp", "price": 15, "description": null,
                "stock": 1, "available": true, "product_type": "generic"
            }
        });
        std::fs::write(&path, edited.to_string()).unwrap();
        let repo = JsonProductRepository::new(&path);

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.keys().collect::<Vec<_>>(), vec!["NEW"]);
        assert_eq!(repo.get("OLD").await.unwrap(), None);

        let mut lamp = repo.get("NEW").await.unwrap().unwrap();
        lamp.set_stock(7).unwrap();
        repo.update(&lamp).await.unwrap();
        assert_eq!(repo.get("NEW").await.unwrap().unwrap().stock(), 7);

        // Re-adding the same code is still refused
        assert!(!repo.add(&lamp).await.unwrap());

        repo.delete("NEW").await.unwrap();
        assert!(repo.list().await.unwrap().is_empty());

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_duplicate_codes_keep_first_record() {
        let path = fixtures::temp_path("json");
        let edited = json!({
            "A": {"code": "DUP", "name": "First", "price": 1, "stock": 1},
            "B": {"code": "DUP", "name": "Second", "price": 2, "stock": 1}
        });
        std::fs::write(&path, edited.to_string()).unwrap();
        let repo = JsonProductRepository::new(&path);

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed["DUP"].name(), "First");

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_save_replaces_file_without_leftovers() {
        let dir = std::env::temp_dir().join(format!("inventory-{}", uuid::Uuid::new_v4()));
        let path = dir.join("products.json");
        let repo = JsonProductRepository::new(&path);

        repo.add(&fixtures::generic()).await.unwrap();
        repo.add(&fixtures::food()).await.unwrap();
        repo.delete("G-100").await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![OsString::from("products.json")]);
        assert!(!repo.temp_path().exists());

        let on_disk: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.as_object().unwrap().len(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_previous_file() {
        let dir = std::env::temp_dir().join(format!("inventory-{}", uuid::Uuid::new_v4()));
        let path = dir.join("products.json");
        let repo = JsonProductRepository::new(&path);
        repo.add(&fixtures::generic()).await.unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        // A directory squatting on the temp name makes the write fail
        std::fs::create_dir_all(repo.temp_path()).unwrap();
        let err = repo.add(&fixtures::food()).await.unwrap_err();
        assert!(matches!(err, StoreError::FileAccess { .. }));

        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_invalid_stored_record_propagates() {
        let path = fixtures::temp_path("json");
        let bad = json!({
            "X": {"code": "X", "name": "Broken", "price": 1, "stock": -3}
        });
        std::fs::write(&path, bad.to_string()).unwrap();
        let repo = JsonProductRepository::new(&path);

        assert!(matches!(
            repo.get("X").await.unwrap_err(),
            StoreError::Validation(_)
        ));

        let _ = std::fs::remove_file(&path);
    }
}
