//! # SQL Product Repository
//!
//! Products live in a base table plus one extension table per variant.
//!
//! ## Table Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products (code PK, name, price¢, description, stock, available 0/1,    │
//! │            product_type)                                                │
//! │      │                                                                  │
//! │      ├── electronics (code PK/FK, warranty)          electronic        │
//! │      ├── food        (code PK/FK, expiration_date)   food              │
//! │      └── clothing    (code PK/FK, size, color)       clothing          │
//! │                                                                         │
//! │  generic products have no extension row                                 │
//! │  ON DELETE CASCADE removes extension rows with the base row             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Write Path
//! ```text
//! pool.begin()
//!     │
//!     ├── base statement (INSERT ... DO NOTHING / UPDATE)
//!     ├── clear other variants' extension rows (update only)
//!     ├── extension upsert
//!     │
//!     ├── all Ok  → COMMIT
//!     └── any Err → ROLLBACK, then return the error
//! ```
//!
//! ## Read Path
//! Base row first, then the extension row by code, merged into one canonical
//! mapping for [`ProductFactory`]. Storage failures while reading are logged
//! and reported as "absent"; bad stored data still surfaces as an error.

use async_trait::async_trait;
use inventory_core::validation::DATE_FORMAT;
use inventory_core::{Money, Product, ProductDetails, ProductFactory, ProductFields, ProductType};
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::{debug, warn};

use super::{ProductMap, ProductRepository};
use crate::error::{StoreError, StoreResult};

const SELECT_PRODUCTS: &str = r#"
    SELECT code, name, price, description, stock, available, product_type
    FROM products
"#;

/// Repository for the SQLite product tables.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("inventory.db")).await?;
/// let repo = db.products();
///
/// repo.add(&product).await?;
/// let stored = repo.get("E-1").await?;
/// ```
#[derive(Debug, Clone)]
pub struct SqlProductRepository {
    pool: SqlitePool,
    factory: ProductFactory,
}

impl SqlProductRepository {
    /// Creates a new SqlProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SqlProductRepository {
            pool,
            factory: ProductFactory,
        }
    }

    /// Reads the merged mapping for one code.
    async fn fetch_fields(&self, code: &str) -> StoreResult<Option<ProductFields>> {
        let sql = format!("{} WHERE code = ?1", SELECT_PRODUCTS);
        let row = sqlx::query(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.merge_extension(base_fields(&row)?).await?)),
            None => Ok(None),
        }
    }

    /// Adds the variant columns from the matching extension table.
    async fn merge_extension(&self, mut fields: ProductFields) -> StoreResult<ProductFields> {
        let product_type = match fields.get("product_type") {
            Some(Value::String(tag)) => tag.parse::<ProductType>()?,
            _ => ProductType::Generic,
        };
        let Some(table) = product_type.extension_table() else {
            return Ok(fields);
        };
        let code = match fields.get("code") {
            Some(Value::String(code)) => code.clone(),
            _ => return Ok(fields),
        };

        let sql = format!(
            "SELECT {} FROM {} WHERE code = ?1",
            product_type.extra_field_names().join(", "),
            table
        );
        let row = sqlx::query(&sql)
            .bind(&code)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => extension_fields(product_type, &row, &mut fields)?,
            None => debug!(code = %code, table, "No extension row, using defaults"),
        }
        Ok(fields)
    }

    /// Inserts base and extension rows. `Ok(false)` when the code exists.
    async fn insert_product(
        tx: &mut Transaction<'_, Sqlite>,
        product: &Product,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO products (
                code, name, price, description, stock, available, product_type
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(code) DO NOTHING
            "#,
        )
        .bind(product.code())
        .bind(product.name())
        .bind(product.price().cents())
        .bind(product.description())
        .bind(product.stock())
        .bind(product.available())
        .bind(product.product_type().as_str())
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        write_extension(tx, product).await?;
        Ok(true)
    }

    /// Replaces base and extension rows of an existing product.
    async fn replace_product(
        tx: &mut Transaction<'_, Sqlite>,
        product: &Product,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                price = ?3,
                description = ?4,
                stock = ?5,
                available = ?6,
                product_type = ?7
            WHERE code = ?1
            "#,
        )
        .bind(product.code())
        .bind(product.name())
        .bind(product.price().cents())
        .bind(product.description())
        .bind(product.stock())
        .bind(product.available())
        .bind(product.product_type().as_str())
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", product.code()));
        }

        // The variant may have changed
        for other in ProductType::ALL {
            if other == product.product_type() {
                continue;
            }
            if let Some(table) = other.extension_table() {
                let sql = format!("DELETE FROM {} WHERE code = ?1", table);
                sqlx::query(&sql)
                    .bind(product.code())
                    .execute(&mut **tx)
                    .await?;
            }
        }

        write_extension(tx, product).await
    }
}

/// Commits on success; rolls back explicitly and returns the error otherwise.
async fn finish<T>(
    tx: Transaction<'_, Sqlite>,
    code: &str,
    result: StoreResult<T>,
) -> StoreResult<T> {
    match result {
        Ok(value) => {
            tx.commit()
                .await
                .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;
            Ok(value)
        }
        Err(err) => {
            debug!(code = %code, error = %err, "Rolling back product write");
            if let Err(rollback_err) = tx.rollback().await {
                warn!(code = %code, error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

/// Upserts the extension row for the product's variant.
async fn write_extension(tx: &mut Transaction<'_, Sqlite>, product: &Product) -> StoreResult<()> {
    let Some(table) = product.product_type().extension_table() else {
        return Ok(());
    };

    let query = match product.details() {
        ProductDetails::Generic => return Ok(()),
        ProductDetails::Electronic { warranty } => {
            let sql = format!(
                "INSERT INTO {} (code, warranty) VALUES (?1, ?2) \
                 ON CONFLICT(code) DO UPDATE SET warranty = excluded.warranty",
                table
            );
            sqlx::query(&sql)
                .bind(product.code())
                .bind(*warranty)
                .execute(&mut **tx)
                .await
        }
        ProductDetails::Food { expiration_date } => {
            let sql = format!(
                "INSERT INTO {} (code, expiration_date) VALUES (?1, ?2) \
                 ON CONFLICT(code) DO UPDATE SET expiration_date = excluded.expiration_date",
                table
            );
            sqlx::query(&sql)
                .bind(product.code())
                .bind(expiration_date.map(|d| d.format(DATE_FORMAT).to_string()))
                .execute(&mut **tx)
                .await
        }
        ProductDetails::Clothing { size, color } => {
            let sql = format!(
                "INSERT INTO {} (code, size, color) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(code) DO UPDATE SET size = excluded.size, color = excluded.color",
                table
            );
            sqlx::query(&sql)
                .bind(product.code())
                .bind(size.as_str())
                .bind(color.as_deref())
                .execute(&mut **tx)
                .await
        }
    };

    query?;
    Ok(())
}

fn optional<T: Into<Value>>(value: Option<T>) -> Value {
    value.map(Into::into).unwrap_or(Value::Null)
}

/// Canonical mapping of a base row. `available` stays 0/1 for the factory.
fn base_fields(row: &SqliteRow) -> StoreResult<ProductFields> {
    let mut fields = ProductFields::new();
    fields.insert("code".into(), Value::from(row.try_get::<String, _>("code")?));
    fields.insert("name".into(), Value::from(row.try_get::<String, _>("name")?));
    fields.insert(
        "price".into(),
        Money::from_cents(row.try_get::<i64, _>("price")?).to_json_value(),
    );
    fields.insert(
        "description".into(),
        optional(row.try_get::<Option<String>, _>("description")?),
    );
    fields.insert("stock".into(), Value::from(row.try_get::<i64, _>("stock")?));
    fields.insert(
        "available".into(),
        Value::from(row.try_get::<i64, _>("available")?),
    );
    fields.insert(
        "product_type".into(),
        Value::from(row.try_get::<String, _>("product_type")?),
    );
    Ok(fields)
}

fn extension_fields(
    product_type: ProductType,
    row: &SqliteRow,
    fields: &mut ProductFields,
) -> StoreResult<()> {
    match product_type {
        ProductType::Generic => {}
        ProductType::Electronic => {
            let warranty: Option<i64> = row.try_get("warranty")?;
            fields.insert("warranty".into(), optional(warranty));
        }
        ProductType::Food => {
            let expiration_date: Option<String> = row.try_get("expiration_date")?;
            fields.insert("expiration_date".into(), optional(expiration_date));
        }
        ProductType::Clothing => {
            let size: Option<String> = row.try_get("size")?;
            let color: Option<String> = row.try_get("color")?;
            fields.insert("size".into(), optional(size));
            fields.insert("color".into(), optional(color));
        }
    }
    Ok(())
}

#[async_trait]
impl ProductRepository for SqlProductRepository {
    async fn add(&self, product: &Product) -> StoreResult<bool> {
        debug!(
            code = %product.code(),
            product_type = %product.product_type(),
            "Inserting product"
        );

        let mut tx = self.pool.begin().await?;
        let result = Self::insert_product(&mut tx, product).await;
        let inserted = finish(tx, product.code(), result).await?;

        if !inserted {
            debug!(code = %product.code(), "Code already present, add skipped");
        }
        Ok(inserted)
    }

    async fn get(&self, code: &str) -> StoreResult<Option<Product>> {
        debug!(code = %code, "Fetching product");

        match self.fetch_fields(code).await {
            Ok(Some(fields)) => Ok(Some(self.factory.create_product(&fields)?)),
            Ok(None) => Ok(None),
            Err(err) if err.is_storage_failure() => {
                warn!(code = %code, error = %err, "Product read failed, reporting it as absent");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn list(&self) -> StoreResult<ProductMap> {
        let sql = format!("{} ORDER BY rowid", SELECT_PRODUCTS);
        let rows = match sqlx::query(&sql).fetch_all(&self.pool).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(error = %err, "Product listing failed, reporting an empty catalog");
                return Ok(ProductMap::new());
            }
        };

        let mut products = ProductMap::with_capacity(rows.len());
        for row in &rows {
            let merged = match base_fields(row) {
                Ok(fields) => self.merge_extension(fields).await,
                Err(err) => Err(err),
            };
            let fields = match merged {
                Ok(fields) => fields,
                Err(err) if err.is_storage_failure() => {
                    warn!(error = %err, "Skipping unreadable product row");
                    continue;
                }
                Err(err) => return Err(err),
            };
            let product = self.factory.create_product(&fields)?;
            products.insert(product.code().to_string(), product);
        }

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    async fn update(&self, product: &Product) -> StoreResult<()> {
        debug!(
            code = %product.code(),
            product_type = %product.product_type(),
            "Updating product"
        );

        let mut tx = self.pool.begin().await?;
        let result = Self::replace_product(&mut tx, product).await;
        finish(tx, product.code(), result).await
    }

    async fn delete(&self, code: &str) -> StoreResult<()> {
        debug!(code = %code, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE code = ?1")
            .bind(code)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", code));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::fixtures;

    async fn setup() -> (Database, SqlProductRepository) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        (db, repo)
    }

    async fn count(pool: &SqlitePool, table: &str) -> i64 {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        sqlx::query_scalar(&sql).fetch_one(pool).await.unwrap()
    }

    async fn fail_electronics_writes(pool: &SqlitePool) {
        for event in ["INSERT", "UPDATE"] {
            let sql = format!(
                "CREATE TRIGGER fail_electronics_{} BEFORE {} ON electronics \
                 BEGIN SELECT RAISE(ABORT, 'forced failure'); END",
                event.to_lowercase(),
                event
            );
            sqlx::query(&sql).execute(pool).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_storage_layout() {
        let (db, repo) = setup().await;
        repo.add(&fixtures::electronic()).await.unwrap();

        let (price, available, product_type): (i64, i64, String) = sqlx::query_as(
            "SELECT price, available, product_type FROM products WHERE code = 'E-200'",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(price, 8_999);
        assert_eq!(available, 1);
        assert_eq!(product_type, "electronic");

        let warranty: i64 =
            sqlx::query_scalar("SELECT warranty FROM electronics WHERE code = 'E-200'")
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(warranty, 2);
    }

    #[tokio::test]
    async fn test_generic_has_no_extension_row() {
        let (db, repo) = setup().await;
        repo.add(&fixtures::generic()).await.unwrap();

        assert_eq!(count(db.pool(), "products").await, 1);
        for table in ["electronics", "food", "clothing"] {
            assert_eq!(count(db.pool(), table).await, 0);
        }
    }

    #[tokio::test]
    async fn test_failed_add_leaves_no_rows() {
        let (db, repo) = setup().await;
        fail_electronics_writes(db.pool()).await;

        let err = repo.add(&fixtures::electronic()).await.unwrap_err();
        assert!(err.to_string().contains("forced failure"));

        assert_eq!(count(db.pool(), "products").await, 0);
        assert_eq!(count(db.pool(), "electronics").await, 0);
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_failed_update_keeps_previous_state() {
        let (db, repo) = setup().await;
        let original = fixtures::electronic();
        repo.add(&original).await.unwrap();
        fail_electronics_writes(db.pool()).await;

        let mut changed = original.clone();
        changed.set_name("Renamed").unwrap();
        changed
            .set_details(ProductDetails::Electronic { warranty: 5 })
            .unwrap();
        assert!(repo.update(&changed).await.is_err());

        assert_eq!(repo.get("E-200").await.unwrap(), Some(original));
    }

    #[tokio::test]
    async fn test_variant_change_clears_old_extension() {
        let (db, repo) = setup().await;
        let mut product = fixtures::electronic();
        repo.add(&product).await.unwrap();

        product
            .set_details(ProductDetails::Food {
                expiration_date: None,
            })
            .unwrap();
        repo.update(&product).await.unwrap();

        assert_eq!(count(db.pool(), "electronics").await, 0);
        assert_eq!(count(db.pool(), "food").await, 1);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_extension() {
        let (db, repo) = setup().await;
        repo.add(&fixtures::clothing()).await.unwrap();
        assert_eq!(count(db.pool(), "clothing").await, 1);

        repo.delete("C-400").await.unwrap();
        assert_eq!(count(db.pool(), "clothing").await, 0);
    }

    #[tokio::test]
    async fn test_stored_unknown_type_propagates() {
        let (db, repo) = setup().await;
        sqlx::query(
            "INSERT INTO products (code, name, price, stock, available, product_type) \
             VALUES ('B-1', 'Canoe', 100, 1, 1, 'boat')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        assert!(matches!(
            repo.get("B-1").await.unwrap_err(),
            StoreError::InvalidProductType(tag) if tag == "boat"
        ));
        assert!(repo.list().await.is_err());
    }

    #[tokio::test]
    async fn test_legacy_tag_reads_as_generic() {
        let (db, repo) = setup().await;
        sqlx::query(
            "INSERT INTO products (code, name, price, stock, available, product_type) \
             VALUES ('L-1', 'Lamp', 1999, 2, 1, 'product')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let lamp = repo.get("L-1").await.unwrap().unwrap();
        assert_eq!(lamp.product_type(), ProductType::Generic);
        assert_eq!(lamp.price(), Money::from_cents(1999));
    }

    #[tokio::test]
    async fn test_reads_degrade_when_pool_closed() {
        let (db, repo) = setup().await;
        repo.add(&fixtures::food()).await.unwrap();
        db.close().await;

        assert_eq!(repo.get("F-300").await.unwrap(), None);
        assert!(repo.list().await.unwrap().is_empty());
        assert!(repo.add(&fixtures::generic()).await.is_err());
    }
}
