//! # Product Factory
//!
//! The single place where a canonical field mapping becomes a [`Product`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  { "product_type": "food", "code": "F1", ... }                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  create_product()                                                       │
//! │       ├── read product_type (default: generic)                          │
//! │       ├── unknown tag?  → CoreError::InvalidProductType                 │
//! │       ├── read common fields + variant fields (typed readers)           │
//! │       └── NewProduct::build() → invariants enforced                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Product::Food                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage backends never construct products themselves; they hand stored
//! mappings to this factory, so validation has exactly one entry point.

use serde::Serialize;
use serde_json::Value;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{NewProduct, Product, ProductDetails, ProductFields, ProductType};
use crate::validation::{
    read_bool, read_date, read_integer, read_optional_string, read_string, read_string_or,
};

/// Field-name schema for one product variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProductSchema {
    pub product_type: ProductType,
    pub field_names: &'static [&'static str],
}

/// Builds products from canonical field mappings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductFactory;

impl ProductFactory {
    /// Constructs the variant named by `product_type`.
    ///
    /// ## Example
    /// ```rust
    /// use inventory_core::{ProductFactory, ProductType};
    /// use serde_json::json;
    ///
    /// let fields = json!({
    ///     "code": "E1", "name": "Radio", "price": 25.5,
    ///     "stock": 2, "product_type": "electronic", "warranty": 1
    /// });
    /// let product = ProductFactory
    ///     .create_product(fields.as_object().unwrap())
    ///     .unwrap();
    ///
    /// assert_eq!(product.product_type(), ProductType::Electronic);
    /// assert_eq!(product.warranty(), Some(1));
    /// ```
    pub fn create_product(&self, fields: &ProductFields) -> CoreResult<Product> {
        let product_type = read_product_type(fields)?;

        let details = match product_type {
            ProductType::Generic => ProductDetails::Generic,
            ProductType::Electronic => ProductDetails::Electronic {
                warranty: read_integer(fields, "warranty", 0)?,
            },
            ProductType::Food => ProductDetails::Food {
                expiration_date: read_date(fields, "expiration_date")?,
            },
            ProductType::Clothing => ProductDetails::Clothing {
                size: read_string_or(fields, "size", "")?,
                color: read_optional_string(fields, "color")?,
            },
        };

        let price = match fields.get("price") {
            None | Some(Value::Null) => {
                return Err(ValidationError::Required {
                    field: "price".to_string(),
                }
                .into())
            }
            Some(value) => Money::from_json_value(value)?,
        };

        let product = NewProduct {
            code: read_string(fields, "code")?,
            name: read_string(fields, "name")?,
            price,
            description: read_optional_string(fields, "description")?,
            stock: read_integer(fields, "stock", 0)?,
            available: read_bool(fields, "available", true)?,
            details,
        }
        .build()?;

        Ok(product)
    }

    /// Schema for a type tag, or `None` if the tag is unknown.
    ///
    /// Lets a caller collect the right fields before any product exists.
    pub fn product_schema(&self, tag: &str) -> Option<ProductSchema> {
        let product_type: ProductType = tag.parse().ok()?;
        Some(ProductSchema {
            product_type,
            field_names: product_type.field_names(),
        })
    }

    /// All recognized type tags.
    pub fn product_types(&self) -> Vec<&'static str> {
        ProductType::ALL.iter().map(ProductType::as_str).collect()
    }
}

fn read_product_type(fields: &ProductFields) -> CoreResult<ProductType> {
    match fields.get("product_type") {
        None | Some(Value::Null) => Ok(ProductType::Generic),
        Some(Value::String(tag)) => tag.parse(),
        Some(other) => Err(CoreError::InvalidProductType(other.to_string())),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
