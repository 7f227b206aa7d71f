//! # Domain Types
//!
//! The product model shared by every storage backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Product                                         │
//! │  ─────────────────────────────────────────────────────────────────────  │
//! │  code (key) · name · price · description · stock · available           │
//! │  details: ProductDetails ──┬── Generic                                  │
//! │                            ├── Electronic { warranty }                  │
//! │                            ├── Food       { expiration_date }           │
//! │                            └── Clothing   { size, color }               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Canonical Mapping
//! [`Product::to_fields`] produces the flat, ordered field mapping every
//! backend stores. Common fields come first, variant fields are appended in
//! declaration order; [`ProductType::field_names`] returns the same order.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, ValidationResult};
use crate::factory::ProductFactory;
use crate::money::Money;
use crate::validation::{
    validate_code, validate_name, validate_non_negative, validate_price, DATE_FORMAT,
};

/// Flat field-name → value mapping used for serialization.
pub type ProductFields = Map<String, Value>;

/// Fields shared by every product variant, in canonical order.
pub const COMMON_FIELDS: [&str; 7] = [
    "code",
    "name",
    "price",
    "description",
    "stock",
    "available",
    "product_type",
];

const GENERIC_FIELDS: &[&str] = &COMMON_FIELDS;
const ELECTRONIC_FIELDS: &[&str] = &[
    "code",
    "name",
    "price",
    "description",
    "stock",
    "available",
    "product_type",
    "warranty",
];
const FOOD_FIELDS: &[&str] = &[
    "code",
    "name",
    "price",
    "description",
    "stock",
    "available",
    "product_type",
    "expiration_date",
];
const CLOTHING_FIELDS: &[&str] = &[
    "code",
    "name",
    "price",
    "description",
    "stock",
    "available",
    "product_type",
    "size",
    "color",
];

// =============================================================================
// Product Type
// =============================================================================

/// The variant tag stored in `product_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    /// Plain catalog item with no extra fields.
    #[default]
    Generic,
    Electronic,
    Food,
    Clothing,
}

impl ProductType {
    /// Every recognized tag, in menu order.
    pub const ALL: [ProductType; 4] = [
        ProductType::Generic,
        ProductType::Electronic,
        ProductType::Food,
        ProductType::Clothing,
    ];

    /// The tag as stored in `product_type`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProductType::Generic => "generic",
            ProductType::Electronic => "electronic",
            ProductType::Food => "food",
            ProductType::Clothing => "clothing",
        }
    }

    /// Field names for this variant, common fields first.
    pub const fn field_names(&self) -> &'static [&'static str] {
        match self {
            ProductType::Generic => GENERIC_FIELDS,
            ProductType::Electronic => ELECTRONIC_FIELDS,
            ProductType::Food => FOOD_FIELDS,
            ProductType::Clothing => CLOTHING_FIELDS,
        }
    }

    /// Only the fields this variant appends to the common set.
    pub fn extra_field_names(&self) -> &'static [&'static str] {
        &self.field_names()[COMMON_FIELDS.len()..]
    }

    /// Relational extension table holding this variant's extra fields.
    ///
    /// ```text
    /// generic    → (none)
    /// electronic → electronics
    /// food       → food
    /// clothing   → clothing
    /// ```
    pub const fn extension_table(&self) -> Option<&'static str> {
        match self {
            ProductType::Generic => None,
            ProductType::Electronic => Some("electronics"),
            ProductType::Food => Some("food"),
            ProductType::Clothing => Some("clothing"),
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `product` is accepted as a legacy spelling of `generic`.
impl FromStr for ProductType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generic" | "product" => Ok(ProductType::Generic),
            "electronic" => Ok(ProductType::Electronic),
            "food" => Ok(ProductType::Food),
            "clothing" => Ok(ProductType::Clothing),
            _ => Err(CoreError::InvalidProductType(s.to_string())),
        }
    }
}

// =============================================================================
// Product Details
// =============================================================================

/// Variant payload carried by a [`Product`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProductDetails {
    #[default]
    Generic,
    Electronic {
        /// Warranty length; never negative.
        warranty: i64,
    },
    Food {
        expiration_date: Option<NaiveDate>,
    },
    Clothing {
        size: String,
        color: Option<String>,
    },
}

impl ProductDetails {
    /// The tag matching this payload.
    pub const fn product_type(&self) -> ProductType {
        match self {
            ProductDetails::Generic => ProductType::Generic,
            ProductDetails::Electronic { .. } => ProductType::Electronic,
            ProductDetails::Food { .. } => ProductType::Food,
            ProductDetails::Clothing { .. } => ProductType::Clothing,
        }
    }

    fn validate(&self) -> ValidationResult<()> {
        if let ProductDetails::Electronic { warranty } = self {
            validate_non_negative("warranty", *warranty)?;
        }
        Ok(())
    }

    /// Appends this variant's fields to a canonical mapping.
    pub fn write_fields(&self, fields: &mut ProductFields) {
        match self {
            ProductDetails::Generic => {}
            ProductDetails::Electronic { warranty } => {
                fields.insert("warranty".into(), Value::from(*warranty));
            }
            ProductDetails::Food { expiration_date } => {
                let value = match expiration_date {
                    Some(date) => Value::from(date.format(DATE_FORMAT).to_string()),
                    None => Value::Null,
                };
                fields.insert("expiration_date".into(), value);
            }
            ProductDetails::Clothing { size, color } => {
                fields.insert("size".into(), Value::from(size.clone()));
                fields.insert(
                    "color".into(),
                    color.clone().map(Value::from).unwrap_or(Value::Null),
                );
            }
        }
    }
}

// =============================================================================
// New Product (builder)
// =============================================================================

/// Unvalidated product fields, turned into a [`Product`] by [`NewProduct::build`].
///
/// ## Example
/// ```rust
/// use inventory_core::{Money, NewProduct, ProductDetails};
///
/// let laptop = NewProduct::new("E-100", "Laptop", Money::from_cents(99_900))
///     .stock(3)
///     .details(ProductDetails::Electronic { warranty: 2 })
///     .build()
///     .unwrap();
///
/// assert!(laptop.available());
/// ```
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    pub price: Money,
    pub description: Option<String>,
    pub stock: i64,
    pub available: bool,
    pub details: ProductDetails,
}

impl NewProduct {
    /// Starts a generic product with no stock.
    pub fn new(code: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        NewProduct {
            code: code.into(),
            name: name.into(),
            price,
            description: None,
            stock: 0,
            available: true,
            details: ProductDetails::Generic,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn stock(mut self, stock: i64) -> Self {
        self.stock = stock;
        self
    }

    pub fn available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    pub fn details(mut self, details: ProductDetails) -> Self {
        self.details = details;
        self
    }

    /// Validates every field and produces a [`Product`].
    ///
    /// `available` is stored as `false` whenever `stock` is zero.
    pub fn build(self) -> ValidationResult<Product> {
        validate_code(&self.code)?;
        validate_name(&self.name)?;
        validate_price(self.price)?;
        validate_non_negative("stock", self.stock)?;
        self.details.validate()?;

        Ok(Product {
            available: self.available && self.stock > 0,
            code: self.code,
            name: self.name,
            price: self.price,
            description: self.description,
            stock: self.stock,
            details: self.details,
        })
    }
}

// =============================================================================
// Product
// =============================================================================

/// A validated catalog entry.
///
/// Fields are private so the invariants hold after every mutation:
/// - `price` and `stock` are never negative
/// - `available` is never true while `stock == 0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    code: String,
    name: String,
    price: Money,
    description: Option<String>,
    stock: i64,
    available: bool,
    details: ProductDetails,
}

impl Product {
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    pub fn available(&self) -> bool {
        self.available
    }

    pub fn details(&self) -> &ProductDetails {
        &self.details
    }

    pub fn product_type(&self) -> ProductType {
        self.details.product_type()
    }

    /// Warranty, if this is an electronic product.
    pub fn warranty(&self) -> Option<i64> {
        match self.details {
            ProductDetails::Electronic { warranty } => Some(warranty),
            _ => None,
        }
    }

    /// Canonical field names for this product's variant.
    pub fn field_names(&self) -> &'static [&'static str] {
        self.product_type().field_names()
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> ValidationResult<()> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn set_price(&mut self, price: Money) -> ValidationResult<()> {
        validate_price(price)?;
        self.price = price;
        Ok(())
    }

    /// Sets stock; dropping to zero also clears `available`.
    pub fn set_stock(&mut self, stock: i64) -> ValidationResult<()> {
        validate_non_negative("stock", stock)?;
        self.stock = stock;
        if stock == 0 {
            self.available = false;
        }
        Ok(())
    }

    /// Requests availability. Ignored (stays `false`) while out of stock.
    pub fn set_available(&mut self, available: bool) {
        self.available = available && self.stock > 0;
    }

    /// Replaces the variant payload, which may change the product type.
    pub fn set_details(&mut self, details: ProductDetails) -> ValidationResult<()> {
        details.validate()?;
        self.details = details;
        Ok(())
    }

    /// Produces the canonical flat mapping.
    pub fn to_fields(&self) -> ProductFields {
        let mut fields = ProductFields::new();
        fields.insert("code".into(), Value::from(self.code.clone()));
        fields.insert("name".into(), Value::from(self.name.clone()));
        fields.insert("price".into(), self.price.to_json_value());
        fields.insert(
            "description".into(),
            self.description.clone().map(Value::from).unwrap_or(Value::Null),
        );
        fields.insert("stock".into(), Value::from(self.stock));
        fields.insert("available".into(), Value::from(self.available));
        fields.insert(
            "product_type".into(),
            Value::from(self.product_type().as_str()),
        );
        self.details.write_fields(&mut fields);
        fields
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}) {} {} (price={}, stock={}",
            self.code,
            self.product_type(),
            self.name,
            self.price,
            self.stock
        )?;
        match &self.details {
            ProductDetails::Generic => {}
            ProductDetails::Electronic { warranty } => write!(f, ", warranty={}", warranty)?,
            ProductDetails::Food { expiration_date } => match expiration_date {
                Some(date) => write!(f, ", expiration_date={}", date.format(DATE_FORMAT))?,
                None => write!(f, ", expiration_date=-")?,
            },
            ProductDetails::Clothing { size, color } => {
                write!(f, ", size={}, color={}", size, color.as_deref().unwrap_or("-"))?
            }
        }
        write!(f, ")")
    }
}

impl Serialize for Product {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_fields().serialize(serializer)
    }
}

/// Deserialization goes through [`ProductFactory`] like every other read.
impl<'de> Deserialize<'de> for Product {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = ProductFields::deserialize(deserializer)?;
        ProductFactory
            .create_product(&fields)
            .map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
