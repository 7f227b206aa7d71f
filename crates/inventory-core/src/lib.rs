//! # inventory-core: Pure Product Model
//!
//! This crate is the **heart** of the inventory catalog. It defines the
//! polymorphic product model, its validation rules and the factory that every
//! storage backend goes through. There is no I/O here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Inventory Catalog Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Caller (menu / CLI / seed binary)                      │   │
//! │  │   raw text → typed values → ProductFactory → Product            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ inventory-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  factory  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  schema   │  │   rules   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO FILES                               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              inventory-store (Repository Layer)                 │   │
//! │  │          list · map · JSON file · SQLite backends               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, ProductType, ProductDetails
//! - [`money`] - Money type with integer cents
//! - [`factory`] - Variant dispatch from a field mapping
//! - [`validation`] - Field rules and typed mapping readers
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use inventory_core::{Money, NewProduct, ProductDetails, ProductFactory};
//!
//! let shirt = NewProduct::new("C-1", "Shirt", Money::from_cents(1999))
//!     .stock(0)
//!     .available(true)
//!     .details(ProductDetails::Clothing { size: "M".into(), color: None })
//!     .build()
//!     .unwrap();
//!
//! // Out of stock products are never available
//! assert!(!shirt.available());
//!
//! // Canonical mapping round-trips through the factory
//! let again = ProductFactory.create_product(&shirt.to_fields()).unwrap();
//! assert_eq!(again, shirt);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod factory;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError, ValidationResult};
pub use factory::{ProductFactory, ProductSchema};
pub use money::{Money, MAX_PRICE_CENTS};
pub use types::*;
