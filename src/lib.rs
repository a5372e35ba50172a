//! Storefront Configurator
//!
//! Product-variant resolution and dynamic pricing for a sheet-goods storefront.
//!
//! ## Features
//! - Attribute option narrowing (constraint propagation over a group's variants)
//! - Selection to SKU resolution with deterministic fallback
//! - Dimension normalization for display and pricing
//! - Flat or area-based unit pricing, driven by a category table
//! - Quantity policies (minimum, step, stock ceiling)
//! - SKU-keyed cart merging and per-SKU dispatch dates

use thiserror::Error;

pub mod config;
pub mod domain;
pub mod engine;
pub mod http;

pub use config::{AppConfig, ConfigError};
pub use domain::aggregates::{Cart, CartError, CartLine, CartStore, CartSynchronizer, MergeOutcome};
pub use domain::catalog::{Attribute, AttributeOptions, Catalog, CatalogError, CatalogIndex, ProductGroup, ProductVariant, Resolution, Selection};
pub use domain::classification::{CategoryClass, CategoryTable, PricingClass, ProductClass, QuantityClass};
pub use domain::configurator::{Configurator, ConfiguratorEvent, ConfiguratorState};
pub use domain::dimensions::{Dimension, DimensionKind, DimensionNormalizer, MagnitudeHeuristic};
pub use domain::pricing::{PriceQuote, PricingCalculator};
pub use domain::quantity::{Adjustment, Direction, QuantityPolicy};
pub use domain::storage::{InMemoryStore, KeyValueStore};
pub use domain::value_objects::{Money, Sku};
pub use engine::Engine;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum EcommerceError {
    #[error("Variant not found: {0}")]
    VariantNotFound(Sku),

    #[error("Insufficient inventory for {0}")]
    InsufficientInventory(Sku),

    #[error("Invalid quantity")]
    InvalidQuantity,

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub type Result<T> = std::result::Result<T, EcommerceError>;
