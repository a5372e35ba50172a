//! Catalog model: product groups and their purchasable variants.

pub mod index;
pub mod resolver;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::domain::classification::{CategoryTable, PricingClass, ProductClass, QuantityClass};
use crate::domain::value_objects::{Money, Sku};

pub use index::{available_options, AttributeOptions, CatalogIndex};
pub use resolver::{resolve, Resolution, Resolved};

// =============================================================================
// Attributes and selections
// =============================================================================

/// Physical attribute a group's variants may differ by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Thickness,
    Color,
    Width,
    Length,
}

impl Attribute {
    /// Canonical visiting order for selection repair and option listings.
    pub const ALL: [Attribute; 4] = [Attribute::Thickness, Attribute::Color, Attribute::Width, Attribute::Length];

    pub fn as_str(&self) -> &'static str {
        match self { Self::Thickness => "thickness", Self::Color => "color", Self::Width => "width", Self::Length => "length" }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Transient per-session attribute picks. Always a subset of one group's domain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
}

impl Selection {
    pub fn get(&self, attribute: Attribute) -> Option<&str> {
        match attribute {
            Attribute::Thickness => self.thickness.as_deref(),
            Attribute::Color => self.color.as_deref(),
            Attribute::Width => self.width.as_deref(),
            Attribute::Length => self.length.as_deref(),
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: Option<String>) {
        let slot = match attribute {
            Attribute::Thickness => &mut self.thickness,
            Attribute::Color => &mut self.color,
            Attribute::Width => &mut self.width,
            Attribute::Length => &mut self.length,
        };
        *slot = value;
    }

    pub fn with(mut self, attribute: Attribute, value: impl Into<String>) -> Self {
        self.set(attribute, Some(value.into()));
        self
    }

    pub fn is_empty(&self) -> bool { Attribute::ALL.iter().all(|a| self.get(*a).is_none()) }
}

// =============================================================================
// Groups and variants
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub sku: Sku,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub thickness: Option<String>,
    #[serde(default)]
    pub width: Option<String>,
    #[serde(default)]
    pub length: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub stock: u32,
    /// Net catalog price.
    pub price_net: Decimal,
    /// VAT-inclusive catalog price. Area-priced categories read it as a rate per square meter.
    pub price: Decimal,
    #[serde(default)]
    pub uv_protection: bool,
    #[serde(default)]
    pub warranty: Option<String>,
    #[serde(default = "default_true")]
    pub in_stock: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Resolved by [`CategoryTable::apply`] when the catalog is built.
    #[serde(skip_deserializing)]
    pub class: ProductClass,
}

fn default_true() -> bool { true }

impl ProductVariant {
    /// Attribute value, with blank strings treated as "not applicable".
    pub fn attribute(&self, attribute: Attribute) -> Option<&str> {
        let value = match attribute {
            Attribute::Thickness => self.thickness.as_deref(),
            Attribute::Color => self.color.as_deref(),
            Attribute::Width => self.width.as_deref(),
            Attribute::Length => self.length.as_deref(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    /// True when every attribute fixed by `selection` equals this variant's value.
    pub fn matches(&self, selection: &Selection) -> bool {
        self.matches_except(selection, None)
    }

    pub(crate) fn matches_except(&self, selection: &Selection, skip: Option<Attribute>) -> bool {
        Attribute::ALL.iter().filter(|a| Some(**a) != skip).all(|a| match selection.get(*a) {
            Some(wanted) => self.attribute(*a) == Some(wanted),
            None => true,
        })
    }

    pub fn catalog_price(&self, currency: &str) -> Money { Money::new(self.price, currency) }

    pub fn is_purchasable(&self) -> bool { self.in_stock && self.stock > 0 }

    fn attribute_tuple(&self) -> [Option<&str>; 4] { Attribute::ALL.map(|a| self.attribute(a)) }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductGroup {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub sub_type: Option<String>,
    pub variants: Vec<ProductVariant>,
    #[serde(default)]
    pub pricing_class: Option<PricingClass>,
    #[serde(default)]
    pub quantity_class: Option<QuantityClass>,
}

impl ProductGroup {
    pub fn first_variant(&self) -> Option<&ProductVariant> { self.variants.first() }

    pub fn variant(&self, sku: &Sku) -> Option<&ProductVariant> { self.variants.iter().find(|v| &v.sku == sku) }

    /// Checks the group-level invariants. Duplicate attribute tuples are only
    /// logged; resolution then picks the first one in catalog order.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.variants.is_empty() { return Err(CatalogError::EmptyGroup(self.id.clone())); }
        let mut seen = HashSet::new();
        for variant in &self.variants {
            if let Some(category) = variant.category.as_deref() {
                if !category.trim().eq_ignore_ascii_case(self.category.trim()) {
                    return Err(CatalogError::CategoryMismatch { group: self.id.clone(), sku: variant.sku.clone() });
                }
            }
            if !seen.insert(variant.attribute_tuple()) {
                tracing::warn!(group = %self.id, sku = %variant.sku, "duplicate attribute combination in group");
            }
        }
        Ok(())
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// All groups fetched for one page view.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    groups: Vec<ProductGroup>,
}

impl Catalog {
    /// Validates every group and resolves each variant's classes against `table`.
    pub fn new(mut groups: Vec<ProductGroup>, table: &CategoryTable) -> Result<Self, CatalogError> {
        let mut skus = HashSet::new();
        for group in &mut groups {
            group.validate()?;
            table.apply(group);
            for variant in &group.variants {
                if !skus.insert(variant.sku.clone()) { return Err(CatalogError::DuplicateSku(variant.sku.clone())); }
            }
        }
        tracing::info!(groups = groups.len(), variants = skus.len(), "catalog loaded");
        Ok(Self { groups })
    }

    pub fn from_json(raw: &str, table: &CategoryTable) -> Result<Self, CatalogError> {
        let groups: Vec<ProductGroup> = serde_json::from_str(raw)?;
        Self::new(groups, table)
    }

    pub fn load(path: impl AsRef<Path>, table: &CategoryTable) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw, table)
    }

    pub fn groups(&self) -> &[ProductGroup] { &self.groups }

    pub fn group(&self, id: &str) -> Option<&ProductGroup> { self.groups.iter().find(|g| g.id == id) }

    pub fn variant(&self, sku: &Sku) -> Option<(&ProductGroup, &ProductVariant)> {
        self.groups.iter().find_map(|g| g.variant(sku).map(|v| (g, v)))
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("group {0} has no variants")]
    EmptyGroup(String),
    #[error("variant {sku} does not share the category of group {group}")]
    CategoryMismatch { group: String, sku: Sku },
    #[error("SKU {0} appears more than once in the catalog")]
    DuplicateSku(Sku),
    #[error("malformed catalog: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("catalog unreadable: {0}")]
    Io(#[from] std::io::Error),
}
