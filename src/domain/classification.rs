//! Product classification used by pricing and quantity policies.
//!
//! Classes are resolved once per variant when the catalog is loaded: explicit
//! group override, then the category table, then the legacy name/SKU heuristic.
//! Everything downstream reads [`ProductVariant::class`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::catalog::{ProductGroup, ProductVariant};
use crate::config::ConfigError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PricingClass {
    #[default]
    Flat,
    /// Sold by area: width × length × rate per m².
    Area,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuantityClass {
    /// Compact sheets: one at a time.
    Single,
    #[default]
    BulkTen,
}

/// Classes resolved for one variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductClass {
    pub pricing: PricingClass,
    pub quantity: QuantityClass,
}

/// One category table entry. Unset fields fall through to the next source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryClass {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<PricingClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<QuantityClass>,
}

/// Category key → classes. Keys are compared trimmed and case-insensitively.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTable {
    #[serde(default)]
    categories: HashMap<String, CategoryClass>,
}

impl CategoryTable {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, category: &str, class: CategoryClass) -> Self {
        self.categories.insert(category_key(category), class);
        self
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let table: CategoryTable = serde_json::from_str(raw)?;
        Ok(Self { categories: table.categories.into_iter().map(|(k, v)| (category_key(&k), v)).collect() })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::from_json(&raw)?)
    }

    pub fn lookup(&self, category: &str) -> Option<CategoryClass> { self.categories.get(&category_key(category)).copied() }

    pub fn classify(&self, group: &ProductGroup, variant: &ProductVariant) -> ProductClass {
        let entry = self.lookup(&group.category).unwrap_or_default();
        ProductClass {
            pricing: group.pricing_class.or(entry.pricing).unwrap_or_default(),
            quantity: group.quantity_class.or(entry.quantity).unwrap_or_else(|| classify_legacy(group, variant)),
        }
    }

    /// Stamps the resolved class onto every variant of `group`.
    pub fn apply(&self, group: &mut ProductGroup) {
        let classes: Vec<ProductClass> = group.variants.iter().map(|v| self.classify(group, v)).collect();
        for (variant, class) in group.variants.iter_mut().zip(classes) {
            variant.class = class;
        }
    }
}

pub(crate) fn category_key(category: &str) -> String { category.trim().to_lowercase() }

/// Legacy compact-sheet detection for catalog data with no explicit class:
/// the group or variant name mentions "Compacto", or the SKU uses the 517 prefix.
pub fn classify_legacy(group: &ProductGroup, variant: &ProductVariant) -> QuantityClass {
    let compact = group.name.contains("Compacto") || variant.name.contains("Compacto") || variant.sku.as_str().starts_with("517");
    if compact { QuantityClass::Single } else { QuantityClass::BulkTen }
}
