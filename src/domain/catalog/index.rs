//! Catalog index and availability filter.
//!
//! Both are recomputed from the complete variant list on every call. Values are
//! kept in first-seen catalog order so the "first available" default is stable.

use serde::{Deserialize, Serialize};

use super::{Attribute, ProductGroup, ProductVariant, Selection};

/// Distinct selectable values per attribute.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeOptions {
    pub thickness: Vec<String>,
    pub color: Vec<String>,
    pub width: Vec<String>,
    pub length: Vec<String>,
}

impl AttributeOptions {
    pub fn get(&self, attribute: Attribute) -> &[String] {
        match attribute {
            Attribute::Thickness => &self.thickness,
            Attribute::Color => &self.color,
            Attribute::Width => &self.width,
            Attribute::Length => &self.length,
        }
    }

    fn get_mut(&mut self, attribute: Attribute) -> &mut Vec<String> {
        match attribute {
            Attribute::Thickness => &mut self.thickness,
            Attribute::Color => &mut self.color,
            Attribute::Width => &mut self.width,
            Attribute::Length => &mut self.length,
        }
    }

    pub fn contains(&self, attribute: Attribute, value: &str) -> bool {
        self.get(attribute).iter().any(|v| v == value)
    }

    pub fn first(&self, attribute: Attribute) -> Option<&str> { self.get(attribute).first().map(String::as_str) }

    fn push_distinct(&mut self, attribute: Attribute, value: &str) {
        let values = self.get_mut(attribute);
        if !values.iter().any(|v| v == value) { values.push(value.to_string()); }
    }
}

/// Full, unfiltered attribute domain of one group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogIndex {
    options: AttributeOptions,
}

impl CatalogIndex {
    pub fn build(group: &ProductGroup) -> Self {
        let mut options = AttributeOptions::default();
        for variant in &group.variants {
            for attribute in Attribute::ALL {
                if let Some(value) = variant.attribute(attribute) { options.push_distinct(attribute, value); }
            }
        }
        Self { options }
    }

    pub fn options(&self) -> &AttributeOptions { &self.options }

    /// Attributes with a non-empty domain. Single-value domains are included.
    pub fn varying_attributes(&self) -> Vec<Attribute> {
        Attribute::ALL.into_iter().filter(|a| !self.options.get(*a).is_empty()).collect()
    }

    /// Selection with the first value of every attribute in the domain.
    pub fn default_selection(&self) -> Selection {
        let mut selection = Selection::default();
        for attribute in Attribute::ALL {
            selection.set(attribute, self.options.first(attribute).map(str::to_string));
        }
        selection
    }
}

/// For each attribute, the values carried by at least one variant that matches
/// every *other* attribute fixed in `selection`.
pub fn available_options(variants: &[ProductVariant], selection: &Selection) -> AttributeOptions {
    let mut options = AttributeOptions::default();
    for attribute in Attribute::ALL {
        for variant in variants.iter().filter(|v| v.matches_except(selection, Some(attribute))) {
            if let Some(value) = variant.attribute(attribute) { options.push_distinct(attribute, value); }
        }
    }
    options
}
