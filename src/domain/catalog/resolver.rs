//! Variant resolution: selection to exactly one SKU.

use serde::Serialize;

use super::{ProductGroup, ProductVariant, Selection};
use crate::domain::value_objects::Sku;

/// How a variant was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Exact,
    /// Nothing matched; kept the previously resolved variant.
    Previous,
    /// Nothing matched and there was no usable previous variant.
    First,
}

#[derive(Clone, Copy, Debug)]
pub struct Resolved<'a> {
    pub variant: &'a ProductVariant,
    pub resolution: Resolution,
}

/// Returns the first variant, in catalog order, carrying every value fixed in
/// `selection`. Falls back to `previous` (when it belongs to the group) and
/// then to the group's first variant.
///
/// Returns `None` only for a group without variants, which `ProductGroup::validate`
/// rejects upstream.
pub fn resolve<'a>(group: &'a ProductGroup, selection: &Selection, previous: Option<&Sku>) -> Option<Resolved<'a>> {
    if let Some(variant) = group.variants.iter().find(|v| v.matches(selection)) {
        return Some(Resolved { variant, resolution: Resolution::Exact });
    }
    if let Some(variant) = previous.and_then(|sku| group.variant(sku)) {
        tracing::warn!(group = %group.id, ?selection, sku = %variant.sku, "no variant matches selection, keeping previous");
        return Some(Resolved { variant, resolution: Resolution::Previous });
    }
    let variant = group.first_variant()?;
    tracing::warn!(group = %group.id, ?selection, sku = %variant.sku, "no variant matches selection, using first variant");
    Some(Resolved { variant, resolution: Resolution::First })
}
