//! Configurator reducer.
//!
//! The caller owns a [`ConfiguratorState`]; every user interaction is turned
//! into a [`ConfiguratorEvent`] and fed to [`Configurator::reduce`], which
//! runs the whole pipeline (filter, resolve, price, quantity policy) and
//! returns the next state.

use serde::{Deserialize, Serialize};

use super::catalog::{available_options, resolve, Attribute, AttributeOptions, CatalogIndex, ProductGroup, ProductVariant, Resolution, Selection};
use super::classification::ProductClass;
use super::dimensions::DimensionNormalizer;
use super::pricing::{PriceQuote, PricingCalculator};
use super::quantity::QuantityPolicy;
use super::value_objects::{Money, Sku};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConfiguratorEvent {
    Select { attribute: Attribute, value: String },
    Increment,
    Decrement,
    Reset,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfiguratorState {
    pub group_id: String,
    pub selection: Selection,
    pub options: AttributeOptions,
    pub sku: Sku,
    pub resolution: Resolution,
    pub class: ProductClass,
    pub policy: QuantityPolicy,
    pub quote: PriceQuote,
    pub quantity: u32,
    /// The last decrement asked for the line to leave the cart.
    pub removed: bool,
}

impl ConfiguratorState {
    pub fn unit_price(&self) -> &Money { &self.quote.unit_price }
    pub fn line_total(&self) -> Money { self.quote.unit_price.multiply(self.quantity) }
}

pub struct Configurator<'a, N> {
    group: &'a ProductGroup,
    index: CatalogIndex,
    pricing: &'a PricingCalculator<N>,
}

impl<'a, N: DimensionNormalizer> Configurator<'a, N> {
    pub fn new(group: &'a ProductGroup, pricing: &'a PricingCalculator<N>) -> Self {
        Self { group, index: CatalogIndex::build(group), pricing }
    }

    pub fn group(&self) -> &'a ProductGroup { self.group }
    pub fn index(&self) -> &CatalogIndex { &self.index }

    /// Initial state: first available value per attribute, initial quantity.
    /// `None` only for a group without variants.
    pub fn mount(&self) -> Option<ConfiguratorState> {
        let selection = repair(self.group, &Selection::default(), None);
        self.settle(selection, None)
    }

    pub fn reduce(&self, state: ConfiguratorState, event: ConfiguratorEvent) -> ConfiguratorState {
        match event {
            ConfiguratorEvent::Select { attribute, value } => {
                if !self.index.options().contains(attribute, &value) {
                    tracing::warn!(group = %self.group.id, %attribute, value = %value, "ignoring value outside the group's domain");
                    return state;
                }
                let mut picked = state.selection.clone();
                picked.set(attribute, Some(value));
                let selection = repair(self.group, &picked, Some(attribute));
                if selection != picked {
                    tracing::debug!(group = %self.group.id, ?picked, ?selection, "selection repaired");
                }
                let previous = state.sku.clone();
                self.settle(selection, Some(&previous)).map(|next| carry_quantity(&state, next)).unwrap_or(state)
            }
            ConfiguratorEvent::Increment => {
                let adjustment = state.policy.increment(state.quantity);
                if adjustment.capped { return state; }
                ConfiguratorState { quantity: adjustment.qty, removed: false, ..state }
            }
            ConfiguratorEvent::Decrement => {
                let adjustment = state.policy.decrement(state.quantity);
                ConfiguratorState { quantity: adjustment.qty, removed: adjustment.should_remove, ..state }
            }
            ConfiguratorEvent::Reset => self.mount().unwrap_or(state),
        }
    }

    fn settle(&self, selection: Selection, previous: Option<&Sku>) -> Option<ConfiguratorState> {
        let resolved = resolve(self.group, &selection, previous)?;
        let variant = resolved.variant;
        let class = variant.class;
        let policy = QuantityPolicy::for_class(class.quantity, variant.stock);
        let quote = self.pricing.quote(variant, &self.group.category);
        Some(ConfiguratorState {
            group_id: self.group.id.clone(),
            options: available_options(&self.group.variants, &selection),
            selection,
            sku: variant.sku.clone(),
            resolution: resolved.resolution,
            class,
            policy,
            quote,
            quantity: policy.initial_qty(),
            removed: false,
        })
    }
}

/// Same SKU keeps the chosen quantity; a new SKU starts over at its minimum.
fn carry_quantity(before: &ConfiguratorState, mut next: ConfiguratorState) -> ConfiguratorState {
    if before.sku == next.sku {
        next.quantity = before.quantity;
        next.removed = before.removed;
    }
    next
}

/// Rebuilds `selection` so it matches at least one variant.
///
/// `pinned` keeps its value. The remaining attributes are visited in canonical
/// order; each keeps its value when some variant still carries it together
/// with everything fixed so far, otherwise it takes the first such value.
pub fn repair(group: &ProductGroup, selection: &Selection, pinned: Option<Attribute>) -> Selection {
    let mut fixed = Selection::default();
    if let Some(attribute) = pinned {
        fixed.set(attribute, selection.get(attribute).map(str::to_string));
    }
    for attribute in Attribute::ALL.into_iter().filter(|a| Some(*a) != pinned) {
        let candidates = available_options(&group.variants, &fixed);
        let values = candidates.get(attribute);
        let keep = selection.get(attribute).filter(|v| values.iter().any(|c| c.as_str() == *v));
        fixed.set(attribute, keep.or(values.first().map(String::as_str)).map(str::to_string));
    }
    fixed
}

/// Human-readable line description stored with the cart line.
pub fn spec_text(variant: &ProductVariant, quote: &PriceQuote) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(thickness) = variant.attribute(Attribute::Thickness) { lines.push(format!("Espesor: {thickness}")); }
    if let Some(color) = variant.attribute(Attribute::Color) { lines.push(format!("Color: {color}")); }
    if !quote.width.label.is_empty() { lines.push(format!("Ancho: {}", quote.width.label)); }
    if !quote.length.label.is_empty() { lines.push(format!("Largo: {}", quote.length.label)); }
    if variant.uv_protection { lines.push("Protección UV".to_string()); }
    if let Some(warranty) = variant.warranty.as_deref().filter(|w| !w.trim().is_empty()) { lines.push(format!("Garantía: {warranty}")); }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::fixtures::*;
    use crate::domain::classification::QuantityClass;

    fn calc() -> PricingCalculator { PricingCalculator::new("CLP") }

    fn select(attribute: Attribute, value: &str) -> ConfiguratorEvent {
        ConfiguratorEvent::Select { attribute, value: value.to_string() }
    }

    #[test]
    fn test_mount_defaults_to_first_values() {
        let group = alveolar();
        let pricing = calc();
        let state = Configurator::new(&group, &pricing).mount().unwrap();
        assert_eq!(state.sku.as_str(), "PAL-4MM-CR");
        assert_eq!(state.resolution, Resolution::Exact);
        assert_eq!(state.quantity, 10);
        assert_eq!(state.class.quantity, QuantityClass::BulkTen);
    }

    #[test]
    fn test_color_change_resets_unavailable_width() {
        let group = alveolar();
        let pricing = calc();
        let configurator = Configurator::new(&group, &pricing);
        let state = configurator.mount().unwrap();
        let state = configurator.reduce(state, select(Attribute::Thickness, "6mm"));
        assert_eq!(state.sku.as_str(), "PAL-6MM-CR");
        let state = configurator.reduce(state, select(Attribute::Color, "Bronce"));
        assert_eq!(state.selection.width.as_deref(), Some("1.05"));
        assert_eq!(state.selection.length.as_deref(), Some("2.90"));
        assert_eq!(state.sku.as_str(), "PAL-6MM-BR");
        assert_eq!(state.resolution, Resolution::Exact);
    }

    #[test]
    fn test_compatible_values_survive_repair() {
        let group = alveolar();
        let mut picked = Selection::default().with(Attribute::Thickness, "6mm").with(Attribute::Color, "Cristal");
        picked = picked.with(Attribute::Width, "1.05").with(Attribute::Length, "5.80");
        let repaired = repair(&group, &picked, Some(Attribute::Width));
        assert_eq!(repaired.thickness.as_deref(), Some("6mm"));
        assert_eq!(repaired.color.as_deref(), Some("Cristal"));
        assert_eq!(repaired.length.as_deref(), Some("2.90"));
    }

    #[test]
    fn test_unknown_value_is_ignored() {
        let group = alveolar();
        let pricing = calc();
        let configurator = Configurator::new(&group, &pricing);
        let state = configurator.mount().unwrap();
        let next = configurator.reduce(state.clone(), select(Attribute::Color, "Fucsia"));
        assert_eq!(next, state);
    }

    #[test]
    fn test_quantity_events() {
        let group = compact();
        let pricing = calc();
        let configurator = Configurator::new(&group, &pricing);
        let state = configurator.mount().unwrap();
        assert_eq!(state.quantity, 1);
        let state = configurator.reduce(state, ConfiguratorEvent::Increment);
        assert_eq!(state.quantity, 2);
        let state = configurator.reduce(state, ConfiguratorEvent::Decrement);
        let state = configurator.reduce(state, ConfiguratorEvent::Decrement);
        assert!(state.removed);
        assert_eq!(state.quantity, 0);
        let state = configurator.reduce(state, ConfiguratorEvent::Reset);
        assert_eq!((state.quantity, state.removed), (1, false));
    }

    #[test]
    fn test_same_sku_keeps_quantity() {
        let group = alveolar();
        let pricing = calc();
        let configurator = Configurator::new(&group, &pricing);
        let state = configurator.reduce(configurator.mount().unwrap(), ConfiguratorEvent::Increment);
        assert_eq!(state.quantity, 20);
        let state = configurator.reduce(state, select(Attribute::Color, "Cristal"));
        assert_eq!(state.quantity, 20);
        let state = configurator.reduce(state, select(Attribute::Thickness, "10mm"));
        assert_eq!(state.sku.as_str(), "PAL-10MM-OP");
        assert_eq!(state.quantity, 10);
    }

    #[test]
    fn test_increment_at_stock_is_noop() {
        let mut group = compact();
        for v in &mut group.variants { v.stock = 1; }
        let pricing = calc();
        let configurator = Configurator::new(&group, &pricing);
        let state = configurator.mount().unwrap();
        assert_eq!(configurator.reduce(state.clone(), ConfiguratorEvent::Increment), state);
    }

    #[test]
    fn test_spec_text() {
        let group = alveolar();
        let pricing = calc();
        let state = Configurator::new(&group, &pricing).mount().unwrap();
        let text = spec_text(&group.variants[0], &state.quote);
        assert_eq!(&text[..4], ["Espesor: 4mm", "Color: Cristal", "Ancho: 2,10m", "Largo: 5,80m"]);
        assert!(text.contains(&"Garantía: 10 años".to_string()));
    }
}
