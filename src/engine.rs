//! Engine facade: the operations storefront views call.

use chrono::NaiveDate;

use crate::domain::aggregates::{CartLine, CartStore, CartSynchronizer, MergeOutcome};
use crate::domain::catalog::{available_options, resolve, AttributeOptions, CatalogError, ProductGroup, ProductVariant, Selection};
use crate::domain::configurator::{spec_text, Configurator};
use crate::domain::dimensions::{DimensionNormalizer, MagnitudeHeuristic};
use crate::domain::pricing::{PriceQuote, PricingCalculator};
use crate::domain::quantity::{Adjustment, Direction, QuantityPolicy};
use crate::domain::storage::{read_dispatch_date, write_dispatch_date, KeyValueStore};
use crate::domain::value_objects::{Money, Sku};
use crate::{EcommerceError, Result};

#[derive(Clone, Debug)]
pub struct Engine<N = MagnitudeHeuristic> {
    pricing: PricingCalculator<N>,
}

impl Engine<MagnitudeHeuristic> {
    pub fn new(currency: &str) -> Self { Self { pricing: PricingCalculator::new(currency) } }
}

impl<N: DimensionNormalizer> Engine<N> {
    pub fn with_pricing(pricing: PricingCalculator<N>) -> Self { Self { pricing } }

    pub fn pricing(&self) -> &PricingCalculator<N> { &self.pricing }
    pub fn currency(&self) -> &str { self.pricing.currency() }

    pub fn configurator<'a>(&'a self, group: &'a ProductGroup) -> Configurator<'a, N> { Configurator::new(group, &self.pricing) }

    pub fn get_attribute_options(&self, group: &ProductGroup, selection: &Selection) -> AttributeOptions {
        available_options(&group.variants, selection)
    }

    pub fn resolve_variant<'a>(&self, group: &'a ProductGroup, selection: &Selection) -> Result<&'a ProductVariant> {
        resolve(group, selection, None).map(|r| r.variant).ok_or_else(|| CatalogError::EmptyGroup(group.id.clone()).into())
    }

    /// Unit price by the variant's class, as resolved when the catalog was loaded.
    pub fn compute_unit_price(&self, variant: &ProductVariant, category: &str) -> Money {
        self.pricing.unit_price(variant, category)
    }

    pub fn quote(&self, group: &ProductGroup, variant: &ProductVariant) -> PriceQuote {
        self.pricing.quote(variant, &group.category)
    }

    pub fn quantity_policy(&self, variant: &ProductVariant) -> QuantityPolicy {
        QuantityPolicy::for_class(variant.class.quantity, variant.stock)
    }

    pub fn adjust_quantity(&self, variant: &ProductVariant, current: u32, direction: Direction) -> Adjustment {
        self.quantity_policy(variant).adjust(current, direction)
    }

    /// Merges `quantity` units of `variant` into the cart at `unit_price`.
    ///
    /// The merged line never exceeds the variant's stock; the excess is dropped
    /// silently, and a line already at stock is left untouched. The SKU's stored
    /// dispatch date, if any, travels with the line.
    pub fn add_to_cart<S, K>(
        &self,
        cart: &mut S,
        dates: &K,
        group: &ProductGroup,
        variant: &ProductVariant,
        quantity: u32,
        unit_price: Money,
    ) -> Result<MergeOutcome>
    where
        S: CartStore + ?Sized,
        K: KeyValueStore + ?Sized,
    {
        if quantity == 0 { return Err(EcommerceError::InvalidQuantity); }
        if !variant.is_purchasable() { return Err(EcommerceError::InsufficientInventory(variant.sku.clone())); }

        let existing = cart.line(&variant.sku).map(CartLine::quantity).unwrap_or(0);
        let requested = existing.saturating_add(quantity);
        let target = requested.min(variant.stock.max(existing));
        if target < requested {
            tracing::debug!(sku = %variant.sku, requested = quantity, existing, stock = variant.stock, "add to cart capped at stock");
        }
        if target == existing { return Ok(MergeOutcome::Unchanged { quantity: existing }); }

        let quote = self.quote(group, variant);
        let line = CartLine::new(variant.sku.clone(), target - existing, unit_price, spec_text(variant, &quote))
            .with_dispatch_date(read_dispatch_date(dates, &variant.sku));
        Ok(CartSynchronizer::add_or_merge(cart, line)?)
    }

    pub fn remove_from_cart<S: CartStore + ?Sized>(&self, cart: &mut S, sku: &Sku) -> bool { CartSynchronizer::remove(cart, sku) }

    pub fn dispatch_date<K: KeyValueStore + ?Sized>(&self, dates: &K, sku: &Sku) -> Option<NaiveDate> { read_dispatch_date(dates, sku) }

    pub fn set_dispatch_date<K: KeyValueStore + ?Sized>(&self, dates: &mut K, sku: &Sku, date: NaiveDate) { write_dispatch_date(dates, sku, date) }
}
