//! Unit pricing: flat catalog price or area-derived.

use rust_decimal::Decimal;
use serde::Serialize;

use super::catalog::ProductVariant;
use super::classification::PricingClass;
use super::dimensions::{Dimension, DimensionKind, DimensionNormalizer, MagnitudeHeuristic};
use super::value_objects::Money;

/// Breakdown of one unit price computation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    pub unit_price: Money,
    pub class: PricingClass,
    pub width: Dimension,
    pub length: Dimension,
    /// Area pricing was requested but the dimensions were unusable.
    pub flat_fallback: bool,
}

#[derive(Clone, Debug)]
pub struct PricingCalculator<N = MagnitudeHeuristic> {
    currency: String,
    normalizer: N,
}

impl PricingCalculator<MagnitudeHeuristic> {
    pub fn new(currency: &str) -> Self { Self::with_normalizer(currency, MagnitudeHeuristic) }
}

impl<N: DimensionNormalizer> PricingCalculator<N> {
    pub fn with_normalizer(currency: &str, normalizer: N) -> Self {
        Self { currency: currency.to_uppercase(), normalizer }
    }

    pub fn currency(&self) -> &str { &self.currency }
    pub fn normalizer(&self) -> &N { &self.normalizer }

    /// Unit price for `variant` sold under `category`.
    pub fn unit_price(&self, variant: &ProductVariant, category: &str) -> Money {
        self.quote(variant, category).unit_price
    }

    /// Prices `variant` by its resolved pricing class. Area prices are the exact
    /// product of the dimensions and the rate; no rounding is applied.
    pub fn quote(&self, variant: &ProductVariant, category: &str) -> PriceQuote {
        let width = self.normalizer.normalize(variant.width.as_deref(), DimensionKind::Width, category);
        let length = self.normalizer.normalize(variant.length.as_deref(), DimensionKind::Length, category);
        let flat = variant.catalog_price(&self.currency);
        let class = variant.class.pricing;

        let (unit_price, flat_fallback) = match class {
            PricingClass::Flat => (flat, false),
            PricingClass::Area => match (width.positive_meters(), length.positive_meters()) {
                (Some(w), Some(l)) => match area_price_exact(w, l, variant.price) {
                    Some(amount) => (Money::new(amount, &self.currency), false),
                    None => {
                        tracing::warn!(sku = %variant.sku, width = %w, length = %l, rate = %variant.price, "area price overflows, using catalog price");
                        (flat, true)
                    }
                },
                _ => {
                    tracing::debug!(sku = %variant.sku, "area-priced variant without usable dimensions, using catalog price");
                    (flat, true)
                }
            },
        };
        PriceQuote { unit_price, class, width, length, flat_fallback }
    }
}

/// `width_m * length_m * rate_per_m2`, unrounded. `None` on overflow.
pub fn area_price_exact(width_m: Decimal, length_m: Decimal, rate: Decimal) -> Option<Decimal> {
    width_m.checked_mul(length_m)?.checked_mul(rate)
}
