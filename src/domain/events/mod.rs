//! Domain events
use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::value_objects::{Money, Sku};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainEvent {
    Cart(CartEvent),
    DispatchDateSet { sku: Sku, date: NaiveDate },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartEvent {
    LineAdded { cart_id: String, sku: Sku, quantity: u32, unit_price: Money },
    LineMerged { cart_id: String, sku: Sku, quantity: u32, unit_price: Money },
    QuantityUpdated { cart_id: String, sku: Sku, quantity: u32 },
    LineRemoved { cart_id: String, sku: Sku },
}

impl DomainEvent {
    /// Subject suffix used when publishing.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Cart(CartEvent::LineAdded { .. }) => "cart.line_added",
            Self::Cart(CartEvent::LineMerged { .. }) => "cart.line_merged",
            Self::Cart(CartEvent::QuantityUpdated { .. }) => "cart.quantity_updated",
            Self::Cart(CartEvent::LineRemoved { .. }) => "cart.line_removed",
            Self::DispatchDateSet { .. } => "dispatch_date.set",
        }
    }
}
