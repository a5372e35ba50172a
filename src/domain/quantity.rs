//! Quantity policy: minimum order quantity, increment step and stock ceiling.

use serde::{Deserialize, Serialize};

use super::classification::QuantityClass;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increment,
    Decrement,
}

/// Outcome of a quantity button press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Adjustment {
    pub qty: u32,
    /// The line should leave the cart.
    pub should_remove: bool,
    /// The increment was refused because it would exceed stock.
    pub capped: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct QuantityPolicy {
    pub min_qty: u32,
    pub step: u32,
    pub stock: u32,
}

impl QuantityPolicy {
    pub fn for_class(class: QuantityClass, stock: u32) -> Self {
        let unit = match class { QuantityClass::Single => 1, QuantityClass::BulkTen => 10 };
        Self { min_qty: unit, step: unit, stock }
    }

    pub fn initial_qty(&self) -> u32 { self.min_qty }

    pub fn adjust(&self, current: u32, direction: Direction) -> Adjustment {
        match direction {
            Direction::Increment => self.increment(current),
            Direction::Decrement => self.decrement(current),
        }
    }

    /// Adds one step, or does nothing when the step would pass the stock ceiling.
    pub fn increment(&self, current: u32) -> Adjustment {
        match current.checked_add(self.step).filter(|next| *next <= self.stock) {
            Some(qty) => Adjustment { qty, should_remove: false, capped: false },
            None => {
                tracing::debug!(current, step = self.step, stock = self.stock, "increment refused at stock ceiling");
                Adjustment { qty: current, should_remove: false, capped: true }
            }
        }
    }

    /// Removes one step; dropping below the minimum means "remove the line".
    pub fn decrement(&self, current: u32) -> Adjustment {
        match current.checked_sub(self.step).filter(|next| *next >= self.min_qty) {
            Some(qty) => Adjustment { qty, should_remove: false, capped: false },
            None => Adjustment { qty: 0, should_remove: true, capped: false },
        }
    }

    /// Caps a requested quantity at the stock ceiling.
    pub fn clamp(&self, requested: u32) -> u32 { requested.min(self.stock) }
}
