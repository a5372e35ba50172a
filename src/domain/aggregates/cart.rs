//! Cart Aggregate and the synchronizer that merges configured lines into it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::{Money, Sku};

/// One cart line. `total` always equals `unit_price * quantity`.
///
/// Serialized with the cart store's field names (`id`, `cantidad`, `precioUnitario`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(rename = "id")]
    sku: Sku,
    #[serde(rename = "cantidad")]
    quantity: u32,
    #[serde(rename = "precioUnitario")]
    unit_price: Money,
    total: Money,
    spec_text: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dispatch_date: Option<NaiveDate>,
}

impl CartLine {
    pub fn new(sku: Sku, quantity: u32, unit_price: Money, spec_text: Vec<String>) -> Self {
        let total = unit_price.multiply(quantity);
        Self { sku, quantity, unit_price, total, spec_text, dispatch_date: None }
    }

    pub fn with_dispatch_date(mut self, date: Option<NaiveDate>) -> Self { self.dispatch_date = date; self }

    pub fn sku(&self) -> &Sku { &self.sku }
    pub fn quantity(&self) -> u32 { self.quantity }
    pub fn unit_price(&self) -> &Money { &self.unit_price }
    pub fn total(&self) -> &Money { &self.total }
    pub fn spec_text(&self) -> &[String] { &self.spec_text }
    pub fn dispatch_date(&self) -> Option<NaiveDate> { self.dispatch_date }

    fn set_quantity(&mut self, quantity: u32) { self.quantity = quantity; self.total = self.unit_price.multiply(quantity); }
    fn set_unit_price(&mut self, unit_price: Money) { self.total = unit_price.multiply(self.quantity); self.unit_price = unit_price; }
}

/// The external cart store as seen by the engine. `sku` is the line key.
pub trait CartStore {
    fn items(&self) -> &[CartLine];
    fn add_item(&mut self, line: CartLine);
    fn update_quantity(&mut self, sku: &Sku, quantity: u32) -> Result<(), CartError>;
    /// Sets the merged quantity of an existing line and reprices it.
    fn merge_item(&mut self, sku: &Sku, quantity: u32, unit_price: Money) -> Result<(), CartError>;
    /// Returns whether a line was removed.
    fn remove_item(&mut self, sku: &Sku) -> bool;

    fn line(&self, sku: &Sku) -> Option<&CartLine> { self.items().iter().find(|l| l.sku() == sku) }
}

/// In-memory cart keyed by SKU.
#[derive(Clone, Debug)]
pub struct Cart {
    id: String,
    session_id: Option<String>,
    items: Vec<CartLine>,
    subtotal: Money,
    currency: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

impl Cart {
    pub fn new(currency: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(), session_id: None,
            items: vec![], subtotal: Money::zero(currency), currency: currency.to_uppercase(),
            created_at: Utc::now(), updated_at: Utc::now(), events: vec![],
        }
    }

    pub fn for_session(session_id: impl Into<String>, currency: &str) -> Self {
        let mut cart = Self::new(currency);
        cart.session_id = Some(session_id.into());
        cart
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn session_id(&self) -> Option<&str> { self.session_id.as_deref() }
    pub fn subtotal(&self) -> &Money { &self.subtotal }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }

    fn line_mut(&mut self, sku: &Sku) -> Result<&mut CartLine, CartError> {
        self.items.iter_mut().find(|l| l.sku() == sku).ok_or_else(|| CartError::ItemNotFound(sku.clone()))
    }

    fn recalculate(&mut self) {
        self.subtotal = self.items.iter().fold(Money::zero(&self.currency), |acc, l| acc.add(l.total()).unwrap_or(acc));
        self.updated_at = Utc::now();
    }

    fn raise_event(&mut self, e: CartEvent) { self.events.push(DomainEvent::Cart(e)); }
}

impl CartStore for Cart {
    fn items(&self) -> &[CartLine] { &self.items }

    fn add_item(&mut self, line: CartLine) {
        self.raise_event(CartEvent::LineAdded { cart_id: self.id.clone(), sku: line.sku.clone(), quantity: line.quantity, unit_price: line.unit_price.clone() });
        self.items.push(line);
        self.recalculate();
    }

    fn update_quantity(&mut self, sku: &Sku, quantity: u32) -> Result<(), CartError> {
        self.line_mut(sku)?.set_quantity(quantity);
        self.raise_event(CartEvent::QuantityUpdated { cart_id: self.id.clone(), sku: sku.clone(), quantity });
        self.recalculate();
        Ok(())
    }

    fn merge_item(&mut self, sku: &Sku, quantity: u32, unit_price: Money) -> Result<(), CartError> {
        if unit_price.currency() != self.currency { return Err(CartError::CurrencyMismatch); }
        let line = self.line_mut(sku)?;
        line.set_unit_price(unit_price.clone());
        line.set_quantity(quantity);
        self.raise_event(CartEvent::LineMerged { cart_id: self.id.clone(), sku: sku.clone(), quantity, unit_price });
        self.recalculate();
        Ok(())
    }

    fn remove_item(&mut self, sku: &Sku) -> bool {
        let before = self.items.len();
        self.items.retain(|l| l.sku() != sku);
        if self.items.len() == before { return false; }
        self.raise_event(CartEvent::LineRemoved { cart_id: self.id.clone(), sku: sku.clone() });
        self.recalculate();
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Item not found: {0}")]
    ItemNotFound(Sku),
    #[error("Currency mismatch")]
    CurrencyMismatch,
}

// =============================================================================
// Synchronizer
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeOutcome {
    Added,
    Merged { previous_qty: u32 },
    /// The line already held the whole stock; nothing was written.
    Unchanged { quantity: u32 },
}

/// Merges configured lines into a [`CartStore`], one line per SKU.
pub struct CartSynchronizer;

impl CartSynchronizer {
    /// Appends a line, or folds `quantity` into the existing line for `sku`
    /// and reprices it at `unit_price`.
    pub fn add_or_merge<S: CartStore + ?Sized>(store: &mut S, line: CartLine) -> Result<MergeOutcome, CartError> {
        let Some(existing) = store.line(line.sku()).map(CartLine::quantity) else {
            tracing::debug!(sku = %line.sku(), quantity = line.quantity(), "cart line added");
            store.add_item(line);
            return Ok(MergeOutcome::Added);
        };
        let merged = existing.saturating_add(line.quantity());
        store.merge_item(line.sku(), merged, line.unit_price().clone())?;
        tracing::debug!(sku = %line.sku(), previous = existing, quantity = merged, "cart line merged");
        Ok(MergeOutcome::Merged { previous_qty: existing })
    }

    pub fn remove<S: CartStore + ?Sized>(store: &mut S, sku: &Sku) -> bool { store.remove_item(sku) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn sku(s: &str) -> Sku { Sku::new(s).unwrap() }
    fn clp(n: i64) -> Money { Money::clp(Decimal::new(n, 0)) }

    #[test]
    fn test_cart_operations() {
        let mut cart = Cart::new("CLP");
        cart.add_item(CartLine::new(sku("W1"), 2, clp(10), vec![]));
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.subtotal().amount(), Decimal::new(20, 0));
        cart.update_quantity(&sku("W1"), 5).unwrap();
        assert_eq!(cart.items()[0].total(), &clp(50));
        assert!(cart.remove_item(&sku("W1")));
        assert!(!cart.remove_item(&sku("W1")));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_merge_adds_quantities() {
        let mut cart = Cart::new("CLP");
        let line = || CartLine::new(sku("PAL-6MM-CR"), 10, clp(52990), vec!["Espesor: 6mm".into()]);
        assert_eq!(CartSynchronizer::add_or_merge(&mut cart, line()).unwrap(), MergeOutcome::Added);
        assert_eq!(CartSynchronizer::add_or_merge(&mut cart, line()).unwrap(), MergeOutcome::Merged { previous_qty: 10 });
        assert_eq!(cart.item_count(), 1);
        let merged = &cart.items()[0];
        assert_eq!(merged.quantity(), 20);
        assert_eq!(merged.total(), &clp(20 * 52990));
    }

    #[test]
    fn test_merge_reprices_line() {
        let mut cart = Cart::new("CLP");
        CartSynchronizer::add_or_merge(&mut cart, CartLine::new(sku("A"), 1, clp(100), vec![])).unwrap();
        CartSynchronizer::add_or_merge(&mut cart, CartLine::new(sku("A"), 2, clp(90), vec![])).unwrap();
        let line = cart.line(&sku("A")).unwrap();
        assert_eq!((line.quantity(), line.unit_price(), line.total()), (3, &clp(90), &clp(270)));
    }

    #[test]
    fn test_skus_never_aggregate() {
        let mut cart = Cart::new("CLP");
        CartSynchronizer::add_or_merge(&mut cart, CartLine::new(sku("A"), 1, clp(100), vec![])).unwrap();
        CartSynchronizer::add_or_merge(&mut cart, CartLine::new(sku("B"), 1, clp(100), vec![])).unwrap();
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.subtotal(), &clp(200));
    }

    #[test]
    fn test_events_recorded() {
        let mut cart = Cart::for_session("s1", "CLP");
        CartSynchronizer::add_or_merge(&mut cart, CartLine::new(sku("A"), 1, clp(100), vec![])).unwrap();
        CartSynchronizer::add_or_merge(&mut cart, CartLine::new(sku("A"), 2, clp(100), vec![])).unwrap();
        CartSynchronizer::remove(&mut cart, &sku("A"));
        let events = cart.take_events();
        let kinds: Vec<_> = events.iter().map(DomainEvent::event_type).collect();
        assert_eq!(kinds, vec!["cart.line_added", "cart.line_merged", "cart.line_removed"]);
        assert!(matches!(&events[1], DomainEvent::Cart(CartEvent::LineMerged { quantity: 3, .. })));
        assert!(cart.take_events().is_empty());
    }

    #[test]
    fn test_line_serializes_with_store_names() {
        let line = CartLine::new(sku("A"), 2, clp(100), vec![]);
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["id"], "A");
        assert_eq!(json["cantidad"], 2);
        assert!(json.get("precioUnitario").is_some());
        assert!(json.get("dispatchDate").is_none());
    }

    #[test]
    fn test_reprice_rejects_other_currency() {
        let mut cart = Cart::new("CLP");
        cart.add_item(CartLine::new(sku("A"), 1, clp(100), vec![]));
        assert_eq!(cart.merge_item(&sku("A"), 2, Money::zero("USD")), Err(CartError::CurrencyMismatch));
        assert_eq!(cart.items()[0].quantity(), 1);
    }
}
