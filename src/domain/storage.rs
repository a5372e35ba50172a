//! Per-key string storage owned by the caller, used for dispatch dates.

use chrono::NaiveDate;
use std::collections::HashMap;

use super::value_objects::Sku;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    entries: HashMap<String, String>,
}

impl InMemoryStore {
    pub fn new() -> Self { Self::default() }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Option<String> { self.entries.get(key).cloned() }
    fn set(&mut self, key: &str, value: String) { self.entries.insert(key.to_string(), value); }
}

pub fn dispatch_date_key(sku: &Sku) -> String { format!("dispatch-date-{sku}") }

/// Stored dispatch date for `sku`. Values that are not ISO dates read as unset.
pub fn read_dispatch_date<S: KeyValueStore + ?Sized>(store: &S, sku: &Sku) -> Option<NaiveDate> {
    let raw = store.get(&dispatch_date_key(sku))?;
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(err) => {
            tracing::warn!(%sku, raw = %raw, %err, "ignoring malformed dispatch date");
            None
        }
    }
}

/// Last write wins; dates are never expired here.
pub fn write_dispatch_date<S: KeyValueStore + ?Sized>(store: &mut S, sku: &Sku, date: NaiveDate) {
    store.set(&dispatch_date_key(sku), date.format("%Y-%m-%d").to_string());
}
