//! Aggregates module
pub mod cart;

pub use cart::{Cart, CartError, CartLine, CartStore, CartSynchronizer, MergeOutcome};
