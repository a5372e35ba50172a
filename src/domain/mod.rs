//! Domain layer: catalog, pricing and quantity rules, cart.
pub mod aggregates;
pub mod catalog;
pub mod classification;
pub mod configurator;
pub mod dimensions;
pub mod events;
pub mod pricing;
pub mod quantity;
pub mod storage;
pub mod value_objects;
