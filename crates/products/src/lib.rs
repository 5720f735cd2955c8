//! Products domain module.
//!
//! This crate contains the catalog's only entity and the rules for building one
//! from an inbound payload, implemented purely as deterministic domain logic (no
//! IO, no HTTP, no storage).

pub mod product;

pub use product::{MAX_UNIT_PRICE, NewProduct, PRICE_SCALE, Product};
