//! Entity store boundary.
//!
//! A store instance is a unit of work: mutating primitives only stage changes,
//! and `commit()` is the single point where they become durable.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::{InMemoryDatabase, InMemoryEntityStore};
pub use postgres::PgProductStore;
pub use r#trait::{EntityStore, PendingChange, StoreError};
