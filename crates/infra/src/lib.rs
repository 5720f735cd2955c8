//! Infrastructure layer: entity stores, the product repository, configuration.

pub mod config;
pub mod repository;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use repository::ProductRepository;
pub use store::{EntityStore, InMemoryDatabase, InMemoryEntityStore, PgProductStore, StoreError};
