//! Infrastructure wiring for the HTTP layer.
//!
//! `AppServices` owns the long-lived storage handle (shared in-memory table or
//! Postgres pool) and opens a fresh store session for every request.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use catalog_infra::store::postgres;
use catalog_infra::{EntityStore, InMemoryDatabase, PgProductStore, ProductRepository, StoreError};
use catalog_products::Product;

use crate::app::product_service::ProductService;

/// Type-erased session so handlers do not care which backend is configured.
pub type DynProductStore = Box<dyn EntityStore<Product>>;

#[derive(Clone)]
pub enum AppServices {
    InMemory { db: Arc<InMemoryDatabase<Product>> },
    Persistent { pool: PgPool },
}

impl AppServices {
    pub fn in_memory() -> Self {
        Self::InMemory {
            db: Arc::new(InMemoryDatabase::new()),
        }
    }

    /// Connect to Postgres and make sure the `products` table exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = postgres::connect(database_url, max_connections).await?;
        PgProductStore::ensure_schema(&pool).await?;
        info!(max_connections, "connected to postgres");
        Ok(Self::Persistent { pool })
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::InMemory { .. } => "in_memory",
            Self::Persistent { .. } => "postgres",
        }
    }

    /// Repository over a new unit of work.
    pub fn repository(&self) -> ProductRepository<DynProductStore> {
        let store: DynProductStore = match self {
            Self::InMemory { db } => Box::new(db.session()),
            Self::Persistent { pool } => Box::new(PgProductStore::new(pool.clone())),
        };
        ProductRepository::new(store)
    }

    pub fn products(&self) -> ProductService<DynProductStore> {
        ProductService::new(self.repository())
    }
}

impl std::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppServices")
            .field("backend", &self.backend_name())
            .finish()
    }
}
