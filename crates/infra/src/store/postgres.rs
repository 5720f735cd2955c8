//! Postgres-backed product store.
//!
//! ## Unit of Work
//!
//! Mutating primitives stage changes in memory. `commit()` replays them inside a
//! single transaction and sums `rows_affected()` across statements; any error
//! drops the transaction (rolled back) and nothing becomes visible.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / PoolTimedOut / Io / other | N/A | `Backend` |

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{FromRow, Row};
use tracing::{Span, instrument};
use uuid::Uuid;

use catalog_core::ProductId;
use catalog_products::Product;

use super::r#trait::{EntityStore, PendingChange, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id UUID PRIMARY KEY,
    product_name TEXT NOT NULL,
    product_description TEXT NULL,
    unit_price NUMERIC(18, 2) NOT NULL CHECK (unit_price >= 0)
)
"#;

/// Open a connection pool.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(8))
        .connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

/// Postgres product store session.
///
/// Cheap to create: `PgPool` is reference-counted, so one session per request is
/// the intended usage.
#[derive(Debug)]
pub struct PgProductStore {
    pool: PgPool,
    pending: Mutex<Vec<PendingChange<Product>>>,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Create the `products` table if it does not exist yet.
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
        sqlx::query(SCHEMA)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    fn stage(&self, change: PendingChange<Product>) -> Result<(), StoreError> {
        self.pending
            .lock()
            .map_err(|_| StoreError::backend("lock poisoned"))?
            .push(change);
        Ok(())
    }
}

#[async_trait]
impl EntityStore<Product> for PgProductStore {
    async fn add(&self, entity: Product) -> Result<(), StoreError> {
        self.stage(PendingChange::Add(entity))
    }

    async fn update(&self, entity: Product) -> Result<(), StoreError> {
        self.stage(PendingChange::Update(entity))
    }

    async fn remove(&self, entity: Product) -> Result<(), StoreError> {
        self.stage(PendingChange::Remove(entity))
    }

    #[instrument(skip(self), fields(row_count = tracing::field::Empty), err)]
    async fn all(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, product_name, product_description, unit_price
            FROM products
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("all", e))?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            let row = ProductRow::from_row(&row)
                .map_err(|e| StoreError::backend(format!("failed to read product row: {e}")))?;
            products.push(row.into());
        }

        Span::current().record("row_count", products.len());
        Ok(products)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, product_name, product_description, unit_price
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.map(|r| {
            ProductRow::from_row(&r)
                .map(Product::from)
                .map_err(|e| StoreError::backend(format!("failed to read product row: {e}")))
        })
        .transpose()
    }

    #[instrument(skip(self), fields(rows_affected = tracing::field::Empty), err)]
    async fn commit(&self) -> Result<u64, StoreError> {
        let changes = std::mem::take(
            &mut *self
                .pending
                .lock()
                .map_err(|_| StoreError::backend("lock poisoned"))?,
        );
        if changes.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let mut affected = 0u64;
        for change in changes {
            let result = match change {
                PendingChange::Add(p) => {
                    sqlx::query(
                        r#"
                        INSERT INTO products (id, product_name, product_description, unit_price)
                        VALUES ($1, $2, $3, $4)
                        "#,
                    )
                    .bind(Uuid::from(p.id_typed()))
                    .bind(p.name())
                    .bind(p.description())
                    .bind(p.unit_price())
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| map_sqlx_error("insert", e))?
                }
                PendingChange::Update(p) => {
                    // Only touch the row when something actually changes, so a
                    // no-op replacement reports zero rows.
                    sqlx::query(
                        r#"
                        UPDATE products
                        SET product_name = $2, product_description = $3, unit_price = $4
                        WHERE id = $1
                          AND (product_name, product_description, unit_price)
                              IS DISTINCT FROM ($2::TEXT, $3::TEXT, $4::NUMERIC)
                        "#,
                    )
                    .bind(Uuid::from(p.id_typed()))
                    .bind(p.name())
                    .bind(p.description())
                    .bind(p.unit_price())
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| map_sqlx_error("update", e))?
                }
                PendingChange::Remove(p) => sqlx::query("DELETE FROM products WHERE id = $1")
                    .bind(Uuid::from(p.id_typed()))
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| map_sqlx_error("delete", e))?,
            };
            affected += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;

        Span::current().record("rows_affected", affected);
        Ok(affected)
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code() {
                Some(code) if code.as_ref() == "23505" => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Backend(format!("timed out acquiring connection in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

// SQLx row types

#[derive(Debug)]
struct ProductRow {
    id: Uuid,
    product_name: String,
    product_description: Option<String>,
    unit_price: Decimal,
}

impl<'r> FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            product_name: row.try_get("product_name")?,
            product_description: row.try_get("product_description")?,
            unit_price: row.try_get("unit_price")?,
        })
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product::new(
            ProductId::from_uuid(row.id),
            row.product_name,
            row.product_description,
            row.unit_price,
        )
    }
}
