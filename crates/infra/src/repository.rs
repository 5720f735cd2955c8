//! Product repository: the translation boundary between the entity store and
//! response envelopes.
//!
//! Every public operation returns an [`Envelope`]. Store errors never escape;
//! they become `PersistenceFailure` envelopes. A commit that affects zero rows is
//! treated the same way, so a no-op write is indistinguishable from a failed one.

use tracing::{debug, instrument, warn};

use catalog_core::{Envelope, FailureKind, ProductId};
use catalog_products::Product;

use crate::store::{EntityStore, StoreError};

const MISSING_PRODUCT: &str = "product is required";
const EMPTY_ID: &str = "product id is empty";
const NOT_FOUND: &str = "product not found";
const NO_ROWS: &str = "no rows were affected by the commit";

/// Repository over a single store session.
///
/// Holds no state besides the store handle and takes no locks of its own.
#[derive(Debug)]
pub struct ProductRepository<S> {
    store: S,
}

impl<S> ProductRepository<S>
where
    S: EntityStore<Product>,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[instrument(skip(self, product), fields(product_id = ?product.as_ref().map(Product::id_typed)))]
    pub async fn insert(&self, product: Option<Product>) -> Envelope<bool> {
        let Some(product) = product else {
            return rejected("insert", MISSING_PRODUCT, FailureKind::InvalidInput);
        };
        if product.id_typed().is_nil() {
            return rejected("insert", EMPTY_ID, FailureKind::InvalidInput);
        }

        let outcome = match self.store.add(product).await {
            Ok(()) => self.store.commit().await,
            Err(e) => Err(e),
        };
        committed("insert", outcome)
    }

    /// Replace a stored product.
    ///
    /// Existence is checked first through [`Self::select_by_id`] with the incoming
    /// product's own identifier; an unsuccessful lookup stages nothing and
    /// reports `NotFound`.
    #[instrument(skip(self, product), fields(product_id = ?product.as_ref().map(Product::id_typed)))]
    pub async fn update(&self, product: Option<Product>) -> Envelope<bool> {
        let Some(product) = product else {
            return rejected("update", MISSING_PRODUCT, FailureKind::InvalidInput);
        };

        let existing = self.select_by_id(product.id_typed()).await;
        if existing.result().is_none() {
            return rejected("update", NOT_FOUND, FailureKind::NotFound);
        }

        let outcome = match self.store.update(product).await {
            Ok(()) => self.store.commit().await,
            Err(e) => Err(e),
        };
        committed("update", outcome)
    }

    #[instrument(skip(self, product), fields(product_id = ?product.as_ref().map(Product::id_typed)))]
    pub async fn delete(&self, product: Option<Product>) -> Envelope<bool> {
        let Some(product) = product else {
            return rejected("delete", MISSING_PRODUCT, FailureKind::InvalidInput);
        };

        let outcome = match self.store.remove(product).await {
            Ok(()) => self.store.commit().await,
            Err(e) => Err(e),
        };
        committed("delete", outcome)
    }

    /// All products; an empty catalog is a success.
    #[instrument(skip(self))]
    pub async fn select_all(&self) -> Envelope<Vec<Product>> {
        match self.store.all().await {
            Ok(products) => {
                debug!(count = products.len(), "selected products");
                Envelope::success(products)
            }
            Err(e) => store_failure("select_all", e),
        }
    }

    #[instrument(skip(self))]
    pub async fn select_by_id(&self, id: ProductId) -> Envelope<Product> {
        if id.is_nil() {
            return rejected("select_by_id", EMPTY_ID, FailureKind::InvalidInput);
        }

        match self.store.find_by_id(&id).await {
            Ok(Some(product)) => Envelope::success(product),
            Ok(None) => rejected("select_by_id", NOT_FOUND, FailureKind::NotFound),
            Err(e) => store_failure("select_by_id", e),
        }
    }
}

fn rejected<T>(operation: &str, message: &str, kind: FailureKind) -> Envelope<T> {
    warn!(operation, ?kind, "{message}");
    Envelope::failure(message, kind)
}

fn store_failure<T>(operation: &str, err: StoreError) -> Envelope<T> {
    warn!(operation, error = %err, "store operation failed");
    Envelope::failure(
        format!("store error: {err}"),
        FailureKind::PersistenceFailure,
    )
}

fn committed(operation: &str, outcome: Result<u64, StoreError>) -> Envelope<bool> {
    match outcome {
        Ok(rows) if rows > 0 => {
            debug!(operation, rows, "commit succeeded");
            Envelope::success(true)
        }
        Ok(_) => rejected(operation, NO_ROWS, FailureKind::PersistenceFailure),
        Err(e) => store_failure(operation, e),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use catalog_core::{Entity, ResponseStatus};
    use rust_decimal::Decimal;

    use super::*;
    use crate::store::{InMemoryDatabase, InMemoryEntityStore};
    use catalog_products::NewProduct;

    fn headphones() -> Product {
        Product::new(
            ProductId::new(),
            "Headphones",
            Some("Over-ear".to_string()),
            Decimal::new(2999, 2),
        )
    }

    fn repo() -> (
        Arc<InMemoryDatabase<Product>>,
        ProductRepository<InMemoryEntityStore<Product>>,
    ) {
        let db: Arc<InMemoryDatabase<Product>> = Arc::new(InMemoryDatabase::new());
        let repo = ProductRepository::new(db.session());
        (db, repo)
    }

    /// Store whose every primitive fails, as a dropped connection would.
    struct BrokenStore;

    #[async_trait]
    impl EntityStore<Product> for BrokenStore {
        async fn add(&self, _entity: Product) -> Result<(), StoreError> {
            Err(StoreError::backend("connection reset"))
        }
        async fn update(&self, _entity: Product) -> Result<(), StoreError> {
            Err(StoreError::backend("connection reset"))
        }
        async fn remove(&self, _entity: Product) -> Result<(), StoreError> {
            Err(StoreError::backend("connection reset"))
        }
        async fn all(&self) -> Result<Vec<Product>, StoreError> {
            Err(StoreError::backend("connection reset"))
        }
        async fn find_by_id(&self, _id: &ProductId) -> Result<Option<Product>, StoreError> {
            Err(StoreError::backend("connection reset"))
        }
        async fn commit(&self) -> Result<u64, StoreError> {
            Err(StoreError::backend("connection reset"))
        }
    }

    /// Store that accepts writes but whose commits never touch a row.
    struct SilentStore;

    #[async_trait]
    impl EntityStore<Product> for SilentStore {
        async fn add(&self, _entity: Product) -> Result<(), StoreError> {
            Ok(())
        }
        async fn update(&self, _entity: Product) -> Result<(), StoreError> {
            Ok(())
        }
        async fn remove(&self, _entity: Product) -> Result<(), StoreError> {
            Ok(())
        }
        async fn all(&self) -> Result<Vec<Product>, StoreError> {
            Ok(vec![])
        }
        async fn find_by_id(&self, _id: &ProductId) -> Result<Option<Product>, StoreError> {
            Ok(None)
        }
        async fn commit(&self) -> Result<u64, StoreError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn insert_then_select_by_id_round_trips() {
        let (_db, repo) = repo();
        let p = headphones();

        let inserted = repo.insert(Some(p.clone())).await;
        assert!(inserted.is_successful());
        assert_eq!(inserted.into_result(), Some(true));

        let found = repo.select_by_id(p.id_typed()).await;
        assert_eq!(found.status_code(), ResponseStatus::Ok);
        assert_eq!(found.into_result(), Some(p));
    }

    #[tokio::test]
    async fn insert_missing_product_is_bad_request() {
        let (db, repo) = repo();
        let env = repo.insert(None).await;
        assert!(!env.is_successful());
        assert_eq!(env.status_code(), ResponseStatus::BadRequest);
        assert!(!env.error_message().is_empty());
        assert!(db.is_empty());
    }

    #[tokio::test]
    async fn insert_nil_identifier_is_bad_request() {
        let (db, repo) = repo();
        let p = Product::new(ProductId::nil(), "Nameless", None, Decimal::ONE);
        let env = repo.insert(Some(p)).await;
        assert_eq!(env.status_code(), ResponseStatus::BadRequest);
        assert!(db.is_empty());
    }

    #[tokio::test]
    async fn insert_duplicate_identifier_is_internal_error() {
        let (_db, repo) = repo();
        let p = headphones();
        assert!(repo.insert(Some(p.clone())).await.is_successful());

        let env = repo.insert(Some(p)).await;
        assert_eq!(env.status_code(), ResponseStatus::InternalServerError);
    }

    #[tokio::test]
    async fn select_by_id_classifies_nil_unknown_and_known() {
        let (_db, repo) = repo();
        let p = headphones();
        repo.insert(Some(p.clone())).await;

        assert_eq!(
            repo.select_by_id(ProductId::nil()).await.status_code(),
            ResponseStatus::BadRequest
        );
        assert_eq!(
            repo.select_by_id(ProductId::new()).await.status_code(),
            ResponseStatus::NotFound
        );
        let known = repo.select_by_id(p.id_typed()).await;
        assert_eq!(known.status_code(), ResponseStatus::Ok);
        assert_eq!(known.result().map(Product::name), Some("Headphones"));
    }

    #[tokio::test]
    async fn update_unknown_product_is_not_found_and_writes_nothing() {
        let (db, repo) = repo();
        let existing = headphones();
        repo.insert(Some(existing.clone())).await;

        let stranger = headphones();
        let env = repo.update(Some(stranger.clone())).await;

        assert_eq!(env.status_code(), ResponseStatus::NotFound);
        assert_eq!(repo.store().pending_len(), 0);
        assert_eq!(db.len(), 1);
        assert_eq!(
            repo.select_by_id(stranger.id_typed()).await.status_code(),
            ResponseStatus::NotFound
        );
        assert_eq!(repo.select_by_id(existing.id_typed()).await.into_result(), Some(existing));
    }

    #[tokio::test]
    async fn update_replaces_whole_record() {
        let (_db, repo) = repo();
        let p = headphones();
        repo.insert(Some(p.clone())).await;

        let replaced = Product::new(p.id_typed(), "Studio Headphones", None, Decimal::new(4999, 2));
        let env = repo.update(Some(replaced.clone())).await;
        assert!(env.is_successful());

        let found = repo.select_by_id(p.id_typed()).await.into_result().unwrap();
        assert_eq!(found, replaced);
        assert_eq!(found.description(), None);
    }

    #[tokio::test]
    async fn update_with_unchanged_values_reports_internal_error() {
        let (_db, repo) = repo();
        let p = headphones();
        repo.insert(Some(p.clone())).await;

        let env = repo.update(Some(p)).await;
        assert!(!env.is_successful());
        assert_eq!(env.status_code(), ResponseStatus::InternalServerError);
    }

    #[tokio::test]
    async fn validated_price_round_trips_exactly() {
        let (_db, repo) = repo();
        let p = NewProduct {
            name: "Cable".to_string(),
            description: None,
            unit_price: Decimal::new(1050, 2),
        }
        .build(ProductId::new())
        .unwrap();
        repo.insert(Some(p.clone())).await;

        let found = repo.select_by_id(p.id_typed()).await.into_result().unwrap();
        assert_eq!(found.unit_price(), Decimal::new(1050, 2));
        assert_eq!(found.unit_price().to_string(), "10.50");

        // Only cent-precision prices get this far; sub-cent input is rejected earlier.
        let sub_cent = NewProduct {
            name: "Cable".to_string(),
            description: None,
            unit_price: Decimal::new(10499, 3),
        };
        assert!(p.replace_details(sub_cent).is_err());
    }

    #[tokio::test]
    async fn update_differing_only_in_price_scale_is_a_no_op() {
        let (_db, repo) = repo();
        let p = Product::new(ProductId::new(), "Cable", None, Decimal::new(105, 1));
        repo.insert(Some(p.clone())).await;

        // 10.5 and 10.50 are the same NUMERIC(18, 2) value, so nothing changes.
        let rescaled = Product::new(p.id_typed(), "Cable", None, Decimal::new(1050, 2));
        let env = repo.update(Some(rescaled)).await;
        assert_eq!(env.status_code(), ResponseStatus::InternalServerError);
        assert_eq!(env.error_message(), NO_ROWS);
    }

    #[tokio::test]
    async fn update_missing_product_is_bad_request() {
        let (_db, repo) = repo();
        assert_eq!(repo.update(None).await.status_code(), ResponseStatus::BadRequest);
    }

    #[tokio::test]
    async fn delete_removes_product() {
        let (_db, repo) = repo();
        let p = headphones();
        repo.insert(Some(p.clone())).await;

        let env = repo.delete(Some(p.clone())).await;
        assert!(env.is_successful());
        assert_eq!(
            repo.select_by_id(p.id_typed()).await.status_code(),
            ResponseStatus::NotFound
        );
    }

    #[tokio::test]
    async fn delete_unknown_product_is_internal_error() {
        let (_db, repo) = repo();
        let env = repo.delete(Some(headphones())).await;
        assert_eq!(env.status_code(), ResponseStatus::InternalServerError);
    }

    #[tokio::test]
    async fn delete_missing_product_is_bad_request() {
        let (_db, repo) = repo();
        assert_eq!(repo.delete(None).await.status_code(), ResponseStatus::BadRequest);
    }

    #[tokio::test]
    async fn select_all_on_empty_store_is_empty_success() {
        let (_db, repo) = repo();
        let env = repo.select_all().await;
        assert!(env.is_successful());
        assert_eq!(env.into_result(), Some(vec![]));
    }

    #[tokio::test]
    async fn headphones_lifecycle_scenario() {
        let (_db, repo) = repo();
        let p = Product::new(ProductId::new(), "Headphones", None, Decimal::new(2999, 2));

        let inserted = repo.insert(Some(p.clone())).await;
        assert!(inserted.is_successful());
        assert!(!p.id().is_nil());

        let all = repo.select_all().await.into_result().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name(), "Headphones");
        assert_eq!(all[0].unit_price(), Decimal::new(2999, 2));

        assert!(repo.delete(Some(all[0].clone())).await.is_successful());
        assert_eq!(repo.select_all().await.into_result(), Some(vec![]));
    }

    #[tokio::test]
    async fn store_errors_become_internal_server_error_envelopes() {
        let repo = ProductRepository::new(BrokenStore);
        let p = headphones();

        let insert = repo.insert(Some(p.clone())).await;
        assert_eq!(insert.status_code(), ResponseStatus::InternalServerError);
        assert!(insert.error_message().contains("connection reset"));

        assert_eq!(repo.delete(Some(p.clone())).await.status_code(), ResponseStatus::InternalServerError);
        assert_eq!(repo.select_all().await.status_code(), ResponseStatus::InternalServerError);
        assert_eq!(
            repo.select_by_id(p.id_typed()).await.status_code(),
            ResponseStatus::InternalServerError
        );
        // The existence check fails first, so update reports the record as missing.
        assert_eq!(repo.update(Some(p)).await.status_code(), ResponseStatus::NotFound);
    }

    #[tokio::test]
    async fn zero_row_commit_is_internal_server_error() {
        let repo = ProductRepository::new(SilentStore);
        let env = repo.insert(Some(headphones())).await;
        assert_eq!(env.status_code(), ResponseStatus::InternalServerError);
        assert_eq!(env.error_message(), NO_ROWS);
    }

    #[tokio::test]
    async fn repository_works_over_a_type_erased_store() {
        let db: Arc<InMemoryDatabase<Product>> = Arc::new(InMemoryDatabase::new());
        let store: Box<dyn EntityStore<Product>> = Box::new(db.session());
        let repo = ProductRepository::new(store);

        assert!(repo.insert(Some(headphones())).await.is_successful());
        assert_eq!(db.len(), 1);
    }
}
