//! Application service for products.
//!
//! Sits between HTTP handlers and [`ProductRepository`]: assigns identifiers,
//! shapes entities into DTOs and passes repository envelopes through untouched.

use tracing::instrument;

use catalog_core::{DomainError, Envelope, FailureKind, ProductId};
use catalog_infra::{EntityStore, ProductRepository};
use catalog_products::Product;

use crate::app::dto::{CreateProductRequest, ProductDto, UpdateProductRequest};

#[derive(Debug)]
pub struct ProductService<S> {
    repository: ProductRepository<S>,
}

impl<S> ProductService<S>
where
    S: EntityStore<Product>,
{
    pub fn new(repository: ProductRepository<S>) -> Self {
        Self { repository }
    }

    pub async fn get_all(&self) -> Envelope<Vec<ProductDto>> {
        self.repository
            .select_all()
            .await
            .map(|products| products.into_iter().map(ProductDto::from).collect())
    }

    /// Create a product under a freshly generated identifier.
    #[instrument(skip(self, request))]
    pub async fn post(&self, request: &CreateProductRequest) -> Envelope<ProductDto> {
        let product = match request.to_new_product().build(ProductId::new()) {
            Ok(p) => p,
            Err(e) => return invalid(e),
        };

        let created = ProductDto::from(product.clone());
        self.repository
            .insert(Some(product))
            .await
            .map(|_| created)
    }

    pub async fn get_by_id(&self, id: ProductId) -> Envelope<ProductDto> {
        self.repository.select_by_id(id).await.map(ProductDto::from)
    }

    /// Replace every field of an existing product.
    ///
    /// The payload is checked before the lookup, so a bad payload is a 400 even
    /// for an unknown id.
    #[instrument(skip(self, request))]
    pub async fn put(&self, id: ProductId, request: &UpdateProductRequest) -> Envelope<ProductDto> {
        let details = request.to_new_product();
        if let Err(e) = details.validate() {
            return invalid(e);
        }

        let found = self.repository.select_by_id(id).await;
        let Some(existing) = found.result().cloned() else {
            return found.map(ProductDto::from);
        };
        let product = match existing.replace_details(details) {
            Ok(p) => p,
            Err(e) => return invalid(e),
        };

        let replaced = ProductDto::from(product.clone());
        self.repository
            .update(Some(product))
            .await
            .map(|_| replaced)
    }

    /// Remove a product; an unknown id surfaces the lookup failure.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Envelope<bool> {
        let found = self.repository.select_by_id(id).await;
        let Some(product) = found.result().cloned() else {
            return found.map(|_| false);
        };
        self.repository.delete(Some(product)).await
    }
}

fn invalid<T>(err: DomainError) -> Envelope<T> {
    Envelope::failure(err.to_string(), FailureKind::InvalidInput)
}
