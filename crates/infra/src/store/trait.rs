use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use catalog_core::Entity;

/// A change staged on a store but not yet committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingChange<E> {
    Add(E),
    Update(E),
    Remove(E),
}

/// Entity store operation error.
///
/// These are **infrastructure errors**. The store passes them through untouched;
/// translating them into response envelopes is the repository's job.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write collided with an existing record (e.g. duplicate identifier).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend failed (connection, query, timeout, poisoned lock, ...).
    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Persistent collection of entities, used as a unit of work.
///
/// ## Write Semantics
///
/// `add`, `update` and `remove` only stage a [`PendingChange`]. Nothing is durable
/// until `commit()` flushes every staged change atomically and reports how many
/// rows were affected. Staged changes are consumed by `commit()` whether it
/// succeeds or fails.
///
/// ## Read Semantics
///
/// `all` and `find_by_id` observe committed state only; staged changes are not
/// visible to reads.
#[async_trait]
pub trait EntityStore<E>: Send + Sync
where
    E: Entity + Send + Sync + 'static,
{
    /// Stage insertion of a new record.
    async fn add(&self, entity: E) -> Result<(), StoreError>;

    /// Stage replace-by-identity of an existing record.
    async fn update(&self, entity: E) -> Result<(), StoreError>;

    /// Stage removal of the record with the entity's identifier.
    async fn remove(&self, entity: E) -> Result<(), StoreError>;

    async fn all(&self) -> Result<Vec<E>, StoreError>;

    async fn find_by_id(&self, id: &E::Id) -> Result<Option<E>, StoreError>;

    /// Flush staged changes, returning the number of affected rows.
    async fn commit(&self) -> Result<u64, StoreError>;
}

#[async_trait]
impl<E, S> EntityStore<E> for Arc<S>
where
    E: Entity + Send + Sync + 'static,
    S: EntityStore<E> + ?Sized,
{
    async fn add(&self, entity: E) -> Result<(), StoreError> {
        (**self).add(entity).await
    }

    async fn update(&self, entity: E) -> Result<(), StoreError> {
        (**self).update(entity).await
    }

    async fn remove(&self, entity: E) -> Result<(), StoreError> {
        (**self).remove(entity).await
    }

    async fn all(&self) -> Result<Vec<E>, StoreError> {
        (**self).all().await
    }

    async fn find_by_id(&self, id: &E::Id) -> Result<Option<E>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn commit(&self) -> Result<u64, StoreError> {
        (**self).commit().await
    }
}

#[async_trait]
impl<E, S> EntityStore<E> for Box<S>
where
    E: Entity + Send + Sync + 'static,
    S: EntityStore<E> + ?Sized,
{
    async fn add(&self, entity: E) -> Result<(), StoreError> {
        (**self).add(entity).await
    }

    async fn update(&self, entity: E) -> Result<(), StoreError> {
        (**self).update(entity).await
    }

    async fn remove(&self, entity: E) -> Result<(), StoreError> {
        (**self).remove(entity).await
    }

    async fn all(&self) -> Result<Vec<E>, StoreError> {
        (**self).all().await
    }

    async fn find_by_id(&self, id: &E::Id) -> Result<Option<E>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn commit(&self) -> Result<u64, StoreError> {
        (**self).commit().await
    }
}
