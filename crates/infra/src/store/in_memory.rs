use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;

use catalog_core::Entity;

use super::r#trait::{EntityStore, PendingChange, StoreError};

/// Shared in-memory table keyed by entity identifier.
///
/// Intended for tests/dev. Each request opens its own [`InMemoryEntityStore`]
/// session via [`InMemoryDatabase::session`]; only committed state lives here.
#[derive(Debug)]
pub struct InMemoryDatabase<E: Entity> {
    rows: RwLock<HashMap<E::Id, E>>,
}

impl<E: Entity> InMemoryDatabase<E> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// Open a unit of work against this table.
    pub fn session(self: &Arc<Self>) -> InMemoryEntityStore<E> {
        InMemoryEntityStore {
            db: Arc::clone(self),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Committed row count. A poisoned lock still reports the rows it guards.
    pub fn len(&self) -> usize {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: Entity> Default for InMemoryDatabase<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory unit of work over an [`InMemoryDatabase`].
///
/// Row counting on commit:
/// - add: 1 (an identifier that already exists fails the whole commit)
/// - update: 1 if the record exists and its stored value differs, else 0
/// - remove: 1 if the record exists, else 0
#[derive(Debug)]
pub struct InMemoryEntityStore<E: Entity> {
    db: Arc<InMemoryDatabase<E>>,
    pending: Mutex<Vec<PendingChange<E>>>,
}

impl<E: Entity> InMemoryEntityStore<E> {
    fn stage(&self, change: PendingChange<E>) -> Result<(), StoreError> {
        self.pending
            .lock()
            .map_err(|_| StoreError::backend("lock poisoned"))?
            .push(change);
        Ok(())
    }

    /// Number of staged, uncommitted changes.
    pub fn pending_len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl<E> EntityStore<E> for InMemoryEntityStore<E>
where
    E: Entity + Clone + PartialEq + Send + Sync + 'static,
{
    async fn add(&self, entity: E) -> Result<(), StoreError> {
        self.stage(PendingChange::Add(entity))
    }

    async fn update(&self, entity: E) -> Result<(), StoreError> {
        self.stage(PendingChange::Update(entity))
    }

    async fn remove(&self, entity: E) -> Result<(), StoreError> {
        self.stage(PendingChange::Remove(entity))
    }

    async fn all(&self) -> Result<Vec<E>, StoreError> {
        let rows = self
            .db
            .rows
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        Ok(rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: &E::Id) -> Result<Option<E>, StoreError> {
        let rows = self
            .db
            .rows
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        Ok(rows.get(id).cloned())
    }

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

        let mut rows = self
            .db
            .rows
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))?;

        // Apply to a copy so a failing change leaves committed state untouched.
        let mut staged = rows.clone();
        let mut affected = 0u64;

        for change in changes {
            match change {
                PendingChange::Add(entity) => {
                    if staged.contains_key(entity.id()) {
                        return Err(StoreError::Conflict(format!(
                            "duplicate identifier {:?}",
                            entity.id()
                        )));
                    }
                    staged.insert(entity.id().clone(), entity);
                    affected += 1;
                }
                PendingChange::Update(entity) => {
                    if let Some(current) = staged.get_mut(entity.id()) {
                        if *current != entity {
                            *current = entity;
                            affected += 1;
                        }
                    }
                }
                PendingChange::Remove(entity) => {
                    if staged.remove(entity.id()).is_some() {
                        affected += 1;
                    }
                }
            }
        }

        *rows = staged;
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::ProductId;
    use catalog_products::Product;
    use rust_decimal::Decimal;

    fn product(name: &str, cents: i64) -> Product {
        Product::new(ProductId::new(), name, None, Decimal::new(cents, 2))
    }

    #[tokio::test]
    async fn staged_changes_are_invisible_until_commit() {
        let db: Arc<InMemoryDatabase<Product>> = Arc::new(InMemoryDatabase::new());
        let store = db.session();
        let p = product("Keyboard", 4500);

        store.add(p.clone()).await.unwrap();
        assert_eq!(store.pending_len(), 1);
        assert!(store.find_by_id(p.id()).await.unwrap().is_none());

        assert_eq!(store.commit().await.unwrap(), 1);
        assert_eq!(store.pending_len(), 0);
        assert_eq!(store.find_by_id(p.id()).await.unwrap(), Some(p));
    }

    #[tokio::test]
    async fn committed_rows_are_shared_between_sessions() {
        let db: Arc<InMemoryDatabase<Product>> = Arc::new(InMemoryDatabase::new());
        let writer = db.session();
        let p = product("Mouse", 1999);
        writer.add(p.clone()).await.unwrap();
        writer.commit().await.unwrap();

        let reader = db.session();
        assert_eq!(reader.all().await.unwrap(), vec![p]);
        assert_eq!(db.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_add_fails_whole_commit() {
        let db: Arc<InMemoryDatabase<Product>> = Arc::new(InMemoryDatabase::new());
        let store = db.session();
        let existing = product("Monitor", 19900);
        store.add(existing.clone()).await.unwrap();
        store.commit().await.unwrap();

        let fresh = product("Cable", 500);
        store.add(fresh.clone()).await.unwrap();
        store.add(existing.clone()).await.unwrap();

        let err = store.commit().await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        // The fresh row staged before the conflict is not applied either.
        assert!(store.find_by_id(fresh.id()).await.unwrap().is_none());
        assert_eq!(store.pending_len(), 0);
    }

    #[tokio::test]
    async fn update_with_identical_value_affects_no_rows() {
        let db: Arc<InMemoryDatabase<Product>> = Arc::new(InMemoryDatabase::new());
        let store = db.session();
        let p = product("Lamp", 2500);
        store.add(p.clone()).await.unwrap();
        store.commit().await.unwrap();

        store.update(p.clone()).await.unwrap();
        assert_eq!(store.commit().await.unwrap(), 0);

        let changed = Product::new(p.id_typed(), "Desk Lamp", None, p.unit_price());
        store.update(changed.clone()).await.unwrap();
        assert_eq!(store.commit().await.unwrap(), 1);
        assert_eq!(store.find_by_id(p.id()).await.unwrap(), Some(changed));
    }

    #[tokio::test]
    async fn remove_of_unknown_record_affects_no_rows() {
        let db: Arc<InMemoryDatabase<Product>> = Arc::new(InMemoryDatabase::new());
        let store = db.session();
        store.remove(product("Ghost", 100)).await.unwrap();
        assert_eq!(store.commit().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn counts_survive_a_poisoned_lock() {
        let db: Arc<InMemoryDatabase<Product>> = Arc::new(InMemoryDatabase::new());
        let store = db.session();
        store.add(product("Speaker", 8900)).await.unwrap();
        store.commit().await.unwrap();
        store.add(product("Stand", 1500)).await.unwrap();

        let poisoner = Arc::clone(&db);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.rows.write().unwrap();
            panic!("poison the table");
        })
        .join();
        assert!(db.rows.is_poisoned());
        assert_eq!(db.len(), 1);
        assert!(!db.is_empty());

        let _ = std::thread::scope(|s| {
            s.spawn(|| {
                let _guard = store.pending.lock().unwrap();
                panic!("poison the session");
            })
            .join()
        });
        assert_eq!(store.pending_len(), 1);

        // Primitives still refuse to work on poisoned state.
        assert!(matches!(store.all().await, Err(StoreError::Backend(_))));
    }

    #[tokio::test]
    async fn commit_without_changes_is_zero() {
        let db: Arc<InMemoryDatabase<Product>> = Arc::new(InMemoryDatabase::new());
        assert_eq!(db.session().commit().await.unwrap(), 0);
        assert!(db.is_empty());
    }
}
