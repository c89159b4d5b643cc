//! In-memory repository implementation.
//!
//! Suitable for tests and local development. Records live in an ordered map
//! behind `Arc<RwLock<...>>`; the identifier counter sits under the same lock
//! so assignment is atomic with the insert.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::domain::{NewVilla, Timestamp, Villa, VillaId};
use crate::infrastructure::{RepositoryError, RepositoryResult, VillaRepository};

/// State guarded by the repository lock.
#[derive(Debug)]
struct Store {
    villas: BTreeMap<VillaId, Villa>,
    /// Last identifier handed out. Identifiers are never reused.
    last_id: i32,
}

/// In-memory implementation of `VillaRepository`.
///
/// # Example
///
/// ```ignore
/// let repository = InMemoryVillaRepository::new();
/// let villa = repository.insert(new_villa, Timestamp::now()).await?;
/// assert_eq!(villa.id, VillaId::new(1));
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryVillaRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryVillaRepository {
    /// Creates a new empty in-memory villa repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(Store {
                villas: BTreeMap::new(),
                last_id: 0,
            })),
        }
    }
}

impl Default for InMemoryVillaRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl VillaRepository for InMemoryVillaRepository {
    fn find_all(&self) -> BoxFuture<'static, RepositoryResult<Vec<Villa>>> {
        let store = Arc::clone(&self.store);
        async move {
            let guard = store.read().await;
            Ok(guard.villas.values().cloned().collect())
        }
        .boxed()
    }

    fn find_by_id(&self, id: VillaId) -> BoxFuture<'static, RepositoryResult<Option<Villa>>> {
        let store = Arc::clone(&self.store);
        async move {
            let guard = store.read().await;
            Ok(guard.villas.get(&id).cloned())
        }
        .boxed()
    }

    fn find_by_name(&self, name: &str) -> BoxFuture<'static, RepositoryResult<Option<Villa>>> {
        let store = Arc::clone(&self.store);
        let name = name.to_string();
        async move {
            let guard = store.read().await;
            Ok(guard
                .villas
                .values()
                .find(|villa| villa.has_name(&name))
                .cloned())
        }
        .boxed()
    }

    fn insert(
        &self,
        villa: NewVilla,
        timestamp: Timestamp,
    ) -> BoxFuture<'static, RepositoryResult<Villa>> {
        let store = Arc::clone(&self.store);
        async move {
            let mut guard = store.write().await;
            guard.last_id = guard.last_id.checked_add(1).ok_or_else(|| {
                RepositoryError::DatabaseError("villa identifiers exhausted".to_string())
            })?;
            let stored = villa.into_villa(VillaId::new(guard.last_id), timestamp);
            guard.villas.insert(stored.id, stored.clone());
            Ok(stored)
        }
        .boxed()
    }

    fn update(&self, villa: &Villa) -> BoxFuture<'static, RepositoryResult<bool>> {
        let store = Arc::clone(&self.store);
        let villa = villa.clone();
        async move {
            let mut guard = store.write().await;
            let Some(existing) = guard.villas.get_mut(&villa.id) else {
                return Ok(false);
            };
            *existing = Villa {
                created_at: existing.created_at,
                ..villa
            };
            Ok(true)
        }
        .boxed()
    }

    fn delete(&self, id: VillaId) -> BoxFuture<'static, RepositoryResult<bool>> {
        let store = Arc::clone(&self.store);
        async move {
            let mut guard = store.write().await;
            Ok(guard.villas.remove(&id).is_some())
        }
        .boxed()
    }

    fn count(&self) -> BoxFuture<'static, RepositoryResult<u64>> {
        let store = Arc::clone(&self.store);
        async move {
            let guard = store.read().await;
            Ok(guard.villas.len() as u64)
        }
        .boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================
