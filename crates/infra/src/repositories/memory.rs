use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use devcamp_core::Entity;

use crate::StoreError;

/// In-memory entity map for tests/dev.
#[derive(Debug)]
pub struct InMemoryStore<E: Entity> {
    inner: RwLock<HashMap<E::Id, E>>,
}

impl<E: Entity> InMemoryStore<E> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<E: Entity> Default for InMemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> InMemoryStore<E>
where
    E: Entity + Clone,
{
    pub fn get(&self, id: &E::Id) -> Option<E> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(id).cloned()
    }

    pub fn find(&self, pred: impl Fn(&E) -> bool) -> Option<E> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.values().find(|e| pred(e)).cloned()
    }

    pub fn values(&self) -> Vec<E> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.values().cloned().collect()
    }

    /// Insert or replace `entity` unless a *different* entity `clashes` with it.
    pub fn upsert_unique(
        &self,
        entity: E,
        clashes: impl Fn(&E, &E) -> bool,
        key: &str,
    ) -> Result<(), StoreError> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let duplicate = map
            .values()
            .any(|other| other.id() != entity.id() && clashes(other, &entity));
        if duplicate {
            return Err(StoreError::Duplicate(key.to_string()));
        }
        map.insert(*entity.id(), entity);
        Ok(())
    }

    /// Replace an existing entity under the same uniqueness rule. An id that is
    /// no longer stored is left absent and `Ok(false)` is returned.
    pub fn replace_unique(
        &self,
        entity: E,
        clashes: impl Fn(&E, &E) -> bool,
        key: &str,
    ) -> Result<bool, StoreError> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if !map.contains_key(entity.id()) {
            return Ok(false);
        }
        let duplicate = map
            .values()
            .any(|other| other.id() != entity.id() && clashes(other, &entity));
        if duplicate {
            return Err(StoreError::Duplicate(key.to_string()));
        }
        map.insert(*entity.id(), entity);
        Ok(true)
    }

    /// Mutate in place; returns whether the entity existed.
    pub fn modify(&self, id: &E::Id, f: impl FnOnce(&mut E)) -> bool {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match map.get_mut(id) {
            Some(entity) => {
                f(entity);
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, id: &E::Id) -> bool {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.remove(id).is_some()
    }
}
