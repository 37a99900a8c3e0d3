//! Process-wide identified-entity cache.
//!
//! Unlike the per-request position cache of an
//! [`EvaluationContext`](crate::eval::EvaluationContext), these caches may be
//! shared between requests and threads. Entries are keyed by (type, id).
//! [`StrongCache`] keeps entries alive until removed; [`WeakCache`] only holds
//! them while someone else does, so callers must tolerate misses for keys they
//! inserted earlier.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::{Arc, RwLock, Weak},
};

use tracing::trace;

use crate::{
    model::{Attribute, AttributeKey, DataSet, DataSetList, Id, ListValue, Parameter},
    source::{DataSource, StoreError},
};

type Key = (TypeId, Id);
type Entity = dyn Any + Send + Sync;

/// A concurrent map from (type, id) to shared entities.
pub trait EntityCache: Send + Sync {
    fn get<T: Send + Sync + 'static>(&self, id: &Id) -> Option<Arc<T>>;

    fn insert<T: Send + Sync + 'static>(&self, id: Id, value: Arc<T>);

    fn remove<T: Send + Sync + 'static>(&self, id: &Id);

    fn clear(&self);

    /// Number of stored entries, including reclaimed ones not yet purged.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Holds strong references.
#[derive(Debug, Default)]
pub struct StrongCache {
    entries: RwLock<HashMap<Key, Arc<Entity>>>,
}

impl StrongCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntityCache for StrongCache {
    fn get<T: Send + Sync + 'static>(&self, id: &Id) -> Option<Arc<T>> {
        let entries = self.entries.read().unwrap();
        let entity = entries.get(&(TypeId::of::<T>(), *id))?.clone();
        entity.downcast::<T>().ok()
    }

    fn insert<T: Send + Sync + 'static>(&self, id: Id, value: Arc<T>) {
        let mut entries = self.entries.write().unwrap();
        entries.insert((TypeId::of::<T>(), id), value);
    }

    fn remove<T: Send + Sync + 'static>(&self, id: &Id) {
        let mut entries = self.entries.write().unwrap();
        entries.remove(&(TypeId::of::<T>(), *id));
    }

    fn clear(&self) {
        self.entries.write().unwrap().clear();
    }

    fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }
}

/// Holds weak references; entries vanish once the last outside `Arc` drops.
#[derive(Debug, Default)]
pub struct WeakCache {
    entries: RwLock<HashMap<Key, Weak<Entity>>>,
}

impl WeakCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops entries whose value has been reclaimed.
    pub fn purge(&self) {
        let mut entries = self.entries.write().unwrap();
        entries.retain(|_, entity| entity.strong_count() > 0);
    }
}

impl EntityCache for WeakCache {
    fn get<T: Send + Sync + 'static>(&self, id: &Id) -> Option<Arc<T>> {
        let entries = self.entries.read().unwrap();
        let entity = entries.get(&(TypeId::of::<T>(), *id))?.upgrade()?;
        entity.downcast::<T>().ok()
    }

    fn insert<T: Send + Sync + 'static>(&self, id: Id, value: Arc<T>) {
        let value: Arc<Entity> = value;
        let mut entries = self.entries.write().unwrap();
        entries.insert((TypeId::of::<T>(), id), Arc::downgrade(&value));
    }

    fn remove<T: Send + Sync + 'static>(&self, id: &Id) {
        let mut entries = self.entries.write().unwrap();
        entries.remove(&(TypeId::of::<T>(), *id));
    }

    fn clear(&self) {
        self.entries.write().unwrap().clear();
    }

    fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }
}

/// A [`DataSource`] whose entity lookups go through an [`EntityCache`].
///
/// Overrides and parameters are always read from the inner source.
#[derive(Debug)]
pub struct CachingSource<S, C> {
    inner: S,
    cache: C,
}

impl<S: DataSource, C: EntityCache> CachingSource<S, C> {
    pub fn new(inner: S, cache: C) -> Self {
        Self { inner, cache }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    fn cached<T, F>(&self, id: &Id, fetch: F) -> Result<Option<Arc<T>>, StoreError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Result<Option<Arc<T>>, StoreError>,
    {
        if let Some(hit) = self.cache.get::<T>(id) {
            trace!(%id, "Entity cache hit");
            return Ok(Some(hit));
        }
        let found = fetch()?;
        if let Some(value) = &found {
            self.cache.insert(*id, value.clone());
        }
        Ok(found)
    }

    fn remember<T: Send + Sync + 'static>(&self, id: Id, found: &Option<Arc<T>>) {
        if let Some(value) = found {
            self.cache.insert(id, value.clone());
        }
    }
}

impl<S: DataSource, C: EntityCache> DataSource for CachingSource<S, C> {
    fn data_set_list(&self, id: &Id) -> Result<Option<Arc<DataSetList>>, StoreError> {
        self.cached(id, || self.inner.data_set_list(id))
    }

    fn data_set_list_by_name(&self, name: &str) -> Result<Option<Arc<DataSetList>>, StoreError> {
        let found = self.inner.data_set_list_by_name(name)?;
        if let Some(list) = &found {
            self.remember(list.id, &found);
        }
        Ok(found)
    }

    fn data_set(&self, id: &Id) -> Result<Option<Arc<DataSet>>, StoreError> {
        self.cached(id, || self.inner.data_set(id))
    }

    fn data_set_by_name(
        &self,
        data_set_list: &Id,
        name: &str,
    ) -> Result<Option<Arc<DataSet>>, StoreError> {
        let found = self.inner.data_set_by_name(data_set_list, name)?;
        if let Some(data_set) = &found {
            self.remember(data_set.id, &found);
        }
        Ok(found)
    }

    fn attribute(&self, id: &Id) -> Result<Option<Arc<Attribute>>, StoreError> {
        self.cached(id, || self.inner.attribute(id))
    }

    fn attribute_by_name(
        &self,
        data_set_list: &Id,
        name: &str,
    ) -> Result<Option<Arc<Attribute>>, StoreError> {
        let found = self.inner.attribute_by_name(data_set_list, name)?;
        if let Some(attribute) = &found {
            self.remember(attribute.id, &found);
        }
        Ok(found)
    }

    fn list_value(&self, id: &Id) -> Result<Option<Arc<ListValue>>, StoreError> {
        self.cached(id, || self.inner.list_value(id))
    }

    fn overlaps(&self, data_set_list: &Id) -> Result<Vec<AttributeKey>, StoreError> {
        self.inner.overlaps(data_set_list)
    }

    fn parameter(&self, data_set: &Id, attribute: &Id) -> Result<Option<Parameter>, StoreError> {
        self.inner.parameter(data_set, attribute)
    }
}
