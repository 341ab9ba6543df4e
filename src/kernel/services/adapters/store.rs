//! In-memory entity store
//!
//! Keeps entities newest-first and publishes every change as a full
//! identifier snapshot on a `watch` channel.

use crate::kernel::services::ports::{Entity, EntityId, EntitySnapshot, EntityStore};
use rustc_hash::FxHashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;

#[derive(Default)]
struct StoreInner {
    entities: FxHashMap<EntityId, Arc<Entity>>,
    /// Newest first.
    order: Vec<EntityId>,
}

pub struct MemoryEntityStore {
    inner: RwLock<StoreInner>,
    snapshots: watch::Sender<EntitySnapshot>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        let (snapshots, _) = watch::channel(EntitySnapshot::from(Vec::new()));
        Self {
            inner: RwLock::new(StoreInner::default()),
            snapshots,
        }
    }

    pub fn with_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        let store = Self::new();
        store.insert_all(entities);
        store
    }

    pub fn subscribe(&self) -> watch::Receiver<EntitySnapshot> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> EntitySnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts as the newest entity, or replaces in place if the id exists.
    pub fn insert(&self, entity: Entity) {
        self.insert_all(std::iter::once(entity));
    }

    /// Inserts in iteration order, so the last item ends up newest.
    pub fn insert_all(&self, entities: impl IntoIterator<Item = Entity>) {
        {
            let mut inner = self.write();
            let mut added = Vec::new();
            for entity in entities {
                let id = entity.id();
                if inner.entities.insert(id, Arc::new(entity)).is_none() {
                    added.push(id);
                }
            }
            added.reverse();
            inner.order.splice(0..0, added);
        }
        self.publish();
    }

    pub fn remove(&self, id: EntityId) -> bool {
        let removed = {
            let mut inner = self.write();
            let removed = inner.entities.remove(&id).is_some();
            if removed {
                inner.order.retain(|other| *other != id);
            }
            removed
        };
        if removed {
            self.publish();
        }
        removed
    }

    fn publish(&self) {
        let snapshot = EntitySnapshot::from(self.read().order.as_slice());
        self.snapshots.send_replace(snapshot);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, StoreInner> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, StoreInner> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for MemoryEntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore for MemoryEntityStore {
    fn entity(&self, id: EntityId) -> Option<Arc<Entity>> {
        self.read().entities.get(&id).cloned()
    }

    fn hosts(&self) -> Vec<String> {
        let inner = self.read();
        let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
        for entity in inner.entities.values() {
            if let Entity::Task(task) = entity.as_ref() {
                if let Some(host) = task.host() {
                    *counts.entry(host).or_default() += 1;
                }
            }
        }
        let mut hosts: Vec<(&str, usize)> = counts.into_iter().collect();
        hosts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        hosts.into_iter().map(|(host, _)| host.to_string()).collect()
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/store.rs"]
mod tests;
