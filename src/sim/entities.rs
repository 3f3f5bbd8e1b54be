//! Live entity collection shared by the frame path and background tasks
//!
//! All access goes through one lock, and iteration works on snapshots or
//! inside the lock, so removal during a scan never invalidates anything.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::entity::{Entity, EntityId};

/// Thread-safe set of live entities keyed by id
#[derive(Debug)]
pub struct EntitySet {
    entities: Mutex<BTreeMap<EntityId, Entity>>,
    next_id: AtomicU32,
}

impl Default for EntitySet {
    fn default() -> Self {
        Self {
            entities: Mutex::new(BTreeMap::new()),
            next_id: AtomicU32::new(1),
        }
    }
}

impl EntitySet {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<EntityId, Entity>> {
        self.entities.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert an entity, assigning it a fresh id
    pub fn insert(&self, mut entity: Entity) -> EntityId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        entity.id = id;
        self.lock().insert(id, entity);
        id
    }

    pub fn extend(&self, entities: impl IntoIterator<Item = Entity>) {
        for entity in entities {
            self.insert(entity);
        }
    }

    /// Remove by id; `None` if another path already removed it
    pub fn remove(&self, id: EntityId) -> Option<Entity> {
        self.lock().remove(&id)
    }

    /// Keep only entities matching `keep`, returning how many were dropped
    pub fn retain(&self, mut keep: impl FnMut(&Entity) -> bool) -> usize {
        let mut entities = self.lock();
        let before = entities.len();
        entities.retain(|_, entity| keep(entity));
        before - entities.len()
    }

    /// Apply `f` to every entity under the lock, stopping at the first error
    pub fn try_for_each_mut<E>(
        &self,
        mut f: impl FnMut(&mut Entity) -> Result<(), E>,
    ) -> Result<(), E> {
        self.lock().values_mut().try_for_each(|entity| f(entity))
    }

    /// First entity matching `pred`, in id order
    pub fn find(&self, mut pred: impl FnMut(&Entity) -> bool) -> Option<Entity> {
        self.lock().values().find(|entity| pred(entity)).cloned()
    }

    /// Point-in-time copy in id order
    pub fn snapshot(&self) -> Vec<Entity> {
        self.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
