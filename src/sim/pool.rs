//! Homogeneous entity pools
//!
//! Each pool owns one kind of entity and hands out stable ids. Removal is
//! always mark-and-compact, so survivors keep their relative order and are
//! visited exactly once.

use serde::{Deserialize, Serialize};

/// Stable identifier of an entity within its pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// An ordered collection of one entity kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool<T> {
    entries: Vec<(EntityId, T)>,
    next_id: u32,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Add an entity, returning its id. Ids are never reused.
    pub fn spawn(&mut self, entity: T) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, entity));
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.iter().any(|(eid, _)| *eid == id)
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.entries.iter().find(|(eid, _)| *eid == id).map(|(_, e)| e)
    }

    /// Remove one entity. Unknown ids are a no-op.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let idx = self.entries.iter().position(|(eid, _)| *eid == id)?;
        Some(self.entries.remove(idx).1)
    }

    /// Iterate `(id, entity)` in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.entries.iter().map(|(id, e)| (*id, e))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.entries.iter_mut().map(|(id, e)| (*id, e))
    }

    /// Iterate entities only
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, e)| e)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut().map(|(_, e)| e)
    }

    /// Visit every live entity mutably
    pub fn for_each_alive(&mut self, mut visit: impl FnMut(EntityId, &mut T)) {
        for (id, entity) in &mut self.entries {
            visit(*id, entity);
        }
    }

    /// Remove every entity matching `pred`, returning how many were removed
    pub fn remove_where(&mut self, mut pred: impl FnMut(EntityId, &T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(id, e)| !pred(*id, e));
        before - self.entries.len()
    }

    /// Remove a set of ids in one compaction pass
    pub fn remove_ids(&mut self, ids: &[EntityId]) -> usize {
        if ids.is_empty() {
            return 0;
        }
        self.remove_where(|id, _| ids.contains(&id))
    }
}
