//! The entity registry: sole owner of every entity.

use crate::entity::Entity;
use eco_core::EntityId;
use std::collections::BTreeMap;

/// Entities keyed by handle. Handles increase monotonically, so key order is
/// creation order. Entities created while a tick is in progress wait in
/// `pending` until the traversal is over.
#[derive(Debug, Clone)]
pub struct Registry {
    entities: BTreeMap<EntityId, Entity>,
    pending: BTreeMap<EntityId, Entity>,
    next_id: u64,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            pending: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Register an entity in the pending list and hand back its new handle
    pub fn insert(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        entity.id = id;
        self.pending.insert(id, entity);
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id).or_else(|| self.pending.get(&id))
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        match self.entities.get_mut(&id) {
            Some(entity) => Some(entity),
            None => self.pending.get_mut(&id),
        }
    }

    /// Handles of the settled entities, in traversal order
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// Move pending entities into the traversal order
    pub fn merge_pending(&mut self) -> usize {
        let merged = self.pending.len();
        self.entities.append(&mut self.pending);
        merged
    }

    /// Drop every Removed entity, returning them
    pub fn purge_removed(&mut self) -> Vec<Entity> {
        let removed: Vec<EntityId> = self
            .iter()
            .filter(|entity| entity.is_removed())
            .map(|entity| entity.id)
            .collect();

        removed
            .into_iter()
            .filter_map(|id| {
                self.entities
                    .remove(&id)
                    .or_else(|| self.pending.remove(&id))
            })
            .collect()
    }

    /// Settled entities followed by pending ones
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values().chain(self.pending.values())
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn len(&self) -> usize {
        self.entities.len() + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
