//! Shared mutable state the behavior rules act on: the grid, the registry
//! and the running tally of the current tick.
//!
//! Every lifecycle transition goes through `World` so that the grid layers
//! stay in sync with entity state.

use crate::entity::{Entity, Footprint};
use crate::grid::Grid;
use crate::registry::Registry;
use eco_core::rules::MAX_SPAWN_ATTEMPTS;
use eco_core::{EntityId, Lifecycle, PopulationCensus, Position, TickReport};
use rand::Rng;
use tracing::{debug, trace};

/// Why an entity died
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    Eaten,
    Starvation,
    OldAge,
}

#[derive(Debug, Clone)]
pub struct World {
    pub(crate) grid: Grid,
    pub(crate) registry: Registry,
    tick: u64,
    tally: TickReport,
}

impl World {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            registry: Registry::new(),
            tick: 0,
            tally: TickReport::default(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.registry.get(id)
    }

    /// Direct access to an entity's fields. Position must not be changed
    /// through this; use the behavior rules, which keep the grid in sync.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.registry.get_mut(id)
    }

    /// Put a new entity on the grid. Returns `None`, leaving the world
    /// untouched, when its cell cannot take it.
    pub fn spawn(&mut self, entity: Entity) -> Option<EntityId> {
        let footprint = entity.footprint();
        let pos = entity.position;
        if !self.grid.can_place(footprint, pos) {
            trace!(tick = self.tick, position = %pos, kind = %entity.kind(), "Spawn rejected");
            return None;
        }

        let kind = entity.kind();
        let id = self.registry.insert(entity);
        self.grid.place(id, footprint, pos);
        self.tally.births += 1;

        debug!(
            event = "birth",
            tick = self.tick,
            entity_id = %id,
            kind = %kind,
            row = pos.row,
            col = pos.col,
            "Entity born"
        );

        Some(id)
    }

    /// Live -> Dead. The entity leaves the occupancy layers and, unless it
    /// is a decomposer, stays behind as remains. Decomposers go straight on
    /// to Removed.
    pub fn kill(&mut self, id: EntityId, cause: DeathCause) -> bool {
        let Some(entity) = self.registry.get_mut(id) else {
            return false;
        };
        if !entity.is_live() {
            return false;
        }

        entity.lifecycle = Lifecycle::Dead;
        let pos = entity.position;
        let kind = entity.kind();
        let age = entity.age;
        let leaves_remains = kind != eco_core::EntityKind::Decomposer;

        self.grid.vacate(id, pos);
        self.tally.deaths += 1;

        debug!(
            event = "death",
            tick = self.tick,
            entity_id = %id,
            kind = %kind,
            cause = ?cause,
            age = age,
            "Entity died"
        );

        if leaves_remains {
            self.grid.bury(id, pos);
        } else {
            self.remove(id);
        }
        true
    }

    /// Mark an entity Removed and clear every grid reference to it
    pub fn remove(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.registry.get_mut(id) else {
            return false;
        };
        if entity.is_removed() {
            return false;
        }

        entity.lifecycle = Lifecycle::Removed;
        let pos = entity.position;
        self.grid.vacate(id, pos);
        self.grid.exhume(id, pos);
        self.tally.removals += 1;

        debug!(event = "removal", tick = self.tick, entity_id = %id, "Entity removed");
        true
    }

    /// Rejection-sample a random cell that can take `footprint`. Gives up
    /// after a bounded number of draws so a full grid cannot stall a tick.
    pub fn find_vacant_cell<R: Rng + ?Sized>(
        &self,
        footprint: Footprint,
        rng: &mut R,
    ) -> Option<Position> {
        for _ in 0..MAX_SPAWN_ATTEMPTS {
            let pos = Position::new(
                rng.gen_range(0..self.grid.height),
                rng.gen_range(0..self.grid.width),
            );
            if self.grid.can_place(footprint, pos) {
                return Some(pos);
            }
        }
        None
    }

    /// Live entities of any kind in the 3x3 block around `pos`, skipping `except`
    pub fn live_neighbors(&self, pos: Position, except: EntityId) -> Vec<EntityId> {
        self.grid
            .neighborhood(pos)
            .into_iter()
            .flat_map(|cell| self.grid.occupants_at(cell).collect::<Vec<_>>())
            .filter(|&id| id != except)
            .filter(|&id| self.registry.get(id).map(Entity::is_live).unwrap_or(false))
            .collect()
    }

    /// Corpses in the 3x3 block around `pos`
    pub fn corpses_near(&self, pos: Position) -> Vec<EntityId> {
        self.grid
            .neighborhood(pos)
            .into_iter()
            .flat_map(|cell| self.grid.remains_at(cell).to_vec())
            .filter(|&id| self.registry.get(id).map(Entity::is_dead).unwrap_or(false))
            .collect()
    }

    pub fn census(&self) -> PopulationCensus {
        let mut census = PopulationCensus::new();
        for entity in self.registry.iter() {
            census.record(entity.kind(), entity.stage(), entity.lifecycle);
        }
        census
    }

    /// Advance the clock and start a fresh tally
    pub(crate) fn begin_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tally = TickReport {
            tick: self.tick,
            ..Default::default()
        };
        self.tick
    }

    /// Drop Removed entities from the registry, making sure no grid layer
    /// still points at them
    pub(crate) fn purge_removed(&mut self) -> usize {
        let purged = self.registry.purge_removed();
        for entity in &purged {
            self.grid.vacate(entity.id, entity.position);
            self.grid.exhume(entity.id, entity.position);
        }
        purged.len()
    }

    pub(crate) fn note_emergence(&mut self) {
        self.tally.emergences += 1;
    }

    pub(crate) fn finish_tick(&mut self) -> TickReport {
        std::mem::take(&mut self.tally)
    }
}
