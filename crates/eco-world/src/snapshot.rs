//! Read-only per-tick view of the world for exporters and renderers.

use crate::world::World;
use eco_core::{
    EntityId, EntityKind, Lifecycle, PopulationCensus, Position, Result, Stage, TerrainTile,
};
use serde::{Deserialize, Serialize};

/// One entity as seen from outside the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupantDescriptor {
    pub id: EntityId,
    pub kind: EntityKind,
    pub stage: Option<Stage>,
    pub health: i32,
    pub lifecycle: Lifecycle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub position: Position,
    pub terrain: TerrainTile,
    /// Every Live or Dead entity positioned here, in registry order
    pub occupants: Vec<OccupantDescriptor>,
}

/// The whole grid after a tick, row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub width: i32,
    pub height: i32,
    pub cells: Vec<CellSnapshot>,
    pub census: PopulationCensus,
}

impl WorldSnapshot {
    pub fn capture(world: &World) -> Self {
        let grid = world.grid();
        let mut cells: Vec<CellSnapshot> = grid
            .iter()
            .map(|(position, terrain)| CellSnapshot {
                position,
                terrain,
                occupants: Vec::new(),
            })
            .collect();

        for entity in world.registry().iter().filter(|e| !e.is_removed()) {
            let pos = entity.position;
            if !grid.contains(pos) {
                continue;
            }
            let index = pos.row as usize * grid.width as usize + pos.col as usize;
            cells[index].occupants.push(OccupantDescriptor {
                id: entity.id,
                kind: entity.kind(),
                stage: entity.stage(),
                health: entity.health,
                lifecycle: entity.lifecycle,
            });
        }

        Self {
            tick: world.tick(),
            width: grid.width,
            height: grid.height,
            cells,
            census: world.census(),
        }
    }

    pub fn cell(&self, pos: Position) -> Option<&CellSnapshot> {
        if pos.row < 0 || pos.row >= self.height || pos.col < 0 || pos.col >= self.width {
            return None;
        }
        self.cells.get(pos.row as usize * self.width as usize + pos.col as usize)
    }

    /// Every occupant on the grid
    pub fn occupants(&self) -> impl Iterator<Item = &OccupantDescriptor> {
        self.cells.iter().flat_map(|cell| cell.occupants.iter())
    }
}

/// Consumer of per-tick snapshots (exporters, renderers)
pub trait SnapshotSink {
    fn record(&mut self, snapshot: &WorldSnapshot) -> Result<()>;
}

/// Keeps every snapshot in memory
impl SnapshotSink for Vec<WorldSnapshot> {
    fn record(&mut self, snapshot: &WorldSnapshot) -> Result<()> {
        self.push(snapshot.clone());
        Ok(())
    }
}

/// Discards snapshots
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn record(&mut self, _snapshot: &WorldSnapshot) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::grid::Grid;
    use crate::world::DeathCause;

    #[test]
    fn test_capture_lists_live_and_dead_only() {
        let mut world = World::new(Grid::new(4, 3));
        let pos = Position::new(1, 2);
        let animal = world.spawn(Entity::animal(pos, false)).unwrap();
        let plant = world.spawn(Entity::plant(pos, 5)).unwrap();
        let gone = world.spawn(Entity::plant(Position::new(0, 0), 5)).unwrap();
        world.kill(plant, DeathCause::Eaten);
        world.kill(gone, DeathCause::OldAge);
        world.remove(gone);

        let snapshot = WorldSnapshot::capture(&world);
        assert_eq!(snapshot.cells.len(), 12);
        assert_eq!(snapshot.census.corpses, 1);

        let cell = snapshot.cell(pos).unwrap();
        assert_eq!(cell.terrain, TerrainTile::Soil);
        let ids: Vec<EntityId> = cell.occupants.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![animal, plant]);
        assert_eq!(cell.occupants[1].lifecycle, Lifecycle::Dead);

        assert!(snapshot.cell(Position::new(0, 0)).unwrap().occupants.is_empty());
        assert!(snapshot.occupants().all(|o| o.lifecycle != Lifecycle::Removed));
        assert!(snapshot.cell(Position::new(3, 0)).is_none());
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut world = World::new(Grid::new(2, 2));
        world.spawn(Entity::decomposer(Position::new(1, 1))).unwrap();
        let snapshot = WorldSnapshot::capture(&world);

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: WorldSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_vec_sink_collects() {
        let world = World::new(Grid::new(2, 2));
        let mut sink: Vec<WorldSnapshot> = Vec::new();
        sink.record(&WorldSnapshot::capture(&world)).unwrap();
        sink.record(&WorldSnapshot::capture(&world)).unwrap();
        assert_eq!(sink.len(), 2);
    }
}
