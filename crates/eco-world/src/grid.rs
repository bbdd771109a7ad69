//! 2D terrain and occupancy grid for the world.
//!
//! Each cell carries a terrain tag and three occupancy layers: one blocking
//! occupant, one non-blocking understory occupant (a Low plant), and the
//! remains of dead entities. The grid only stores handles; the registry owns
//! the entities.

use crate::entity::Footprint;
use eco_core::{EntityId, Position, TerrainTile, WorldConfig};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Cell {
    occupant: Option<EntityId>,
    understory: Option<EntityId>,
    remains: Vec<EntityId>,
}

/// A bounded (non-wrapping) grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    terrain: Vec<TerrainTile>,
    cells: Vec<Cell>,
}

impl Grid {
    /// An all-soil grid with nothing on it
    pub fn new(width: i32, height: i32) -> Self {
        Self::filled(width, height, TerrainTile::Soil)
    }

    pub fn filled(width: i32, height: i32, tile: TerrainTile) -> Self {
        let size = (width.max(0) as usize).saturating_mul(height.max(0) as usize);
        Self {
            width,
            height,
            terrain: vec![tile; size],
            cells: vec![Cell::default(); size],
        }
    }

    /// Create a grid from world configuration. Every terrain kind appears at
    /// least once when the grid has room for it.
    pub fn from_config<R: Rng + ?Sized>(config: &WorldConfig, rng: &mut R) -> Self {
        let mut grid = Self::new(config.width, config.height);

        for tile in grid.terrain.iter_mut() {
            let roll = rng.gen::<f32>();

            *tile = if roll < config.water_density {
                TerrainTile::Water
            } else if roll < config.water_density + config.rock_density {
                TerrainTile::Rock
            } else if roll < config.water_density + config.rock_density + config.fertile_density {
                TerrainTile::FertileSoil
            } else {
                TerrainTile::Soil
            };
        }

        let mut counts = [0usize; 4];
        for &tile in &grid.terrain {
            counts[tile as usize] += 1;
        }

        for tile in TerrainTile::all() {
            if counts[tile as usize] > 0 {
                continue;
            }
            let spare: Vec<usize> = (0..grid.terrain.len())
                .filter(|&i| counts[grid.terrain[i] as usize] > 1)
                .collect();
            if let Some(&index) = spare.choose(rng) {
                counts[grid.terrain[index] as usize] -= 1;
                grid.terrain[index] = tile;
                counts[tile as usize] += 1;
            }
        }

        grid
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row >= 0 && pos.row < self.height && pos.col >= 0 && pos.col < self.width
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.row as usize * self.width as usize + pos.col as usize)
        } else {
            None
        }
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        let width = self.width.max(1) as usize;
        Position::new((index / width) as i32, (index % width) as i32)
    }

    pub fn cell_count(&self) -> usize {
        self.terrain.len()
    }

    pub fn tile_at(&self, pos: Position) -> Option<TerrainTile> {
        self.index(pos).map(|i| self.terrain[i])
    }

    /// Rewrite the terrain of a cell; false when out of bounds
    pub fn set_tile(&mut self, pos: Position, tile: TerrainTile) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.terrain[i] = tile;
                true
            }
            None => false,
        }
    }

    pub fn count(&self, tile: TerrainTile) -> usize {
        self.terrain.iter().filter(|&&t| t == tile).count()
    }

    /// The blocking occupant of a cell
    pub fn occupant_at(&self, pos: Position) -> Option<EntityId> {
        self.index(pos).and_then(|i| self.cells[i].occupant)
    }

    /// The non-blocking occupant of a cell
    pub fn understory_at(&self, pos: Position) -> Option<EntityId> {
        self.index(pos).and_then(|i| self.cells[i].understory)
    }

    /// Dead entities lying in a cell
    pub fn remains_at(&self, pos: Position) -> &[EntityId] {
        match self.index(pos) {
            Some(i) => &self.cells[i].remains,
            None => &[],
        }
    }

    /// Live occupants of a cell in either layer
    pub fn occupants_at(&self, pos: Position) -> impl Iterator<Item = EntityId> + '_ {
        self.understory_at(pos)
            .into_iter()
            .chain(self.occupant_at(pos))
    }

    /// True when nothing live is in the cell
    pub fn is_vacant(&self, pos: Position) -> bool {
        self.index(pos)
            .map(|i| self.cells[i].occupant.is_none() && self.cells[i].understory.is_none())
            .unwrap_or(false)
    }

    /// Whether an entity with this footprint could be placed at `pos`
    pub fn can_place(&self, footprint: Footprint, pos: Position) -> bool {
        match self.index(pos) {
            Some(i) => match footprint {
                Footprint::Blocking => self.cells[i].occupant.is_none(),
                Footprint::Understory => self.cells[i].understory.is_none(),
            },
            None => false,
        }
    }

    /// Point a cell layer at `id`. Fails when out of bounds or when the layer
    /// is already taken.
    pub fn place(&mut self, id: EntityId, footprint: Footprint, pos: Position) -> bool {
        let Some(i) = self.index(pos) else {
            return false;
        };
        let slot = match footprint {
            Footprint::Blocking => &mut self.cells[i].occupant,
            Footprint::Understory => &mut self.cells[i].understory,
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(id);
        true
    }

    /// Clear the back-reference to `id` at `pos`, only if it points at `id`
    pub fn vacate(&mut self, id: EntityId, pos: Position) -> bool {
        let Some(i) = self.index(pos) else {
            return false;
        };
        let cell = &mut self.cells[i];
        if cell.occupant == Some(id) {
            cell.occupant = None;
            true
        } else if cell.understory == Some(id) {
            cell.understory = None;
            true
        } else {
            false
        }
    }

    /// Move `id` from one cell to another. Either both cells are updated or
    /// neither is.
    pub fn relocate(
        &mut self,
        id: EntityId,
        footprint: Footprint,
        from: Position,
        to: Position,
    ) -> bool {
        if !self.can_place(footprint, to) || !self.vacate(id, from) {
            return false;
        }
        self.place(id, footprint, to)
    }

    /// Lay a dead entity's remains in a cell
    pub fn bury(&mut self, id: EntityId, pos: Position) -> bool {
        match self.index(pos) {
            Some(i) => {
                if !self.cells[i].remains.contains(&id) {
                    self.cells[i].remains.push(id);
                }
                true
            }
            None => false,
        }
    }

    /// Take remains out of a cell
    pub fn exhume(&mut self, id: EntityId, pos: Position) -> bool {
        let Some(i) = self.index(pos) else {
            return false;
        };
        let remains = &mut self.cells[i].remains;
        match remains.iter().position(|&r| r == id) {
            Some(at) => {
                remains.remove(at);
                true
            }
            None => false,
        }
    }

    /// In-bounds cells of the 3x3 block centred on `pos`, centre included
    pub fn neighborhood(&self, pos: Position) -> Vec<Position> {
        let mut cells = Vec::with_capacity(9);

        for drow in -1..=1 {
            for dcol in -1..=1 {
                let neighbor = pos.offset(drow, dcol);
                if self.contains(neighbor) {
                    cells.push(neighbor);
                }
            }
        }

        cells
    }

    /// In-bounds orthogonal neighbours in fixed west, east, north, south order
    pub fn orthogonal_neighbors(&self, pos: Position) -> Vec<Position> {
        eco_core::Direction::orthogonal()
            .into_iter()
            .map(|direction| pos.step(direction, 1))
            .filter(|&neighbor| self.contains(neighbor))
            .collect()
    }

    /// Cells holding at least one corpse, in row-major order
    pub fn corpse_cells(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.remains.is_empty())
            .map(|(i, _)| self.index_to_pos(i))
            .collect()
    }

    /// Iterator over all positions
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.terrain.len()).map(move |i| self.index_to_pos(i))
    }

    /// Iterator over all terrain tiles with positions
    pub fn iter(&self) -> impl Iterator<Item = (Position, TerrainTile)> + '_ {
        self.terrain
            .iter()
            .enumerate()
            .map(move |(i, &tile)| (self.index_to_pos(i), tile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(10, 8);
        assert_eq!(grid.width, 10);
        assert_eq!(grid.height, 8);
        assert_eq!(grid.cell_count(), 80);
        assert_eq!(grid.tile_at(Position::new(7, 9)), Some(TerrainTile::Soil));
    }

    #[test]
    fn test_bounds_are_rejected_not_wrapped() {
        let grid = Grid::new(10, 10);
        assert_eq!(grid.tile_at(Position::new(-1, 0)), None);
        assert_eq!(grid.tile_at(Position::new(0, 10)), None);
        assert!(!grid.contains(Position::new(10, 0)));
    }

    #[test]
    fn test_grid_from_config_has_every_tile() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let config = WorldConfig {
            width: 20,
            height: 20,
            water_density: 0.0,
            rock_density: 0.0,
            fertile_density: 0.0,
        };

        let grid = Grid::from_config(&config, &mut rng);
        assert_eq!(grid.width, 20);
        for tile in TerrainTile::all() {
            assert!(grid.count(tile) > 0, "missing {:?}", tile);
        }
    }

    #[test]
    fn test_missing_tile_fixup_on_large_grid() {
        let config = WorldConfig {
            width: 200,
            height: 200,
            water_density: 0.0,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let grid = Grid::from_config(&config, &mut rng);

        assert_eq!(grid.cell_count(), 40_000);
        assert_eq!(grid.count(TerrainTile::Water), 1);
        let total: usize = TerrainTile::all().iter().map(|&t| grid.count(t)).sum();
        assert_eq!(total, 40_000);
        for tile in TerrainTile::all() {
            assert!(grid.count(tile) > 0, "{:?} missing", tile);
        }
    }

    #[test]
    fn test_index_math_on_wide_grid() {
        let mut grid = Grid::new(100_000, 3);
        let far = Position::new(2, 99_999);

        assert!(grid.set_tile(far, TerrainTile::Rock));
        assert_eq!(grid.tile_at(far), Some(TerrainTile::Rock));
        assert_eq!(grid.index_to_pos(grid.cell_count() - 1), far);
        assert_eq!(grid.count(TerrainTile::Rock), 1);
    }

    #[test]
    fn test_place_and_vacate() {
        let mut grid = Grid::new(5, 5);
        let pos = Position::new(2, 2);

        assert!(grid.place(EntityId(1), Footprint::Blocking, pos));
        assert!(!grid.place(EntityId(2), Footprint::Blocking, pos));
        assert!(grid.place(EntityId(2), Footprint::Understory, pos));
        assert!(!grid.place(EntityId(3), Footprint::Understory, pos));
        assert_eq!(grid.occupant_at(pos), Some(EntityId(1)));
        assert_eq!(grid.understory_at(pos), Some(EntityId(2)));

        // Vacating on behalf of someone else is a no-op
        assert!(!grid.vacate(EntityId(3), pos));
        assert!(grid.vacate(EntityId(1), pos));
        assert_eq!(grid.occupant_at(pos), None);
        assert_eq!(grid.understory_at(pos), Some(EntityId(2)));
        assert!(!grid.is_vacant(pos));
    }

    #[test]
    fn test_place_out_of_bounds_fails() {
        let mut grid = Grid::new(5, 5);
        assert!(!grid.place(EntityId(1), Footprint::Blocking, Position::new(5, 0)));
        assert!(!grid.place(EntityId(1), Footprint::Understory, Position::new(0, -1)));
    }

    #[test]
    fn test_relocate_is_all_or_nothing() {
        let mut grid = Grid::new(5, 5);
        let from = Position::new(0, 0);
        let blocked = Position::new(1, 1);
        grid.place(EntityId(1), Footprint::Blocking, from);
        grid.place(EntityId(2), Footprint::Blocking, blocked);

        assert!(!grid.relocate(EntityId(1), Footprint::Blocking, from, blocked));
        assert_eq!(grid.occupant_at(from), Some(EntityId(1)));

        let to = Position::new(3, 3);
        assert!(grid.relocate(EntityId(1), Footprint::Blocking, from, to));
        assert_eq!(grid.occupant_at(from), None);
        assert_eq!(grid.occupant_at(to), Some(EntityId(1)));
    }

    #[test]
    fn test_remains_layer() {
        let mut grid = Grid::new(5, 5);
        let pos = Position::new(4, 4);
        grid.bury(EntityId(7), pos);
        grid.bury(EntityId(8), pos);

        assert_eq!(grid.remains_at(pos), &[EntityId(7), EntityId(8)]);
        assert_eq!(grid.corpse_cells(), vec![pos]);
        assert!(grid.is_vacant(pos));

        assert!(grid.exhume(EntityId(7), pos));
        assert!(!grid.exhume(EntityId(7), pos));
        assert_eq!(grid.remains_at(pos), &[EntityId(8)]);
    }

    #[test]
    fn test_neighborhood_clipped_at_edges() {
        let grid = Grid::new(10, 10);
        assert_eq!(grid.neighborhood(Position::new(5, 5)).len(), 9);
        assert_eq!(grid.neighborhood(Position::new(0, 0)).len(), 4);
        assert_eq!(grid.neighborhood(Position::new(0, 5)).len(), 6);
    }

    #[test]
    fn test_orthogonal_order() {
        let grid = Grid::new(10, 10);
        let pos = Position::new(5, 5);
        assert_eq!(
            grid.orthogonal_neighbors(pos),
            vec![
                Position::new(5, 4),
                Position::new(5, 6),
                Position::new(4, 5),
                Position::new(6, 5),
            ]
        );
        assert_eq!(grid.orthogonal_neighbors(Position::new(0, 0)).len(), 2);
    }
}
