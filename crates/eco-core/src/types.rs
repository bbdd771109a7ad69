//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to an entity in the registry. Handles are allocated in increasing
/// order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Cell coordinate on the grid. Coordinates may be computed off-grid and are
/// bounds checked by the grid, never wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn offset(&self, drow: i32, dcol: i32) -> Self {
        Self {
            row: self.row + drow,
            col: self.col + dcol,
        }
    }

    /// Position reached by walking `distance` cells in `direction`
    pub fn step(&self, direction: Direction, distance: i32) -> Self {
        let (drow, dcol) = direction.to_delta();
        self.offset(drow * distance, dcol * distance)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Compass direction for movement, as (row, col) deltas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::East => (0, 1),
            Direction::West => (0, -1),
            Direction::NorthEast => (-1, 1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (1, -1),
        }
    }

    pub fn all() -> [Direction; 8] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
            Direction::NorthEast,
            Direction::NorthWest,
            Direction::SouthEast,
            Direction::SouthWest,
        ]
    }

    /// Orthogonal neighbours in the fixed order used for seeding offspring
    pub fn orthogonal() -> [Direction; 4] {
        [
            Direction::West,
            Direction::East,
            Direction::North,
            Direction::South,
        ]
    }
}

/// Terrain tag of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainTile {
    Water,
    Rock,
    Soil,
    FertileSoil,
}

impl TerrainTile {
    pub fn all() -> [TerrainTile; 4] {
        [
            TerrainTile::Water,
            TerrainTile::Rock,
            TerrainTile::Soil,
            TerrainTile::FertileSoil,
        ]
    }

    /// Plants may root here
    pub fn is_arable(&self) -> bool {
        matches!(self, TerrainTile::Soil | TerrainTile::FertileSoil)
    }
}

/// Lifecycle of every entity: Live -> Dead -> Removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifecycle {
    Live,
    Dead,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Animal,
    Plant,
    Decomposer,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Animal => "animal",
            EntityKind::Plant => "plant",
            EntityKind::Decomposer => "decomposer",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimalStage {
    Small,
    Big,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlantStage {
    Low,
    High,
}

/// Growth stage of any kind, as reported in snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Small,
    Big,
    Low,
    High,
}

impl From<AnimalStage> for Stage {
    fn from(stage: AnimalStage) -> Self {
        match stage {
            AnimalStage::Small => Stage::Small,
            AnimalStage::Big => Stage::Big,
        }
    }
}

impl From<PlantStage> for Stage {
    fn from(stage: PlantStage) -> Self {
        match stage {
            PlantStage::Low => Stage::Low,
            PlantStage::High => Stage::High,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_step() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.step(Direction::North, 2), Position::new(3, 5));
        assert_eq!(pos.step(Direction::SouthWest, 3), Position::new(8, 2));
        assert_eq!(pos.step(Direction::East, 1), Position::new(5, 6));
    }

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::North.to_delta(), (-1, 0));
        assert_eq!(Direction::South.to_delta(), (1, 0));
        assert_eq!(Direction::East.to_delta(), (0, 1));
        assert_eq!(Direction::West.to_delta(), (0, -1));
    }

    #[test]
    fn test_every_direction_moves() {
        for direction in Direction::all() {
            assert_ne!(direction.to_delta(), (0, 0));
        }
    }

    #[test]
    fn test_arable_terrain() {
        assert!(TerrainTile::Soil.is_arable());
        assert!(TerrainTile::FertileSoil.is_arable());
        assert!(!TerrainTile::Rock.is_arable());
        assert!(!TerrainTile::Water.is_arable());
    }

    #[test]
    fn test_stage_conversion() {
        assert_eq!(Stage::from(AnimalStage::Big), Stage::Big);
        assert_eq!(Stage::from(PlantStage::Low), Stage::Low);
    }
}
