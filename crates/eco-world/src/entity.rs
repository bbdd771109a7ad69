//! Entity state shared by every kind, plus each kind's sub-state.

use eco_core::rules::{
    ANIMAL_BIG_HEALTH, ANIMAL_SMALL_HEALTH, DECOMPOSER_HEALTH, PLANT_HEALTH,
};
use eco_core::{AnimalStage, EntityId, EntityKind, Lifecycle, PlantStage, Position, Stage};
use serde::{Deserialize, Serialize};

/// Which occupancy layer an entity takes up in its cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Footprint {
    /// At most one per cell; stops movement and spawning into the cell
    Blocking,
    /// Low plants; coexist with one blocking occupant
    Understory,
}

/// Kind-specific sub-state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KindState {
    Animal {
        stage: AnimalStage,
        born_in_water: bool,
    },
    Plant {
        stage: PlantStage,
        energy: i32,
    },
    Decomposer,
}

/// An entity in the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Assigned by the registry on insertion; `EntityId(0)` until then
    pub id: EntityId,
    pub position: Position,
    pub lifecycle: Lifecycle,
    pub age: u32,
    pub health: i32,
    pub ticks_since_fed: u32,
    pub state: KindState,
}

impl Entity {
    fn new(position: Position, health: i32, state: KindState) -> Self {
        Self {
            id: EntityId(0),
            position,
            lifecycle: Lifecycle::Live,
            age: 0,
            health,
            ticks_since_fed: 0,
            state,
        }
    }

    /// A newborn Small animal
    pub fn animal(position: Position, born_in_water: bool) -> Self {
        Self::new(
            position,
            ANIMAL_SMALL_HEALTH,
            KindState::Animal {
                stage: AnimalStage::Small,
                born_in_water,
            },
        )
    }

    /// An animal already at the Big stage
    pub fn big_animal(position: Position, born_in_water: bool) -> Self {
        Self::new(
            position,
            ANIMAL_BIG_HEALTH,
            KindState::Animal {
                stage: AnimalStage::Big,
                born_in_water,
            },
        )
    }

    /// A Low plant seeded with `energy`
    pub fn plant(position: Position, energy: i32) -> Self {
        Self::new(
            position,
            PLANT_HEALTH,
            KindState::Plant {
                stage: PlantStage::Low,
                energy,
            },
        )
    }

    pub fn decomposer(position: Position) -> Self {
        Self::new(position, DECOMPOSER_HEALTH, KindState::Decomposer)
    }

    pub fn kind(&self) -> EntityKind {
        match self.state {
            KindState::Animal { .. } => EntityKind::Animal,
            KindState::Plant { .. } => EntityKind::Plant,
            KindState::Decomposer => EntityKind::Decomposer,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self.state {
            KindState::Animal { stage, .. } => Some(stage.into()),
            KindState::Plant { stage, .. } => Some(stage.into()),
            KindState::Decomposer => None,
        }
    }

    pub fn animal_stage(&self) -> Option<AnimalStage> {
        match self.state {
            KindState::Animal { stage, .. } => Some(stage),
            _ => None,
        }
    }

    pub fn plant_stage(&self) -> Option<PlantStage> {
        match self.state {
            KindState::Plant { stage, .. } => Some(stage),
            _ => None,
        }
    }

    pub fn footprint(&self) -> Footprint {
        match self.state {
            KindState::Plant {
                stage: PlantStage::Low,
                ..
            } => Footprint::Understory,
            _ => Footprint::Blocking,
        }
    }

    pub fn is_live(&self) -> bool {
        self.lifecycle == Lifecycle::Live
    }

    pub fn is_dead(&self) -> bool {
        self.lifecycle == Lifecycle::Dead
    }

    pub fn is_removed(&self) -> bool {
        self.lifecycle == Lifecycle::Removed
    }

    pub fn tick(&mut self) {
        self.age += 1;
    }

    /// Reduce health; true when this leaves the entity at or below zero
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.health -= amount;
        self.health <= 0
    }

    pub fn fed(&mut self) {
        self.ticks_since_fed = 0;
    }

    pub fn went_hungry(&mut self) {
        self.ticks_since_fed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_creation() {
        let pos = Position::new(3, 4);

        let animal = Entity::animal(pos, true);
        assert_eq!(animal.kind(), EntityKind::Animal);
        assert_eq!(animal.stage(), Some(Stage::Small));
        assert_eq!(animal.health, ANIMAL_SMALL_HEALTH);
        assert_eq!(animal.footprint(), Footprint::Blocking);
        assert!(animal.is_live());

        let plant = Entity::plant(pos, 3);
        assert_eq!(plant.kind(), EntityKind::Plant);
        assert_eq!(plant.footprint(), Footprint::Understory);
        assert_eq!(
            plant.state,
            KindState::Plant {
                stage: PlantStage::Low,
                energy: 3
            }
        );

        let decomposer = Entity::decomposer(pos);
        assert_eq!(decomposer.stage(), None);
        assert_eq!(decomposer.health, DECOMPOSER_HEALTH);
    }

    #[test]
    fn test_high_plant_blocks() {
        let mut plant = Entity::plant(Position::new(0, 0), 5);
        plant.state = KindState::Plant {
            stage: PlantStage::High,
            energy: 5,
        };
        assert_eq!(plant.footprint(), Footprint::Blocking);
        assert_eq!(plant.plant_stage(), Some(PlantStage::High));
    }

    #[test]
    fn test_damage_and_hunger() {
        let mut decomposer = Entity::decomposer(Position::new(0, 0));
        assert!(!decomposer.take_damage(2));
        assert!(decomposer.take_damage(1));
        assert_eq!(decomposer.health, 0);

        decomposer.went_hungry();
        decomposer.went_hungry();
        assert_eq!(decomposer.ticks_since_fed, 2);
        decomposer.fed();
        assert_eq!(decomposer.ticks_since_fed, 0);
    }
}
