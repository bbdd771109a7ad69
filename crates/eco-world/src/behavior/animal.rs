//! Animal rules: move, forage, starve, age, grow up, reproduce.

use super::lifespan_check;
use crate::entity::{Entity, Footprint, KindState};
use crate::world::{DeathCause, World};
use eco_core::rules::{
    ANIMAL_LIFESPAN, ANIMAL_LIFESPAN_JITTER, ANIMAL_MAX_STEP, ANIMAL_MIN_STEP,
    ANIMAL_PROMOTION_AGE, ANIMAL_REPRODUCTION_CHANCE, ANIMAL_REPRODUCTION_PERIOD,
    ANIMAL_STARVATION_TICKS, BITE_BIG_ON_HIGH_PLANT, BITE_BIG_ON_LOW_PLANT,
    BITE_SMALL_ON_DECOMPOSER, BITE_SMALL_ON_LOW_PLANT,
};
use eco_core::{AnimalStage, Direction, EntityId, EntityKind, PlantStage, TerrainTile};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;

/// Run one tick of an animal's life
pub fn act<R: Rng + ?Sized>(world: &mut World, id: EntityId, rng: &mut R) {
    match world.registry.get_mut(id) {
        Some(animal) if animal.is_live() => animal.tick(),
        _ => return,
    }

    let directions = Direction::all();
    let direction = directions[rng.gen_range(0..directions.len())];
    let distance = rng.gen_range(ANIMAL_MIN_STEP..=ANIMAL_MAX_STEP);
    try_move(world, id, direction, distance);

    forage(world, id, rng);

    if check_death(world, id, rng) {
        return;
    }

    promote(world, id);
    reproduce(world, id, rng);
}

/// Attempt to walk `distance` cells in `direction`. The animal stays put when
/// the target is off the grid, is water it was not born in, or is blocked.
pub fn try_move(world: &mut World, id: EntityId, direction: Direction, distance: i32) -> bool {
    let Some(animal) = world.registry.get(id) else {
        return false;
    };
    let KindState::Animal { born_in_water, .. } = animal.state else {
        return false;
    };
    if !animal.is_live() {
        return false;
    }

    let from = animal.position;
    let to = from.step(direction, distance);

    let Some(tile) = world.grid.tile_at(to) else {
        trace!(entity_id = %id, target = %to, "Move rejected: off grid");
        return false;
    };
    if tile == TerrainTile::Water && !born_in_water {
        trace!(entity_id = %id, target = %to, "Move rejected: water");
        return false;
    }
    if !world.grid.relocate(id, Footprint::Blocking, from, to) {
        trace!(entity_id = %id, target = %to, "Move rejected: blocked");
        return false;
    }

    if let Some(animal) = world.registry.get_mut(id) {
        animal.position = to;
    }
    true
}

/// Health an animal at `stage` takes out of `target` per bite, or `None`
/// when the target is not edible to it
pub fn bite_size(stage: AnimalStage, target: &Entity) -> Option<i32> {
    match (stage, &target.state) {
        (AnimalStage::Small, KindState::Plant { stage: PlantStage::Low, .. }) => {
            Some(BITE_SMALL_ON_LOW_PLANT)
        }
        (AnimalStage::Small, KindState::Decomposer) => Some(BITE_SMALL_ON_DECOMPOSER),
        (AnimalStage::Big, KindState::Plant { stage: PlantStage::Low, .. }) => {
            Some(BITE_BIG_ON_LOW_PLANT)
        }
        (AnimalStage::Big, KindState::Plant { stage: PlantStage::High, .. }) => {
            Some(BITE_BIG_ON_HIGH_PLANT)
        }
        _ => None,
    }
}

/// Bite one edible neighbour chosen uniformly from the 3x3 block. Returns
/// whether the animal ate.
fn forage<R: Rng + ?Sized>(world: &mut World, id: EntityId, rng: &mut R) -> bool {
    let Some(animal) = world.registry.get(id) else {
        return false;
    };
    let Some(stage) = animal.animal_stage() else {
        return false;
    };
    let pos = animal.position;

    let targets: Vec<(EntityId, i32)> = world
        .live_neighbors(pos, id)
        .into_iter()
        .filter_map(|target| {
            let entity = world.registry.get(target)?;
            bite_size(stage, entity).map(|bite| (target, bite))
        })
        .collect();

    let Some(&(target, bite)) = targets.choose(rng) else {
        if let Some(animal) = world.registry.get_mut(id) {
            animal.went_hungry();
        }
        return false;
    };

    if let Some(animal) = world.registry.get_mut(id) {
        animal.fed();
    }

    let depleted = world
        .registry
        .get_mut(target)
        .map(|prey| prey.take_damage(bite))
        .unwrap_or(false);
    if depleted {
        world.kill(target, DeathCause::Eaten);
    }
    true
}

/// Starvation and old age. Returns true when the animal died.
fn check_death<R: Rng + ?Sized>(world: &mut World, id: EntityId, rng: &mut R) -> bool {
    let Some(animal) = world.registry.get(id) else {
        return false;
    };
    let starved = animal.ticks_since_fed > ANIMAL_STARVATION_TICKS;
    let age = animal.age;
    let lifespan = lifespan_check(ANIMAL_LIFESPAN, ANIMAL_LIFESPAN_JITTER, rng);

    if starved {
        world.kill(id, DeathCause::Starvation)
    } else if age >= lifespan {
        world.kill(id, DeathCause::OldAge)
    } else {
        false
    }
}

/// Small -> Big once old enough. Never reverts; health and age carry over.
fn promote(world: &mut World, id: EntityId) {
    if let Some(animal) = world.registry.get_mut(id) {
        if let KindState::Animal { stage, .. } = &mut animal.state {
            if *stage == AnimalStage::Small && animal.age >= ANIMAL_PROMOTION_AGE {
                *stage = AnimalStage::Big;
            }
        }
    }
}

/// Every few ticks, with another live animal nearby, maybe spawn a Small
/// animal somewhere on the grid.
fn reproduce<R: Rng + ?Sized>(world: &mut World, id: EntityId, rng: &mut R) -> Option<EntityId> {
    let animal = world.registry.get(id)?;
    if animal.age % ANIMAL_REPRODUCTION_PERIOD != 0 {
        return None;
    }
    let pos = animal.position;

    let has_mate = world
        .live_neighbors(pos, id)
        .into_iter()
        .any(|n| world.registry.get(n).map(|e| e.kind()) == Some(EntityKind::Animal));
    if !has_mate || !rng.gen_bool(ANIMAL_REPRODUCTION_CHANCE) {
        return None;
    }

    let Some(site) = world.find_vacant_cell(Footprint::Blocking, rng) else {
        trace!(entity_id = %id, tick = world.tick(), "Reproduction abandoned: no free cell");
        return None;
    };
    let born_in_water = world.grid.tile_at(site) == Some(TerrainTile::Water);
    world.spawn(Entity::animal(site, born_in_water))
}
