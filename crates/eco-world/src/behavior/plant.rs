//! Plant rules: photosynthesis, growth, seeding and senescence.

use super::lifespan_check;
use crate::entity::{Entity, Footprint, KindState};
use crate::world::{DeathCause, World};
use eco_core::rules::{
    PLANT_HIGH_REPRODUCTION_COST, PLANT_LIFESPAN, PLANT_LIFESPAN_JITTER,
    PLANT_OFFSPRING_ENERGY, PLANT_PHOTOSYNTHESIS_GAIN, PLANT_PROMOTION_AGE,
    PLANT_PROMOTION_CHANCE, PLANT_REPRODUCTION_CHANCE, PLANT_REPRODUCTION_PERIOD,
};
use eco_core::{EntityId, PlantStage, TerrainTile};
use rand::Rng;
use tracing::trace;

/// Run one tick of a plant's life
pub fn act<R: Rng + ?Sized>(world: &mut World, id: EntityId, rng: &mut R) {
    let depleted = match world.registry.get_mut(id) {
        Some(plant) if plant.is_live() => {
            plant.tick();
            plant.fed();
            if let KindState::Plant { energy, .. } = &mut plant.state {
                *energy += PLANT_PHOTOSYNTHESIS_GAIN;
            }
            plant.health <= 0
        }
        _ => return,
    };
    if depleted {
        world.kill(id, DeathCause::Eaten);
        return;
    }

    if !promote(world, id, rng) {
        reproduce(world, id, rng);
    }

    senesce(world, id, rng);
}

/// Low -> High with a coin flip once old enough. Needs the blocking layer of
/// the plant's cell to be free; otherwise it waits for a later tick.
fn promote<R: Rng + ?Sized>(world: &mut World, id: EntityId, rng: &mut R) -> bool {
    let Some(plant) = world.registry.get(id) else {
        return false;
    };
    if plant.plant_stage() != Some(PlantStage::Low) || plant.age < PLANT_PROMOTION_AGE {
        return false;
    }
    if !rng.gen_bool(PLANT_PROMOTION_CHANCE) {
        return false;
    }

    let pos = plant.position;
    if !world.grid.can_place(Footprint::Blocking, pos) {
        trace!(entity_id = %id, position = %pos, "Promotion deferred: cell blocked");
        return false;
    }
    world.grid.vacate(id, pos);
    world.grid.place(id, Footprint::Blocking, pos);

    if let Some(plant) = world.registry.get_mut(id) {
        if let KindState::Plant { stage, .. } = &mut plant.state {
            *stage = PlantStage::High;
        }
    }
    true
}

/// Every few ticks, maybe seed a Low plant into the first free orthogonal
/// neighbour that is not rock, scanning west, east, north, south.
fn reproduce<R: Rng + ?Sized>(world: &mut World, id: EntityId, rng: &mut R) -> Option<EntityId> {
    let plant = world.registry.get(id)?;
    if plant.age % PLANT_REPRODUCTION_PERIOD != 0 || !rng.gen_bool(PLANT_REPRODUCTION_CHANCE) {
        return None;
    }
    let pos = plant.position;
    let is_high = plant.plant_stage() == Some(PlantStage::High);

    let site = world.grid.orthogonal_neighbors(pos).into_iter().find(|&cell| {
        world.grid.is_vacant(cell) && world.grid.tile_at(cell) != Some(TerrainTile::Rock)
    });
    let Some(site) = site else {
        trace!(entity_id = %id, "Seeding abandoned: no free neighbour");
        return None;
    };

    let offspring = world.spawn(Entity::plant(site, PLANT_OFFSPRING_ENERGY))?;
    if is_high {
        if let Some(KindState::Plant { energy, .. }) =
            world.registry.get_mut(id).map(|plant| &mut plant.state)
        {
            *energy -= PLANT_HIGH_REPRODUCTION_COST;
        }
    }
    Some(offspring)
}

/// Old plants die; the threshold is re-drawn every tick
fn senesce<R: Rng + ?Sized>(world: &mut World, id: EntityId, rng: &mut R) -> bool {
    let Some(plant) = world.registry.get(id) else {
        return false;
    };
    if !plant.is_live() {
        return false;
    }
    let age = plant.age;
    if age >= lifespan_check(PLANT_LIFESPAN, PLANT_LIFESPAN_JITTER, rng) {
        world.kill(id, DeathCause::OldAge)
    } else {
        false
    }
}
