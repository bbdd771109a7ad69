//! Decomposer rules: feed on nearby corpses and clear them away, plus the
//! spontaneous emergence of decomposers on corpse cells.

use crate::entity::Entity;
use crate::world::{DeathCause, World};
use eco_core::rules::{
    DECOMPOSER_EMERGENCE_CHANCE, DECOMPOSER_NUTRIENT_PER_CORPSE, DECOMPOSER_REMOVAL_CHANCE,
};
use eco_core::{EntityId, TerrainTile};
use rand::seq::SliceRandom;
use rand::Rng;

/// Run one tick of a decomposer's life. Returns the corpse it cleared, if any.
pub fn act<R: Rng + ?Sized>(world: &mut World, id: EntityId, rng: &mut R) -> Option<EntityId> {
    let decomposer = world.registry.get_mut(id)?;
    if !decomposer.is_live() {
        return None;
    }
    decomposer.tick();
    let pos = decomposer.position;
    if decomposer.health <= 0 {
        world.kill(id, DeathCause::Eaten);
        return None;
    }

    let corpses = world.corpses_near(pos);
    let decomposer = world.registry.get_mut(id)?;
    if corpses.is_empty() {
        decomposer.went_hungry();
        return None;
    }
    decomposer.health += DECOMPOSER_NUTRIENT_PER_CORPSE * corpses.len() as i32;
    decomposer.fed();

    if !rng.gen_bool(DECOMPOSER_REMOVAL_CHANCE) {
        return None;
    }
    let corpse = *corpses.choose(rng)?;
    world.remove(corpse);

    if world.grid.tile_at(pos) == Some(TerrainTile::FertileSoil) {
        world.grid.set_tile(pos, TerrainTile::Soil);
    }
    Some(corpse)
}

/// Roll once per corpse cell for a new decomposer to appear there. Cells
/// whose blocking layer is taken are skipped.
pub fn emerge_on_corpses<R: Rng + ?Sized>(world: &mut World, rng: &mut R) -> Vec<EntityId> {
    let mut emerged = Vec::new();

    for cell in world.grid.corpse_cells() {
        if !rng.gen_bool(DECOMPOSER_EMERGENCE_CHANCE) {
            continue;
        }
        if let Some(id) = world.spawn(Entity::decomposer(cell)) {
            world.note_emergence();
            emerged.push(id);
        }
    }

    emerged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use eco_core::rules::DECOMPOSER_HEALTH;
    use eco_core::{Lifecycle, Position};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn corpse_at(world: &mut World, pos: Position) -> EntityId {
        let id = world.spawn(Entity::plant(pos, 5)).unwrap();
        world.kill(id, DeathCause::OldAge);
        id
    }

    #[test]
    fn test_hungry_without_corpses() {
        let mut world = World::new(Grid::new(5, 5));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let id = world.spawn(Entity::decomposer(Position::new(2, 2))).unwrap();

        assert_eq!(act(&mut world, id, &mut rng), None);
        let decomposer = world.entity(id).unwrap();
        assert_eq!(decomposer.health, DECOMPOSER_HEALTH);
        assert_eq!(decomposer.ticks_since_fed, 1);
        assert_eq!(decomposer.age, 1);
    }

    #[test]
    fn test_each_corpse_feeds() {
        let mut world = World::new(Grid::new(5, 5));
        let pos = Position::new(2, 2);
        let id = world.spawn(Entity::decomposer(pos)).unwrap();
        corpse_at(&mut world, Position::new(1, 1));
        corpse_at(&mut world, Position::new(3, 3));
        corpse_at(&mut world, Position::new(2, 2));
        // Out of reach
        corpse_at(&mut world, Position::new(4, 4));

        let mut rng = ChaCha8Rng::seed_from_u64(11);
        act(&mut world, id, &mut rng);
        assert_eq!(world.entity(id).unwrap().health, DECOMPOSER_HEALTH + 3);
        assert_eq!(world.entity(id).unwrap().ticks_since_fed, 0);
    }

    #[test]
    fn test_removal_clears_corpse_and_depletes_soil() {
        let mut grid = Grid::new(5, 5);
        let pos = Position::new(2, 2);
        grid.set_tile(pos, TerrainTile::FertileSoil);

        for seed in 0..100 {
            let mut world = World::new(grid.clone());
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let id = world.spawn(Entity::decomposer(pos)).unwrap();
            let corpse = corpse_at(&mut world, Position::new(2, 3));

            if let Some(cleared) = act(&mut world, id, &mut rng) {
                assert_eq!(cleared, corpse);
                assert_eq!(world.entity(corpse).unwrap().lifecycle, Lifecycle::Removed);
                assert!(world.grid().remains_at(Position::new(2, 3)).is_empty());
                assert_eq!(world.grid().tile_at(pos), Some(TerrainTile::Soil));
                return;
            }
            assert_eq!(world.grid().tile_at(pos), Some(TerrainTile::FertileSoil));
        }
        panic!("no removal in 100 seeds");
    }

    #[test]
    fn test_emergence_only_on_corpse_cells() {
        let mut world = World::new(Grid::new(6, 6));
        let corpse_cell = Position::new(3, 3);
        corpse_at(&mut world, corpse_cell);

        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut emerged = Vec::new();
        for _ in 0..100 {
            emerged = emerge_on_corpses(&mut world, &mut rng);
            if !emerged.is_empty() {
                break;
            }
        }

        assert_eq!(emerged.len(), 1);
        let decomposer = world.entity(emerged[0]).unwrap();
        assert_eq!(decomposer.position, corpse_cell);
        assert_eq!(world.grid().occupant_at(corpse_cell), Some(emerged[0]));

        // The cell is now blocked, so no second decomposer can appear there
        for _ in 0..100 {
            assert!(emerge_on_corpses(&mut world, &mut rng).is_empty());
        }
    }
}
