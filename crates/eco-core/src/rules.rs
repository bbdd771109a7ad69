//! Fixed rule constants. The rules are not data driven; changing any of these
//! changes the ecosystem.

// Animals
pub const ANIMAL_SMALL_HEALTH: i32 = 5;
pub const ANIMAL_BIG_HEALTH: i32 = 10;
pub const ANIMAL_MIN_STEP: i32 = 1;
pub const ANIMAL_MAX_STEP: i32 = 3;
pub const ANIMAL_LIFESPAN: u32 = 24;
pub const ANIMAL_LIFESPAN_JITTER: i32 = 1;
/// An animal starves once its ticks-since-fed counter exceeds this
pub const ANIMAL_STARVATION_TICKS: u32 = 3;
pub const ANIMAL_PROMOTION_AGE: u32 = 12;
pub const ANIMAL_REPRODUCTION_PERIOD: u32 = 6;
pub const ANIMAL_REPRODUCTION_CHANCE: f64 = 0.5;

// Bites, in health removed from the target
pub const BITE_SMALL_ON_LOW_PLANT: i32 = 1;
pub const BITE_SMALL_ON_DECOMPOSER: i32 = 1;
pub const BITE_BIG_ON_LOW_PLANT: i32 = 1;
pub const BITE_BIG_ON_HIGH_PLANT: i32 = 2;

// Plants
pub const PLANT_HEALTH: i32 = 5;
pub const PLANT_FRESH_ENERGY: i32 = 5;
pub const PLANT_OFFSPRING_ENERGY: i32 = 3;
pub const PLANT_PHOTOSYNTHESIS_GAIN: i32 = 2;
pub const PLANT_PROMOTION_AGE: u32 = 16;
pub const PLANT_PROMOTION_CHANCE: f64 = 0.5;
pub const PLANT_REPRODUCTION_PERIOD: u32 = 8;
pub const PLANT_REPRODUCTION_CHANCE: f64 = 0.3;
/// Energy a High plant spends on each offspring
pub const PLANT_HIGH_REPRODUCTION_COST: i32 = 1;
pub const PLANT_LIFESPAN: u32 = 30;
pub const PLANT_LIFESPAN_JITTER: i32 = 3;

// Decomposers
pub const DECOMPOSER_HEALTH: i32 = 3;
pub const DECOMPOSER_NUTRIENT_PER_CORPSE: i32 = 1;
pub const DECOMPOSER_REMOVAL_CHANCE: f64 = 0.2;
pub const DECOMPOSER_EMERGENCE_CHANCE: f64 = 0.1;

/// Rejection-sampling attempts before an empty-cell search gives up
pub const MAX_SPAWN_ATTEMPTS: usize = 100;

/// Lifespan threshold after applying a jitter draw, never below zero
pub fn jittered_lifespan(base: u32, jitter: i32) -> u32 {
    (base as i64 + jitter as i64).max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jittered_lifespan() {
        assert_eq!(jittered_lifespan(ANIMAL_LIFESPAN, -1), 23);
        assert_eq!(jittered_lifespan(PLANT_LIFESPAN, 3), 33);
        assert_eq!(jittered_lifespan(0, -3), 0);
    }

    #[test]
    fn test_big_bites_high_plants_harder() {
        assert!(BITE_BIG_ON_HIGH_PLANT > BITE_BIG_ON_LOW_PLANT);
        assert!(PLANT_OFFSPRING_ENERGY < PLANT_FRESH_ENERGY);
    }
}
