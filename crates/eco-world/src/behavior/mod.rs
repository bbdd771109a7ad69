//! Per-tick rules for each entity kind.
//!
//! Each module exposes `act`, which runs one entity's behavior for one tick.
//! The scheduler picks the module by the entity's kind.

pub mod animal;
pub mod decomposer;
pub mod plant;

use eco_core::rules::jittered_lifespan;
use rand::Rng;

/// Lifespan threshold with a fresh jitter draw in `[-jitter, jitter]`
fn lifespan_check<R: Rng + ?Sized>(base: u32, jitter: i32, rng: &mut R) -> u32 {
    jittered_lifespan(base, rng.gen_range(-jitter..=jitter))
}
