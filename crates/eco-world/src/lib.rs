//! World simulation engine.
//!
//! This module implements the 2D grid ecosystem where animals, plants and
//! decomposers move, feed, reproduce, age and die.

pub mod grid;
pub mod entity;
pub mod registry;
pub mod world;
pub mod behavior;
pub mod simulation;
pub mod snapshot;

pub use entity::{Entity, Footprint, KindState};
pub use grid::Grid;
pub use registry::Registry;
pub use simulation::Simulation;
pub use snapshot::{SnapshotSink, WorldSnapshot};
pub use world::World;
