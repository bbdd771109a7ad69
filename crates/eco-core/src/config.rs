//! Configuration types for the simulation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Largest grid accepted; cell indices must stay addressable by `i32`
/// row/column arithmetic.
pub const MAX_CELLS: usize = i32::MAX as usize;

/// World configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width of the world grid (columns)
    pub width: i32,
    /// Height of the world grid (rows)
    pub height: i32,
    /// Fraction of tiles generated as water (0.0 to 1.0)
    pub water_density: f32,
    /// Fraction of tiles generated as rock (0.0 to 1.0)
    pub rock_density: f32,
    /// Fraction of tiles generated as fertile soil (0.0 to 1.0)
    pub fertile_density: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 24,
            height: 24,
            water_density: 0.25,
            rock_density: 0.25,
            fertile_density: 0.25,
        }
    }
}

impl WorldConfig {
    pub fn cell_count(&self) -> usize {
        (self.width.max(0) as usize).saturating_mul(self.height.max(0) as usize)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(Error::Validation(format!(
                "grid dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }

        if self.cell_count() > MAX_CELLS {
            return Err(Error::Validation(format!(
                "grid of {}x{} exceeds the limit of {} cells",
                self.width, self.height, MAX_CELLS
            )));
        }

        let densities = [
            ("water_density", self.water_density),
            ("rock_density", self.rock_density),
            ("fertile_density", self.fertile_density),
        ];
        for (name, value) in densities {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Validation(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        let total = self.water_density + self.rock_density + self.fertile_density;
        if total > 1.0 {
            return Err(Error::Validation(format!(
                "terrain densities sum to {}, which exceeds 1",
                total
            )));
        }

        Ok(())
    }
}

/// Initial population counts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub plants: usize,
    pub animals: usize,
    pub decomposers: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            plants: 3,
            animals: 3,
            decomposers: 2,
        }
    }
}

impl PopulationConfig {
    pub fn total(&self) -> usize {
        self.plants + self.animals + self.decomposers
    }
}

/// Simulation run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of ticks to run the simulation
    pub num_ticks: u64,
    /// Random seed for reproducibility
    pub seed: u64,
    /// World configuration
    pub world: WorldConfig,
    /// Initial population
    pub population: PopulationConfig,
    /// Emit population metrics every this many ticks (0 disables)
    pub report_interval: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_ticks: 50,
            seed: 0,
            world: WorldConfig::default(),
            population: PopulationConfig::default(),
            report_interval: 10,
        }
    }
}

impl SimulationConfig {
    /// Reject malformed configuration before the engine is built
    pub fn validate(&self) -> Result<()> {
        if self.num_ticks == 0 {
            return Err(Error::Validation(
                "num_ticks must be a positive integer".to_string(),
            ));
        }

        self.world.validate()?;

        let cells = self.world.cell_count();
        if self.population.total() > cells {
            return Err(Error::Validation(format!(
                "initial population of {} does not fit on a {}x{} grid",
                self.population.total(),
                self.world.width,
                self.world.height
            )));
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
