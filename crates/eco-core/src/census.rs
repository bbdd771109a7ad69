//! Population counts and run statistics.

use crate::{EntityKind, Lifecycle, Stage};
use serde::{Deserialize, Serialize};

/// Head count of the registry at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationCensus {
    pub animals_small: usize,
    pub animals_big: usize,
    pub plants_low: usize,
    pub plants_high: usize,
    pub decomposers: usize,
    /// Dead entities still awaiting removal
    pub corpses: usize,
}

impl PopulationCensus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one entity. Removed entities are ignored.
    pub fn record(&mut self, kind: EntityKind, stage: Option<Stage>, lifecycle: Lifecycle) {
        match lifecycle {
            Lifecycle::Removed => {}
            Lifecycle::Dead => self.corpses += 1,
            Lifecycle::Live => match (kind, stage) {
                (EntityKind::Animal, Some(Stage::Big)) => self.animals_big += 1,
                (EntityKind::Animal, _) => self.animals_small += 1,
                (EntityKind::Plant, Some(Stage::High)) => self.plants_high += 1,
                (EntityKind::Plant, _) => self.plants_low += 1,
                (EntityKind::Decomposer, _) => self.decomposers += 1,
            },
        }
    }

    pub fn animals(&self) -> usize {
        self.animals_small + self.animals_big
    }

    pub fn plants(&self) -> usize {
        self.plants_low + self.plants_high
    }

    pub fn live(&self) -> usize {
        self.animals() + self.plants() + self.decomposers
    }

    /// True when nothing is left alive
    pub fn is_extinct(&self) -> bool {
        self.live() == 0
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub births: u32,
    pub deaths: u32,
    pub removals: u32,
    /// Decomposers that emerged on corpses after the traversal
    pub emergences: u32,
}

/// Totals for a completed (or interrupted) run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub ticks_run: u64,
    pub total_births: u64,
    pub total_deaths: u64,
    pub total_removals: u64,
    pub final_census: PopulationCensus,
}

impl SimulationSummary {
    pub fn absorb(&mut self, report: &TickReport) {
        self.ticks_run = report.tick;
        self.total_births += report.births as u64;
        self.total_deaths += report.deaths as u64;
        self.total_removals += report.removals as u64;
    }
}
