//! Plain-text frames of the grid, one glyph per cell.

use eco_core::{EntityKind, Lifecycle, Result, Stage, TerrainTile};
use eco_world::snapshot::{CellSnapshot, OccupantDescriptor};
use eco_world::{SnapshotSink, WorldSnapshot};
use std::io::Write;

fn terrain_glyph(tile: TerrainTile) -> char {
    match tile {
        TerrainTile::Water => '~',
        TerrainTile::Rock => '^',
        TerrainTile::Soil => '.',
        TerrainTile::FertileSoil => ',',
    }
}

fn occupant_glyph(occupant: &OccupantDescriptor) -> char {
    match (occupant.kind, occupant.stage) {
        (EntityKind::Animal, Some(Stage::Big)) => 'A',
        (EntityKind::Animal, _) => 'a',
        (EntityKind::Plant, Some(Stage::High)) => 'P',
        (EntityKind::Plant, _) => 'p',
        (EntityKind::Decomposer, _) => 'd',
    }
}

/// The blocking occupant shows over an understory plant, which shows over
/// corpses, which show over bare terrain.
pub fn cell_glyph(cell: &CellSnapshot) -> char {
    let live = || cell.occupants.iter().filter(|o| o.lifecycle == Lifecycle::Live);

    if let Some(blocking) = live().find(|o| o.stage != Some(Stage::Low)) {
        return occupant_glyph(blocking);
    }
    if let Some(understory) = live().next() {
        return occupant_glyph(understory);
    }
    if cell.occupants.iter().any(|o| o.lifecycle == Lifecycle::Dead) {
        return 'x';
    }
    terrain_glyph(cell.terrain)
}

pub fn render_frame(snapshot: &WorldSnapshot) -> String {
    let census = &snapshot.census;
    let mut frame = format!(
        "tick {} | animals {} ({} big) | plants {} ({} high) | decomposers {} | corpses {}\n",
        snapshot.tick,
        census.animals(),
        census.animals_big,
        census.plants(),
        census.plants_high,
        census.decomposers,
        census.corpses,
    );

    for row in snapshot.cells.chunks(snapshot.width.max(1) as usize) {
        frame.extend(row.iter().map(cell_glyph));
        frame.push('\n');
    }
    frame
}

pub struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SnapshotSink for TextRenderer<W> {
    fn record(&mut self, snapshot: &WorldSnapshot) -> Result<()> {
        writeln!(self.out, "{}", render_frame(snapshot))?;
        self.out.flush()?;
        Ok(())
    }
}
