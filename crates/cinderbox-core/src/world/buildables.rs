//! Buildables pre-pass - external emitter and absorber records
//!
//! Applied to the grid before automaton evaluation each tick. The core
//! only consumes the records' effects; lifetime bookkeeping and record
//! expiry belong to the collaborator that owns them.

use cinderbox_simulation::{Cell, MaterialId, Materials};
use glam::IVec2;

use super::grid::CellGrid;
use super::symmetry;

const SALT_SOURCE: u64 = 0x5a;
const SALT_SINK: u64 = 0x6b;

/// What a buildable does to cells within its radius
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildableKind {
    /// Spawns its material into empty cells
    Source,
    /// Deletes movable cells
    Sink,
    /// Adds heat proportional to intensity
    HeatSource,
    /// Removes heat proportional to intensity
    ColdSource,
}

/// One active emitter/absorber placed by the tooling layer
#[derive(Clone, Copy, Debug)]
pub struct BuildableRecord {
    pub kind: BuildableKind,
    pub position: IVec2,
    pub radius: f32,
    /// Material spawned or deleted by Source/Sink
    pub material_id: u8,
    /// Kelvin added/removed per tick at the center by Heat/ColdSource
    pub intensity: f32,
    /// Per-cell per-tick spawn/delete probability for Source/Sink
    pub rate: f32,
    /// Remaining ticks; decremented and expired by the owner
    pub lifetime: u32,
}

pub struct BuildablesSystem;

impl BuildablesSystem {
    /// Apply every record to the grid, in order
    pub fn apply(
        grid: &mut CellGrid,
        records: &[BuildableRecord],
        materials: &Materials,
        seed: u64,
    ) {
        for (index, record) in records.iter().enumerate() {
            // Records at the same position must not share dice
            let record_seed = symmetry::tick_seed(seed, index as u64);
            Self::apply_record(grid, record, materials, record_seed);
        }
    }

    fn apply_record(
        grid: &mut CellGrid,
        record: &BuildableRecord,
        materials: &Materials,
        seed: u64,
    ) {
        let radius = record.radius.max(0.0);
        let reach = radius.ceil() as i32;
        let radius_sq = radius * radius;

        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let dist_sq = (dx * dx + dy * dy) as f32;
                if dist_sq > radius_sq {
                    continue;
                }
                let x = record.position.x + dx;
                let y = record.position.y + dy;
                if !grid.in_bounds(x, y) {
                    continue;
                }
                let cell = grid.get(x, y);

                match record.kind {
                    BuildableKind::Source => {
                        if cell.is_empty()
                            && symmetry::unit_noise(x, y, seed, SALT_SOURCE) < record.rate
                        {
                            let def = materials.get(record.material_id);
                            grid.set(x, y, Cell::new(record.material_id, def.default_temperature));
                        }
                    }
                    BuildableKind::Sink => {
                        if cell.category().is_movable()
                            && symmetry::unit_noise(x, y, seed, SALT_SINK) < record.rate
                        {
                            grid.set(x, y, Cell::new(MaterialId::AIR, cell.temperature));
                        }
                    }
                    BuildableKind::HeatSource => {
                        let delta = Self::falloff_delta(record.intensity, dist_sq, radius);
                        grid.set(
                            x,
                            y,
                            Cell::new(cell.material_id, cell.temperature.saturating_add(delta)),
                        );
                    }
                    BuildableKind::ColdSource => {
                        let delta = Self::falloff_delta(record.intensity, dist_sq, radius);
                        grid.set(
                            x,
                            y,
                            Cell::new(cell.material_id, cell.temperature.saturating_sub(delta)),
                        );
                    }
                }
            }
        }
    }

    /// Intensity scaled down linearly toward the edge of the radius
    fn falloff_delta(intensity: f32, dist_sq: f32, radius: f32) -> u16 {
        let falloff = 1.0 - dist_sq.sqrt() / (radius + 1.0);
        (intensity.max(0.0) * falloff).round() as u16
    }
}
