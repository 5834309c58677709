//! Force-field extraction - ejecting grid cells into the dynamic buffer
//!
//! A movable cell whose local force magnitude meets the ejection threshold
//! leaves the grid and becomes a ballistic particle. Scanning the whole
//! grid every tick is prohibitive, so each buffer slot owns the candidate
//! positions whose linear index hashes to it and inspects a rotating
//! sparse subset per tick. Capture is a two-step protocol: spawn into the
//! buffer first, then a confirm pass re-reads the buffer and clears the
//! source cells, so mass is never lost or duplicated even when sampling
//! and clearing could disagree.

use cinderbox_simulation::{Cell, MaterialId};
use glam::Vec2;
use rayon::prelude::*;

use super::ambient_field::AmbientField;
use super::config::SimulationConfig;
use super::dynamic_buffer::{DynamicBuffer, DynamicParticle, MAX_DYNAMIC, ParticleFlags};
use super::grid::CellGrid;
use super::stats::SimStats;

/// Sampling stride for candidate rows (and columns on non-aligned widths)
const SPARSE_STRIDE: u64 = 4;

pub struct ExtractionSystem;

impl ExtractionSystem {
    /// Phase A: scan candidates and spawn eligible cells into free slots.
    ///
    /// Slot candidate sets are disjoint by construction, so two slots can
    /// never capture the same cell. An active slot is left untouched; a
    /// saturated buffer drops the extraction, which is the intended
    /// backpressure.
    pub fn extract(
        grid: &CellGrid,
        ambient: &AmbientField,
        buffer: &mut DynamicBuffer,
        tick: u64,
        config: &SimulationConfig,
    ) {
        let width = grid.width();
        let area = width * grid.height();
        // Widths that are a multiple of the stride confine a slot's
        // candidates to a few columns, so the row rotation alone covers
        // them; other widths add a rotating column filter
        let column_filter = width as u64 % SPARSE_STRIDE != 0;

        buffer
            .slots_mut()
            .par_iter_mut()
            .enumerate()
            .for_each(|(slot, particle)| {
                if particle.is_active() {
                    return;
                }
                let mut index = slot;
                while index < area {
                    let x = (index % width) as i32;
                    let y = (index / width) as i32;
                    if sampled(x, y, tick, column_filter) {
                        let cell = grid.get(x, y);
                        if cell.category().is_movable() {
                            let force = ambient.force_at(x, y);
                            if force.length() >= config.ejection_threshold {
                                let velocity = (force * config.ejection_speed)
                                    .clamp_length_max(config.max_ejection_speed);
                                *particle = DynamicParticle {
                                    position: Vec2::new(x as f32 + 0.5, y as f32 + 0.5),
                                    velocity,
                                    material_id: cell.material_id,
                                    temperature: cell.temperature,
                                    flags: ParticleFlags::ACTIVE | ParticleFlags::JUST_SPAWNED,
                                    lifetime: 0,
                                };
                                return;
                            }
                        }
                    }
                    index += MAX_DYNAMIC;
                }
            });
    }

    /// Phase B: confirm captures against the grid, then clear them.
    ///
    /// The source cell is cleared only once the buffer provably holds its
    /// particle. A cell that changed under the sample drops the particle
    /// instead; the grid keeps the mass.
    pub fn confirm_clear(
        grid: &mut CellGrid,
        buffer: &mut DynamicBuffer,
        stats: &mut dyn SimStats,
    ) {
        for particle in buffer.slots_mut() {
            if !particle.flags.contains(ParticleFlags::JUST_SPAWNED) {
                continue;
            }
            let x = particle.position.x.floor() as i32;
            let y = particle.position.y.floor() as i32;
            let cell = grid.get(x, y);
            if cell.material_id == particle.material_id {
                // The vacated cell keeps its temperature: the air left
                // behind is as warm as the spot it filled
                grid.set(x, y, Cell::new(MaterialId::AIR, cell.temperature));
                particle.flags.remove(ParticleFlags::JUST_SPAWNED);
                stats.record_extraction();
            } else {
                log::warn!(
                    "extraction confirm failed at ({x}, {y}): expected material {}, found {}",
                    particle.material_id,
                    cell.material_id
                );
                *particle = DynamicParticle::INACTIVE;
            }
        }
    }
}

/// Whether a candidate position is inspected this tick
fn sampled(x: i32, y: i32, tick: u64, column_filter: bool) -> bool {
    if (y as u64 + tick) % SPARSE_STRIDE != 0 {
        return false;
    }
    !column_filter || (x as u64 + tick / SPARSE_STRIDE) % SPARSE_STRIDE == 0
}
