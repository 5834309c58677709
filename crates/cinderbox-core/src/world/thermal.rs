//! Particle thermal exchange
//!
//! Updates each occupied cell's temperature from the ambient layer at its
//! position and from its immediate neighbors, then applies any resulting
//! state change. Empty cells pass through unchanged; their heat lives in
//! the ambient layer.

use cinderbox_simulation::{Cell, Materials};
use rayon::prelude::*;

use super::ambient_field::AmbientField;
use super::config::SimulationConfig;
use super::grid::CellGrid;
use super::state_changes::StateChangeSystem;
use super::stats::SimStats;

const NEIGHBORS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

pub struct ThermalSystem;

impl ThermalSystem {
    /// Advance one thermal pass: `src` is the frozen input, `dst` the output
    pub fn step(
        src: &CellGrid,
        dst: &mut CellGrid,
        ambient: &AmbientField,
        materials: &Materials,
        config: &SimulationConfig,
        stats: &mut dyn SimStats,
    ) {
        let width = src.width() as i32;

        let changes: usize = dst
            .cells_mut()
            .par_iter_mut()
            .enumerate()
            .map(|(i, out)| {
                let x = i as i32 % width;
                let y = i as i32 / width;
                let cell = src.get(x, y);
                if cell.is_empty() {
                    *out = cell;
                    return 0;
                }

                let def = materials.get(cell.material_id);
                let mut t = cell.temperature as f32;

                // Ambient exchange; high-capacity materials keep their heat
                let ambient_t = ambient.get(x, y).temperature as f32;
                t += (ambient_t - t) * (1.0 - def.capacity) * config.ambient_coupling;

                // Neighbor diffusion: same-material contact is fast,
                // material boundaries are limited by the worse conductor
                let mut delta = 0.0;
                for (dx, dy) in NEIGHBORS {
                    let neighbor = src.get(x + dx, y + dy);
                    if neighbor.is_empty() {
                        continue;
                    }
                    let rate = if neighbor.material_id == cell.material_id {
                        0.3 + 0.5 * def.conductivity
                    } else {
                        let ndef = materials.get(neighbor.material_id);
                        0.2 * def.conductivity.min(ndef.conductivity)
                    };
                    delta += (neighbor.temperature as f32 - t) * rate;
                }
                t += delta / NEIGHBORS.len() as f32;

                let mut next =
                    Cell::new(cell.material_id, t.round().clamp(0.0, u16::MAX as f32) as u16);
                let changed = StateChangeSystem::check_state_change(&mut next, def);
                *out = next;
                usize::from(changed)
            })
            .sum();

        stats.record_state_changes(changes);
    }
}
