//! Ambient heat field update
//!
//! Three stages per generation, all computed from the frozen previous
//! field: emission from resident particles, jittered inverse-distance
//! diffusion over a radius-2 neighborhood, and relaxation toward the
//! equilibrium temperature. The force component passes through unchanged;
//! it is owned by external systems.

use cinderbox_simulation::Materials;
use rayon::prelude::*;

use super::ambient_field::{AmbientCell, AmbientField};
use super::config::SimulationConfig;
use super::grid::CellGrid;
use super::symmetry;

const SALT_JITTER_X: u64 = 0x11;
const SALT_JITTER_Y: u64 = 0x2d;

/// Diffusion sample radius
const RADIUS: i32 = 2;

pub struct AmbientSystem;

impl AmbientSystem {
    /// Advance one ambient pass: `src` is the frozen input, `dst` the output
    pub fn step(
        grid: &CellGrid,
        src: &AmbientField,
        dst: &mut AmbientField,
        materials: &Materials,
        config: &SimulationConfig,
        seed: u64,
    ) {
        let width = src.width() as i32;

        dst.cells_mut().par_iter_mut().enumerate().for_each(|(i, out)| {
            let x = i as i32 % width;
            let y = i as i32 / width;
            let current = src.get(x, y);
            let cell = grid.get(x, y);
            let mut t = current.temperature as f32;

            // Emission: the resident particle nudges its surroundings
            // toward its own temperature, blended for stability
            if !cell.is_empty() {
                let def = materials.get(cell.material_id);
                t += (cell.temperature as f32 - t) * def.conductivity * config.emission_rate;
            }

            // Diffusion: inverse-distance weighted neighborhood average
            // with a positional jitter that breaks axis alignment
            let jx = symmetry::unit_noise(x, y, seed, SALT_JITTER_X) - 0.5;
            let jy = symmetry::unit_noise(x, y, seed, SALT_JITTER_Y) - 0.5;
            let mut acc = 0.0f32;
            let mut weight = 0.0f32;
            for dy in -RADIUS..=RADIUS {
                for dx in -RADIUS..=RADIUS {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let fx = dx as f32 + jx;
                    let fy = dy as f32 + jy;
                    let w = 1.0 / (fx * fx + fy * fy).sqrt();
                    acc += w * src.get(x + dx, y + dy).temperature as f32;
                    weight += w;
                }
            }
            let base_rate = if cell.is_empty() { 0.9 } else { 0.5 };
            t += (acc / weight - t) * base_rate * config.diffusion_multiplier;

            // Equilibrium decay, proportional to deviation and capped
            let deviation = t - config.equilibrium_temperature as f32;
            t -= (deviation * config.equilibrium_decay)
                .clamp(-config.max_equilibrium_step, config.max_equilibrium_step);

            *out = AmbientCell {
                temperature: t.round().clamp(0.0, u16::MAX as f32) as u16,
                force: current.force,
            };
        });
    }
}
