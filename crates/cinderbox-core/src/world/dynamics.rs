//! Ballistic particle pipeline - simulate, collide, reintegrate
//!
//! Dynamic particles integrate under gravity, force-field coupling and
//! drag, bounce off the world edges, ray-march against the grid for
//! collisions, and settle back into empty cells once slow enough. Each
//! phase reads frozen grid state and mutates only the particle buffer,
//! except reintegration, which writes settled particles into the grid.

use cinderbox_simulation::{Cell, MaterialCategory};
use glam::Vec2;
use rayon::prelude::*;

use super::ambient_field::AmbientField;
use super::config::SimulationConfig;
use super::dynamic_buffer::{DynamicBuffer, DynamicParticle, ParticleFlags};
use super::grid::CellGrid;
use super::stats::SimStats;

/// Upper bound on collision ray-march sub-steps per tick
const MAX_COLLISION_STEPS: usize = 16;

/// Stride of the rotating slot subset probed for settle targets
const REINTEGRATE_STRIDE: u64 = 4;

/// Margin keeping reflected positions strictly inside the world
const EDGE_MARGIN: f32 = 1e-3;

pub struct DynamicsSystem;

impl DynamicsSystem {
    /// Integrate velocities and positions; bounce off world boundaries
    pub fn simulate(
        buffer: &mut DynamicBuffer,
        ambient: &AmbientField,
        width: usize,
        height: usize,
        config: &SimulationConfig,
    ) {
        let max_x = width as f32 - EDGE_MARGIN;
        let max_y = height as f32 - EDGE_MARGIN;

        buffer.slots_mut().par_iter_mut().for_each(|p| {
            if !p.is_active() || p.flags.contains(ParticleFlags::SETTLING) {
                return;
            }

            p.velocity.y -= config.gravity;
            let force = ambient.force_at(p.position.x.floor() as i32, p.position.y.floor() as i32);
            p.velocity += force * config.force_coupling;
            p.velocity *= config.drag;
            p.position += p.velocity;

            // Elastic bounce off the world edges; the particle never
            // leaves [0, width) x [0, height)
            if p.position.x < 0.0 {
                p.position.x = -p.position.x;
                p.velocity.x = -p.velocity.x * config.restitution;
            } else if p.position.x > max_x {
                p.position.x = max_x - (p.position.x - max_x);
                p.velocity.x = -p.velocity.x * config.restitution;
            }
            if p.position.y < 0.0 {
                p.position.y = -p.position.y;
                p.velocity.y = -p.velocity.y * config.restitution;
            } else if p.position.y > max_y {
                p.position.y = max_y - (p.position.y - max_y);
                p.velocity.y = -p.velocity.y * config.restitution;
            }
            // A double overshoot can still land outside; clamp the rest
            p.position = p.position.clamp(Vec2::ZERO, Vec2::new(max_x, max_y));

            p.lifetime += 1;
        });
    }

    /// Ray-march each particle's path against the grid and resolve hits
    pub fn collide(buffer: &mut DynamicBuffer, grid: &CellGrid, config: &SimulationConfig) {
        let max_x = grid.width() as f32 - EDGE_MARGIN;
        let max_y = grid.height() as f32 - EDGE_MARGIN;

        buffer.slots_mut().par_iter_mut().for_each(|p| {
            if !p.is_active() || p.flags.contains(ParticleFlags::SETTLING) {
                return;
            }

            let speed = p.velocity.length();
            if speed < config.settle_speed {
                p.velocity = Vec2::ZERO;
                p.flags.insert(ParticleFlags::SETTLING);
                return;
            }

            // Re-trace this tick's motion from the pre-integration point,
            // clamped into bounds after any edge bounce
            let start = (p.position - p.velocity).clamp(Vec2::ZERO, Vec2::new(max_x, max_y));
            let travel = speed.min(config.max_traversal);
            let dir = p.velocity / speed;
            let steps = ((travel / 0.5).ceil() as usize).clamp(1, MAX_COLLISION_STEPS);
            let step = travel / steps as f32;

            let mut pos = start;
            for _ in 0..steps {
                let next = pos + dir * step;
                let cell = grid.get(next.x.floor() as i32, next.y.floor() as i32);
                match cell.category() {
                    MaterialCategory::Static | MaterialCategory::Entity => {
                        // Normal is estimated from the last free point, so
                        // a flat wall's cells all push the same way
                        let normal = estimate_normal(grid, pos);
                        p.position = pos;
                        p.velocity = reflect(p.velocity, normal) * config.restitution;
                        break;
                    }
                    MaterialCategory::Solid | MaterialCategory::Liquid => {
                        // Brushing a loose particle just bleeds speed; no
                        // momentum transfer in the base model
                        p.position = pos;
                        p.velocity *= config.contact_damping;
                        break;
                    }
                    _ => pos = next,
                }
            }

            if p.velocity.length() < config.settle_speed {
                p.velocity = Vec2::ZERO;
                p.flags.insert(ParticleFlags::SETTLING);
            }
        });
    }

    /// Write settled particles back into the grid.
    ///
    /// A particle lands only in a cell that is currently Empty or Gas;
    /// anything else leaves it waiting. Successful writes keep their slot
    /// one more pass (flagged REINTEGRATED) and clear on the next call,
    /// mirroring extraction's confirm-then-clear. Target probing walks a
    /// rotating quarter of the slots per tick to bound cost.
    pub fn reintegrate(
        buffer: &mut DynamicBuffer,
        grid: &mut CellGrid,
        tick: u64,
        stats: &mut dyn SimStats,
    ) {
        for (slot, p) in buffer.slots_mut().iter_mut().enumerate() {
            if !p.is_active() {
                continue;
            }
            if p.flags.contains(ParticleFlags::REINTEGRATED) {
                *p = DynamicParticle::INACTIVE;
                continue;
            }
            if !p.flags.contains(ParticleFlags::SETTLING) {
                continue;
            }
            if (slot as u64 + tick) % REINTEGRATE_STRIDE != 0 {
                continue;
            }

            let x = p.position.x.floor() as i32;
            let y = p.position.y.floor() as i32;
            match grid.get(x, y).category() {
                MaterialCategory::Empty | MaterialCategory::Gas => {
                    grid.set(x, y, Cell::new(p.material_id, p.temperature));
                    p.flags.insert(ParticleFlags::REINTEGRATED);
                    stats.record_reintegration();
                }
                _ => {
                    // Occupied; stay settled and try again later
                }
            }
        }
    }
}

/// Reflect a velocity about a surface normal
fn reflect(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Estimate the local surface normal as the average direction away from
/// rigid neighbors around the impact point
fn estimate_normal(grid: &CellGrid, point: Vec2) -> Vec2 {
    let cx = point.x.floor() as i32;
    let cy = point.y.floor() as i32;
    let mut normal = Vec2::ZERO;
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            if grid.get(cx + dx, cy + dy).category().is_rigid() {
                normal -= Vec2::new(dx as f32, dy as f32);
            }
        }
    }
    if normal.length_squared() < 1e-6 {
        // Fully enclosed or isolated cell; fall back to pushing up
        Vec2::Y
    } else {
        normal.normalize()
    }
}
