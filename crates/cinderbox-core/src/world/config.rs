//! Simulation tuning parameters

use serde::{Deserialize, Serialize};

/// All tunables of the simulation core, grouped per pass.
///
/// Rates are per tick unless noted; distances and speeds are in cells and
/// cells per tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Automaton generations per tick
    pub automaton_generations: u32,
    /// Multiplier on average block friction when rolling topples
    pub friction_amplifier: f32,

    /// Blend rate for particle <-> ambient heat exchange
    pub ambient_coupling: f32,

    /// Blend rate for particles emitting into the ambient layer
    pub emission_rate: f32,
    /// Global multiplier on ambient diffusion (0.9x for empty cells,
    /// 0.5x for occupied ones)
    pub diffusion_multiplier: f32,
    /// Temperature the ambient layer relaxes toward
    pub equilibrium_temperature: u16,
    /// Fraction of the equilibrium deviation removed per tick
    pub equilibrium_decay: f32,
    /// Cap on the per-tick equilibrium relaxation, in Kelvin
    pub max_equilibrium_step: f32,

    /// Minimum force magnitude that ejects a movable cell
    pub ejection_threshold: f32,
    /// Initial speed per unit of force magnitude
    pub ejection_speed: f32,
    /// Hard cap on ejection speed
    pub max_ejection_speed: f32,

    /// Downward acceleration on ballistic particles
    pub gravity: f32,
    /// Force-field contribution to ballistic velocity
    pub force_coupling: f32,
    /// Uniform per-tick velocity multiplier
    pub drag: f32,
    /// Velocity retained when reflecting off static cells or world edges
    pub restitution: f32,
    /// Velocity retained when brushing another movable particle
    pub contact_damping: f32,
    /// Below this speed a ballistic particle settles
    pub settle_speed: f32,
    /// Maximum collision ray-march distance per tick
    pub max_traversal: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            automaton_generations: 2,
            friction_amplifier: 1.6,

            ambient_coupling: 0.35,

            emission_rate: 0.25,
            diffusion_multiplier: 0.6,
            equilibrium_temperature: 298,
            equilibrium_decay: 0.02,
            max_equilibrium_step: 4.0,

            ejection_threshold: 0.65,
            ejection_speed: 6.0,
            max_ejection_speed: 9.0,

            gravity: 0.35,
            force_coupling: 0.8,
            drag: 0.98,
            restitution: 0.45,
            contact_damping: 0.35,
            settle_speed: 0.12,
            max_traversal: 8.0,
        }
    }
}
