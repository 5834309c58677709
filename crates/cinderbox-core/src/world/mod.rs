//! World state and simulation passes

mod ambient_field;
mod ambient_system;
mod buildables;
mod config;
mod dynamic_buffer;
mod dynamics;
mod extraction;
mod grid;
mod margolus;
mod queries;
mod snapshot;
mod state_changes;
mod stats;
pub mod symmetry;
mod thermal;
#[allow(clippy::module_inception)]
mod world;

pub use ambient_field::{AmbientCell, AmbientField};
pub use ambient_system::AmbientSystem;
pub use buildables::{BuildableKind, BuildableRecord, BuildablesSystem};
pub use config::SimulationConfig;
pub use dynamic_buffer::{DynamicBuffer, DynamicParticle, MAX_DYNAMIC, ParticleFlags};
pub use dynamics::DynamicsSystem;
pub use extraction::ExtractionSystem;
pub use grid::{BOUNDARY_CELL, CellGrid};
pub use margolus::MargolusSystem;
pub use queries::{CellClass, CellQueries, HazardFlags};
pub use snapshot::{SnapshotError, decode_grid, encode_grid};
pub use state_changes::StateChangeSystem;
pub use stats::{NoopStats, SimStats};
pub use world::SimulationWorld;
