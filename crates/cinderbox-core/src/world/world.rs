//! Simulation world - owns all simulation state and runs the tick
//!
//! One `SimulationWorld` owns the double-buffered cell grid and ambient
//! field, the material table, and the dynamic particle buffer; every pass
//! borrows what it needs. A tick is a fixed sequence of passes with a
//! hard barrier between them: each pass reads the frozen output of the
//! previous one and writes a fresh buffer, swapped here. There is no
//! mid-tick suspension; a tick always leaves a self-consistent generation.

use cinderbox_simulation::{Cell, Materials};
use glam::Vec2;

use super::ambient_field::{AmbientCell, AmbientField};
use super::ambient_system::AmbientSystem;
use super::buildables::{BuildableRecord, BuildablesSystem};
use super::config::SimulationConfig;
use super::dynamic_buffer::DynamicBuffer;
use super::dynamics::DynamicsSystem;
use super::extraction::ExtractionSystem;
use super::grid::CellGrid;
use super::margolus::MargolusSystem;
use super::queries::{CellClass, CellQueries};
use super::snapshot::{self, SnapshotError};
use super::stats::{NoopStats, SimStats};
use super::symmetry;
use super::thermal::ThermalSystem;

pub struct SimulationWorld {
    pub materials: Materials,
    pub config: SimulationConfig,

    grid: CellGrid,
    grid_next: CellGrid,
    ambient: AmbientField,
    ambient_next: AmbientField,
    dynamics: DynamicBuffer,

    seed: u64,
    ticks: u64,
    /// Automaton generation counter; drives the block-parity cycle
    generation: u64,
}

impl SimulationWorld {
    pub fn new(width: usize, height: usize, seed: u64) -> Self {
        Self::with_config(width, height, seed, SimulationConfig::default())
    }

    pub fn with_config(width: usize, height: usize, seed: u64, config: SimulationConfig) -> Self {
        let equilibrium = config.equilibrium_temperature;
        Self {
            materials: Materials::new(),
            config,
            grid: CellGrid::new(width, height),
            grid_next: CellGrid::new(width, height),
            ambient: AmbientField::new(width, height, equilibrium),
            ambient_next: AmbientField::new(width, height, equilibrium),
            dynamics: DynamicBuffer::new(),
            seed,
            ticks: 0,
            generation: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    pub fn ambient(&self) -> &AmbientField {
        &self.ambient
    }

    pub fn dynamics(&self) -> &DynamicBuffer {
        &self.dynamics
    }

    pub fn cell(&self, x: i32, y: i32) -> Cell {
        self.grid.get(x, y)
    }

    pub fn set_cell(&mut self, x: i32, y: i32, cell: Cell) {
        self.grid.set(x, y, cell);
    }

    /// Place a material at its default temperature
    pub fn place_material(&mut self, x: i32, y: i32, material_id: u8) {
        let temperature = self.materials.get(material_id).default_temperature;
        self.grid.set(x, y, Cell::new(material_id, temperature));
    }

    pub fn ambient_cell(&self, x: i32, y: i32) -> AmbientCell {
        self.ambient.get(x, y)
    }

    /// Write a force vector into the ambient layer (fans, blasts, wind)
    pub fn set_force(&mut self, x: i32, y: i32, force: Vec2) {
        self.ambient.set_force(x, y, force);
    }

    /// Collision/hazard view for character controllers; read-only
    pub fn classify(&self, position: Vec2) -> CellClass {
        CellQueries::classify(&self.grid, &self.materials, position)
    }

    /// Launch a ballistic particle from an external impulse
    pub fn spawn_particle(
        &mut self,
        position: Vec2,
        velocity: Vec2,
        material_id: u8,
        temperature: u16,
    ) -> bool {
        let width = self.grid.width();
        self.dynamics
            .spawn(position, velocity, material_id, temperature, width)
    }

    /// Raw level snapshot of the current generation
    pub fn snapshot(&self) -> Vec<u8> {
        snapshot::encode_grid(&self.grid)
    }

    /// Replace the grid from a raw level snapshot
    pub fn load_snapshot(&mut self, bytes: &[u8]) -> Result<(), SnapshotError> {
        self.grid = snapshot::decode_grid(self.grid.width(), self.grid.height(), bytes)?;
        Ok(())
    }

    /// Advance one full simulation tick
    pub fn update(&mut self, buildables: &[BuildableRecord]) {
        self.update_with_stats(buildables, &mut NoopStats);
    }

    /// Advance one full simulation tick, reporting counters through `stats`
    pub fn update_with_stats(&mut self, buildables: &[BuildableRecord], stats: &mut dyn SimStats) {
        let tick_seed = symmetry::tick_seed(self.seed, self.ticks);

        // External pre-pass effects land before any evaluation
        BuildablesSystem::apply(&mut self.grid, buildables, &self.materials, tick_seed);

        // Movement generations, block parity advancing each time
        for _ in 0..self.config.automaton_generations {
            let generation_seed = symmetry::tick_seed(tick_seed, self.generation);
            MargolusSystem::step(
                &self.grid,
                &mut self.grid_next,
                &self.materials,
                self.generation,
                generation_seed,
                &self.config,
                stats,
            );
            std::mem::swap(&mut self.grid, &mut self.grid_next);
            self.generation += 1;
        }

        // Particle-side heat exchange, then the ambient layer
        ThermalSystem::step(
            &self.grid,
            &mut self.grid_next,
            &self.ambient,
            &self.materials,
            &self.config,
            stats,
        );
        std::mem::swap(&mut self.grid, &mut self.grid_next);

        AmbientSystem::step(
            &self.grid,
            &self.ambient,
            &mut self.ambient_next,
            &self.materials,
            &self.config,
            tick_seed,
        );
        std::mem::swap(&mut self.ambient, &mut self.ambient_next);

        // Dynamic particle pipeline: extract, confirm, fly, collide, settle
        ExtractionSystem::extract(
            &self.grid,
            &self.ambient,
            &mut self.dynamics,
            self.ticks,
            &self.config,
        );
        ExtractionSystem::confirm_clear(&mut self.grid, &mut self.dynamics, stats);
        DynamicsSystem::simulate(
            &mut self.dynamics,
            &self.ambient,
            self.grid.width(),
            self.grid.height(),
            &self.config,
        );
        DynamicsSystem::collide(&mut self.dynamics, &self.grid, &self.config);
        DynamicsSystem::reintegrate(&mut self.dynamics, &mut self.grid, self.ticks, stats);

        self.ticks += 1;
    }
}
