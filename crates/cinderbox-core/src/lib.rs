//! Cinderbox simulation core
//!
//! A fixed-size grid of typed, temperature-carrying cells advanced by a
//! block-parity cellular automaton, a two-layer thermal model (per-cell
//! temperature plus an ambient heat field), and a fixed-capacity ballistic
//! particle subsystem for cells ejected from the grid by the force field.

pub mod world;

// Re-export the material data crate under the path the systems use
pub mod simulation {
    pub use cinderbox_simulation::*;
}
