//! Material data and cell primitives for Cinderbox
//!
//! This crate provides the foundational data types for the particle simulation:
//! - Material definitions (MaterialId, MaterialDef, Materials)
//! - Material categories (MaterialCategory)
//! - Cell types and byte packing (Cell, pack/unpack helpers)

mod cell;
mod materials;

pub use cell::{
    CELL_BYTES, Cell, pack_force_component, pack_temperature, unpack_force_component,
    unpack_temperature,
};
pub use materials::{MaterialCategory, MaterialDef, MaterialId, Materials};
