//! Read-only grid queries for external collaborators
//!
//! The player controller and NPCs consume the grid through `classify`; it
//! derives everything from the material table and the current generation
//! and never mutates the grid.

use bitflags::bitflags;
use cinderbox_simulation::{MaterialCategory, Materials};
use glam::Vec2;

use super::grid::CellGrid;

/// Contact is dangerous above this temperature
const SCALDING_TEMPERATURE: u16 = 333;
/// Contact is dangerous below this temperature
const FROSTBITE_TEMPERATURE: u16 = 253;

bitflags! {
    /// Hazards a character touching the cell is exposed to
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct HazardFlags: u8 {
        const SCALDING = 1 << 0;
        const FREEZING = 1 << 1;
        const CORROSIVE = 1 << 2;
        const SUBMERGING = 1 << 3;
    }
}

/// Collision/hazard view of one position
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellClass {
    /// Characters cannot pass through this cell
    pub blocking: bool,
    /// Thermally adjusted effective density
    pub density: f32,
    pub hazards: HazardFlags,
}

/// Stateless query utilities over the current grid generation
pub struct CellQueries;

impl CellQueries {
    /// Classify the cell under a continuous position.
    ///
    /// Out-of-bounds positions read as the solid boundary and therefore
    /// block.
    pub fn classify(grid: &CellGrid, materials: &Materials, position: Vec2) -> CellClass {
        let cell = grid.get(position.x.floor() as i32, position.y.floor() as i32);
        let def = materials.get(cell.material_id);
        let category = cell.category();

        let mut hazards = HazardFlags::empty();
        if cell.temperature >= SCALDING_TEMPERATURE {
            hazards.insert(HazardFlags::SCALDING);
        }
        if cell.temperature <= FROSTBITE_TEMPERATURE {
            hazards.insert(HazardFlags::FREEZING);
        }
        if def.corrosive {
            hazards.insert(HazardFlags::CORROSIVE);
        }
        if category == MaterialCategory::Liquid {
            hazards.insert(HazardFlags::SUBMERGING);
        }

        CellClass {
            blocking: category.is_rigid() || category == MaterialCategory::Solid,
            density: def.effective_density(cell.temperature),
            hazards,
        }
    }
}
