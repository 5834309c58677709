//! State change system
//!
//! Handles material transitions when a cell's temperature crosses a
//! threshold of its descriptor:
//! - Melting (static/solid -> liquid)
//! - Boiling (liquid -> gas)
//! - Freezing/condensing (liquid -> static, gas -> liquid)
//!
//! Transitions preserve the cell's temperature.

use cinderbox_simulation::{Cell, MaterialDef};

/// System for checking and applying state changes
pub struct StateChangeSystem;

impl StateChangeSystem {
    /// Check if a cell should change state based on its temperature
    ///
    /// Returns true if the cell was transformed to a different material
    pub fn check_state_change(cell: &mut Cell, material: &MaterialDef) -> bool {
        // Melting (e.g., ice -> water, stone -> lava)
        if let Some(melt_temp) = material.melting_point {
            if cell.temperature >= melt_temp {
                if let Some(melts_to) = material.melts_to {
                    cell.material_id = melts_to;
                    return true;
                }
            }
        }

        // Boiling (e.g., water -> steam)
        if let Some(boil_temp) = material.boiling_point {
            if cell.temperature >= boil_temp {
                if let Some(boils_to) = material.boils_to {
                    cell.material_id = boils_to;
                    return true;
                }
            }
        }

        // Freezing/condensing (e.g., water -> ice, steam -> water)
        if let Some(freeze_temp) = material.freezing_point {
            if cell.temperature <= freeze_temp {
                if let Some(freezes_to) = material.freezes_to {
                    cell.material_id = freezes_to;
                    return true;
                }
            }
        }

        false
    }
}
