//! Ambient heat field - environmental temperature and force layer
//!
//! A grid-wide layer distinct from per-cell particle temperature. Each
//! position carries an environmental temperature and a force vector with
//! components in [-1, 1]; the force component is written by external
//! systems (fans, blasts, wind tools) and read by extraction and the
//! ballistic pipeline.

use cinderbox_simulation::{pack_force_component, unpack_force_component};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One position of the ambient layer
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmbientCell {
    /// Environmental temperature in Kelvin
    pub temperature: u16,
    /// Force vector, components in [-1, 1]
    pub force: Vec2,
}

impl AmbientCell {
    /// Room temperature, no force
    pub const NEUTRAL: AmbientCell = AmbientCell {
        temperature: 298,
        force: Vec2::ZERO,
    };

    pub fn new(temperature: u16) -> Self {
        Self {
            temperature,
            force: Vec2::ZERO,
        }
    }

    /// Force packed to the byte-pair wire layout, midpoint 128 = zero
    pub fn packed_force(&self) -> [u8; 2] {
        [
            pack_force_component(self.force.x),
            pack_force_component(self.force.y),
        ]
    }

    pub fn set_packed_force(&mut self, packed: [u8; 2]) {
        self.force = Vec2::new(
            unpack_force_component(packed[0]),
            unpack_force_component(packed[1]),
        );
    }
}

impl Default for AmbientCell {
    fn default() -> Self {
        AmbientCell::NEUTRAL
    }
}

/// Fixed-size ambient layer, same dimensions and orientation as the cell grid
#[derive(Clone, Serialize, Deserialize)]
pub struct AmbientField {
    width: usize,
    height: usize,
    cells: Vec<AmbientCell>,
}

impl AmbientField {
    pub fn new(width: usize, height: usize, temperature: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![AmbientCell::new(temperature); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Read a position; out-of-bounds reads are neutral
    pub fn get(&self, x: i32, y: i32) -> AmbientCell {
        if self.in_bounds(x, y) {
            self.cells[y as usize * self.width + x as usize]
        } else {
            AmbientCell::NEUTRAL
        }
    }

    pub fn set(&mut self, x: i32, y: i32, cell: AmbientCell) {
        if self.in_bounds(x, y) {
            self.cells[y as usize * self.width + x as usize] = cell;
        }
    }

    pub fn force_at(&self, x: i32, y: i32) -> Vec2 {
        self.get(x, y).force
    }

    pub fn set_force(&mut self, x: i32, y: i32, force: Vec2) {
        if self.in_bounds(x, y) {
            self.cells[y as usize * self.width + x as usize].force =
                force.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
        }
    }

    pub fn cells(&self) -> &[AmbientCell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [AmbientCell] {
        &mut self.cells
    }

    pub fn copy_from(&mut self, other: &AmbientField) {
        debug_assert_eq!(self.width, other.width);
        debug_assert_eq!(self.height, other.height);
        self.cells.copy_from_slice(&other.cells);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_field_is_uniform() {
        let field = AmbientField::new(4, 4, 298);
        assert_eq!(field.get(2, 2), AmbientCell::new(298));
        assert_eq!(field.force_at(2, 2), Vec2::ZERO);
    }

    #[test]
    fn test_out_of_bounds_neutral() {
        let field = AmbientField::new(4, 4, 500);
        assert_eq!(field.get(-1, 0), AmbientCell::NEUTRAL);
        assert_eq!(field.get(0, 4), AmbientCell::NEUTRAL);
    }

    #[test]
    fn test_set_force_clamps() {
        let mut field = AmbientField::new(4, 4, 298);
        field.set_force(1, 1, Vec2::new(3.0, -2.0));
        assert_eq!(field.force_at(1, 1), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_packed_force_round_trip() {
        let mut cell = AmbientCell::new(298);
        cell.force = Vec2::new(0.5, -0.25);
        let packed = cell.packed_force();

        let mut other = AmbientCell::new(298);
        other.set_packed_force(packed);
        assert!((other.force.x - 0.5).abs() <= 1.0 / 127.0);
        assert!((other.force.y + 0.25).abs() <= 1.0 / 127.0);
        // Repacking a decoded pair is stable
        assert_eq!(other.packed_force(), packed);
    }
}
