//! Fixed-size world grid storage

use cinderbox_simulation::{Cell, MaterialId};
use serde::{Deserialize, Serialize};

/// Cell reported for out-of-bounds reads: the world edge is solid rock
pub const BOUNDARY_CELL: Cell = Cell {
    material_id: MaterialId::BEDROCK,
    temperature: 293,
};

/// Row-major fixed-size grid of cells, y = 0 at the bottom.
///
/// Passes never mutate the grid they read: each pass reads one grid and
/// writes a separate next-generation grid, and the owner swaps the pair
/// between passes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CellGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl CellGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; width * height],
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

    /// Read a cell; out-of-bounds positions read as the solid boundary
    pub fn get(&self, x: i32, y: i32) -> Cell {
        if self.in_bounds(x, y) {
            self.cells[y as usize * self.width + x as usize]
        } else {
            BOUNDARY_CELL
        }
    }

    /// Write a cell; out-of-bounds writes are dropped
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if self.in_bounds(x, y) {
            self.cells[y as usize * self.width + x as usize] = cell;
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Overwrite this grid's contents from another of the same dimensions
    pub fn copy_from(&mut self, other: &CellGrid) {
        debug_assert_eq!(self.width, other.width);
        debug_assert_eq!(self.height, other.height);
        self.cells.copy_from_slice(&other.cells);
    }

    /// Count of non-empty cells (diagnostics and tests)
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinderbox_simulation::MaterialId;

    #[test]
    fn test_new_grid_is_empty() {
        let grid = CellGrid::new(8, 8);
        assert_eq!(grid.occupied_count(), 0);
        assert_eq!(grid.get(3, 3), Cell::EMPTY);
    }

    #[test]
    fn test_set_get_round_trip() {
        let mut grid = CellGrid::new(8, 8);
        let cell = Cell::new(MaterialId::SAND, 400);
        grid.set(2, 5, cell);
        assert_eq!(grid.get(2, 5), cell);
        assert_eq!(grid.occupied_count(), 1);
    }

    #[test]
    fn test_out_of_bounds_reads_solid_boundary() {
        let grid = CellGrid::new(8, 8);
        assert_eq!(grid.get(-1, 0), BOUNDARY_CELL);
        assert_eq!(grid.get(0, -1), BOUNDARY_CELL);
        assert_eq!(grid.get(8, 0), BOUNDARY_CELL);
        assert_eq!(grid.get(0, 8), BOUNDARY_CELL);
        assert!(BOUNDARY_CELL.category().is_rigid());
    }

    #[test]
    fn test_out_of_bounds_writes_dropped() {
        let mut grid = CellGrid::new(4, 4);
        grid.set(-1, 2, Cell::new(MaterialId::SAND, 293));
        grid.set(4, 2, Cell::new(MaterialId::SAND, 293));
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_copy_from() {
        let mut a = CellGrid::new(4, 4);
        let mut b = CellGrid::new(4, 4);
        a.set(1, 1, Cell::new(MaterialId::WATER, 293));
        b.copy_from(&a);
        assert_eq!(b.get(1, 1).material_id, MaterialId::WATER);
    }
}
