//! Raw grid snapshot encode/decode
//!
//! The persisted level format: 4 bytes per cell, row-major from y = 0.
//! The per-cell layout is owned by `Cell::to_bytes`/`Cell::from_bytes`;
//! this module only frames whole grids.

use cinderbox_simulation::{CELL_BYTES, Cell};
use thiserror::Error;

use super::grid::CellGrid;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is {got} bytes, but a {width}x{height} grid needs {expected}")]
    LengthMismatch {
        width: usize,
        height: usize,
        expected: usize,
        got: usize,
    },
}

/// Serialize a grid to the raw snapshot layout
pub fn encode_grid(grid: &CellGrid) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(grid.cells().len() * CELL_BYTES);
    for cell in grid.cells() {
        bytes.extend_from_slice(&cell.to_bytes());
    }
    bytes
}

/// Rebuild a grid of the given dimensions from a raw snapshot
pub fn decode_grid(width: usize, height: usize, bytes: &[u8]) -> Result<CellGrid, SnapshotError> {
    let expected = width * height * CELL_BYTES;
    if bytes.len() != expected {
        return Err(SnapshotError::LengthMismatch {
            width,
            height,
            expected,
            got: bytes.len(),
        });
    }

    let mut grid = CellGrid::new(width, height);
    for (cell, chunk) in grid.cells_mut().iter_mut().zip(bytes.chunks_exact(CELL_BYTES)) {
        *cell = Cell::from_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Ok(grid)
}
