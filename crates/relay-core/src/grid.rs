//! Shared toggle grid.
//!
//! A fixed number of binary cells, all zero at construction. Each cell
//! is its own `AtomicU8`, so a toggle is a single `fetch_xor`:
//! concurrent toggles of the same cell never lose an update, and
//! toggles of different cells never contend.
//!
//! There is no history or versioning. When two clients hit the same
//! cell at nearly the same time both flips apply, and each caller gets
//! back the value its own flip produced.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::GridError;

/// Number of cells in the deployed grid.
pub const GRID_SIZE: usize = 275;

#[derive(Debug)]
pub struct ToggleGrid {
    cells: Box<[AtomicU8]>,
}

impl Default for ToggleGrid {
    fn default() -> Self {
        ToggleGrid::with_len(GRID_SIZE)
    }
}

impl ToggleGrid {
    /// Create a grid of [`GRID_SIZE`] cells, all zero.
    pub fn new() -> Self {
        ToggleGrid::default()
    }

    /// Create a grid with a custom number of cells, all zero.
    pub fn with_len(len: usize) -> Self {
        let cells = (0..len).map(|_| AtomicU8::new(0)).collect();
        ToggleGrid { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Current value (0 or 1) of the cell at `index`.
    pub fn get(&self, index: i64) -> Result<u8, GridError> {
        Ok(self.cell(index)?.load(Ordering::Acquire))
    }

    /// Flip the cell at `index` and return its new value.
    pub fn toggle(&self, index: i64) -> Result<u8, GridError> {
        let previous = self.cell(index)?.fetch_xor(1, Ordering::AcqRel);
        Ok(previous ^ 1)
    }

    /// Copy of every cell, in index order.
    ///
    /// Cells are read one by one, so under concurrent toggles this is
    /// not a point-in-time view of the whole grid.
    pub fn snapshot(&self) -> Vec<u8> {
        self.cells
            .iter()
            .map(|cell| cell.load(Ordering::Acquire))
            .collect()
    }

    /// Number of cells currently set.
    pub fn count_set(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.load(Ordering::Relaxed) == 1)
            .count()
    }

    fn cell(&self, index: i64) -> Result<&AtomicU8, GridError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.cells.get(i))
            .ok_or(GridError::OutOfRange {
                index,
                len: self.cells.len(),
            })
    }
}
