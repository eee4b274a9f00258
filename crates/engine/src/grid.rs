use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::cell_address;
use crate::cell::Cell;
use crate::error::GridError;

/// An inclusive rectangle of merged cells. `start` is the top-left corner
/// and doubles as the region's origin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergedRegion {
    pub start: (usize, usize),
    pub end: (usize, usize),
}

impl MergedRegion {
    /// Build a region from any two corners, normalizing so `start <= end`.
    pub fn new(r1: usize, c1: usize, r2: usize, c2: usize) -> Self {
        Self {
            start: (r1.min(r2), c1.min(c2)),
            end: (r1.max(r2), c1.max(c2)),
        }
    }

    pub fn origin(&self) -> (usize, usize) {
        self.start
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.start.0 && row <= self.end.0 && col >= self.start.1 && col <= self.end.1
    }

    pub fn overlaps(&self, other: &MergedRegion) -> bool {
        self.start.0 <= other.end.0
            && self.end.0 >= other.start.0
            && self.start.1 <= other.end.1
            && self.end.1 >= other.start.1
    }

    pub fn row_span(&self) -> usize {
        self.end.0 - self.start.0 + 1
    }

    pub fn col_span(&self) -> usize {
        self.end.1 - self.start.1 + 1
    }

    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for MergedRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            cell_address(self.start.0, self.start.1),
            cell_address(self.end.0, self.end.1)
        )
    }
}

/// The grid itself: dimensions, a sparse cell map, and the merge list.
///
/// Invariants: every stored cell and every merge lies within `rows` x `cols`,
/// merges are pairwise disjoint, and no stored cell is fully default.
#[derive(Debug, Clone)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    cells: FxHashMap<(usize, usize), Cell>,
    merged_regions: Vec<MergedRegion>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: FxHashMap::default(),
            merged_regions: Vec::new(),
        }
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<(), GridError> {
        if self.in_bounds(row, col) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Effective cell at a position: covered non-origin addresses read as
    /// empty, everything else reads its stored cell (or the default).
    pub fn get_cell(&self, row: usize, col: usize) -> Cell {
        if self.is_covered(row, col) {
            return Cell::default();
        }
        self.cells.get(&(row, col)).cloned().unwrap_or_default()
    }

    /// Effective display text at a position (suppressed view).
    pub fn get_display(&self, row: usize, col: usize) -> String {
        if self.is_covered(row, col) {
            return String::new();
        }
        self.cells
            .get(&(row, col))
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    /// Raw stored cell, ignoring merge suppression.
    pub fn get_stored(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Store a cell, dropping it from the map when it is fully default.
    pub fn set_cell(&mut self, row: usize, col: usize, cell: Cell) -> Result<(), GridError> {
        self.check_bounds(row, col)?;
        if cell.is_empty() {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), cell);
        }
        Ok(())
    }

    /// Direct write without a bounds check; callers have already validated
    /// the position. `None` and fully-default cells clear the slot.
    pub(crate) fn write_cell(&mut self, row: usize, col: usize, cell: Option<Cell>) {
        match cell {
            Some(c) if !c.is_empty() => {
                self.cells.insert((row, col), c);
            }
            _ => {
                self.cells.remove(&(row, col));
            }
        }
    }

    /// Iterate over all stored cells.
    pub fn cells_iter(&self) -> impl Iterator<Item = (&(usize, usize), &Cell)> {
        self.cells.iter()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Swap in a whole new cell map (import / snapshot restore).
    pub(crate) fn replace_cells(&mut self, cells: FxHashMap<(usize, usize), Cell>) {
        self.cells = cells;
    }

    pub(crate) fn clone_cells(&self) -> FxHashMap<(usize, usize), Cell> {
        self.cells.clone()
    }

    /// Strip every cell's style, keeping values and placeholder flags.
    /// Cells left fully default disappear from the map.
    pub(crate) fn strip_all_styles(&mut self) {
        for cell in self.cells.values_mut() {
            cell.style = Default::default();
        }
        self.cells.retain(|_, cell| !cell.is_empty());
    }

    /// Grow dimensions to at least the given size. Never shrinks.
    pub(crate) fn grow_to(&mut self, rows: usize, cols: usize) {
        self.rows = self.rows.max(rows);
        self.cols = self.cols.max(cols);
    }

    /// Shrink dimensions, purging cells and merges that no longer fit.
    /// Only history replay calls this; the public surface never shrinks.
    pub(crate) fn shrink_to(&mut self, rows: usize, cols: usize) {
        self.rows = rows;
        self.cols = cols;
        self.cells.retain(|(r, c), _| *r < rows && *c < cols);
        self.merged_regions
            .retain(|m| m.end.0 < rows && m.end.1 < cols);
    }

    // =========================================================================
    // Merge Management
    // =========================================================================

    pub fn merges(&self) -> &[MergedRegion] {
        &self.merged_regions
    }

    /// Add a merge region. Fails if the region leaves the grid or shares a
    /// cell with an existing region; the merge list is unchanged on failure.
    pub fn add_merge(&mut self, region: MergedRegion) -> Result<(), GridError> {
        self.check_bounds(region.end.0, region.end.1)?;
        if let Some(existing) = self.merged_regions.iter().find(|m| m.overlaps(&region)) {
            return Err(GridError::MergeOverlap {
                requested: region,
                existing: *existing,
            });
        }
        self.merged_regions.push(region);
        Ok(())
    }

    /// Remove the region whose origin is at the given position.
    pub fn remove_merge(&mut self, origin: (usize, usize)) -> Option<MergedRegion> {
        let idx = self
            .merged_regions
            .iter()
            .position(|m| m.origin() == origin)?;
        Some(self.merged_regions.remove(idx))
    }

    /// The region covering a position, if any.
    pub fn merge_at(&self, row: usize, col: usize) -> Option<&MergedRegion> {
        self.merged_regions.iter().find(|m| m.contains(row, col))
    }

    pub fn is_merge_origin(&self, row: usize, col: usize) -> bool {
        self.merge_at(row, col)
            .map(|m| m.origin() == (row, col))
            .unwrap_or(false)
    }

    /// Covered by a merge but not its origin.
    fn is_covered(&self, row: usize, col: usize) -> bool {
        self.merge_at(row, col)
            .map(|m| m.origin() != (row, col))
            .unwrap_or(false)
    }

    /// Render span of a position: `(rows, cols)` of its region at the
    /// origin, `(1, 1)` for unmerged cells, `(0, 0)` for covered cells.
    pub fn span_at(&self, row: usize, col: usize) -> (usize, usize) {
        match self.merge_at(row, col) {
            Some(m) if m.origin() == (row, col) => (m.row_span(), m.col_span()),
            Some(_) => (0, 0),
            None => (1, 1),
        }
    }
}
