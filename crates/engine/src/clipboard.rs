use rustc_hash::FxHashMap;

use crate::cell::Cell;
use crate::grid::Grid;

/// Value snapshot of a copied rectangle.
///
/// Cells are deep copies keyed by their source address, so grid edits made
/// after the copy never leak into a paste. Only non-default cells are kept;
/// the rectangle bounds remember which positions were empty.
#[derive(Debug, Clone)]
pub struct Clipboard {
    cells: FxHashMap<(usize, usize), Cell>,
    anchor: (usize, usize),
    end: (usize, usize),
}

impl Clipboard {
    /// Capture a rectangle through the suppressed view (what the user sees:
    /// covered non-origin cells copy as empty). Corners may come in any
    /// order.
    pub fn capture(grid: &Grid, r1: usize, c1: usize, r2: usize, c2: usize) -> Self {
        let (min_row, max_row) = (r1.min(r2), r1.max(r2));
        let (min_col, max_col) = (c1.min(c2), c1.max(c2));

        let mut cells = FxHashMap::default();
        for row in min_row..=max_row {
            for col in min_col..=max_col {
                let cell = grid.get_cell(row, col);
                if !cell.is_empty() {
                    cells.insert((row, col), cell);
                }
            }
        }
        Self {
            cells,
            anchor: (min_row, min_col),
            end: (max_row, max_col),
        }
    }

    /// Top-left of the copied rectangle; paste offsets are relative to it.
    pub fn anchor(&self) -> (usize, usize) {
        self.anchor
    }

    pub fn row_span(&self) -> usize {
        self.end.0 - self.anchor.0 + 1
    }

    pub fn col_span(&self) -> usize {
        self.end.1 - self.anchor.1 + 1
    }

    /// Every position of the copied rectangle with its snapshot, default
    /// cells included so a paste overwrites the full footprint.
    pub fn iter_positions(&self) -> impl Iterator<Item = ((usize, usize), Cell)> + '_ {
        let (r1, c1) = self.anchor;
        let (r2, c2) = self.end;
        (r1..=r2).flat_map(move |row| {
            (c1..=c2).map(move |col| {
                let cell = self.cells.get(&(row, col)).cloned().unwrap_or_default();
                ((row, col), cell)
            })
        })
    }
}
