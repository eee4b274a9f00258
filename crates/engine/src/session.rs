//! Host-facing editing session.
//!
//! A `GridSession` owns one grid, its history, and its clipboard. Every
//! mutation flows through the session so that each change lands in history
//! with exact before/after images; a failed operation records nothing and
//! leaves the grid untouched.

use std::collections::BTreeMap;
use std::time::Instant;

use rustc_hash::FxHashMap;

use crate::cell::{Cell, CellPatch};
use crate::clipboard::Clipboard;
use crate::error::GridError;
use crate::grid::{Grid, MergedRegion};
use crate::history::{CellChange, EditAction, History};
use crate::snapshot::GridSnapshot;
use crate::tabular::TabularSheet;

pub struct GridSession {
    grid: Grid,
    history: History,
    clipboard: Option<Clipboard>,
    modified: bool,
}

impl GridSession {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            grid: Grid::new(rows, cols),
            history: History::new(),
            clipboard: None,
            modified: false,
        }
    }

    pub fn from_snapshot(snapshot: &GridSnapshot) -> Result<Self, GridError> {
        Ok(Self {
            grid: snapshot.to_grid()?,
            history: History::new(),
            clipboard: None,
            modified: false,
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rows(&self) -> usize {
        self.grid.rows
    }

    pub fn cols(&self) -> usize {
        self.grid.cols
    }

    /// Effective cell at a position (merge suppression applied).
    pub fn get_cell(&self, row: usize, col: usize) -> Cell {
        self.grid.get_cell(row, col)
    }

    pub fn merges(&self) -> &[MergedRegion] {
        self.grid.merges()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Timestamp of the newest history entry, for host autosave debouncing.
    pub fn last_edit_at(&self) -> Option<Instant> {
        self.history.last_edit_at()
    }

    /// True once any edit ran; hosts use it for save prompts.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    /// Cells flagged for template substitution, in row-major order.
    pub fn placeholder_cells(&self) -> Vec<(usize, usize, String)> {
        let mut out: Vec<_> = self
            .grid
            .cells_iter()
            .filter(|(_, cell)| cell.placeholder)
            .map(|(&(row, col), cell)| (row, col, cell.value.clone()))
            .collect();
        out.sort_by_key(|entry| (entry.0, entry.1));
        out
    }

    // =========================================================================
    // Cell Editing
    // =========================================================================

    /// Apply a partial cell update. Unnamed fields keep their prior values.
    /// Records one history entry; a patch that changes nothing records
    /// nothing.
    pub fn set_cell(&mut self, row: usize, col: usize, patch: &CellPatch) -> Result<(), GridError> {
        if !self.grid.in_bounds(row, col) {
            return Err(GridError::OutOfBounds {
                row,
                col,
                rows: self.grid.rows,
                cols: self.grid.cols,
            });
        }

        let before = self.grid.get_stored(row, col).cloned();
        let mut cell = before.clone().unwrap_or_default();
        patch.apply(&mut cell);
        let after = if cell.is_empty() { None } else { Some(cell) };

        if before == after {
            return Ok(());
        }

        self.grid.write_cell(row, col, after.clone());
        self.history.push(EditAction::Cells {
            changes: vec![CellChange {
                row,
                col,
                before,
                after,
            }],
        });
        self.modified = true;
        Ok(())
    }

    /// Replace just the display text of a cell.
    pub fn set_cell_value(&mut self, row: usize, col: usize, text: &str) -> Result<(), GridError> {
        self.set_cell(row, col, &CellPatch::value(text))
    }

    // =========================================================================
    // Dimensions
    // =========================================================================

    /// Append one row at the bottom.
    pub fn add_row(&mut self) {
        self.grid.grow_to(self.grid.rows + 1, self.grid.cols);
        self.history.push(EditAction::AddRow);
        self.modified = true;
    }

    /// Append one column at the right.
    pub fn add_column(&mut self) {
        self.grid.grow_to(self.grid.rows, self.grid.cols + 1);
        self.history.push(EditAction::AddColumn);
        self.modified = true;
    }

    /// Grow the grid to at least the given dimensions. Shrinking is
    /// rejected outright; equal dimensions are a no-op. Growth is recorded
    /// one row or column at a time, so a bulk resize undoes stepwise.
    pub fn resize(&mut self, rows: usize, cols: usize) -> Result<(), GridError> {
        if rows < self.grid.rows || cols < self.grid.cols {
            return Err(GridError::InvalidResize {
                from: (self.grid.rows, self.grid.cols),
                to: (rows, cols),
            });
        }
        while self.grid.rows < rows {
            self.add_row();
        }
        while self.grid.cols < cols {
            self.add_column();
        }
        Ok(())
    }

    // =========================================================================
    // Merge / Unmerge
    // =========================================================================

    /// Merge a rectangle given by any two corners. Returns the normalized
    /// region, or `None` for a single-cell rectangle (nothing to merge).
    /// Cell contents are untouched: covered values stay in storage and
    /// reappear on unmerge.
    pub fn merge_cells(
        &mut self,
        r1: usize,
        c1: usize,
        r2: usize,
        c2: usize,
    ) -> Result<Option<MergedRegion>, GridError> {
        let region = MergedRegion::new(r1, c1, r2, c2);
        if region.is_single_cell() {
            return Ok(None);
        }
        self.grid.add_merge(region)?;
        self.history.push(EditAction::Merge { region });
        self.modified = true;
        Ok(Some(region))
    }

    /// Remove the merge covering a position. Silent no-op when the position
    /// is not merged.
    pub fn unmerge_cells(&mut self, row: usize, col: usize) -> Option<MergedRegion> {
        let origin = self.grid.merge_at(row, col)?.origin();
        let region = self.grid.remove_merge(origin)?;
        self.history.push(EditAction::Unmerge { region });
        self.modified = true;
        Some(region)
    }

    // =========================================================================
    // Clipboard
    // =========================================================================

    /// Snapshot a single cell into the session clipboard.
    pub fn copy(&mut self, row: usize, col: usize) -> Result<(), GridError> {
        self.copy_region(row, col, row, col)
    }

    /// Snapshot a rectangle into the session clipboard. Not an edit: no
    /// history entry, and the modified flag is untouched.
    pub fn copy_region(
        &mut self,
        r1: usize,
        c1: usize,
        r2: usize,
        c2: usize,
    ) -> Result<(), GridError> {
        let (max_row, max_col) = (r1.max(r2), c1.max(c2));
        if !self.grid.in_bounds(max_row, max_col) {
            return Err(GridError::OutOfBounds {
                row: max_row,
                col: max_col,
                rows: self.grid.rows,
                cols: self.grid.cols,
            });
        }
        self.clipboard = Some(Clipboard::capture(&self.grid, r1, c1, r2, c2));
        Ok(())
    }

    /// Paste the clipboard with its anchor at the target position. Writes
    /// that fall outside the grid are skipped silently; the rest form one
    /// history entry. Returns the number of cells written.
    pub fn paste(&mut self, target_row: usize, target_col: usize) -> usize {
        let (anchor, positions) = match &self.clipboard {
            Some(clip) => (clip.anchor(), clip.iter_positions().collect::<Vec<_>>()),
            None => return 0,
        };

        let mut changes = Vec::new();
        for ((row, col), cell) in positions {
            // A saturated sum is never in bounds, so targets past usize::MAX
            // clip like any other out-of-grid write.
            let tr = target_row.saturating_add(row - anchor.0);
            let tc = target_col.saturating_add(col - anchor.1);
            if !self.grid.in_bounds(tr, tc) {
                continue;
            }
            let before = self.grid.get_stored(tr, tc).cloned();
            let after = if cell.is_empty() { None } else { Some(cell) };
            if before == after {
                continue;
            }
            self.grid.write_cell(tr, tc, after.clone());
            changes.push(CellChange {
                row: tr,
                col: tc,
                before,
                after,
            });
        }

        if changes.is_empty() {
            return 0;
        }
        let count = changes.len();
        self.history.push(EditAction::Cells { changes });
        self.modified = true;
        count
    }

    // =========================================================================
    // Bulk Operations
    // =========================================================================

    /// Strip every style attribute while keeping values and placeholder
    /// flags. One history entry captures the full prior cell map.
    pub fn clear_formatting(&mut self) {
        let before_cells = self.grid.clone_cells();
        if !before_cells.values().any(|c| !c.style.is_default()) {
            return;
        }
        self.grid.strip_all_styles();
        self.history.push(EditAction::Clear { before_cells });
        self.modified = true;
    }

    /// Move a rectangle of stored cells so its top-left lands at the
    /// destination. The source footprint is cleared, the destination is
    /// overwritten, and writes past the grid edge are skipped like paste.
    /// Merge regions do not travel with the cells.
    pub fn move_region(
        &mut self,
        r1: usize,
        c1: usize,
        r2: usize,
        c2: usize,
        dest_row: usize,
        dest_col: usize,
    ) -> Result<(), GridError> {
        let (min_row, max_row) = (r1.min(r2), r1.max(r2));
        let (min_col, max_col) = (c1.min(c2), c1.max(c2));
        if !self.grid.in_bounds(max_row, max_col) {
            return Err(GridError::OutOfBounds {
                row: max_row,
                col: max_col,
                rows: self.grid.rows,
                cols: self.grid.cols,
            });
        }
        if !self.grid.in_bounds(dest_row, dest_col) {
            return Err(GridError::OutOfBounds {
                row: dest_row,
                col: dest_col,
                rows: self.grid.rows,
                cols: self.grid.cols,
            });
        }

        // Final state per touched position: the whole source footprint is
        // cleared, then the footprint's image lands at the destination.
        // BTreeMap keeps the change list in row-major order.
        let mut final_state: BTreeMap<(usize, usize), Option<Cell>> = BTreeMap::new();
        for row in min_row..=max_row {
            for col in min_col..=max_col {
                final_state.insert((row, col), None);
            }
        }
        for row in min_row..=max_row {
            for col in min_col..=max_col {
                let tr = dest_row.saturating_add(row - min_row);
                let tc = dest_col.saturating_add(col - min_col);
                if !self.grid.in_bounds(tr, tc) {
                    continue;
                }
                final_state.insert((tr, tc), self.grid.get_stored(row, col).cloned());
            }
        }

        let mut changes = Vec::new();
        for ((row, col), after) in final_state {
            let before = self.grid.get_stored(row, col).cloned();
            let after = after.filter(|c| !c.is_empty());
            if before == after {
                continue;
            }
            self.grid.write_cell(row, col, after.clone());
            changes.push(CellChange {
                row,
                col,
                before,
                after,
            });
        }

        if !changes.is_empty() {
            self.history.push(EditAction::Move { changes });
            self.modified = true;
        }
        Ok(())
    }

    /// Replace the entire cell map with imported tabular rows. `None` input
    /// cells stay absent; imported cells are left-aligned plain text.
    /// Dimensions grow to cover the input and never shrink. One history
    /// entry restores the prior grid on undo.
    pub fn import_rows(&mut self, rows: &[Vec<Option<String>>]) {
        let before_cells = self.grid.clone_cells();
        let before_dims = (self.grid.rows, self.grid.cols);

        let mut after_cells: FxHashMap<(usize, usize), Cell> = FxHashMap::default();
        for (r, row) in rows.iter().enumerate() {
            for (c, text) in row.iter().enumerate() {
                if let Some(text) = text {
                    let cell = Cell::with_value(text);
                    if !cell.is_empty() {
                        after_cells.insert((r, c), cell);
                    }
                }
            }
        }

        let need_rows = rows.len();
        let need_cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let after_dims = (before_dims.0.max(need_rows), before_dims.1.max(need_cols));

        self.grid.rows = after_dims.0;
        self.grid.cols = after_dims.1;
        self.grid.replace_cells(after_cells.clone());
        self.history.push(EditAction::Import {
            before_cells,
            after_cells,
            before_dims,
            after_dims,
        });
        self.modified = true;
    }

    // =========================================================================
    // Undo / Redo
    // =========================================================================

    /// Step one entry back. Returns false (and does nothing) at the start
    /// of history.
    pub fn undo(&mut self) -> bool {
        let action = match self.history.undo() {
            Some(action) => action,
            None => return false,
        };
        self.apply_inverse(action);
        self.modified = true;
        true
    }

    /// Step one entry forward. Returns false (and does nothing) at the tip.
    pub fn redo(&mut self) -> bool {
        let action = match self.history.redo() {
            Some(action) => action,
            None => return false,
        };
        self.apply_forward(action);
        self.modified = true;
        true
    }

    fn apply_inverse(&mut self, action: EditAction) {
        match action {
            EditAction::Cells { changes } | EditAction::Move { changes } => {
                // Reverse order so repeated writes to one cell unwind
                // correctly.
                for change in changes.iter().rev() {
                    self.grid.write_cell(change.row, change.col, change.before.clone());
                }
            }
            EditAction::Merge { region } => {
                self.grid.remove_merge(region.origin());
            }
            EditAction::Unmerge { region } => {
                let _ = self.grid.add_merge(region);
            }
            EditAction::AddRow => {
                self.grid.shrink_to(self.grid.rows - 1, self.grid.cols);
            }
            EditAction::AddColumn => {
                self.grid.shrink_to(self.grid.rows, self.grid.cols - 1);
            }
            EditAction::Import {
                before_cells,
                before_dims,
                ..
            } => {
                self.grid.rows = before_dims.0;
                self.grid.cols = before_dims.1;
                self.grid.replace_cells(before_cells);
            }
            EditAction::Clear { before_cells } => {
                self.grid.replace_cells(before_cells);
            }
        }
    }

    fn apply_forward(&mut self, action: EditAction) {
        match action {
            EditAction::Cells { changes } | EditAction::Move { changes } => {
                for change in changes {
                    self.grid.write_cell(change.row, change.col, change.after);
                }
            }
            EditAction::Merge { region } => {
                let _ = self.grid.add_merge(region);
            }
            EditAction::Unmerge { region } => {
                self.grid.remove_merge(region.origin());
            }
            EditAction::AddRow => {
                self.grid.grow_to(self.grid.rows + 1, self.grid.cols);
            }
            EditAction::AddColumn => {
                self.grid.grow_to(self.grid.rows, self.grid.cols + 1);
            }
            EditAction::Import {
                after_cells,
                after_dims,
                ..
            } => {
                self.grid.rows = after_dims.0;
                self.grid.cols = after_dims.1;
                self.grid.replace_cells(after_cells);
            }
            EditAction::Clear { .. } => {
                self.grid.strip_all_styles();
            }
        }
    }

    // =========================================================================
    // Interchange
    // =========================================================================

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot::from_grid(&self.grid)
    }

    /// Replace the grid from a snapshot. A loaded document starts fresh:
    /// history and clipboard are cleared and the modified flag resets.
    pub fn load_snapshot(&mut self, snapshot: &GridSnapshot) -> Result<(), GridError> {
        let grid = snapshot.to_grid()?;
        self.grid = grid;
        self.history.clear();
        self.clipboard = None;
        self.modified = false;
        Ok(())
    }

    /// Suppressed-view export of every non-empty cell plus the merge list.
    pub fn export_tabular(&self) -> TabularSheet {
        TabularSheet::from_grid(&self.grid)
    }
}
