//! Linear undo/redo log.
//!
//! One vector of entries plus a cursor counting the applied prefix. Pushing
//! discards everything from the cursor on (the redo branch), so the log never
//! branches. Undo and redo hand the action back to the session, which owns
//! applying it to the grid.

use std::time::Instant;

use rustc_hash::FxHashMap;

use crate::cell::Cell;
use crate::grid::MergedRegion;

const MAX_HISTORY_ENTRIES: usize = 100;

/// Before/after images of a single cell within an edit. `None` means the
/// cell was (or becomes) absent from the map.
#[derive(Debug, Clone, PartialEq)]
pub struct CellChange {
    pub row: usize,
    pub col: usize,
    pub before: Option<Cell>,
    pub after: Option<Cell>,
}

/// One undoable edit. Bulk operations (paste, import, clear, move) occupy a
/// single action so one undo reverses the whole thing.
#[derive(Debug, Clone, PartialEq)]
pub enum EditAction {
    /// Direct cell edits, style patches, and paste batches.
    Cells { changes: Vec<CellChange> },
    Merge { region: MergedRegion },
    Unmerge { region: MergedRegion },
    AddRow,
    AddColumn,
    /// Wholesale cell-map replacement from a tabular import.
    Import {
        before_cells: FxHashMap<(usize, usize), Cell>,
        after_cells: FxHashMap<(usize, usize), Cell>,
        before_dims: (usize, usize),
        after_dims: (usize, usize),
    },
    /// Formatting clear; values survive, so only prior cells are needed.
    Clear {
        before_cells: FxHashMap<(usize, usize), Cell>,
    },
    Move { changes: Vec<CellChange> },
}

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub action: EditAction,
    pub at: Instant,
}

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    /// Number of applied entries; the redo branch is `entries[cursor..]`.
    cursor: usize,
    max_entries: usize,
}

impl History {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            max_entries: MAX_HISTORY_ENTRIES,
        }
    }

    /// Record a new edit, discarding any redo branch. Oldest entries are
    /// evicted once the cap is reached.
    pub fn push(&mut self, action: EditAction) {
        self.entries.truncate(self.cursor);
        self.entries.push(HistoryEntry {
            action,
            at: Instant::now(),
        });
        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
        }
        self.cursor = self.entries.len();
    }

    /// Step the cursor back and return the action to invert. `None` when
    /// there is nothing to undo.
    pub fn undo(&mut self) -> Option<EditAction> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].action.clone())
    }

    /// Return the action at the cursor and advance. `None` when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> Option<EditAction> {
        if self.cursor == self.entries.len() {
            return None;
        }
        let action = self.entries[self.cursor].action.clone();
        self.cursor += 1;
        Some(action)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Timestamp of the most recent entry, applied or not.
    pub fn last_edit_at(&self) -> Option<Instant> {
        self.entries.last().map(|e| e.at)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
