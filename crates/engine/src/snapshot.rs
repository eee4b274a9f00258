//! Persisted document snapshot.
//!
//! The JSON shape here is the on-disk contract shared with the host app:
//! camelCase keys, cells keyed by A1 address, merge spans as corner pairs.
//! Attributes at their default are omitted on write and restored on read,
//! so files stay small and hand-edited files with sparse cells still load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::address::{cell_address, parse_address};
use crate::cell::{Alignment, Cell, CellStyle};
use crate::error::GridError;
use crate::grid::{Grid, MergedRegion};

/// Serialized form of one non-default cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellAttrs {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(skip_serializing_if = "is_left")]
    pub align: Alignment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(skip_serializing_if = "is_false")]
    pub border_top: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub border_right: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub border_bottom: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub border_left: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_placeholder: bool,
}

fn is_false(v: &bool) -> bool {
    !*v
}

fn is_left(a: &Alignment) -> bool {
    *a == Alignment::Left
}

impl CellAttrs {
    fn from_cell(cell: &Cell) -> Self {
        Self {
            value: cell.value.clone(),
            bold: cell.style.bold,
            italic: cell.style.italic,
            underline: cell.style.underline,
            align: cell.style.align,
            background_color: cell.style.background_color.clone(),
            text_color: cell.style.text_color.clone(),
            font_size: cell.style.font_size,
            border_top: cell.style.border_top,
            border_right: cell.style.border_right,
            border_bottom: cell.style.border_bottom,
            border_left: cell.style.border_left,
            is_placeholder: cell.placeholder,
        }
    }

    fn to_cell(&self) -> Cell {
        Cell {
            value: self.value.clone(),
            style: CellStyle {
                bold: self.bold,
                italic: self.italic,
                underline: self.underline,
                align: self.align,
                background_color: self.background_color.clone(),
                text_color: self.text_color.clone(),
                font_size: self.font_size,
                border_top: self.border_top,
                border_right: self.border_right,
                border_bottom: self.border_bottom,
                border_left: self.border_left,
            },
            placeholder: self.is_placeholder,
        }
    }
}

/// One merged rectangle, as inclusive zero-based corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeSpan {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl MergeSpan {
    fn from_region(region: &MergedRegion) -> Self {
        Self {
            start_row: region.start.0,
            start_col: region.start.1,
            end_row: region.end.0,
            end_col: region.end.1,
        }
    }

    fn to_region(&self) -> MergedRegion {
        MergedRegion::new(self.start_row, self.start_col, self.end_row, self.end_col)
    }
}

/// Complete document state in its serialized layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSnapshot {
    pub row_count: usize,
    pub col_count: usize,
    #[serde(default)]
    pub cells: BTreeMap<String, CellAttrs>,
    #[serde(default)]
    pub merges: Vec<MergeSpan>,
}

impl GridSnapshot {
    /// Capture raw storage. Merge suppression does not apply here: covered
    /// cells serialize too, so a round trip restores them.
    pub fn from_grid(grid: &Grid) -> Self {
        let mut cells = BTreeMap::new();
        for (&(row, col), cell) in grid.cells_iter() {
            if cell.is_empty() {
                continue;
            }
            cells.insert(cell_address(row, col), CellAttrs::from_cell(cell));
        }
        let mut merges: Vec<MergeSpan> =
            grid.merges().iter().map(MergeSpan::from_region).collect();
        merges.sort_by_key(|m| (m.start_row, m.start_col));
        Self {
            row_count: grid.rows,
            col_count: grid.cols,
            cells,
            merges,
        }
    }

    /// Validate and rebuild the grid. Bad addresses, cells or merges outside
    /// the declared dimensions, and overlapping merges all fail the load.
    pub fn to_grid(&self) -> Result<Grid, GridError> {
        let mut grid = Grid::new(self.row_count, self.col_count);
        for (addr, attrs) in &self.cells {
            let (row, col) = parse_address(addr)?;
            grid.set_cell(row, col, attrs.to_cell())?;
        }
        for span in &self.merges {
            grid.add_merge(span.to_region())?;
        }
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_json_field_names() {
        let mut grid = Grid::new(30, 8);
        let mut cell = Cell::with_value("Invoice");
        cell.style.bold = true;
        cell.style.align = Alignment::Center;
        cell.style.background_color = Some("#FFF2CC".to_string());
        cell.style.text_color = Some("#7F6000".to_string());
        cell.style.font_size = Some(14.0);
        cell.style.border_top = true;
        cell.style.border_bottom = true;
        grid.set_cell(0, 0, cell).unwrap();
        grid.add_merge(MergedRegion::new(0, 0, 0, 7)).unwrap();

        let snapshot = GridSnapshot::from_grid(&grid);
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["rowCount"], 30);
        assert_eq!(json["colCount"], 8);

        let a1 = &json["cells"]["A1"];
        assert_eq!(a1["value"], "Invoice");
        assert_eq!(a1["bold"], true);
        assert_eq!(a1["align"], "center");
        assert_eq!(a1["backgroundColor"], "#FFF2CC");
        assert_eq!(a1["textColor"], "#7F6000");
        assert_eq!(a1["fontSize"], 14.0);
        assert_eq!(a1["borderTop"], true);
        assert_eq!(a1["borderBottom"], true);
        assert!(a1.get("italic").is_none(), "default attrs are omitted");
        assert!(a1.get("isPlaceholder").is_none());

        let merge = &json["merges"][0];
        assert_eq!(merge["startRow"], 0);
        assert_eq!(merge["startCol"], 0);
        assert_eq!(merge["endRow"], 0);
        assert_eq!(merge["endCol"], 7);
    }

    #[test]
    fn test_empty_grid_serializes_empty_collections() {
        let snapshot = GridSnapshot::from_grid(&Grid::new(10, 4));
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["rowCount"], 10);
        assert!(json["cells"].as_object().unwrap().is_empty());
        assert!(json["merges"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_reproduces_grid() {
        let mut grid = Grid::new(12, 6);
        grid.set_cell(0, 0, Cell::with_value("Title")).unwrap();
        grid.set_cell(1, 1, Cell::with_value("covered")).unwrap();
        let mut styled = Cell::with_value("{total}");
        styled.placeholder = true;
        styled.style.border_left = true;
        styled.style.font_size = Some(11.5);
        grid.set_cell(4, 2, styled).unwrap();
        grid.add_merge(MergedRegion::new(1, 0, 2, 2)).unwrap();

        let text = serde_json::to_string(&GridSnapshot::from_grid(&grid)).unwrap();
        let parsed: GridSnapshot = serde_json::from_str(&text).unwrap();
        let restored = parsed.to_grid().unwrap();

        assert_eq!(restored.rows, 12);
        assert_eq!(restored.cols, 6);
        assert_eq!(restored.get_stored(0, 0).unwrap().value, "Title");
        assert_eq!(
            restored.get_stored(1, 1).unwrap().value,
            "covered",
            "suppressed content persists through storage"
        );
        let cell = restored.get_stored(4, 2).unwrap();
        assert!(cell.placeholder);
        assert_eq!(cell.style.font_size, Some(11.5));
        assert!(cell.style.border_left);
        assert_eq!(restored.merges(), grid.merges());
    }

    #[test]
    fn test_missing_attributes_default_on_read() {
        let text = r#"{"rowCount":4,"colCount":3,"cells":{"B2":{"value":"x"}}}"#;
        let snapshot: GridSnapshot = serde_json::from_str(text).unwrap();
        let grid = snapshot.to_grid().unwrap();

        let cell = grid.get_cell(1, 1);
        assert_eq!(cell.value, "x");
        assert_eq!(cell.style, CellStyle::default());
        assert!(!cell.placeholder);
        assert!(grid.merges().is_empty());
    }

    #[test]
    fn test_load_rejects_cell_outside_dimensions() {
        let text = r#"{"rowCount":2,"colCount":2,"cells":{"E9":{"value":"x"}}}"#;
        let snapshot: GridSnapshot = serde_json::from_str(text).unwrap();
        assert!(matches!(
            snapshot.to_grid(),
            Err(GridError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_load_rejects_bad_address_key() {
        let text = r#"{"rowCount":2,"colCount":2,"cells":{"9E":{"value":"x"}}}"#;
        let snapshot: GridSnapshot = serde_json::from_str(text).unwrap();
        assert!(matches!(
            snapshot.to_grid(),
            Err(GridError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_load_rejects_overlapping_merges() {
        let text = r#"{
            "rowCount": 5, "colCount": 5, "cells": {},
            "merges": [
                {"startRow": 0, "startCol": 0, "endRow": 1, "endCol": 1},
                {"startRow": 1, "startCol": 1, "endRow": 2, "endCol": 2}
            ]
        }"#;
        let snapshot: GridSnapshot = serde_json::from_str(text).unwrap();
        assert!(matches!(
            snapshot.to_grid(),
            Err(GridError::MergeOverlap { .. })
        ));
    }

    #[test]
    fn test_load_rejects_merge_outside_dimensions() {
        let text = r#"{
            "rowCount": 3, "colCount": 3,
            "merges": [{"startRow": 0, "startCol": 0, "endRow": 0, "endCol": 6}]
        }"#;
        let snapshot: GridSnapshot = serde_json::from_str(text).unwrap();
        assert!(matches!(
            snapshot.to_grid(),
            Err(GridError::OutOfBounds { .. })
        ));
    }
}
