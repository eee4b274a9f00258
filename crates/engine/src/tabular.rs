//! Flattened sheet form consumed by the file exporters.

use crate::cell::CellStyle;
use crate::grid::{Grid, MergedRegion};

/// One exported cell record.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularCell {
    pub row: usize,
    pub col: usize,
    pub text: String,
    pub style: CellStyle,
}

/// Suppressed-view export of a grid: dimensions, merge list, and one record
/// per non-empty stored cell in row-major order. Covered non-origin cells
/// are dropped; styled cells with no text keep their record so formats
/// survive the trip.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularSheet {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<TabularCell>,
    pub merges: Vec<MergedRegion>,
}

impl TabularSheet {
    pub fn from_grid(grid: &Grid) -> Self {
        let mut cells: Vec<TabularCell> = grid
            .cells_iter()
            .filter(|(&(row, col), _)| {
                grid.merge_at(row, col)
                    .map_or(true, |m| m.origin() == (row, col))
            })
            .map(|(&(row, col), cell)| TabularCell {
                row,
                col,
                text: cell.value.clone(),
                style: cell.style.clone(),
            })
            .collect();
        cells.sort_by_key(|c| (c.row, c.col));

        let mut merges = grid.merges().to_vec();
        merges.sort_by_key(|m| m.start);

        Self {
            rows: grid.rows,
            cols: grid.cols,
            cells,
            merges,
        }
    }

    /// Dense `rows x cols` matrix of cell texts, empty string for absent
    /// cells. This is what delimited-text export writes.
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        let mut out = vec![vec![String::new(); self.cols]; self.rows];
        for cell in &self.cells {
            if cell.row < self.rows && cell.col < self.cols {
                out[cell.row][cell.col] = cell.text.clone();
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    #[test]
    fn test_export_is_sorted_and_skips_covered() {
        let mut grid = Grid::new(6, 6);
        grid.set_cell(3, 1, Cell::with_value("later")).unwrap();
        grid.set_cell(0, 0, Cell::with_value("first")).unwrap();
        grid.set_cell(0, 2, Cell::with_value("hidden")).unwrap();
        grid.add_merge(MergedRegion::new(0, 1, 1, 3)).unwrap();

        let sheet = TabularSheet::from_grid(&grid);

        let positions: Vec<_> = sheet.cells.iter().map(|c| (c.row, c.col)).collect();
        assert_eq!(positions, vec![(0, 0), (3, 1)], "covered cell (0,2) dropped");
        assert_eq!(sheet.merges, vec![MergedRegion::new(0, 1, 1, 3)]);
        assert_eq!((sheet.rows, sheet.cols), (6, 6));
    }

    #[test]
    fn test_merge_origin_is_exported() {
        let mut grid = Grid::new(4, 4);
        grid.set_cell(1, 1, Cell::with_value("origin")).unwrap();
        grid.add_merge(MergedRegion::new(1, 1, 2, 2)).unwrap();

        let sheet = TabularSheet::from_grid(&grid);
        assert_eq!(sheet.cells.len(), 1);
        assert_eq!(sheet.cells[0].text, "origin");
    }

    #[test]
    fn test_styled_empty_cell_keeps_its_record() {
        let mut grid = Grid::new(3, 3);
        let mut cell = Cell::new();
        cell.style.background_color = Some("#D9EAD3".to_string());
        grid.set_cell(2, 0, cell).unwrap();

        let sheet = TabularSheet::from_grid(&grid);
        assert_eq!(sheet.cells.len(), 1);
        assert_eq!(sheet.cells[0].text, "");
        assert_eq!(
            sheet.cells[0].style.background_color.as_deref(),
            Some("#D9EAD3")
        );
    }

    #[test]
    fn test_text_rows_is_dense() {
        let mut grid = Grid::new(2, 3);
        grid.set_cell(0, 1, Cell::with_value("b")).unwrap();
        grid.set_cell(1, 2, Cell::with_value("f")).unwrap();

        let rows = TabularSheet::from_grid(&grid).text_rows();
        assert_eq!(
            rows,
            vec![
                vec!["".to_string(), "b".to_string(), "".to_string()],
                vec!["".to_string(), "".to_string(), "f".to_string()],
            ]
        );
    }
}
