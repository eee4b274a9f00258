use std::fmt;

use crate::grid::MergedRegion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// A1 address that does not parse (empty, bad characters, row 0).
    InvalidAddress(String),
    /// Resize that would shrink a dimension.
    InvalidResize { from: (usize, usize), to: (usize, usize) },
    /// Merge request sharing at least one cell with an existing region.
    MergeOverlap { requested: MergedRegion, existing: MergedRegion },
    /// Cell or region outside the grid dimensions.
    OutOfBounds { row: usize, col: usize, rows: usize, cols: usize },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAddress(addr) => write!(f, "invalid cell address '{addr}'"),
            Self::InvalidResize { from, to } => {
                write!(
                    f,
                    "cannot shrink grid from {}x{} to {}x{}",
                    from.0, from.1, to.0, to.1
                )
            }
            Self::MergeOverlap { requested, existing } => {
                write!(f, "merge {requested} overlaps existing region {existing}")
            }
            Self::OutOfBounds { row, col, rows, cols } => {
                write!(
                    f,
                    "cell ({row}, {col}) is outside the {rows}x{cols} grid"
                )
            }
        }
    }
}

impl std::error::Error for GridError {}
