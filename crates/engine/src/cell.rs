use serde::{Deserialize, Serialize};

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Cell styling attributes
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CellStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub align: Alignment,
    pub background_color: Option<String>, // "#RRGGBB"; None = unset
    pub text_color: Option<String>,
    pub font_size: Option<f32>, // points; None = host default
    pub border_top: bool,
    pub border_right: bool,
    pub border_bottom: bool,
    pub border_left: bool,
}

impl CellStyle {
    pub fn is_default(&self) -> bool {
        *self == CellStyle::default()
    }
}

/// A single grid cell: display text plus styling.
///
/// A cell absent from the grid map reads as `Cell::default()`; writes that
/// leave a cell fully default are not materialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cell {
    pub value: String,
    pub style: CellStyle,
    /// Marks a template substitution cell (informational only)
    pub placeholder: bool,
}

impl Cell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: &str) -> Self {
        Cell {
            value: value.to_string(),
            ..Cell::default()
        }
    }

    /// True when the cell is indistinguishable from an absent one
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && !self.placeholder && self.style.is_default()
    }
}

/// Partial cell update. Fields left as `None` keep their current value;
/// for the clearable attributes, `Some(None)` resets them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellPatch {
    pub value: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub align: Option<Alignment>,
    pub background_color: Option<Option<String>>,
    pub text_color: Option<Option<String>>,
    pub font_size: Option<Option<f32>>,
    pub border_top: Option<bool>,
    pub border_right: Option<bool>,
    pub border_bottom: Option<bool>,
    pub border_left: Option<bool>,
    pub placeholder: Option<bool>,
}

impl CellPatch {
    pub fn value(text: &str) -> Self {
        CellPatch {
            value: Some(text.to_string()),
            ..CellPatch::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == CellPatch::default()
    }

    /// Shallow merge into an existing cell
    pub fn apply(&self, cell: &mut Cell) {
        if let Some(v) = &self.value {
            cell.value = v.clone();
        }
        if let Some(b) = self.bold {
            cell.style.bold = b;
        }
        if let Some(i) = self.italic {
            cell.style.italic = i;
        }
        if let Some(u) = self.underline {
            cell.style.underline = u;
        }
        if let Some(a) = self.align {
            cell.style.align = a;
        }
        if let Some(bg) = &self.background_color {
            cell.style.background_color = bg.clone();
        }
        if let Some(tc) = &self.text_color {
            cell.style.text_color = tc.clone();
        }
        if let Some(fs) = self.font_size {
            cell.style.font_size = fs;
        }
        if let Some(b) = self.border_top {
            cell.style.border_top = b;
        }
        if let Some(b) = self.border_right {
            cell.style.border_right = b;
        }
        if let Some(b) = self.border_bottom {
            cell.style.border_bottom = b;
        }
        if let Some(b) = self.border_left {
            cell.style.border_left = b;
        }
        if let Some(p) = self.placeholder {
            cell.placeholder = p;
        }
    }
}
