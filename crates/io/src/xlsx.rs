// Excel file import (xlsx, xls, xlsb, ods) and export (xlsx only)
//
// Import: text only, first worksheet. Styles and merges in the source file
//         are ignored.
// Export: presentation snapshot for sharing. Not a round-trip format.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, FormatUnderline, Workbook, Worksheet,
};

use gridform_engine::cell::{Alignment, CellStyle};
use gridform_engine::tabular::TabularSheet;

/// Maximum dimensions accepted on import
const MAX_ROWS: usize = 10_000;
const MAX_COLS: usize = 256;

/// Result of an Excel import operation
#[derive(Debug, Default)]
pub struct ImportReport {
    pub cells_imported: usize,
    pub rows_read: usize,
    pub truncated: bool,
    pub warnings: Vec<String>,
}

impl ImportReport {
    /// Returns a summary message suitable for display
    pub fn summary(&self) -> String {
        format!("{} rows, {} cells", self.rows_read, self.cells_imported)
    }
}

/// Result of an Excel export operation
#[derive(Debug, Default)]
pub struct ExportReport {
    pub cells_written: usize,
    pub merges_written: usize,
    pub colors_skipped: usize,
}

impl ExportReport {
    /// Returns a summary message suitable for display
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{} cells", self.cells_written)];
        if self.merges_written > 0 {
            parts.push(format!("{} merged regions", self.merges_written));
        }
        if self.colors_skipped > 0 {
            parts.push(format!("{} colors skipped", self.colors_skipped));
        }
        parts.join(", ")
    }
}

/// Import the first worksheet of an Excel file (xlsx, xls, xlsb, ods) as
/// text rows for `GridSession::import_rows`.
pub fn import(path: &Path) -> Result<(Vec<Vec<Option<String>>>, ImportReport), String> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let first = sheet_names
        .first()
        .cloned()
        .ok_or_else(|| "Excel file contains no sheets".to_string())?;

    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| format!("Failed to read sheet '{}': {}", first, e))?;

    let mut report = ImportReport::default();
    if sheet_names.len() > 1 {
        report.warnings.push(format!(
            "Imported only sheet '{}' of {}",
            first,
            sheet_names.len()
        ));
    }

    let (height, width) = range.get_size();
    if height == 0 || width == 0 {
        return Ok((Vec::new(), report));
    }

    // Data may not start at A1; keep absolute positions so a table pasted
    // at B2 in Excel imports at B2 here.
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let total_rows = (start_row as usize + height).min(MAX_ROWS);
    let total_cols = (start_col as usize + width).min(MAX_COLS);

    if start_row as usize + height > MAX_ROWS || start_col as usize + width > MAX_COLS {
        report.truncated = true;
        log::warn!(
            "Sheet '{}' exceeds {}x{}, truncating",
            first,
            MAX_ROWS,
            MAX_COLS
        );
        report.warnings.push(format!(
            "Sheet truncated to {}x{}",
            total_rows, total_cols
        ));
    }

    let mut rows: Vec<Vec<Option<String>>> = vec![vec![None; total_cols]; total_rows];
    for (row_idx, row) in range.rows().enumerate() {
        let target_row = start_row as usize + row_idx;
        if target_row >= total_rows {
            break;
        }
        for (col_idx, value) in row.iter().enumerate() {
            let target_col = start_col as usize + col_idx;
            if target_col >= total_cols {
                break;
            }
            if let Some(text) = cell_text(value) {
                rows[target_row][target_col] = Some(text);
                report.cells_imported += 1;
            }
        }
    }

    report.rows_read = rows.len();
    Ok((rows, report))
}

fn cell_text(value: &Data) -> Option<String> {
    match value {
        Data::Empty => None,
        Data::String(s) => {
            if s.is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        Data::Float(n) => Some(format_number(*n)),
        Data::Int(n) => Some(n.to_string()),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => Some(format!("#{:?}", e)),
        Data::DateTime(dt) => Some(format_number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

/// Format numbers the way a user typed them: integers without decimals
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Export a sheet to XLSX format
pub fn export(sheet: &TabularSheet, path: &Path) -> Result<ExportReport, String> {
    let mut report = ExportReport::default();
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    // Merged regions go first: merge_range() writes blanks to every cell in
    // the span, then the origin cell below overwrites the blank.
    let merge_format = Format::new();
    for merge in &sheet.merges {
        worksheet
            .merge_range(
                merge.start.0 as u32,
                merge.start.1 as u16,
                merge.end.0 as u32,
                merge.end.1 as u16,
                "",
                &merge_format,
            )
            .map_err(|e| format!("Failed to write merge: {}", e))?;
        report.merges_written += 1;
    }

    for cell in &sheet.cells {
        let format = build_format(&cell.style, &mut report);
        write_cell(worksheet, cell.row, cell.col, &cell.text, &format)?;
        report.cells_written += 1;
    }

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;
    Ok(report)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: usize,
    col: usize,
    text: &str,
    format: &Format,
) -> Result<(), String> {
    let result = if text.is_empty() {
        // Styled cell with no text: blank write carries the format
        worksheet.write_blank(row as u32, col as u16, format)
    } else {
        worksheet.write_string_with_format(row as u32, col as u16, text, format)
    };
    result
        .map(|_| ())
        .map_err(|e| format!("Failed to write cell ({}, {}): {}", row, col, e))
}

fn build_format(style: &CellStyle, report: &mut ExportReport) -> Format {
    let mut format = Format::new();

    if style.bold {
        format = format.set_bold();
    }
    if style.italic {
        format = format.set_italic();
    }
    if style.underline {
        format = format.set_underline(FormatUnderline::Single);
    }
    if let Some(size) = style.font_size {
        format = format.set_font_size(size as f64);
    }

    format = match style.align {
        Alignment::Left => format.set_align(FormatAlign::Left),
        Alignment::Center => format.set_align(FormatAlign::Center),
        Alignment::Right => format.set_align(FormatAlign::Right),
    };

    if let Some(ref hex) = style.background_color {
        match parse_hex_color(hex) {
            Some(rgb) => format = format.set_background_color(Color::RGB(rgb)),
            None => {
                log::warn!("Skipping unparseable background color '{}'", hex);
                report.colors_skipped += 1;
            }
        }
    }
    if let Some(ref hex) = style.text_color {
        match parse_hex_color(hex) {
            Some(rgb) => format = format.set_font_color(Color::RGB(rgb)),
            None => {
                log::warn!("Skipping unparseable text color '{}'", hex);
                report.colors_skipped += 1;
            }
        }
    }

    if style.border_top {
        format = format.set_border_top(FormatBorder::Thin);
    }
    if style.border_right {
        format = format.set_border_right(FormatBorder::Thin);
    }
    if style.border_bottom {
        format = format.set_border_bottom(FormatBorder::Thin);
    }
    if style.border_left {
        format = format.set_border_left(FormatBorder::Thin);
    }

    format
}

/// Parse "#RRGGBB" (or bare "RRGGBB") into a packed RGB value
fn parse_hex_color(hex: &str) -> Option<u32> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    use gridform_engine::cell::CellPatch;
    use gridform_engine::session::GridSession;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FFF2CC"), Some(0xFFF2CC));
        assert_eq!(parse_hex_color("7F6000"), Some(0x7F6000));
        assert_eq!(parse_hex_color("#000000"), Some(0));
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("#GGGGGG"), None);
        assert_eq!(parse_hex_color(""), None);
    }

    #[test]
    fn test_export_basic() {
        let mut session = GridSession::new(10, 4);
        session.set_cell_value(0, 0, "Invoice").unwrap();
        session.set_cell_value(1, 0, "Item").unwrap();
        session.set_cell_value(1, 1, "Qty").unwrap();
        session.merge_cells(0, 0, 0, 3).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("export.xlsx");
        let report = export(&session.export_tabular(), &path).unwrap();

        assert_eq!(report.cells_written, 3);
        assert_eq!(report.merges_written, 1);
        assert_eq!(report.colors_skipped, 0);
        assert_eq!(report.summary(), "3 cells, 1 merged regions");
        assert!(path.exists());

        // XLSX is a ZIP; a real file has meaningful size
        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 100);
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut session = GridSession::new(6, 4);
        session.set_cell_value(0, 0, "Title").unwrap();
        session.set_cell_value(2, 1, "Widget").unwrap();
        session.set_cell_value(2, 2, "3").unwrap();
        session.merge_cells(0, 0, 0, 3).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("round.xlsx");
        export(&session.export_tabular(), &path).unwrap();

        let (rows, report) = import(&path).unwrap();
        assert_eq!(rows[0][0].as_deref(), Some("Title"));
        assert_eq!(rows[2][1].as_deref(), Some("Widget"));
        assert_eq!(rows[2][2].as_deref(), Some("3"));
        assert!(rows[0][1].is_none(), "merged blanks import as absent");
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_export_styled_cells() {
        let mut session = GridSession::new(5, 5);
        session
            .set_cell(
                0,
                0,
                &CellPatch {
                    value: Some("Total".to_string()),
                    bold: Some(true),
                    background_color: Some(Some("#FFF2CC".to_string())),
                    font_size: Some(Some(14.0)),
                    border_bottom: Some(true),
                    ..CellPatch::default()
                },
            )
            .unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("styled.xlsx");
        let report = export(&session.export_tabular(), &path).unwrap();

        assert_eq!(report.cells_written, 1);
        assert_eq!(report.colors_skipped, 0);
    }

    #[test]
    fn test_export_skips_bad_colors() {
        let mut session = GridSession::new(3, 3);
        session
            .set_cell(
                1,
                1,
                &CellPatch {
                    value: Some("x".to_string()),
                    background_color: Some(Some("sunshine".to_string())),
                    ..CellPatch::default()
                },
            )
            .unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("colors.xlsx");
        let report = export(&session.export_tabular(), &path).unwrap();

        assert_eq!(report.colors_skipped, 1);
        assert_eq!(report.cells_written, 1, "cell still written without the color");
    }

    #[test]
    fn test_import_numbers_as_typed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("numbers.xlsx");

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_number(0, 0, 42.0).unwrap();
        worksheet.write_number(0, 1, 3.5).unwrap();
        worksheet.write_string(1, 0, "note").unwrap();
        workbook.save(&path).unwrap();

        let (rows, report) = import(&path).unwrap();
        assert_eq!(rows[0][0].as_deref(), Some("42"), "integer without decimals");
        assert_eq!(rows[0][1].as_deref(), Some("3.5"));
        assert_eq!(rows[1][0].as_deref(), Some("note"));
        assert_eq!(report.cells_imported, 3);
        assert_eq!(report.summary(), "2 rows, 3 cells");
    }

    #[test]
    fn test_import_multi_sheet_warns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("multi.xlsx");

        let mut workbook = Workbook::new();
        workbook.add_worksheet().write_string(0, 0, "first").unwrap();
        workbook.add_worksheet().write_string(0, 0, "second").unwrap();
        workbook.save(&path).unwrap();

        let (rows, report) = import(&path).unwrap();
        assert_eq!(rows[0][0].as_deref(), Some("first"));
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Sheet1"));
    }

    #[test]
    fn test_import_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(import(&dir.path().join("absent.xlsx")).is_err());
    }
}
