// CSV/TSV import/export

use std::path::Path;

use gridform_engine::tabular::TabularSheet;

/// Import a delimited text file, sniffing the delimiter.
pub fn import(path: &Path) -> Result<Vec<Vec<Option<String>>>, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_str(&content, delimiter)
}

pub fn import_with_delimiter(path: &Path, delimiter: u8) -> Result<Vec<Vec<Option<String>>>, String> {
    let content = read_file_as_utf8(path)?;
    import_str(&content, delimiter)
}

/// Parse delimited text into import rows. Empty fields become `None` so
/// they stay absent instead of materializing empty cells.
pub fn import_str(content: &str, delimiter: u8) -> Result<Vec<Vec<Option<String>>>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        None
                    } else {
                        Some(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(rows)
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let field_count = |line: &str, delim: u8| -> usize {
        csv::ReaderBuilder::new()
            .delimiter(delim)
            .has_headers(false)
            .flexible(true)
            .from_reader(line.as_bytes())
            .records()
            .next()
            .and_then(|r| r.ok())
            .map(|r| r.len())
            .unwrap_or(1)
    };

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let target = field_count(sample_lines[0], delim);
        // Must produce >1 field on the first line to be viable
        if target <= 1 {
            continue;
        }

        // Score: (lines matching the first line's field count) * field_count.
        // Higher field count breaks ties between consistent candidates.
        let consistent = sample_lines
            .iter()
            .filter(|line| field_count(line, delim) == target)
            .count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            // Windows-1252 covers most Excel-exported CSVs that are not UTF-8
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

pub fn export(sheet: &TabularSheet, path: &Path) -> Result<(), String> {
    export_with_delimiter(sheet, path, b',')
}

pub fn export_tsv(sheet: &TabularSheet, path: &Path) -> Result<(), String> {
    export_with_delimiter(sheet, path, b'\t')
}

fn export_with_delimiter(sheet: &TabularSheet, path: &Path, delimiter: u8) -> Result<(), String> {
    // Trailing empties are trimmed and blank rows skipped, so rows can have
    // different field counts.
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| e.to_string())?;

    for mut record in sheet.text_rows() {
        let width = record
            .iter()
            .rposition(|value| !value.is_empty())
            .map_or(0, |i| i + 1);
        if width == 0 {
            continue;
        }
        record.truncate(width);
        writer.write_record(&record).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}
