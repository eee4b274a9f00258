// Native template format: the persisted JSON snapshot

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use gridform_engine::snapshot::GridSnapshot;

pub fn save(snapshot: &GridSnapshot, path: &Path) -> Result<(), String> {
    let file = File::create(path).map_err(|e| e.to_string())?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, snapshot).map_err(|e| e.to_string())?;
    Ok(())
}

pub fn load(path: &Path) -> Result<GridSnapshot, String> {
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&content).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    use gridform_engine::cell::CellPatch;
    use gridform_engine::session::GridSession;

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invoice.template.json");

        let mut session = GridSession::new(30, 8);
        session.set_cell_value(0, 0, "Invoice").unwrap();
        session
            .set_cell(
                0,
                0,
                &CellPatch {
                    bold: Some(true),
                    background_color: Some(Some("#FFF2CC".to_string())),
                    ..CellPatch::default()
                },
            )
            .unwrap();
        session.merge_cells(0, 0, 0, 7).unwrap();

        save(&session.snapshot(), &path).unwrap();
        let loaded = load(&path).unwrap();

        let restored = GridSession::from_snapshot(&loaded).unwrap();
        assert_eq!(restored.rows(), 30);
        assert_eq!(restored.get_cell(0, 0).value, "Invoice");
        assert!(restored.get_cell(0, 0).style.bold);
        assert_eq!(restored.merges().len(), 1);
    }

    #[test]
    fn test_file_uses_contract_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("keys.template.json");

        let mut session = GridSession::new(5, 5);
        session.set_cell_value(1, 1, "x").unwrap();
        save(&session.snapshot(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"rowCount\""));
        assert!(content.contains("\"colCount\""));
        assert!(content.contains("\"B2\""));
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.template.json");
        fs::write(&path, "{not json").unwrap();

        assert!(load(&path).is_err());
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(load(&dir.path().join("absent.json")).is_err());
    }
}
