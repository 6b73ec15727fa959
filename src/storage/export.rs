//! CSV export of session decisions for external auditing.

use std::fs;
use std::path::Path;

use crate::models::Decision;

const CSV_HEADER: &str = "track_id,track_name,artist,themes,skipped";

/// Write all decisions as CSV, one row per track in resolution order.
/// Theme keys are `|`-joined in a single column.
pub fn export_csv(decisions: &[Decision], path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = String::with_capacity(decisions.len() * 64 + CSV_HEADER.len());
    out.push_str(CSV_HEADER);
    out.push('\n');

    for d in decisions {
        let row = [
            csv_field(&d.track_id),
            csv_field(&d.track_name),
            csv_field(&d.artist),
            csv_field(&d.themes.join("|")),
            d.skipped.to_string(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, out)?;
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(id: &str, name: &str, themes: &[&str], skipped: bool) -> Decision {
        Decision {
            track_id: id.to_string(),
            track_name: name.to_string(),
            artist: "Artist".to_string(),
            themes: themes.iter().map(|t| t.to_string()).collect(),
            skipped,
        }
    }

    #[test]
    fn test_export_mixed_decisions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        let decisions = vec![
            decision("t1", "One", &["ambiance"], false),
            decision("t2", "Two", &[], true),
            decision("t3", "Three", &["lets_dance"], false),
        ];
        export_csv(&decisions, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let rows: Vec<&str> = content.lines().collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], "track_id,track_name,artist,themes,skipped");
        assert_eq!(rows[1], "t1,One,Artist,ambiance,false");
        assert_eq!(rows[2], "t2,Two,Artist,,true");
        assert_eq!(rows[3], "t3,Three,Artist,lets_dance,false");
    }

    #[test]
    fn test_multi_theme_column_is_pipe_joined() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        export_csv(
            &[decision("t1", "One", &["ambiance", "lets_dance"], false)],
            &path,
        )
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("ambiance|lets_dance"));
    }

    #[test]
    fn test_fields_with_commas_and_quotes_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        export_csv(
            &[decision("t1", "Hello, \"World\"", &["ambiance"], false)],
            &path,
        )
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"Hello, \"\"World\"\"\""));
    }

    #[test]
    fn test_empty_decision_list_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        export_csv(&[], &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "track_id,track_name,artist,themes,skipped\n");
    }
}
