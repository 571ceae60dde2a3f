//! Reading activity logs from disk.
//!
//! A log is either a JSON array of entries or JSON Lines, one entry per
//! line. Items that are not entry objects are kept as empty raw entries so
//! validation rejects and counts them like any other malformed entry.

use super::RawHabitEntry;
use crate::error::{DnaError, DnaResult};
use serde_json::Value;
use std::path::Path;

/// Read and parse an activity log file.
pub fn read_log(path: &Path) -> DnaResult<Vec<RawHabitEntry>> {
    let content = std::fs::read_to_string(path)?;
    parse_log(&content)
        .map_err(|e| DnaError::input(format!("{}: {e}", path.display())))
}

/// Parse an activity log from a JSON array or JSON Lines.
pub fn parse_log(content: &str) -> DnaResult<Vec<RawHabitEntry>> {
    let trimmed = content.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        let items: Vec<Value> = serde_json::from_str(trimmed)?;
        return Ok(items.into_iter().map(to_raw).collect());
    }

    let mut raws = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(value) => raws.push(to_raw(value)),
            Err(e) => {
                tracing::debug!(line = number + 1, "unreadable log line: {e}");
                raws.push(RawHabitEntry::default());
            }
        }
    }
    Ok(raws)
}

fn to_raw(value: Value) -> RawHabitEntry {
    serde_json::from_value(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::validate_entries;

    #[test]
    fn test_parse_array() {
        let raws = parse_log(
            r#"[
                {"category": "sleep", "value": 8, "unit": "h", "timestamp": "2024-05-01T07:00:00Z"},
                {"category": "exercise", "timestamp": "2024-05-01T18:00:00Z"}
            ]"#,
        )
        .unwrap();

        assert_eq!(raws.len(), 2);
        let (entries, skipped) = validate_entries(raws);
        assert_eq!(entries.len(), 2);
        assert_eq!(skipped, 0);
    }

    #[test]
    fn test_parse_json_lines_with_garbage() {
        let content = "\
{\"category\": \"social\", \"value\": 1, \"timestamp\": \"2024-05-01T12:00:00Z\"}
not json at all

42
{\"category\": \"learning\", \"value\": \"3.5\", \"timestamp\": \"2024-05-02T12:00:00Z\"}
";
        let raws = parse_log(content).unwrap();
        assert_eq!(raws.len(), 4);

        let (entries, skipped) = validate_entries(raws);
        assert_eq!(entries.len(), 2);
        assert_eq!(skipped, 2);
        assert_eq!(entries[1].value, Some(3.5));
    }

    #[test]
    fn test_empty_log() {
        assert!(parse_log("").unwrap().is_empty());
        assert!(parse_log("  \n").unwrap().is_empty());
        assert!(parse_log("[]").unwrap().is_empty());
    }

    #[test]
    fn test_broken_array_is_an_error() {
        assert!(parse_log("[{\"category\": ").is_err());
    }

    #[test]
    fn test_read_log_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        std::fs::write(
            &path,
            "{\"category\": \"sleep\", \"value\": 2, \"timestamp\": \"2024-05-01T12:00:00Z\"}\n",
        )
        .unwrap();

        assert_eq!(read_log(&path).unwrap().len(), 1);
        assert!(read_log(&dir.path().join("missing.json")).is_err());
    }
}
