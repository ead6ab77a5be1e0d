// Tracebar - core/export.rs
//
// CSV and JSON export of storage log entries and snapshots.
// Core layer: writes to any Write trait object.

use crate::core::model::{LogEntry, ProfilerSnapshot};
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Export storage log entries to CSV format.
///
/// Writes: timestamp, level, header, body. Returns the number of rows.
pub fn export_entries_csv<W: Write>(
    entries: &[LogEntry],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["timestamp", "level", "header", "body"])
        .map_err(|e| ExportError::Csv {
            path: export_path.to_path_buf(),
            source: e,
        })?;

    let mut count = 0;
    for entry in entries {
        let ts = entry
            .timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();

        csv_writer
            .write_record([&ts, entry.level.label(), &entry.header, &entry.body])
            .map_err(|e| ExportError::Csv {
                path: export_path.to_path_buf(),
                source: e,
            })?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// Export storage log entries to JSON format (array of objects).
pub fn export_entries_json<W: Write>(
    entries: &[LogEntry],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, entries).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(entries.len())
}

/// Export a full snapshot to JSON format.
pub fn export_snapshot_json<W: Write>(
    snapshot: &ProfilerSnapshot,
    writer: W,
    export_path: &Path,
) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, snapshot).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::LogLevel;
    use std::path::PathBuf;

    fn make_entry(header: &str, body: &str, level: LogLevel) -> LogEntry {
        LogEntry {
            level,
            header: header.to_string(),
            body: body.to_string(),
            timestamp: None,
        }
    }

    #[test]
    fn test_csv_export() {
        let entries = vec![
            make_entry("[2024-01-01 10:05:00] app.WARNING: slow", "", LogLevel::Warning),
            make_entry(
                "[2024-01-01 10:00:00] app.ERROR: boom",
                "stack trace\n",
                LogLevel::Error,
            ),
        ];
        let mut buf = Vec::new();
        let count = export_entries_csv(&entries, &mut buf, &PathBuf::from("out.csv")).unwrap();
        assert_eq!(count, 2);

        let output = String::from_utf8(buf).unwrap();
        assert!(output.starts_with("timestamp,level,header,body"));
        assert!(output.contains("WARNING"));
        assert!(output.contains("app.ERROR: boom"));
    }

    #[test]
    fn test_json_export_round_trips_level() {
        let entries = vec![make_entry(
            "[2024-01-01 10:00:00] app.ERROR: boom",
            "stack trace\n",
            LogLevel::Error,
        )];
        let mut buf = Vec::new();
        let count = export_entries_json(&entries, &mut buf, &PathBuf::from("out.json")).unwrap();
        assert_eq!(count, 1);

        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed[0]["level"], "ERROR");
        assert_eq!(parsed[0]["body"], "stack trace\n");
    }
}
