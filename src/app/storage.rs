// Tracebar - app/storage.rs
//
// Storage log file access: per-day path computation, bounded tail reads,
// and discovery of rotated daily files. The only module that touches the
// storage directory; parsing itself lives in `core::parser`.

use crate::core::model::{DiscoveredLog, LogEntry};
use crate::core::parser;
use crate::util::constants;
use crate::util::error::StorageError;
use chrono::{Local, NaiveDate};
use std::fs;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Path of the rotating log file for `date` inside `dir`
/// (`<dir>/log-YYYY-MM-DD.txt`).
pub fn daily_log_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!(
        "{}{}{}",
        constants::LOG_FILE_PREFIX,
        date.format("%Y-%m-%d"),
        constants::LOG_FILE_SUFFIX
    ))
}

/// Path of today's log file inside `dir`, using the local date.
pub fn today_log_path(dir: &Path) -> PathBuf {
    daily_log_path(dir, Local::now().date_naive())
}

/// Read and parse the most recent `max` classified entries of the log file
/// at `path`.
///
/// A missing file is a normal outcome ("no errors logged today") and yields
/// an empty vec; repeated calls on a nonexistent path keep returning empty.
/// Any other I/O failure (permissions, device errors) surfaces as
/// `StorageError::Io`.
///
/// Files larger than `MAX_TAIL_READ_BYTES` are read from the end only. The
/// cut can land mid-entry, but that fragment precedes the first complete
/// header in the buffer and is discarded as preamble by the parser.
pub fn read_tail(path: &Path, max: usize) -> Result<Vec<LogEntry>, StorageError> {
    let mut file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No log file for this day");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let io_err = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    let len = file.metadata().map_err(io_err)?.len();
    if len > constants::MAX_TAIL_READ_BYTES {
        tracing::debug!(
            path = %path.display(),
            len,
            window = constants::MAX_TAIL_READ_BYTES,
            "Log file exceeds tail window; reading from end"
        );
        file.seek(SeekFrom::End(-(constants::MAX_TAIL_READ_BYTES as i64)))
            .map_err(io_err)?;
    }

    let mut raw = Vec::new();
    file.read_to_end(&mut raw).map_err(io_err)?;

    // Invalid UTF-8 is malformed content, not an I/O failure: replace and
    // carry on rather than erroring the whole cycle.
    let content = String::from_utf8_lossy(&raw);
    Ok(parser::parse_tail(&content, max))
}

/// Find the per-day log files inside `dir`, sorted by date ascending.
///
/// A missing directory yields an empty list. An unreadable directory is a
/// hard error; unreadable individual entries are skipped with a warning.
/// Files whose name matches the coarse glob but whose date section does not
/// parse are ignored.
pub fn discover_log_files(dir: &Path) -> Result<Vec<DiscoveredLog>, StorageError> {
    if !dir.exists() {
        tracing::debug!(dir = %dir.display(), "Storage directory absent; nothing to discover");
        return Ok(Vec::new());
    }

    let pattern = glob::Pattern::new(constants::LOG_FILE_GLOB)
        .expect("LOG_FILE_GLOB constant must be a valid pattern");

    let mut found = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // Failing to open the root itself is the hard-error class;
                // per-entry failures degrade to a smaller listing.
                if e.path() == Some(dir) {
                    return Err(StorageError::Io {
                        path: dir.to_path_buf(),
                        source: e.into(),
                    });
                }
                tracing::warn!(error = %e, "Skipping unreadable storage entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !pattern.matches(name) {
            continue;
        }
        let Some(date) = parse_file_date(name) else {
            continue;
        };

        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        found.push(DiscoveredLog {
            path: entry.path().to_path_buf(),
            date,
            size,
        });
    }

    found.sort_by_key(|log| log.date);

    tracing::debug!(dir = %dir.display(), files = found.len(), "Storage discovery complete");
    Ok(found)
}

/// Strict parse of the date section of a daily file name.
fn parse_file_date(name: &str) -> Option<NaiveDate> {
    let middle = name
        .strip_prefix(constants::LOG_FILE_PREFIX)?
        .strip_suffix(constants::LOG_FILE_SUFFIX)?;
    NaiveDate::parse_from_str(middle, "%Y-%m-%d").ok()
}
