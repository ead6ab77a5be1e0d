// Tracebar - core/model.rs
//
// Core data model types. Pure data definitions with no I/O.
// These types are the shared vocabulary across all layers.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

// =============================================================================
// Log level
// =============================================================================

/// Severity levels recognised in storage log headers, ordered from most to
/// least severe. NOTICE, INFO, and DEBUG are deliberately excluded: the panel
/// surfaces only entries worth a developer's attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
}

impl LogLevel {
    /// Returns all variants in classification priority order (most severe
    /// first). A header matching several tokens resolves to the first match
    /// in this order — a deliberate tie-break, not an inconsistency.
    pub fn all() -> &'static [LogLevel] {
        &[
            LogLevel::Emergency,
            LogLevel::Alert,
            LogLevel::Critical,
            LogLevel::Error,
            LogLevel::Warning,
        ]
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Emergency => "EMERGENCY",
            LogLevel::Alert => "ALERT",
            LogLevel::Critical => "CRITICAL",
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
        }
    }

    /// The lowercase dotted marker searched for in headers. Any channel
    /// prefix counts: `log.ERROR`, `app.ERROR`, and `production.ERROR` all
    /// carry the `.error` token.
    pub fn token(&self) -> &'static str {
        match self {
            LogLevel::Emergency => ".emergency",
            LogLevel::Alert => ".alert",
            LogLevel::Critical => ".critical",
            LogLevel::Error => ".error",
            LogLevel::Warning => ".warning",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Storage log entry
// =============================================================================

/// A single classified storage log entry.
///
/// Produced by `core::parser::parse_tail`; one entry per recognised
/// timestamp header in the source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// Classified severity level.
    pub level: LogLevel,

    /// The raw matched timestamp-prefixed line, verbatim
    /// (e.g. `"[2024-01-02 03:04:05] production.ERROR: ..."`).
    pub header: String,

    /// Text following the header up to the next header or end of file,
    /// typically a stack trace. Empty when the entry is a single line.
    pub body: String,

    /// Best-effort parse of the bracketed header timestamp. `None` when the
    /// bracket contents do not parse; never affects ordering or inclusion.
    pub timestamp: Option<NaiveDateTime>,
}

// =============================================================================
// In-memory application log
// =============================================================================

/// One record appended via `Collector::add_log` within a single cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppLogEntry {
    /// Caller-chosen category (e.g. "info", "query", "event").
    pub category: String,

    /// Free-form message text.
    pub message: String,
}

// =============================================================================
// Query log
// =============================================================================

/// One executed query as reported by the host's query log source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRecord {
    /// The statement text, possibly with placeholders.
    pub query: String,

    /// Bound parameter values in placeholder order.
    pub bindings: Vec<serde_json::Value>,

    /// Execution time in milliseconds.
    pub duration_ms: f64,
}

// =============================================================================
// View data
// =============================================================================

/// Value stored under a view-data key after merging.
///
/// Scalars overwrite; structured values accumulate into a deduplicated
/// ordered list (see `core::view_data`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViewValue {
    /// A plain scalar (string, number, bool, null). Last write wins.
    Scalar(serde_json::Value),

    /// Structured values contributed across multiple calls, deduplicated by
    /// deep value equality, in first-seen order.
    Many(Vec<serde_json::Value>),
}

// =============================================================================
// Counts
// =============================================================================

/// Typed value of one counts-summary metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CountValue {
    /// A cardinality (number of logs, queries, views, ...).
    Count(usize),

    /// A duration in seconds.
    Seconds(f64),

    /// A display string (environment name, memory usage, user).
    Text(String),
}

// =============================================================================
// Snapshot
// =============================================================================

/// The finalised, read-only aggregate of all diagnostics collected for one
/// unit of work. Built fresh on every output cycle and handed to the
/// rendering collaborator; nothing is cached across cycles.
#[derive(Debug, Clone, Serialize)]
pub struct ProfilerSnapshot {
    /// Named interval durations in seconds, including the `"total"`
    /// aggregate key.
    pub times: BTreeMap<String, f64>,

    /// Merged view/template context, sorted by key.
    pub view_data: BTreeMap<String, ViewValue>,

    /// Application log records appended during the cycle, in order.
    pub app_logs: Vec<AppLogEntry>,

    /// Recent queries; empty when the query log source was unreachable.
    pub sql_log: Vec<QueryRecord>,

    /// Most recent classified storage log entries, newest first.
    /// `None` when the storage section is gated off or unreadable.
    pub storage_logs: Option<Vec<LogEntry>>,

    /// Dot-flattened host configuration dump. `None` when gated off.
    pub config: Option<BTreeMap<String, serde_json::Value>>,

    /// Per-metric summary values keyed by `Metric::key()`.
    pub counts: BTreeMap<String, CountValue>,
}

// =============================================================================
// Discovered log file
// =============================================================================

/// Metadata about one per-day log file found in the storage directory.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredLog {
    /// Full path to the file.
    pub path: PathBuf,

    /// The day encoded in the file name.
    pub date: NaiveDate,

    /// File size in bytes.
    pub size: u64,
}
