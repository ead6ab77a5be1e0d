// Tracebar - core/parser.rs
//
// Storage log tail parsing and classification.
// Core layer: operates on in-memory text, never touches the filesystem.
//
// A storage log file is an append-only sequence of entries, each introduced
// by a bracketed timestamp header line and optionally followed by free text
// (stack traces). This module splits a file's content at those headers,
// classifies each entry by the dotted severity token embedded in its header
// (`log.ERROR`, `app.WARNING`, ...), and returns the most recent entries
// first.

use crate::core::model::{LogEntry, LogLevel};
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::OnceLock;

/// Matches one entry boundary: a bracketed ISO-like timestamp
/// (`[YYYY-MM-DD HH:MM:SS` plus optional microseconds/timezone) and the
/// remainder of that line. Anything until the next boundary is the body.
fn header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\[\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}[^\r\n]*")
            .expect("header_pattern: invalid regex")
    })
}

/// Parse the tail of a storage log file's content.
///
/// Splits `content` into entries at timestamp headers, classifies each
/// entry's severity, and returns at most `max` entries with the one nearest
/// to end-of-file first.
///
/// Policy for irregular input — this function never fails:
///   - content with zero headers yields an empty vec;
///   - text before the first header is preamble and is discarded;
///   - headers with no recognised severity token are dropped without
///     disturbing the header/body pairing of later entries;
///   - a header matching several tokens takes the most severe one
///     (`LogLevel::all()` order).
pub fn parse_tail(content: &str, max: usize) -> Vec<LogEntry> {
    let pattern = header_pattern();

    let headers: Vec<&str> = pattern.find_iter(content).map(|m| m.as_str()).collect();
    let segments: Vec<&str> = pattern.split(content).collect();

    // `split` yields one segment per gap: the preamble before the first
    // header, then exactly one body segment per header. The pairing below
    // relies on that alignment.
    debug_assert_eq!(
        segments.len(),
        headers.len() + 1,
        "boundary split must yield one body segment per header plus preamble"
    );

    let mut entries: Vec<LogEntry> = Vec::with_capacity(headers.len());
    for (header, segment) in headers.iter().zip(&segments[1..]) {
        let Some(level) = classify(header) else {
            tracing::trace!(header = *header, "Header has no recognised level token; dropped");
            continue;
        };
        entries.push(LogEntry {
            level,
            header: (*header).to_string(),
            body: strip_boundary_newline(segment).to_string(),
            timestamp: parse_header_timestamp(header),
        });
    }

    // File order is chronological; output is most-recent-first.
    entries.reverse();
    entries.truncate(max);

    tracing::debug!(
        headers = headers.len(),
        entries = entries.len(),
        max,
        "Storage log tail parsed"
    );

    entries
}

/// Determine an entry's severity from its header line.
///
/// Case-insensitive substring search for the dotted severity token
/// (`.error` as in `log.ERROR` or `app.ERROR`), checked in the fixed
/// priority order EMERGENCY > ALERT > CRITICAL > ERROR > WARNING; the first
/// match wins. A match at byte offset 0 counts like any other. Returns
/// `None` when no token matches, which drops the entry.
fn classify(header: &str) -> Option<LogLevel> {
    let lowered = header.to_lowercase();
    LogLevel::all()
        .iter()
        .copied()
        .find(|level| lowered.contains(level.token()))
}

/// The split segment after a header starts with the newline that terminated
/// the header line. That newline belongs to the boundary, not the body.
fn strip_boundary_newline(segment: &str) -> &str {
    segment
        .strip_prefix("\r\n")
        .or_else(|| segment.strip_prefix('\n'))
        .unwrap_or(segment)
}

/// Best-effort parse of the leading `[YYYY-MM-DD HH:MM:SS...]` bracket.
///
/// Trailing microseconds or timezone text inside the bracket is ignored.
/// Failure leaves the entry's timestamp as `None`; it is metadata only and
/// never affects inclusion or ordering.
fn parse_header_timestamp(header: &str) -> Option<NaiveDateTime> {
    let inner = header.strip_prefix('[')?;
    let close = inner.find(']')?;
    let stamp = inner[..close].get(..19).unwrap_or(&inner[..close]);
    NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").ok()
}
