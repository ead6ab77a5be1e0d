// Tracebar - app/counts.rs
//
// The counts summary: one headline value per panel section.
//
// Metrics form an enumerated table rather than a bag of closures, and each
// variant declares the inputs it derives from via the `CountInputs` bundle.
// A metric whose input is absent (feature gated off, anonymous request) is
// omitted from the summary instead of guessing.

use crate::core::model::{AppLogEntry, CountValue, LogEntry, QueryRecord, ViewValue};
use crate::util::{bytes, constants};
use serde_json::Value;
use std::collections::BTreeMap;

/// Borrowed inputs a counts computation can draw from. Assembled by the
/// collector once per output cycle after all sections are gathered.
#[derive(Debug)]
pub struct CountInputs<'a> {
    /// Host environment name, when configured.
    pub environment: Option<&'a str>,

    /// Resident memory of the current process, when sampling succeeded.
    pub memory_bytes: Option<u64>,

    /// Application log records for the cycle.
    pub app_logs: &'a [AppLogEntry],

    /// Recent queries (already degraded to empty on source failure).
    pub sql_log: &'a [QueryRecord],

    /// Named interval durations, including the total aggregate.
    pub times: &'a BTreeMap<String, f64>,

    /// Merged view data.
    pub view_data: &'a BTreeMap<String, ViewValue>,

    /// Number of entries in the session store.
    pub session_len: usize,

    /// Storage log entries, when that section is enabled and readable.
    pub storage_logs: Option<&'a [LogEntry]>,

    /// Flattened configuration dump, when that section is enabled.
    pub config: Option<&'a BTreeMap<String, Value>>,

    /// Authenticated user's email, when a user is signed in.
    pub auth_user: Option<&'a str>,
}

/// Identifiers of the counts-summary metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Environment,
    Memory,
    Log,
    Sql,
    Checkpoints,
    View,
    Session,
    Storage,
    Config,
    Auth,
}

impl Metric {
    /// All metrics, in panel display order.
    pub fn all() -> &'static [Metric] {
        &[
            Metric::Environment,
            Metric::Memory,
            Metric::Log,
            Metric::Sql,
            Metric::Checkpoints,
            Metric::View,
            Metric::Session,
            Metric::Storage,
            Metric::Config,
            Metric::Auth,
        ]
    }

    /// Stable key under which the metric appears in the counts map.
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Environment => "environment",
            Metric::Memory => "memory",
            Metric::Log => "log",
            Metric::Sql => "sql",
            Metric::Checkpoints => "checkpoints",
            Metric::View => "view",
            Metric::Session => "session",
            Metric::Storage => "storage",
            Metric::Config => "config",
            Metric::Auth => "auth",
        }
    }

    /// Derive this metric's value from its declared inputs.
    /// `None` means the required input is absent and the metric is omitted.
    pub fn compute(&self, inputs: &CountInputs<'_>) -> Option<CountValue> {
        match self {
            Metric::Environment => inputs
                .environment
                .map(|env| CountValue::Text(env.to_string())),
            Metric::Memory => inputs
                .memory_bytes
                .map(|b| CountValue::Text(bytes::format_bytes(b))),
            Metric::Log => Some(CountValue::Count(inputs.app_logs.len())),
            Metric::Sql => Some(CountValue::Count(inputs.sql_log.len())),
            Metric::Checkpoints => inputs
                .times
                .get(constants::TOTAL_TIME_KEY)
                .map(|total| CountValue::Seconds(round_millis(*total))),
            Metric::View => Some(CountValue::Count(inputs.view_data.len())),
            Metric::Session => Some(CountValue::Count(inputs.session_len)),
            Metric::Storage => inputs
                .storage_logs
                .map(|entries| CountValue::Count(entries.len())),
            Metric::Config => inputs.config.map(|c| CountValue::Count(c.len())),
            Metric::Auth => inputs.auth_user.map(|email| {
                CountValue::Text(if email.is_empty() {
                    constants::AUTH_FALLBACK_LABEL.to_string()
                } else {
                    email.to_string()
                })
            }),
        }
    }
}

/// Compute every applicable metric, keyed by `Metric::key()`.
pub fn compute_all(inputs: &CountInputs<'_>) -> BTreeMap<String, CountValue> {
    let mut counts = BTreeMap::new();
    for metric in Metric::all() {
        if let Some(value) = metric.compute(inputs) {
            counts.insert(metric.key().to_string(), value);
        }
    }
    counts
}

/// Round a seconds value to millisecond precision for display.
fn round_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}
