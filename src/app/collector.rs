// Tracebar - app/collector.rs
//
// The diagnostics collector: one instance per request/unit of work.
// Accumulates timers, application logs, and view data during the cycle,
// then assembles a ProfilerSnapshot from its own state plus the injected
// collaborator sources.
//
// Failure policy (one cycle must always produce a snapshot):
//   - query log source unreachable       -> empty sql_log
//   - storage file missing               -> empty storage section
//   - storage file unreadable (I/O)      -> storage section omitted, warning
//   - config keys absent                 -> gated sections skipped
// Nothing in here propagates an error to the host's request path.

use crate::app::config::PanelConfig;
use crate::app::counts::{self, CountInputs};
use crate::app::sources::{
    self, AuthSource, ConfigSource, QueryLogSource, SessionSource,
};
use crate::app::{memory, storage, timer::TimeLog};
use crate::core::model::{AppLogEntry, LogEntry, ProfilerSnapshot};
use crate::core::view_data::ViewData;
use crate::util::constants;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Per-request diagnostics collector.
///
/// Not internally synchronised: one instance belongs to one unit of work.
/// A multi-threaded host creates one collector per worker/task; the shared
/// sources behind `Arc` are the only cross-request state.
pub struct Collector {
    panel: PanelConfig,

    config: Arc<dyn ConfigSource>,
    queries: Arc<dyn QueryLogSource>,
    session: Arc<dyn SessionSource>,
    auth: Arc<dyn AuthSource>,

    time: TimeLog,
    view_data: ViewData,
    logs: Vec<AppLogEntry>,
}

impl Collector {
    pub fn new(
        panel: PanelConfig,
        config: Arc<dyn ConfigSource>,
        queries: Arc<dyn QueryLogSource>,
        session: Arc<dyn SessionSource>,
        auth: Arc<dyn AuthSource>,
    ) -> Self {
        Self {
            panel,
            config,
            queries,
            session,
            auth,
            time: TimeLog::new(),
            view_data: ViewData::new(),
            logs: Vec::new(),
        }
    }

    /// Whether the host has switched the panel on at all. Hosts gate
    /// rendering (and usually snapshot assembly) on this.
    pub fn is_enabled(&self) -> bool {
        self.flag(constants::PROFILER_ENABLED_KEY)
    }

    /// Append a message to the in-memory application log.
    pub fn add_log(&mut self, category: impl Into<String>, message: impl Into<String>) {
        self.logs.push(AppLogEntry {
            category: category.into(),
            message: message.into(),
        });
    }

    /// Start the checkpoint timer named `key`.
    pub fn start(&mut self, key: &str) {
        self.time.start(key);
    }

    /// End the checkpoint timer named `key`.
    pub fn end(&mut self, key: &str) {
        self.time.end(key);
    }

    /// Merge key/value pairs into the view data (see `core::view_data` for
    /// the scalar-overwrite / structured-accumulate semantics).
    pub fn set_view_data<I>(&mut self, data: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        for (key, value) in data {
            self.view_data.insert(key, value);
        }
    }

    /// Merge a single value, converting it to its plain-data form first.
    /// A value that cannot be serialised is skipped with a warning.
    pub fn set_view_value<T: Serialize>(&mut self, key: impl Into<String>, value: &T) {
        match serde_json::to_value(value) {
            Ok(converted) => self.view_data.insert(key.into(), converted),
            Err(e) => {
                tracing::warn!(error = %e, "View value not serialisable; skipped");
            }
        }
    }

    pub fn view_data(&self) -> &ViewData {
        &self.view_data
    }

    pub fn logs(&self) -> &[AppLogEntry] {
        &self.logs
    }

    /// Assemble the snapshot for this cycle.
    ///
    /// Finalises the total timer, so the host calls this once at the end of
    /// the unit of work. Gated sections (storage scan, config dump) are
    /// included only when the corresponding host config key is truthy.
    pub fn snapshot(&mut self) -> ProfilerSnapshot {
        self.time.total();
        let times = self.time.times().clone();

        let view_data = self.view_data.as_map().clone();
        let app_logs = self.logs.clone();

        let sql_log = match self.queries.recent_queries() {
            Ok(queries) => queries,
            Err(e) => {
                tracing::warn!(error = %e, "Query log source failed; continuing with empty SQL log");
                Vec::new()
            }
        };

        let storage_logs = self.collect_storage_logs();

        let config_dump = if self.flag(constants::CONFIG_PANEL_KEY) {
            Some(sources::flatten_dot(&self.config.all()))
        } else {
            None
        };

        let session = self.session.entries();
        let environment = self
            .config
            .get(constants::ENVIRONMENT_KEY)
            .and_then(|v| v.as_str().map(str::to_owned));
        let auth_user = self.auth.user_email();

        let inputs = CountInputs {
            environment: environment.as_deref(),
            memory_bytes: memory::memory_usage_bytes(),
            app_logs: &app_logs,
            sql_log: &sql_log,
            times: &times,
            view_data: &view_data,
            session_len: session.len(),
            storage_logs: storage_logs.as_deref(),
            config: config_dump.as_ref(),
            auth_user: auth_user.as_deref(),
        };
        let counts = counts::compute_all(&inputs);

        tracing::debug!(
            app_logs = app_logs.len(),
            sql = sql_log.len(),
            storage = storage_logs.as_ref().map(Vec::len),
            "Snapshot assembled"
        );

        ProfilerSnapshot {
            times,
            view_data,
            app_logs,
            sql_log,
            storage_logs,
            config: config_dump,
            counts,
        }
    }

    /// Storage log scan, gated by the host config key. A read failure
    /// omits the section rather than failing the cycle.
    fn collect_storage_logs(&self) -> Option<Vec<LogEntry>> {
        if !self.flag(constants::STORAGE_PANEL_KEY) {
            return None;
        }
        let path = storage::today_log_path(&self.panel.storage_dir);
        match storage::read_tail(&path, self.panel.max_storage_entries) {
            Ok(entries) => Some(entries),
            Err(e) => {
                tracing::warn!(error = %e, "Storage log read failed; section omitted");
                None
            }
        }
    }

    fn flag(&self, key: &str) -> bool {
        self.config
            .get(key)
            .map(|value| sources::is_truthy(&value))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::sources::{InMemoryQueryLog, StaticAuth, StaticConfig, StaticSession};
    use crate::core::model::{CountValue, QueryRecord, ViewValue};
    use crate::util::error::SourceError;
    use serde_json::json;

    /// Query source standing in for a database with a dropped connection.
    struct UnreachableQueryLog;

    impl QueryLogSource for UnreachableQueryLog {
        fn recent_queries(&self) -> Result<Vec<QueryRecord>, SourceError> {
            Err(SourceError::Connectivity {
                collaborator: "db",
                reason: "connection refused".into(),
            })
        }
    }

    fn collector_with_config(config: StaticConfig) -> Collector {
        Collector::new(
            PanelConfig::default(),
            Arc::new(config),
            Arc::new(InMemoryQueryLog::default()),
            Arc::new(StaticSession::default()),
            Arc::new(StaticAuth::default()),
        )
    }

    #[test]
    fn test_disabled_by_default_enabled_by_config_key() {
        let off = collector_with_config(StaticConfig::default());
        assert!(!off.is_enabled());

        let on = collector_with_config(
            StaticConfig::default().with(constants::PROFILER_ENABLED_KEY, json!(true)),
        );
        assert!(on.is_enabled());
    }

    #[test]
    fn test_add_log_accumulates_in_order() {
        let mut collector = collector_with_config(StaticConfig::default());
        collector.add_log("info", "first");
        collector.add_log("query", "second");

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.app_logs.len(), 2);
        assert_eq!(snapshot.app_logs[0].message, "first");
        assert_eq!(snapshot.app_logs[1].category, "query");
        assert_eq!(snapshot.counts.get("log"), Some(&CountValue::Count(2)));
    }

    #[test]
    fn test_snapshot_always_has_total_time() {
        let mut collector = collector_with_config(StaticConfig::default());
        collector.start("boot");
        collector.end("boot");

        let snapshot = collector.snapshot();
        assert!(snapshot.times.contains_key("boot"));
        assert!(snapshot.times.contains_key(constants::TOTAL_TIME_KEY));
        assert!(snapshot.counts.contains_key("checkpoints"));
    }

    #[test]
    fn test_query_source_failure_degrades_to_empty() {
        let mut collector = Collector::new(
            PanelConfig::default(),
            Arc::new(StaticConfig::default()),
            Arc::new(UnreachableQueryLog),
            Arc::new(StaticSession::default()),
            Arc::new(StaticAuth::default()),
        );

        let snapshot = collector.snapshot();
        assert!(snapshot.sql_log.is_empty());
        assert_eq!(snapshot.counts.get("sql"), Some(&CountValue::Count(0)));
    }

    #[test]
    fn test_storage_and_config_sections_gated_off_by_default() {
        let mut collector = collector_with_config(StaticConfig::default());
        let snapshot = collector.snapshot();

        assert!(snapshot.storage_logs.is_none());
        assert!(snapshot.config.is_none());
        assert!(!snapshot.counts.contains_key("storage"));
        assert!(!snapshot.counts.contains_key("config"));
    }

    #[test]
    fn test_config_dump_is_flattened_when_enabled() {
        let config = StaticConfig::default()
            .with(constants::CONFIG_PANEL_KEY, json!(true))
            .with("db", json!({"host": "localhost", "port": 5432}));
        let mut collector = collector_with_config(config);

        let snapshot = collector.snapshot();
        let dump = snapshot.config.expect("config dump should be present");
        assert_eq!(dump.get("db.host"), Some(&json!("localhost")));
        assert_eq!(dump.get("db.port"), Some(&json!(5432)));
        assert_eq!(
            snapshot.counts.get("config"),
            Some(&CountValue::Count(dump.len()))
        );
    }

    #[test]
    fn test_storage_section_present_and_empty_when_no_file() {
        // Enabled but pointing at an empty temp dir: "no errors logged
        // today" is an empty section, not an omitted one.
        let dir = tempfile::tempdir().unwrap();
        let panel = PanelConfig {
            storage_dir: dir.path().to_path_buf(),
            ..PanelConfig::default()
        };
        let mut collector = Collector::new(
            panel,
            Arc::new(StaticConfig::default().with(constants::STORAGE_PANEL_KEY, json!(true))),
            Arc::new(InMemoryQueryLog::default()),
            Arc::new(StaticSession::default()),
            Arc::new(StaticAuth::default()),
        );

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.storage_logs, Some(Vec::new()));
        assert_eq!(snapshot.counts.get("storage"), Some(&CountValue::Count(0)));
    }

    #[test]
    fn test_view_data_merge_through_collector() {
        let mut collector = collector_with_config(StaticConfig::default());
        collector.set_view_data([("title".to_string(), json!("first"))]);
        collector.set_view_data([("title".to_string(), json!("second"))]);
        collector.set_view_value("user", &json!({"id": 7}));
        collector.set_view_value("user", &json!({"id": 7}));

        let snapshot = collector.snapshot();
        assert_eq!(
            snapshot.view_data.get("title"),
            Some(&ViewValue::Scalar(json!("second")))
        );
        assert_eq!(
            snapshot.view_data.get("user"),
            Some(&ViewValue::Many(vec![json!({"id": 7})]))
        );
        assert_eq!(snapshot.counts.get("view"), Some(&CountValue::Count(2)));
    }

    #[test]
    fn test_environment_session_and_auth_flow_into_counts() {
        let mut session_entries = std::collections::BTreeMap::new();
        session_entries.insert("cart".to_string(), json!([1, 2, 3]));
        session_entries.insert("csrf".to_string(), json!("token"));

        let mut collector = Collector::new(
            PanelConfig::default(),
            Arc::new(StaticConfig::default().with(constants::ENVIRONMENT_KEY, json!("production"))),
            Arc::new(InMemoryQueryLog::default()),
            Arc::new(StaticSession::new(session_entries)),
            Arc::new(StaticAuth::new(Some("dev@example.com".into()))),
        );

        let snapshot = collector.snapshot();
        assert_eq!(
            snapshot.counts.get("environment"),
            Some(&CountValue::Text("production".into()))
        );
        assert_eq!(snapshot.counts.get("session"), Some(&CountValue::Count(2)));
        assert_eq!(
            snapshot.counts.get("auth"),
            Some(&CountValue::Text("dev@example.com".into()))
        );
    }
}
