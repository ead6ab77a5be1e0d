// Tracebar - tests/e2e_collector.rs
//
// End-to-end tests for the collection cycle.
//
// These tests exercise the real filesystem, real chrono date handling, and
// real storage log parsing — no mocks beyond the in-memory collaborator
// sources a host would also use. This covers the full path from bytes on
// disk to a serialised ProfilerSnapshot.

use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;
use tracebar::app::sources::{InMemoryQueryLog, StaticAuth, StaticConfig, StaticSession};
use tracebar::app::storage;
use tracebar::core::export;
use tracebar::core::model::{CountValue, LogLevel, QueryRecord};
use tracebar::util::constants;
use tracebar::{Collector, PanelConfig};

// =============================================================================
// Helpers
// =============================================================================

/// Write content into today's log file inside `dir`, the path the collector
/// will compute for itself during the snapshot.
fn write_today_log(dir: &std::path::Path, content: &str) {
    let path = storage::today_log_path(dir);
    fs::write(path, content).unwrap();
}

fn full_config() -> StaticConfig {
    StaticConfig::default()
        .with(constants::PROFILER_ENABLED_KEY, json!(true))
        .with(constants::STORAGE_PANEL_KEY, json!(true))
        .with(constants::CONFIG_PANEL_KEY, json!(true))
        .with(constants::ENVIRONMENT_KEY, json!("local"))
        .with("db", json!({"host": "localhost", "port": 5432}))
}

fn sample_queries() -> Vec<QueryRecord> {
    vec![
        QueryRecord {
            query: "select * from users where id = ?".into(),
            bindings: vec![json!(7)],
            duration_ms: 1.42,
        },
        QueryRecord {
            query: "select count(*) from jobs".into(),
            bindings: vec![],
            duration_ms: 0.35,
        },
    ]
}

// =============================================================================
// Full cycle E2E
// =============================================================================

/// A complete cycle: timers, logs, view data, a real storage file on disk,
/// and every gated section enabled.
#[test]
fn e2e_full_cycle_produces_complete_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    write_today_log(
        dir.path(),
        "boot preamble without header\n\
         [2024-06-01 09:00:00] local.log.ERROR: database exploded\n\
         #0 /app/Connection.php(212)\n\
         #1 /app/Kernel.php(42)\n\
         [2024-06-01 09:05:00] local.log.WARNING: cache slow\n\
         [2024-06-01 09:06:00] local.log.INFO: ignored entirely\n",
    );

    let panel = PanelConfig {
        storage_dir: dir.path().to_path_buf(),
        ..PanelConfig::default()
    };

    let mut session = BTreeMap::new();
    session.insert("cart".to_string(), json!([1, 2]));

    let mut collector = Collector::new(
        panel,
        Arc::new(full_config()),
        Arc::new(InMemoryQueryLog::new(sample_queries())),
        Arc::new(StaticSession::new(session)),
        Arc::new(StaticAuth::new(Some("dev@example.com".into()))),
    );

    assert!(collector.is_enabled());

    collector.start("render");
    collector.add_log("info", "rendering home page");
    collector.set_view_value("page", &json!({"title": "Home"}));
    collector.end("render");

    let snapshot = collector.snapshot();

    // -- times --
    assert!(snapshot.times.contains_key("render"));
    assert!(snapshot.times.contains_key(constants::TOTAL_TIME_KEY));

    // -- storage logs: newest first, INFO invisible, stack attached --
    let logs = snapshot.storage_logs.as_ref().expect("storage enabled");
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].level, LogLevel::Warning);
    assert_eq!(logs[1].level, LogLevel::Error);
    assert!(logs[1].body.contains("Connection.php"));

    // -- sql log --
    assert_eq!(snapshot.sql_log.len(), 2);
    assert_eq!(snapshot.sql_log[0].bindings, vec![json!(7)]);

    // -- config dump, flattened --
    let dump = snapshot.config.as_ref().expect("config dump enabled");
    assert_eq!(dump.get("db.host"), Some(&json!("localhost")));

    // -- counts --
    assert_eq!(snapshot.counts.get("storage"), Some(&CountValue::Count(2)));
    assert_eq!(snapshot.counts.get("sql"), Some(&CountValue::Count(2)));
    assert_eq!(snapshot.counts.get("log"), Some(&CountValue::Count(1)));
    assert_eq!(snapshot.counts.get("session"), Some(&CountValue::Count(1)));
    assert_eq!(
        snapshot.counts.get("environment"),
        Some(&CountValue::Text("local".into()))
    );
    assert_eq!(
        snapshot.counts.get("auth"),
        Some(&CountValue::Text("dev@example.com".into()))
    );
    // Memory sampling of the test process itself must succeed.
    assert!(snapshot.counts.contains_key("memory"));
}

/// The snapshot serialises to JSON with domain-level level names and the
/// untagged count values.
#[test]
fn e2e_snapshot_exports_as_json() {
    let dir = tempfile::tempdir().unwrap();
    write_today_log(
        dir.path(),
        "[2024-06-01 09:00:00] local.log.ALERT: paging ops\n",
    );

    let panel = PanelConfig {
        storage_dir: dir.path().to_path_buf(),
        ..PanelConfig::default()
    };
    let mut collector = Collector::new(
        panel,
        Arc::new(full_config()),
        Arc::new(InMemoryQueryLog::default()),
        Arc::new(StaticSession::default()),
        Arc::new(StaticAuth::default()),
    );
    let snapshot = collector.snapshot();

    let mut buf = Vec::new();
    export::export_snapshot_json(&snapshot, &mut buf, std::path::Path::new("snapshot.json"))
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();

    assert_eq!(parsed["storage_logs"][0]["level"], "ALERT");
    assert_eq!(parsed["counts"]["storage"], 1);
    assert_eq!(parsed["counts"]["environment"], "local");
}

/// Repeated cycles against a storage dir that never gets a file: always an
/// empty section, never an error.
#[test]
fn e2e_missing_log_file_is_stable_across_cycles() {
    let dir = tempfile::tempdir().unwrap();

    for _ in 0..3 {
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
    }
}

/// The file may change between cycles; each snapshot reflects the current
/// content with nothing cached.
#[test]
fn e2e_file_growth_between_cycles_is_visible() {
    let dir = tempfile::tempdir().unwrap();
    let path = storage::today_log_path(dir.path());

    fs::write(&path, "[2024-06-01 09:00:00] local.log.ERROR: first\n").unwrap();

    let make_collector = || {
        Collector::new(
            PanelConfig {
                storage_dir: dir.path().to_path_buf(),
                ..PanelConfig::default()
            },
            Arc::new(StaticConfig::default().with(constants::STORAGE_PANEL_KEY, json!(true))),
            Arc::new(InMemoryQueryLog::default()),
            Arc::new(StaticSession::default()),
            Arc::new(StaticAuth::default()),
        )
    };

    let first = make_collector().snapshot();
    assert_eq!(first.storage_logs.as_ref().unwrap().len(), 1);

    let mut content = fs::read_to_string(&path).unwrap();
    content.push_str("[2024-06-01 09:30:00] local.log.WARNING: second\n");
    fs::write(&path, content).unwrap();

    let second = make_collector().snapshot();
    let logs = second.storage_logs.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].level, LogLevel::Warning);
}

/// Rotated daily files are discoverable in date order regardless of
/// directory listing order.
#[test]
fn e2e_discovers_rotated_daily_files() {
    let dir = tempfile::tempdir().unwrap();
    for day in ["2024-06-03", "2024-06-01", "2024-06-02"] {
        fs::write(
            dir.path().join(format!("log-{day}.txt")),
            format!("[{day} 12:00:00] local.log.ERROR: from {day}\n"),
        )
        .unwrap();
    }
    fs::write(dir.path().join("latest.log"), "not a daily file").unwrap();

    let found = storage::discover_log_files(dir.path()).unwrap();
    let dates: Vec<String> = found.iter().map(|f| f.date.to_string()).collect();
    assert_eq!(dates, vec!["2024-06-01", "2024-06-02", "2024-06-03"]);

    // Each discovered file parses through the same tail path.
    let newest = storage::read_tail(&found[2].path, 24).unwrap();
    assert_eq!(newest.len(), 1);
    assert!(newest[0].header.contains("2024-06-03"));
}
