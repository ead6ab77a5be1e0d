// Tracebar - lib.rs
//
// In-process diagnostics collector for developer-facing debug panels.
//
// A host creates one `app::collector::Collector` per request/unit of work,
// feeds it timers, log messages, and view data during the cycle, and calls
// `snapshot()` at the end to obtain a `core::model::ProfilerSnapshot` for
// rendering. The storage log tail parser lives in `core::parser`.

pub mod app;
pub mod core;
pub mod util;

pub use crate::app::collector::Collector;
pub use crate::app::config::PanelConfig;
pub use crate::core::model::{LogEntry, LogLevel, ProfilerSnapshot};
