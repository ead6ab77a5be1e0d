// Tracebar - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Crate metadata
// =============================================================================

/// Crate display name.
pub const APP_NAME: &str = "Tracebar";

/// Current crate version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Storage log limits
// =============================================================================

/// Default number of storage log entries included in a snapshot.
pub const DEFAULT_MAX_STORAGE_ENTRIES: usize = 24;

/// Minimum user-configurable storage entry cap (controls must be non-zero).
pub const MIN_MAX_STORAGE_ENTRIES: usize = 1;

/// Maximum user-configurable storage entry cap.
pub const ABSOLUTE_MAX_STORAGE_ENTRIES: usize = 10_000;

/// Maximum number of bytes read from the end of a storage log file.
///
/// Only the most recent entries are ever returned, so a larger file is read
/// from the tail. An entry cut in half at the truncation point lands in the
/// discarded preamble segment, never in the output.
pub const MAX_TAIL_READ_BYTES: u64 = 4 * 1024 * 1024; // 4 MiB

// =============================================================================
// Storage log file naming
// =============================================================================

/// Prefix of the per-day rotating log file name (`log-YYYY-MM-DD.txt`).
pub const LOG_FILE_PREFIX: &str = "log-";

/// Suffix of the per-day rotating log file name.
pub const LOG_FILE_SUFFIX: &str = ".txt";

/// Coarse glob matched against candidate file names during discovery.
/// The strict date parse on the middle section does the real filtering.
pub const LOG_FILE_GLOB: &str = "log-*.txt";

/// Default storage log directory, relative to the host's working directory.
pub const DEFAULT_STORAGE_DIR: &str = "storage/logs";

// =============================================================================
// Timer
// =============================================================================

/// Key under which the whole-cycle aggregate duration is recorded.
pub const TOTAL_TIME_KEY: &str = "total";

// =============================================================================
// Host configuration keys
// =============================================================================
//
// Looked up through the injected `ConfigSource`. An absent key means the
// feature is skipped, not an error.

/// Master switch: hosts gate panel rendering on this key.
pub const PROFILER_ENABLED_KEY: &str = "profiler.enabled";

/// Enables the storage log scan section of the snapshot.
pub const STORAGE_PANEL_KEY: &str = "profiler.buttons.storage";

/// Enables the flattened configuration dump section of the snapshot.
pub const CONFIG_PANEL_KEY: &str = "profiler.buttons.config";

/// Host environment name shown in the counts summary.
pub const ENVIRONMENT_KEY: &str = "app.env";

// =============================================================================
// Counts
// =============================================================================

/// Label used for an authenticated user whose email is empty.
pub const AUTH_FALLBACK_LABEL: &str = "User";

// =============================================================================
// Configuration
// =============================================================================

/// Panel configuration file name.
pub const CONFIG_FILE_NAME: &str = "tracebar.toml";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
