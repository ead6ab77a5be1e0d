// Tracebar - app/config.rs
//
// Panel configuration: where the storage logs live and how many entries a
// snapshot includes. Loaded from an optional tracebar.toml with startup
// validation; invalid values produce actionable warnings and fall back to
// defaults rather than aborting the host.

use crate::util::constants;
use std::path::{Path, PathBuf};

/// Raw deserialisable shape of tracebar.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct RawPanelConfig {
    /// `[storage]` section.
    storage: StorageSection,
    /// `[logging]` section.
    logging: LoggingSection,
}

/// `[storage]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StorageSection {
    /// Storage log directory.
    dir: Option<String>,
    /// Maximum entries per snapshot.
    max_entries: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    level: Option<String>,
}

/// Validated panel configuration.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Directory holding the per-day rotating log files.
    pub storage_dir: PathBuf,

    /// Cap on storage log entries included in a snapshot.
    pub max_storage_entries: usize,

    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(constants::DEFAULT_STORAGE_DIR),
            max_storage_entries: constants::DEFAULT_MAX_STORAGE_ENTRIES,
            log_level: None,
        }
    }
}

impl PanelConfig {
    /// Load and validate `tracebar.toml` from `path`.
    ///
    /// Returns a validated config and a list of non-fatal warnings. A
    /// missing file returns defaults with no warnings (first-run). An
    /// unparseable file or out-of-range values return defaults for the
    /// affected fields plus a warning naming the expected range.
    pub fn load(path: &Path) -> (PanelConfig, Vec<String>) {
        let mut warnings: Vec<String> = Vec::new();

        if !path.exists() {
            tracing::debug!(path = %path.display(), "No tracebar.toml found; using defaults");
            return (PanelConfig::default(), warnings);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                let msg = format!(
                    "Could not read config file '{}': {e}. Using defaults.",
                    path.display()
                );
                tracing::warn!("{}", msg);
                warnings.push(msg);
                return (PanelConfig::default(), warnings);
            }
        };

        let raw: RawPanelConfig = match toml::from_str(&content) {
            Ok(raw) => raw,
            Err(e) => {
                let msg = format!(
                    "Failed to parse config file '{}': {e}. Using defaults.",
                    path.display()
                );
                tracing::warn!("{}", msg);
                warnings.push(msg);
                return (PanelConfig::default(), warnings);
            }
        };

        tracing::info!(path = %path.display(), "Loaded tracebar.toml");

        let mut config = PanelConfig::default();

        // -- Storage: dir --
        if let Some(dir) = raw.storage.dir {
            if dir.is_empty() {
                warnings.push(format!(
                    "[storage] dir is empty. Using default ({}).",
                    constants::DEFAULT_STORAGE_DIR
                ));
            } else {
                config.storage_dir = PathBuf::from(dir);
            }
        }

        // -- Storage: max_entries --
        if let Some(max) = raw.storage.max_entries {
            if (constants::MIN_MAX_STORAGE_ENTRIES..=constants::ABSOLUTE_MAX_STORAGE_ENTRIES)
                .contains(&max)
            {
                config.max_storage_entries = max;
            } else {
                warnings.push(format!(
                    "[storage] max_entries = {max} is out of range ({}-{}). Using default ({}).",
                    constants::MIN_MAX_STORAGE_ENTRIES,
                    constants::ABSOLUTE_MAX_STORAGE_ENTRIES,
                    constants::DEFAULT_MAX_STORAGE_ENTRIES,
                ));
            }
        }

        // -- Logging: level --
        if let Some(level) = raw.logging.level {
            let valid = ["error", "warn", "info", "debug", "trace"];
            if valid.contains(&level.to_lowercase().as_str()) {
                config.log_level = Some(level);
            } else {
                warnings.push(format!(
                    "[logging] level = \"{level}\" is not recognised. \
                     Valid values: error, warn, info, debug, trace. Using default ({}).",
                    constants::DEFAULT_LOG_LEVEL,
                ));
            }
        }

        if !warnings.is_empty() {
            tracing::warn!(count = warnings.len(), "Config validation produced warnings");
        }

        (config, warnings)
    }
}
