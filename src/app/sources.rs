// Tracebar - app/sources.rs
//
// Narrow collaborator traits through which the collector reaches host
// services. Each capability is injected at construction; the collector
// never consults ambient global state.
//
// Absence (a missing key, an empty session) is a normal outcome and yields
// an empty or skipped section. Only `QueryLogSource` can fail, and that
// failure is caught at the collector boundary.

use crate::core::model::QueryRecord;
use crate::util::error::SourceError;
use serde_json::Value;
use std::collections::BTreeMap;

// =============================================================================
// Capability traits
// =============================================================================

/// Host configuration lookup.
pub trait ConfigSource: Send + Sync {
    /// Look up a single dotted key. `None` means the key is not set, which
    /// gates the associated feature off rather than erroring.
    fn get(&self, key: &str) -> Option<Value>;

    /// The full configuration tree, for the flattened dump section.
    fn all(&self) -> BTreeMap<String, Value>;
}

/// Recent-query retrieval from the host's database layer.
pub trait QueryLogSource: Send + Sync {
    /// Ordered sequence of queries executed during the cycle.
    ///
    /// Implementations report connectivity problems as
    /// `SourceError::Connectivity`; the collector degrades to an empty log.
    fn recent_queries(&self) -> Result<Vec<QueryRecord>, SourceError>;
}

/// Session store access.
pub trait SessionSource: Send + Sync {
    /// Current session contents. Empty map when no session exists.
    fn entries(&self) -> BTreeMap<String, Value>;
}

/// Authenticated-user lookup.
pub trait AuthSource: Send + Sync {
    /// Email of the authenticated user, or `None` for an anonymous request.
    fn user_email(&self) -> Option<String>;
}

// =============================================================================
// Value helpers
// =============================================================================

/// Loose truthiness for configuration gate values: `true`, non-zero numbers,
/// and non-empty strings other than "false"/"0" enable a feature.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty() && s != "false" && s != "0",
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Flatten a configuration tree into dotted keys
/// (`{"db": {"host": "x"}}` -> `{"db.host": "x"}`).
///
/// Arrays flatten with their index as the key segment. Empty containers are
/// kept as leaves so their keys remain visible in the dump.
pub fn flatten_dot(map: &BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    let mut flat = BTreeMap::new();
    for (key, value) in map {
        flatten_into(key, value, &mut flat);
    }
    flat
}

fn flatten_into(prefix: &str, value: &Value, out: &mut BTreeMap<String, Value>) {
    match value {
        Value::Object(fields) if !fields.is_empty() => {
            for (key, nested) in fields {
                flatten_into(&format!("{prefix}.{key}"), nested, out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, nested) in items.iter().enumerate() {
                flatten_into(&format!("{prefix}.{index}"), nested, out);
            }
        }
        _ => {
            out.insert(prefix.to_string(), value.clone());
        }
    }
}

// =============================================================================
// In-memory implementations
// =============================================================================
//
// Usable directly by hosts with static data, and by tests.

/// Map-backed `ConfigSource`.
#[derive(Debug, Clone, Default)]
pub struct StaticConfig {
    values: BTreeMap<String, Value>,
}

impl StaticConfig {
    pub fn new(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }

    /// Builder-style insertion.
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }
}

impl ConfigSource for StaticConfig {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn all(&self) -> BTreeMap<String, Value> {
        self.values.clone()
    }
}

/// Vec-backed `QueryLogSource` that always succeeds.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQueryLog {
    queries: Vec<QueryRecord>,
}

impl InMemoryQueryLog {
    pub fn new(queries: Vec<QueryRecord>) -> Self {
        Self { queries }
    }
}

impl QueryLogSource for InMemoryQueryLog {
    fn recent_queries(&self) -> Result<Vec<QueryRecord>, SourceError> {
        Ok(self.queries.clone())
    }
}

/// Map-backed `SessionSource`.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    entries: BTreeMap<String, Value>,
}

impl StaticSession {
    pub fn new(entries: BTreeMap<String, Value>) -> Self {
        Self { entries }
    }
}

impl SessionSource for StaticSession {
    fn entries(&self) -> BTreeMap<String, Value> {
        self.entries.clone()
    }
}

/// Fixed-identity `AuthSource`. Default is anonymous.
#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    email: Option<String>,
}

impl StaticAuth {
    pub fn new(email: Option<String>) -> Self {
        Self { email }
    }
}

impl AuthSource for StaticAuth {
    fn user_email(&self) -> Option<String> {
        self.email.clone()
    }
}
