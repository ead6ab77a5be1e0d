// Tracebar - core/view_data.rs
//
// Merge semantics for view/template context contributed across a cycle.
//
// Scalars are last-write-wins. Structured values (JSON arrays and objects)
// accumulate into an ordered list under their key, with duplicates
// suppressed by deep value equality — rendering the same partial twice with
// identical context produces one list element, not two.

use crate::core::model::ViewValue;
use serde_json::Value;
use std::collections::BTreeMap;

/// Accumulated view data for one unit of work.
///
/// Keys iterate in sorted order (the panel displays them alphabetically).
#[derive(Debug, Clone, Default)]
pub struct ViewData {
    entries: BTreeMap<String, ViewValue>,
}

impl ViewData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one key/value pair.
    ///
    /// Structured values (arrays/objects) append to the accumulating list
    /// under `key` unless an identical value is already present. A scalar
    /// under the key is displaced by the new list, consistent with scalars
    /// always being overwritten by later writes.
    ///
    /// Scalar values simply overwrite whatever the key held.
    pub fn insert(&mut self, key: String, value: Value) {
        if value.is_array() || value.is_object() {
            match self.entries.get_mut(&key) {
                Some(ViewValue::Many(list)) => {
                    if !list.contains(&value) {
                        list.push(value);
                    }
                }
                _ => {
                    self.entries.insert(key, ViewValue::Many(vec![value]));
                }
            }
        } else {
            self.entries.insert(key, ViewValue::Scalar(value));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&ViewValue> {
        self.entries.get(key)
    }

    /// Borrow the merged mapping, sorted by key.
    pub fn as_map(&self) -> &BTreeMap<String, ViewValue> {
        &self.entries
    }
}
