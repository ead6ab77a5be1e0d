// Tracebar - app/timer.rs
//
// Named-interval stopwatch for the times section of the snapshot.
// Monotonic clock internally; exposed values are seconds.

use crate::util::constants;
use std::collections::BTreeMap;
use std::time::Instant;

/// Records named checkpoint durations for one unit of work.
///
/// `start`/`end` bracket an interval under a caller-chosen key; `total`
/// finalises the whole-cycle aggregate measured from construction.
#[derive(Debug)]
pub struct TimeLog {
    /// When this log (and the unit of work it measures) began.
    created: Instant,

    /// Checkpoints started but not yet ended.
    open: BTreeMap<String, Instant>,

    /// Completed interval durations in seconds.
    times: BTreeMap<String, f64>,
}

impl TimeLog {
    pub fn new() -> Self {
        Self {
            created: Instant::now(),
            open: BTreeMap::new(),
            times: BTreeMap::new(),
        }
    }

    /// Begin (or restart) the interval named `key`.
    pub fn start(&mut self, key: &str) {
        self.open.insert(key.to_string(), Instant::now());
    }

    /// Close the interval named `key` and record its duration.
    /// An `end` with no matching `start` is ignored.
    pub fn end(&mut self, key: &str) {
        match self.open.remove(key) {
            Some(started) => {
                self.times
                    .insert(key.to_string(), started.elapsed().as_secs_f64());
            }
            None => {
                tracing::debug!(key, "Timer end without matching start; ignored");
            }
        }
    }

    /// Finalise the `"total"` aggregate: elapsed time since construction.
    /// Returns the value recorded.
    pub fn total(&mut self) -> f64 {
        let elapsed = self.created.elapsed().as_secs_f64();
        self.times
            .insert(constants::TOTAL_TIME_KEY.to_string(), elapsed);
        elapsed
    }

    /// Completed interval durations, keyed by name.
    pub fn times(&self) -> &BTreeMap<String, f64> {
        &self.times
    }
}

impl Default for TimeLog {
    fn default() -> Self {
        Self::new()
    }
}
