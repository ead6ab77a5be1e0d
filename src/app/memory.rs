// Tracebar - app/memory.rs
//
// Resident-memory sampling for the memory metric.

use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

/// Resident memory of the current process in bytes.
///
/// Best-effort: returns `None` when the pid cannot be resolved or the
/// platform refuses the query, in which case the memory metric is simply
/// omitted from the counts summary.
pub fn memory_usage_bytes() -> Option<u64> {
    let pid = match sysinfo::get_current_pid() {
        Ok(pid) => pid,
        Err(reason) => {
            tracing::debug!(reason, "Current pid unavailable; memory metric skipped");
            return None;
        }
    };

    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::everything(),
    );

    system.process(pid).map(|process| process.memory())
}
