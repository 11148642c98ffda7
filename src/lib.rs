//! Bounded, deduplicated, timeout-safe responsiveness probe for potentially
//! hung filesystem mount points, plus a thin client for an external search
//! indexer.
//!
//! The probe is the hard part: a call to [`probe_path`] or [`probe`] never
//! blocks longer than the caller's timeout, even when the underlying
//! metadata syscall enters uninterruptible kernel sleep on a dead
//! user-space filesystem and never returns. A fixed-size pool of worker
//! threads may permanently leak (bounded at `P`, default 3) rather than
//! ever blocking a caller or unboundedly queueing work behind a stuck
//! mount.
mod config;
mod handle;
mod job;
mod pool;
mod search;
mod subsystem;
mod table;

pub use config::Config;
pub use handle::MountHandle;
pub use job::{MountProbeOp, StatProbe};
pub use search::{spawn_search, SearchHandle, SearchHit, SearchHitSink, BATCH_SIZE, MAX_RESULTS};

use std::path::Path;
use std::time::Duration;

use once_cell::sync::OnceCell;

use subsystem::Subsystem;

static SUBSYSTEM: OnceCell<Option<Subsystem>> = OnceCell::new();

fn global_subsystem() -> &'static Option<Subsystem> {
    SUBSYSTEM.get_or_init(|| {
        let subsystem = Subsystem::new(Config::default());
        if subsystem.is_none() {
            log::error!("fsprobe: failed to initialize probe subsystem, probes will fail safe");
        }
        subsystem
    })
}

/// Check whether `path` answers a metadata call within `timeout`.
///
/// Returns `false` on timeout, on metadata failure, if the worker pool is
/// saturated, or if the subsystem failed to initialize. Never blocks longer
/// than `timeout` plus the time to acquire an internal lock twice.
pub fn probe_path(path: &Path, timeout: Duration) -> bool {
    match global_subsystem() {
        Some(subsystem) => subsystem.probe_path(path, timeout),
        None => false,
    }
}

/// Resolve `handle` and probe it if (and only if) it denotes a local path.
///
/// A non-local handle (e.g. a remote URI) is assumed reachable by its own
/// transport and returns `true` immediately without touching the pool.
pub fn probe(handle: &MountHandle, timeout: Duration) -> bool {
    match handle.as_local_path() {
        Some(path) => probe_path(path, timeout),
        None => true,
    }
}
