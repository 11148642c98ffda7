//! Path-keyed table of in-flight jobs: the dedup/join protocol and cleanup.
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::debug;

use crate::job::Job;

#[derive(Default)]
pub(crate) struct JobTable {
    entries: Mutex<HashMap<PathBuf, Arc<Job>>>,
}

/// Result of consulting the table for a path.
pub(crate) enum Lookup {
    /// A job for this path is already in flight; join it.
    Join(Arc<Job>),
    /// No job existed; one was created and inserted under the lock. The
    /// caller is responsible for dispatching it to the pool and for
    /// removing it again (via [`JobTable::remove_on_submit_failure`]) if
    /// dispatch fails.
    Created(Arc<Job>),
}

impl JobTable {
    pub(crate) fn new() -> Self {
        JobTable {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Look up `path` under the global lock, joining an existing job or
    /// registering a freshly created one. Mirrors §4.2 of the design: the
    /// lock serializes concurrent first-callers so at most one job per path
    /// is ever created.
    pub(crate) fn join_or_create(&self, path: &Path) -> Lookup {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = entries.get(path) {
            debug!("fsprobe: joining existing job for {path:?}");
            return Lookup::Join(Arc::clone(existing));
        }

        let job = Arc::new(Job::new(path.to_path_buf()));
        entries.insert(path.to_path_buf(), Arc::clone(&job));
        debug!("fsprobe: inserted new job for {path:?}");
        Lookup::Created(job)
    }

    /// Undo a `Created` insertion when the pool rejected the job. No entry
    /// is left behind for submission failures (§3, Table).
    pub(crate) fn remove_on_submit_failure(&self, path: &Path) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(path);
    }

    /// Remove the entry for `path` iff it still points at `job` — guards
    /// against the race where the entry was removed and a fresh job
    /// re-inserted between this waiter's unlock and re-lock.
    pub(crate) fn remove_if_same(&self, path: &Path, job: &Arc<Job>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(current) = entries.get(path) {
            if Arc::ptr_eq(current, job) {
                entries.remove(path);
                debug!("fsprobe: removed completed job for {path:?}");
                return;
            }
        }
        debug!("fsprobe: job for {path:?} still running, leaving table entry in place");
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_lookup_for_same_path_joins() {
        let table = JobTable::new();
        let path = Path::new("/mnt/a");

        let first = match table.join_or_create(path) {
            Lookup::Created(job) => job,
            Lookup::Join(_) => panic!("expected Created on first lookup"),
        };

        let second = match table.join_or_create(path) {
            Lookup::Join(job) => job,
            Lookup::Created(_) => panic!("expected Join on second lookup"),
        };

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn remove_if_same_ignores_stale_job() {
        let table = JobTable::new();
        let path = Path::new("/mnt/a");

        let stale = Arc::new(Job::new(path.to_path_buf()));
        let _current = match table.join_or_create(path) {
            Lookup::Created(job) => job,
            Lookup::Join(_) => unreachable!(),
        };

        // `stale` never made it into the table, so this must be a no-op.
        table.remove_if_same(path, &stale);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn submit_failure_leaves_no_entry() {
        let table = JobTable::new();
        let path = Path::new("/mnt/a");
        let _job = match table.join_or_create(path) {
            Lookup::Created(job) => job,
            Lookup::Join(_) => unreachable!(),
        };
        table.remove_on_submit_failure(path);
        assert_eq!(table.len(), 0);
    }
}
