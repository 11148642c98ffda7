//! Orchestrates the job table and the worker pool behind a single
//! [`Subsystem::probe_path`] entry point.
//!
//! Kept separate from the free functions in `lib.rs` so that tests can
//! stand up an isolated subsystem (its own table, its own small pool) rather
//! than sharing the process-wide singleton — important for the pool-cap and
//! thundering-herd tests, which need a known, small `P`.
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;

use crate::config::Config;
use crate::job::{MountProbeOp, StatProbe};
use crate::pool::BoundedPool;
use crate::table::{JobTable, Lookup};

pub(crate) struct Subsystem {
    table: JobTable,
    pool: BoundedPool,
    op: Arc<dyn MountProbeOp>,
}

impl Subsystem {
    /// Build a subsystem with the production [`StatProbe`] operation.
    /// Returns `None` if the pool could not be created — callers memoize
    /// this into the permanent "disabled" state described in §4.5.
    pub(crate) fn new(config: Config) -> Option<Self> {
        Self::with_op(config, Arc::new(StatProbe))
    }

    /// Build a subsystem with an injectable blocking operation, for tests
    /// that stand in for a dead mount without needing a real one.
    pub(crate) fn with_op(config: Config, op: Arc<dyn MountProbeOp>) -> Option<Self> {
        if config.capacity == 0 {
            return None;
        }
        Some(Subsystem {
            table: JobTable::new(),
            pool: BoundedPool::new(config.capacity),
            op,
        })
    }

    /// Implements §4.2–§4.4: dedup/join under the global lock, dispatch on
    /// miss, timed wait, and cleanup of completed entries.
    pub(crate) fn probe_path(&self, path: &Path, timeout: Duration) -> bool {
        let job = match self.table.join_or_create(path) {
            Lookup::Join(job) => job,
            Lookup::Created(job) => {
                if !self.pool.try_submit(Arc::clone(&job), Arc::clone(&self.op)) {
                    self.table.remove_on_submit_failure(path);
                    debug!("fsprobe: submission failed for {path:?}, reporting unresponsive");
                    return false;
                }
                job
            }
        };

        let deadline = Instant::now() + timeout;
        let (responsive, thread_finished) = job.wait(deadline);

        if thread_finished {
            self.table.remove_if_same(path, &job);
        } else {
            debug!("fsprobe: timed out waiting for {path:?}");
        }

        responsive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    struct CountingHang(Arc<AtomicUsize>);
    impl MountProbeOp for CountingHang {
        fn check(&self, _path: &Path) -> bool {
            self.0.fetch_add(1, Ordering::SeqCst);
            loop {
                thread::park();
            }
        }
    }

    fn small_config(capacity: usize) -> Config {
        Config {
            capacity,
            ..Config::default()
        }
    }

    #[test]
    fn single_timeout_on_hung_path() {
        let starts = Arc::new(AtomicUsize::new(0));
        let sub = Subsystem::with_op(small_config(3), Arc::new(CountingHang(Arc::clone(&starts))))
            .unwrap();

        let start = Instant::now();
        let ok = sub.probe_path(Path::new("/mnt/hung"), Duration::from_millis(200));
        let elapsed = start.elapsed();

        assert!(!ok);
        assert!(elapsed >= Duration::from_millis(180), "elapsed={elapsed:?}");
        assert!(elapsed <= Duration::from_millis(600), "elapsed={elapsed:?}");
        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn thundering_herd_dedups_to_one_worker() {
        let starts = Arc::new(AtomicUsize::new(0));
        let sub = Arc::new(
            Subsystem::with_op(small_config(3), Arc::new(CountingHang(Arc::clone(&starts))))
                .unwrap(),
        );

        let n = 50;
        let barrier = Arc::new(Barrier::new(n));
        let mut handles = Vec::with_capacity(n);
        for _ in 0..n {
            let sub = Arc::clone(&sub);
            let barrier = Arc::clone(&barrier);
            handles.push(thread::spawn(move || {
                barrier.wait();
                let start = Instant::now();
                let ok = sub.probe_path(Path::new("/mnt/hung-herd"), Duration::from_millis(200));
                (ok, start.elapsed())
            }));
        }

        for h in handles {
            let (ok, elapsed) = h.join().unwrap();
            assert!(!ok);
            assert!(elapsed <= Duration::from_millis(600), "elapsed={elapsed:?}");
        }

        assert_eq!(starts.load(Ordering::SeqCst), 1, "expected exactly one worker to run");
    }

    #[test]
    fn pool_saturation_caps_concurrent_workers() {
        let starts = Arc::new(AtomicUsize::new(0));
        let sub = Arc::new(
            Subsystem::with_op(small_config(3), Arc::new(CountingHang(Arc::clone(&starts))))
                .unwrap(),
        );

        let paths = ["/mnt/a", "/mnt/b", "/mnt/c", "/mnt/d"];
        let mut handles = Vec::new();
        for p in paths {
            let sub = Arc::clone(&sub);
            handles.push(thread::spawn(move || {
                sub.probe_path(Path::new(p), Duration::from_millis(200))
            }));
        }

        for h in handles {
            // All four must return (none hang forever, no deadlock), and
            // all results must be `false` since the op never completes.
            assert!(!h.join().unwrap());
        }

        // At most 3 distinct paths ever got a worker dispatched since the
        // fourth must have been rejected by the admission gate.
        assert!(starts.load(Ordering::SeqCst) <= 3);
    }

    #[test]
    fn responsive_path_returns_true_quickly() {
        let sub = Subsystem::new(small_config(3)).unwrap();
        let start = Instant::now();
        let ok = sub.probe_path(Path::new("/tmp"), Duration::from_secs(1));
        assert!(ok);
        assert!(start.elapsed() < Duration::from_millis(200));
    }

    #[test]
    fn zero_capacity_config_disables_subsystem() {
        assert!(Subsystem::new(small_config(0)).is_none());
    }
}
