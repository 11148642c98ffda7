//! The job object: state shared by the table, the worker, and every waiter.
//!
//! A job is reached exclusively through `Arc<Job>` clones. That single
//! choice replaces the hand-rolled atomic refcount of the design this crate
//! is modeled on: the table holds a clone, the dispatched worker closure
//! holds a clone, and each attached waiter holds a clone for the duration
//! of its wait. Whichever of those drops last frees the allocation — there
//! is no `ref`/`unref` pair to get wrong.
use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex};
use std::time::Instant;

/// Terminal outcome of a job, once decided. `Checking` is the only
/// non-terminal state and is never observed by a waiter that also observes
/// `thread_finished == true` (see [`JobState`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Status {
    Checking,
    Responsive,
    Unresponsive,
}

/// Mutable part of a job, always accessed through `Job::state`.
struct JobState {
    status: Status,
    thread_finished: bool,
}

/// Shared, ref-counted probe job for one path.
pub(crate) struct Job {
    pub(crate) path: PathBuf,
    state: Mutex<JobState>,
    cond: Condvar,
}

impl Job {
    pub(crate) fn new(path: PathBuf) -> Self {
        Job {
            path,
            state: Mutex::new(JobState {
                status: Status::Checking,
                thread_finished: false,
            }),
            cond: Condvar::new(),
        }
    }

    /// Invoked by the worker thread once the (possibly very slow) metadata
    /// call returns. Sets the terminal status, flips `thread_finished`, and
    /// wakes every waiter in one critical section — per the ordering
    /// guarantee, nobody can observe `thread_finished` without also
    /// observing the final `status`.
    pub(crate) fn complete(&self, responsive: bool) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        debug_assert_eq!(state.status, Status::Checking, "job completed twice");
        state.status = if responsive {
            Status::Responsive
        } else {
            Status::Unresponsive
        };
        state.thread_finished = true;
        self.cond.notify_all();
    }

    /// Block the calling thread until either the job completes or
    /// `deadline` passes, whichever comes first.
    ///
    /// Returns `(responsive, thread_finished)`. `thread_finished` tells the
    /// caller whether it is safe to attempt table cleanup: `false` here
    /// means the worker is still running (or will run forever) and cleanup
    /// must be left to whoever observes completion later.
    pub(crate) fn wait(&self, deadline: Instant) -> (bool, bool) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if state.thread_finished {
                return (state.status == Status::Responsive, true);
            }

            let now = Instant::now();
            if now >= deadline {
                return (false, state.thread_finished);
            }

            let remaining = deadline - now;
            let (guard, timeout_result) = self
                .cond
                .wait_timeout(state, remaining)
                .unwrap_or_else(|e| e.into_inner());
            state = guard;
            if timeout_result.timed_out() && !state.thread_finished {
                return (false, state.thread_finished);
            }
            // Spurious wakeup with time remaining, or a real notification:
            // loop back around and re-check `thread_finished`.
        }
    }
}

/// The blocking operation a worker performs on behalf of a job.
///
/// Production code always uses [`StatProbe`]. Tests substitute operations
/// that park forever (standing in for a dead FUSE mount's D-state `stat()`)
/// or that resolve after a controlled delay, without needing a real kernel
/// fixture.
pub trait MountProbeOp: Send + Sync + 'static {
    /// Returns `true` if the path is responsive. May block indefinitely.
    fn check(&self, path: &Path) -> bool;
}

/// Default production operation: `std::fs::metadata`, exactly the syscall
/// that enters uninterruptible sleep on a dead FUSE mount.
pub struct StatProbe;

impl MountProbeOp for StatProbe {
    fn check(&self, path: &Path) -> bool {
        std::fs::metadata(path).is_ok()
    }
}
