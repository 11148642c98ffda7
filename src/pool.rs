//! Bounded worker pool: the safety valve against permanently leaked threads.
//!
//! [`threadpool::ThreadPool`] alone is the wrong primitive here — by design
//! it queues work it cannot immediately run, and a queue behind `P` stuck
//! workers would grow without bound, silently defeating the whole point of
//! capping concurrency. This module gates submission with an [`AtomicUsize`]
//! counted *before* handing work to the pool, so a full pool rejects new
//! work immediately instead of queueing it.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::debug;
use threadpool::ThreadPool;

use crate::job::{Job, MountProbeOp};

pub(crate) struct BoundedPool {
    inner: ThreadPool,
    capacity: usize,
    in_flight: Arc<AtomicUsize>,
}

impl BoundedPool {
    pub(crate) fn new(capacity: usize) -> Self {
        BoundedPool {
            inner: ThreadPool::new(capacity.max(1)),
            capacity,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Attempt to dispatch `job` to a worker running `op.check(&job.path)`.
    ///
    /// Returns `true` if a worker was admitted, `false` if the pool is
    /// already running `capacity` jobs — in which case the caller must not
    /// treat the job as dispatched (no worker reference is ever acquired).
    pub(crate) fn try_submit(&self, job: Arc<Job>, op: Arc<dyn MountProbeOp>) -> bool {
        loop {
            let current = self.in_flight.load(Ordering::Acquire);
            if current >= self.capacity {
                debug!(
                    "fsprobe: pool saturated ({current}/{}), rejecting {:?}",
                    self.capacity, job.path
                );
                return false;
            }
            if self
                .in_flight
                .compare_exchange(current, current + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                break;
            }
        }

        let in_flight = Arc::clone(&self.in_flight);
        self.inner.execute(move || {
            debug!("fsprobe: worker starting for {:?}", job.path);
            let responsive = op.check(&job.path);
            debug!(
                "fsprobe: worker finished for {:?}: {}",
                job.path,
                if responsive { "responsive" } else { "unresponsive" }
            );
            job.complete(responsive);
            // Only reached if `op.check` actually returns — on a truly dead
            // mount this line, and the decrement below, never execute. That
            // is the accepted, bounded leak: the slot stays occupied forever
            // and `capacity` effective workers are lost.
            in_flight.fetch_sub(1, Ordering::AcqRel);
        });

        true
    }
}
