//! Search provider: a thin client of an external line-oriented indexer.
//!
//! Unlike the probe core, nothing here can get permanently stuck — `sc` is
//! an ordinary, killable subprocess — so this module reaches for the plain
//! `std::process::Command` + reader-thread + channel idiom the teacher crate
//! uses for capturing a child's output (see the worker-process plumbing this
//! crate's `git history` traces back to), rather than anything resembling
//! the probe's quarantine design.
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use log::{debug, warn};

/// Hits are flushed to the sink once this many have accumulated.
pub const BATCH_SIZE: usize = 100;

/// Hard cap on hits delivered for a single query; reading stops and the
/// child is terminated once reached.
pub const MAX_RESULTS: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub path: String,
    pub score: Option<f32>,
}

fn parse_line(line: &str) -> Option<SearchHit> {
    if line.is_empty() {
        return None;
    }
    match line.split_once('\t') {
        Some((path, score)) => Some(SearchHit {
            path: path.to_string(),
            score: score.trim().parse().ok(),
        }),
        None => Some(SearchHit {
            path: line.to_string(),
            score: None,
        }),
    }
}

/// Host-supplied sink for delivered hits, mirroring the narrow slice of
/// `NautilusSearchProvider` this module actually needs.
pub trait SearchHitSink: Send + 'static {
    fn hits_added(&self, hits: Vec<SearchHit>);
    fn finished(&self);
    fn error(&self, message: String);
}

/// Handle to a running search, allowing the host to cancel it early.
///
/// Dropping the handle without calling [`SearchHandle::join`] detaches the
/// background thread (standard `JoinHandle` semantics) — the search keeps
/// running and still delivers to the sink, it just can no longer be waited
/// on or (if the host forgets to call [`SearchHandle::cancel`] first)
/// cleanly stopped by this handle.
pub struct SearchHandle {
    cancelled: Arc<AtomicBool>,
    join: thread::JoinHandle<()>,
}

impl SearchHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Block until the background search thread has exited.
    pub fn join(self) {
        let _ = self.join.join();
    }
}

/// Spawn `sc <query>`, parse its stdout line by line, and trickle batches of
/// hits to `sink` as they accumulate. Returns immediately with a handle;
/// all subprocess and parsing work happens on a background thread.
pub fn spawn_search(indexer: &str, query: &str, sink: impl SearchHitSink) -> SearchHandle {
    let indexer = indexer.to_string();
    let query = query.to_string();
    let cancelled = Arc::new(AtomicBool::new(false));
    let cancelled_for_thread = Arc::clone(&cancelled);

    let join = thread::spawn(move || {
        run_search(&indexer, &query, &sink, &cancelled_for_thread);
    });

    SearchHandle { cancelled, join }
}

fn run_search(indexer: &str, query: &str, sink: &dyn SearchHitSink, cancelled: &AtomicBool) {
    let mut child = match Command::new(indexer)
        .arg(query)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            warn!("fsprobe: failed to spawn search indexer {indexer:?}: {e}");
            sink.error(format!("failed to start {indexer}: {e}"));
            return;
        }
    };

    let stdout = match child.stdout.take() {
        Some(s) => s,
        None => {
            sink.error("failed to capture indexer stdout".to_string());
            let _ = child.kill();
            return;
        }
    };

    // A dedicated reader thread lets us poll `cancelled` on the main search
    // thread without blocking on a `read_line` call that the subprocess
    // might delay indefinitely producing (unlike the probe core, killing
    // the child here is always safe and always eventually unblocks the
    // reader with EOF).
    let (tx, rx) = mpsc::channel::<String>();
    let reader_handle = thread::spawn(move || {
        let reader = BufReader::new(stdout);
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    let mut batch = Vec::with_capacity(BATCH_SIZE);
    let mut delivered = 0usize;
    let mut capped = false;

    loop {
        if cancelled.load(Ordering::SeqCst) {
            debug!("fsprobe: search cancelled, killing indexer");
            let _ = child.kill();
            break;
        }

        match rx.recv_timeout(std::time::Duration::from_millis(100)) {
            Ok(line) => {
                if let Some(hit) = parse_line(&line) {
                    batch.push(hit);
                    delivered += 1;
                    if batch.len() >= BATCH_SIZE {
                        sink.hits_added(std::mem::take(&mut batch));
                    }
                    if delivered >= MAX_RESULTS {
                        debug!("fsprobe: search hit MAX_RESULTS ({MAX_RESULTS}), stopping early");
                        capped = true;
                        let _ = child.kill();
                        break;
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    let _ = reader_handle.join();

    if !batch.is_empty() {
        sink.hits_added(batch);
    }

    if cancelled.load(Ordering::SeqCst) {
        let _ = child.wait();
        sink.finished();
        return;
    }

    if capped {
        let _ = child.wait();
        sink.finished();
        return;
    }

    match child.wait() {
        Ok(status) if status.success() => sink.finished(),
        Ok(status) => sink.error(format!("indexer exited with {status}")),
        Err(e) => sink.error(format!("failed to wait on indexer: {e}")),
    }
}
