//! Process-wide job dispatcher.
//!
//! Serializes long-running, side-effecting jobs so that at most one runs at a
//! time across the whole bot. Jobs are drained in strict FIFO order by a single
//! background worker; the rate-limited source relies on this to assume that no
//! two jobs ever spend its endpoint budgets concurrently.
//!
//! `submit`, `status` and the other introspection methods never suspend. They
//! take one short-held lock around the queue and return immediately.

#[cfg(test)]
mod test;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::Notify;

use crate::server::model::job::{DispatcherStats, Job, JobInfo, QueueStatus};

/// Queue contents guarded by the dispatcher lock.
#[derive(Default)]
struct QueueState {
    queue: VecDeque<Job>,
    current: Option<JobInfo>,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    started: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

struct Inner {
    state: Mutex<QueueState>,
    wake: Notify,
    started: AtomicBool,
    counters: Counters,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // The lock is never held across a panic point, so a poisoned state is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pops the head of the queue and marks it as the running job.
    fn take_next(&self) -> Option<Job> {
        let mut state = self.lock();
        let job = state.queue.pop_front()?;

        let mut info = job.info();
        info.started_at = Some(Utc::now());
        state.current = Some(info);

        Some(job)
    }

    fn finish_current(&self) {
        self.lock().current = None;
    }
}

/// Handle to the dispatcher queue.
///
/// Cloning is cheap and every clone refers to the same queue and worker. The
/// dispatcher is constructed once at startup and passed explicitly to whatever
/// needs to enqueue work.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    /// Creates an empty dispatcher. No worker runs until `start` is called.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(QueueState::default()),
                wake: Notify::new(),
                started: AtomicBool::new(false),
                counters: Counters::default(),
            }),
        }
    }

    /// Appends a job to the tail of the queue.
    ///
    /// Never blocks and is safe to call from any number of concurrent callers.
    /// The returned position is 1-based among waiting jobs: `1` means the job
    /// runs as soon as the currently running job (if any) finishes.
    ///
    /// # Arguments
    /// - `job` - The job to enqueue; ownership of its action moves to the queue
    ///
    /// # Returns
    /// - `usize` - Position of the job in the queue at the time of submission
    pub fn submit(&self, job: Job) -> usize {
        let kind = job.kind;
        let description = job.description.clone();

        let position = {
            let mut state = self.inner.lock();
            state.queue.push_back(job);
            state.queue.len()
        };

        self.inner.counters.submitted.fetch_add(1, Ordering::SeqCst);
        self.inner.wake.notify_one();

        tracing::info!(
            "Queued {} job '{}' at position {}",
            kind,
            description,
            position
        );

        position
    }

    /// Ensures the background worker is running.
    ///
    /// Idempotent: only the first call spawns the worker, later calls do nothing.
    /// The worker lives for the rest of the process. Must be called from within a
    /// Tokio runtime.
    pub fn start(&self) {
        if self
            .inner
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Dispatcher worker already running");
            return;
        }

        let inner = self.inner.clone();
        tokio::spawn(async move {
            run_worker(inner).await;
        });

        tracing::info!("Dispatcher worker started");
    }

    /// Whether `start` has been called.
    pub fn is_started(&self) -> bool {
        self.inner.started.load(Ordering::SeqCst)
    }

    /// Snapshot of the queue length and the running job.
    pub fn status(&self) -> QueueStatus {
        let state = self.inner.lock();
        QueueStatus {
            queue_length: state.queue.len(),
            current_job: state.current.clone(),
        }
    }

    /// Whether the queue is empty and no job is running.
    pub fn is_idle(&self) -> bool {
        let state = self.inner.lock();
        state.queue.is_empty() && state.current.is_none()
    }

    /// Finds the first job tagged with `correlation`.
    ///
    /// # Returns
    /// - `Some(0)` - The running job carries the tag
    /// - `Some(n)` - The first waiting job with the tag is at 1-based position `n`
    /// - `None` - No running or waiting job carries the tag
    pub fn position_of(&self, correlation: &str) -> Option<usize> {
        let state = self.inner.lock();

        if state
            .current
            .as_ref()
            .is_some_and(|job| job.correlation.as_deref() == Some(correlation))
        {
            return Some(0);
        }

        state
            .queue
            .iter()
            .position(|job| job.correlation.as_deref() == Some(correlation))
            .map(|index| index + 1)
    }

    pub fn stats(&self) -> DispatcherStats {
        let counters = &self.inner.counters;
        DispatcherStats {
            submitted: counters.submitted.load(Ordering::SeqCst),
            started: counters.started.load(Ordering::SeqCst),
            completed: counters.completed.load(Ordering::SeqCst),
            failed: counters.failed.load(Ordering::SeqCst),
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Drains the queue one job at a time, sleeping on the notifier when empty.
///
/// Each action runs in its own task which the worker awaits before taking the
/// next job, so a panicking action is contained without breaking sequencing.
async fn run_worker(inner: Arc<Inner>) {
    loop {
        let Some(job) = inner.take_next() else {
            inner.wake.notified().await;
            continue;
        };

        let kind = job.kind;
        let description = job.description.clone();

        inner.counters.started.fetch_add(1, Ordering::SeqCst);
        tracing::info!("Starting {} job '{}'", kind, description);

        let result = tokio::spawn(job.action.run()).await;

        match result {
            Ok(Ok(())) => {
                inner.counters.completed.fetch_add(1, Ordering::SeqCst);
                tracing::info!("Finished {} job '{}'", kind, description);
            }
            Ok(Err(e)) => {
                inner.counters.failed.fetch_add(1, Ordering::SeqCst);
                tracing::error!("{} job '{}' failed: {}", kind, description, e);
            }
            Err(e) => {
                inner.counters.failed.fetch_add(1, Ordering::SeqCst);
                tracing::error!("{} job '{}' panicked: {}", kind, description, e);
            }
        }

        inner.finish_current();
    }
}
