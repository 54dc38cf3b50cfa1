//! Job model for the dispatcher queue.
//!
//! A `Job` pairs an opaque asynchronous action with the metadata callers use to
//! introspect the queue. The dispatcher never looks inside the action and never
//! schedules by `kind`; the metadata exists only for display and progress lookups.

use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::server::error::AppError;

/// Class of a dispatched job, used only for display and introspection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Bulk import of player identifiers into an alliance.
    MemberAddition,
    /// Periodic or manual check of an alliance's members against the game API.
    AllianceControl,
    /// Refresh of endpoint availability.
    AvailabilityProbe,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobKind::MemberAddition => "member addition",
            JobKind::AllianceControl => "alliance control",
            JobKind::AvailabilityProbe => "availability probe",
        };
        f.write_str(label)
    }
}

/// The unit of work a job performs.
///
/// Consumed on execution, so an action can run at most once. Any
/// `FnOnce() -> impl Future<Output = Result<(), AppError>>` closure is an action.
#[async_trait]
pub trait Action: Send + 'static {
    async fn run(self: Box<Self>) -> Result<(), AppError>;
}

#[async_trait]
impl<F, Fut> Action for F
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), AppError>> + Send + 'static,
{
    async fn run(self: Box<Self>) -> Result<(), AppError> {
        (*self)().await
    }
}

/// A queued unit of work.
///
/// Has no identity beyond its position in the queue; submitting the same work
/// twice produces two independent jobs.
pub struct Job {
    pub kind: JobKind,
    pub description: String,
    /// Caller-supplied tag (e.g. an alliance id), never interpreted by the dispatcher.
    pub correlation: Option<String>,
    pub(crate) action: Box<dyn Action>,
}

impl Job {
    pub fn new<A>(kind: JobKind, description: impl Into<String>, action: A) -> Self
    where
        A: Action,
    {
        Self {
            kind,
            description: description.into(),
            correlation: None,
            action: Box::new(action),
        }
    }

    /// Attaches a correlation tag used by callers to find their job in the queue.
    pub fn with_correlation(mut self, correlation: impl Into<String>) -> Self {
        self.correlation = Some(correlation.into());
        self
    }

    /// Metadata snapshot of this job, without the action.
    pub fn info(&self) -> JobInfo {
        JobInfo {
            kind: self.kind,
            description: self.description.clone(),
            correlation: self.correlation.clone(),
            started_at: None,
        }
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("kind", &self.kind)
            .field("description", &self.description)
            .field("correlation", &self.correlation)
            .finish_non_exhaustive()
    }
}

/// Metadata of a job as exposed by queue introspection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JobInfo {
    pub kind: JobKind,
    pub description: String,
    pub correlation: Option<String>,
    /// Set once the worker has started the job.
    pub started_at: Option<DateTime<Utc>>,
}

/// Point-in-time snapshot of the dispatcher queue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    /// Number of jobs waiting, excluding the running one.
    pub queue_length: usize,
    /// The running job, `None` when the worker is idle.
    pub current_job: Option<JobInfo>,
}

impl QueueStatus {
    /// Whether the queue is empty and nothing is running.
    pub fn is_idle(&self) -> bool {
        self.queue_length == 0 && self.current_job.is_none()
    }

    /// One-line description used by progress messages.
    pub fn summary(&self) -> String {
        match &self.current_job {
            None if self.queue_length == 0 => "Idle".to_string(),
            None => format!("Starting ({} queued)", self.queue_length),
            Some(job) => format!(
                "Running {}: {} ({} queued)",
                job.kind, job.description, self.queue_length
            ),
        }
    }
}

/// Monotonic dispatcher counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DispatcherStats {
    pub submitted: u64,
    pub started: u64,
    pub completed: u64,
    pub failed: u64,
}
