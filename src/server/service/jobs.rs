//! Builders for the jobs the bot submits to the dispatcher.
//!
//! Command handlers describe what they want done; these helpers wrap that work
//! into `Job`s whose actions drive the rate-limited source from the dispatcher's
//! worker, keeping every fetch on the single sequential path.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::server::{
    error::AppError,
    model::{
        batch::{BatchProgress, BatchReport},
        job::{Job, JobKind},
    },
    service::{
        batch::{BatchOptions, PlayerBatch},
        source::RateLimitedSource,
    },
};

/// Job that refreshes endpoint availability.
pub fn availability_probe(source: Arc<RateLimitedSource>) -> Job {
    Job::new(
        JobKind::AvailabilityProbe,
        "Check game API availability",
        move || async move {
            source.check_availability().await;
            tracing::info!("Game API mode: {}", source.mode_description());
            Ok::<(), AppError>(())
        },
    )
}

/// Everything needed to run one identifier batch as a job.
pub struct BatchJob {
    pub kind: JobKind,
    pub description: String,
    /// Usually the alliance the batch belongs to.
    pub correlation: Option<String>,
    pub identifiers: Vec<String>,
    pub options: BatchOptions,
    /// Receives progress events; dropped receivers are ignored.
    pub progress: Option<UnboundedSender<BatchProgress>>,
}

impl BatchJob {
    /// Wraps the batch into a job whose action hands the final report to `on_complete`.
    ///
    /// Persisting results and notifying users is up to `on_complete`; an error it
    /// returns fails the job and is logged by the dispatcher.
    pub fn into_job<R, Fut>(self, source: Arc<RateLimitedSource>, on_complete: R) -> Job
    where
        R: FnOnce(BatchReport) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), AppError>> + Send + 'static,
    {
        let BatchJob {
            kind,
            description,
            correlation,
            identifiers,
            options,
            progress,
        } = self;

        let job = Job::new(kind, description, move || async move {
            let batch = PlayerBatch::new(&source, options);
            let report = batch
                .run(identifiers, |event| {
                    if let Some(tx) = &progress {
                        let _ = tx.send(event);
                    }
                })
                .await;

            on_complete(report).await
        });

        match correlation {
            Some(correlation) => job.with_correlation(correlation),
            None => job,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::server::{
        model::fetch::EndpointId,
        service::{dispatcher::Dispatcher, source::SourceConfig, upstream::fake::FakeUpstream},
    };

    fn shared_source() -> (Arc<RateLimitedSource>, Arc<FakeUpstream>, Arc<FakeUpstream>) {
        let a = FakeUpstream::new();
        let b = FakeUpstream::new();
        let source = RateLimitedSource::new(
            SourceConfig {
                window: Duration::from_secs(60),
                cap_a: 5,
                cap_b: 5,
                default_throttle_wait: Duration::from_secs(60),
            },
            a.clone(),
            b.clone(),
        );
        (Arc::new(source), a, b)
    }

    fn batch(description: &str, identifiers: &[&str]) -> BatchJob {
        BatchJob {
            kind: JobKind::MemberAddition,
            description: description.to_string(),
            correlation: Some(description.to_string()),
            identifiers: identifiers.iter().map(|id| id.to_string()).collect(),
            options: BatchOptions::default(),
            progress: None,
        }
    }

    async fn wait_for_idle(dispatcher: &Dispatcher) {
        while !dispatcher.is_idle() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Tests two batch jobs running through the dispatcher.
    ///
    /// Expected: reports delivered in submission order, each identifier fetched once
    #[tokio::test]
    async fn batch_jobs_run_sequentially() {
        let (source, a, b) = shared_source();
        let dispatcher = Dispatcher::new();
        dispatcher.start();
        let reports: Arc<Mutex<Vec<(String, usize)>>> = Arc::default();

        for (name, ids) in [("first", &["1", "2", "3"][..]), ("second", &["4", "5"][..])] {
            let reports = reports.clone();
            let label = name.to_string();
            dispatcher.submit(batch(name, ids).into_job(source.clone(), move |report| async move {
                reports
                    .lock()
                    .unwrap()
                    .push((label, report.succeeded.len()));
                Ok::<(), AppError>(())
            }));
        }

        wait_for_idle(&dispatcher).await;

        assert_eq!(
            *reports.lock().unwrap(),
            vec![("first".to_string(), 3), ("second".to_string(), 2)]
        );
        assert_eq!(a.call_count() + b.call_count(), 5);
    }

    /// Tests progress forwarding from a batch job.
    ///
    /// Expected: one settled event per identifier on the channel
    #[tokio::test]
    async fn forwards_progress_events() {
        let (source, _a, _b) = shared_source();
        let dispatcher = Dispatcher::new();
        dispatcher.start();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let mut job = batch("progress", &["1", "2"]);
        job.progress = Some(tx);
        dispatcher.submit(job.into_job(source, |_| async { Ok::<(), AppError>(()) }));

        wait_for_idle(&dispatcher).await;

        let mut settled = 0;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, BatchProgress::Settled { .. }) {
                settled += 1;
            }
        }
        assert_eq!(settled, 2);
    }

    /// Tests the probe job against a failing endpoint.
    ///
    /// Expected: endpoint A marked unavailable once the job has run
    #[tokio::test]
    async fn probe_job_updates_availability() {
        let (source, a, _b) = shared_source();
        a.set_probe_ok(false);
        let dispatcher = Dispatcher::new();
        dispatcher.start();

        dispatcher.submit(availability_probe(source.clone()));
        wait_for_idle(&dispatcher).await;

        assert!(!source.is_available(EndpointId::A));
        assert!(source.is_available(EndpointId::B));
    }
}
