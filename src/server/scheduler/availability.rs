use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler};

use crate::server::{
    error::AppError,
    service::{dispatcher::Dispatcher, jobs, source::RateLimitedSource},
};

/// Correlation tag carried by scheduled probe jobs.
const PROBE_CORRELATION: &str = "scheduled-availability-probe";

/// Starts the periodic endpoint availability probe.
///
/// On every tick of `schedule` a probe job is submitted to the dispatcher rather
/// than probing directly, so availability only ever changes between jobs and a
/// running batch never sees its endpoints flip underneath it.
///
/// # Arguments
/// - `schedule`: Cron expression with seconds, e.g. `0 */5 * * * *`
/// - `dispatcher`: Dispatcher the probe jobs are submitted to
/// - `source`: Source whose endpoints are probed
///
/// # Returns
/// - `Ok(JobScheduler)` - Running scheduler; keep it alive for the probes to continue
/// - `Err(AppError::SchedulerErr)` - Invalid schedule or scheduler failure
pub async fn start_scheduler(
    schedule: &str,
    dispatcher: Dispatcher,
    source: Arc<RateLimitedSource>,
) -> Result<JobScheduler, AppError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let dispatcher = dispatcher.clone();
        let source = source.clone();

        Box::pin(async move {
            // Skip the tick if a probe is already waiting in the queue.
            if matches!(dispatcher.position_of(PROBE_CORRELATION), Some(position) if position > 0) {
                tracing::debug!("Availability probe already queued, skipping tick");
                return;
            }

            dispatcher.submit(jobs::availability_probe(source).with_correlation(PROBE_CORRELATION));
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    tracing::info!("Availability probe scheduler started ({})", schedule);

    Ok(scheduler)
}
