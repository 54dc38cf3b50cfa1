//! Identifier batches driven through the rate-limited source.
//!
//! Job actions such as member import and alliance control fetch many player
//! identifiers in a row. `PlayerBatch` owns that loop: it settles every
//! identifier exactly once, waits out throttles in small increments so callers
//! can keep reporting progress, and gives up on an identifier after a bounded
//! number of throttles so a job can never spin forever.

#[cfg(test)]
mod test;

use std::time::Duration;

use tokio::time::Instant;

use crate::server::{
    config::Config,
    model::{
        batch::{BatchProgress, BatchReport},
        fetch::{FetchFailure, FetchOutcome},
    },
    service::source::RateLimitedSource,
};

/// Pacing and retry limits for a batch.
#[derive(Clone, Copy, Debug)]
pub struct BatchOptions {
    /// Longest single sleep while waiting out a throttle.
    pub poll_interval: Duration,
    /// Throttles on one identifier after which it is failed.
    pub max_throttle_retries: u32,
}

impl BatchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: config.throttle_poll_interval,
            max_throttle_retries: config.max_throttle_retries,
        }
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_throttle_retries: 10,
        }
    }
}

pub struct PlayerBatch<'a> {
    source: &'a RateLimitedSource,
    options: BatchOptions,
}

impl<'a> PlayerBatch<'a> {
    pub fn new(source: &'a RateLimitedSource, options: BatchOptions) -> Self {
        Self { source, options }
    }

    /// Fetches every identifier, in order, reporting progress as it goes.
    ///
    /// Availability is probed once up front. If no endpoint is available the
    /// batch is aborted before any fetch and every identifier is skipped. If the
    /// endpoints disappear mid-batch, the remaining identifiers are skipped and
    /// the results gathered so far are kept.
    ///
    /// # Arguments
    /// - `identifiers` - Player identifiers, already de-duplicated
    /// - `on_progress` - Called synchronously for every progress event
    ///
    /// # Returns
    /// - `BatchReport` - Every identifier in exactly one of succeeded, failed, skipped
    pub async fn run<F>(&self, identifiers: Vec<String>, mut on_progress: F) -> BatchReport
    where
        F: FnMut(BatchProgress),
    {
        let mut report = BatchReport::default();
        let total = identifiers.len();

        self.source.check_availability().await;
        if self.source.available_endpoints().is_empty() {
            tracing::warn!("No endpoint available, skipping batch of {} identifiers", total);
            report.aborted = true;
            report.skipped = identifiers;
            return report;
        }

        tracing::info!(
            "Processing {} identifiers, {} ({})",
            total,
            self.source.processing_rate_description(),
            self.source.mode_description()
        );

        let mut pending = identifiers.into_iter();
        while let Some(identifier) = pending.next() {
            let mut throttles = 0u32;

            let succeeded = loop {
                on_progress(BatchProgress::Fetching {
                    identifier: identifier.clone(),
                    done: report.total(),
                    total,
                });

                match self.source.fetch(&identifier).await {
                    FetchOutcome::Success { record, endpoint } => {
                        report.record_success(record, endpoint);
                        break true;
                    }
                    FetchOutcome::Throttled { wait, .. } => {
                        throttles += 1;
                        report.throttle_waits += 1;

                        if throttles >= self.options.max_throttle_retries {
                            tracing::warn!(
                                "Giving up on {} after {} throttled attempts",
                                identifier,
                                throttles
                            );
                            report.failed.push((
                                identifier.clone(),
                                FetchFailure::ThrottleRetriesExhausted {
                                    attempts: throttles,
                                },
                            ));
                            break false;
                        }

                        self.wait_out(&identifier, wait, &mut on_progress).await;
                    }
                    FetchOutcome::Failed(FetchFailure::NoEndpointAvailable) => {
                        tracing::warn!(
                            "Endpoints became unavailable, aborting batch at {}",
                            identifier
                        );
                        report.aborted = true;
                        report.skipped.push(identifier);
                        report.skipped.extend(pending.by_ref());
                        return report;
                    }
                    FetchOutcome::Failed(failure) => {
                        tracing::debug!("Fetch of {} failed: {}", identifier, failure);
                        report.failed.push((identifier.clone(), failure));
                        break false;
                    }
                }
            };

            on_progress(BatchProgress::Settled {
                identifier,
                succeeded,
                done: report.total(),
                total,
            });
        }

        report
    }

    /// Sleeps for `wait` in increments of at most `poll_interval`.
    async fn wait_out<F>(&self, identifier: &str, wait: Duration, on_progress: &mut F)
    where
        F: FnMut(BatchProgress),
    {
        let Some(deadline) = Instant::now().checked_add(wait) else {
            tracing::warn!("Ignoring unrepresentable wait of {:?} for {}", wait, identifier);
            return;
        };

        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }

            let remaining = deadline - now;
            on_progress(BatchProgress::Waiting {
                identifier: identifier.to_string(),
                remaining,
            });

            let step = if self.options.poll_interval.is_zero() {
                remaining
            } else {
                remaining.min(self.options.poll_interval)
            };
            tokio::time::sleep(step).await;
        }
    }
}
