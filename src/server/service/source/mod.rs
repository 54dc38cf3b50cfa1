//! Rate-limited access to the two redundant game API endpoints.
//!
//! Every fetch goes to the available endpoint with the most budget left in its
//! sliding window (endpoint A on ties). A call is only sent if that window has
//! room; otherwise the fetch is answered as throttled without touching the
//! upstream or the window. Calls that are sent always count against the budget,
//! whatever the upstream answers.
//!
//! The source never retries. Throttled and failed fetches are returned as
//! values and the caller decides when to try the same identifier again.

pub mod endpoint;
pub mod window;

#[cfg(test)]
mod test;

use std::sync::{Arc, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

use crate::server::{
    config::Config,
    error::upstream::UpstreamError,
    model::fetch::{EndpointId, FetchFailure, FetchOutcome},
    service::{
        source::{endpoint::EndpointRecord, window::SlidingWindow},
        upstream::Upstream,
    },
};

/// Window and throttle settings for the source.
#[derive(Clone, Debug)]
pub struct SourceConfig {
    pub window: Duration,
    pub cap_a: usize,
    pub cap_b: usize,
    /// Wait reported when the upstream rate limits without advertising one.
    pub default_throttle_wait: Duration,
}

impl SourceConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            window: config.rate_window,
            cap_a: config.endpoint_a_cap,
            cap_b: config.endpoint_b_cap,
            default_throttle_wait: config.default_throttle_wait,
        }
    }
}

/// Result of choosing an endpoint for the next call.
enum Reservation {
    Granted(EndpointId),
    Throttled { endpoint: EndpointId, wait: Duration },
    Unavailable,
}

pub struct RateLimitedSource {
    endpoints: [EndpointRecord; 2],
    window: Duration,
    default_throttle_wait: Duration,
}

impl RateLimitedSource {
    /// Creates a source over endpoints A and B; both start out available.
    pub fn new(config: SourceConfig, a: Arc<dyn Upstream>, b: Arc<dyn Upstream>) -> Self {
        Self {
            endpoints: [
                EndpointRecord::new(EndpointId::A, a, SlidingWindow::new(config.cap_a, config.window)),
                EndpointRecord::new(EndpointId::B, b, SlidingWindow::new(config.cap_b, config.window)),
            ],
            window: config.window,
            default_throttle_wait: config.default_throttle_wait,
        }
    }

    fn endpoint(&self, id: EndpointId) -> &EndpointRecord {
        &self.endpoints[id.index()]
    }

    /// Probes both endpoints and refreshes their availability.
    ///
    /// An endpoint answering with a rate limit is reachable and stays available.
    /// Probes do not count against the fetch windows. Call once before a batch of
    /// fetches rather than per identifier.
    pub async fn check_availability(&self) {
        let (a, b) = tokio::join!(
            self.endpoint(EndpointId::A).upstream.probe(),
            self.endpoint(EndpointId::B).upstream.probe()
        );

        for (record, result) in self.endpoints.iter().zip([a, b]) {
            let available = match result {
                Ok(()) | Err(UpstreamError::RateLimited { .. }) => true,
                Err(e) => {
                    tracing::warn!("Probe of endpoint {} failed: {}", record.id, e);
                    false
                }
            };

            if record.set_available(available) {
                if available {
                    tracing::info!("Endpoint {} is available again", record.id);
                } else {
                    tracing::warn!("Endpoint {} marked unavailable", record.id);
                }
            }
        }
    }

    /// Fetches the record for `identifier` with at most one upstream call.
    ///
    /// # Returns
    /// - `FetchOutcome::Success` - Record and the endpoint that served it
    /// - `FetchOutcome::Throttled` - Local window full or upstream rate limit; retry after
    ///   `wait`, which never exceeds the window length
    /// - `FetchOutcome::Failed(NoEndpointAvailable)` - Both endpoints unavailable; nothing sent
    /// - `FetchOutcome::Failed(Transport)` - The call failed; its budget is still spent
    pub async fn fetch(&self, identifier: &str) -> FetchOutcome {
        let endpoint = match self.reserve(Instant::now()) {
            Reservation::Granted(endpoint) => endpoint,
            Reservation::Throttled { endpoint, wait } => {
                tracing::debug!(
                    "Endpoint {} window full, {} must wait {:?}",
                    endpoint,
                    identifier,
                    wait
                );
                return FetchOutcome::Throttled { endpoint, wait };
            }
            Reservation::Unavailable => {
                return FetchOutcome::Failed(FetchFailure::NoEndpointAvailable);
            }
        };

        match self.endpoint(endpoint).upstream.fetch_player(identifier).await {
            Ok(record) => FetchOutcome::Success { record, endpoint },
            Err(UpstreamError::RateLimited { retry_after }) => {
                // A window never holds a call longer than its length.
                let wait = retry_after
                    .unwrap_or(self.default_throttle_wait)
                    .min(self.window);
                tracing::debug!(
                    "Endpoint {} rate limited {}, retry in {:?}",
                    endpoint,
                    identifier,
                    wait
                );
                FetchOutcome::Throttled { endpoint, wait }
            }
            Err(e) => FetchOutcome::Failed(FetchFailure::Transport {
                endpoint,
                reason: e.to_string(),
            }),
        }
    }

    /// Picks an endpoint and records the call in its window.
    ///
    /// The windows of all available endpoints are locked together, in A-then-B
    /// order, so the comparison and the reservation see the same state.
    fn reserve(&self, now: Instant) -> Reservation {
        let mut candidates: Vec<(EndpointId, MutexGuard<'_, SlidingWindow>)> = self
            .endpoints
            .iter()
            .filter(|record| record.is_available())
            .map(|record| (record.id, record.window()))
            .collect();

        if candidates.is_empty() {
            return Reservation::Unavailable;
        }

        // Strict comparison keeps the earlier (primary) endpoint on ties.
        let mut best = 0;
        let mut best_remaining = candidates[0].1.remaining(now);
        for (index, (_, window)) in candidates.iter_mut().enumerate().skip(1) {
            let remaining = window.remaining(now);
            if remaining > best_remaining {
                best = index;
                best_remaining = remaining;
            }
        }

        if best_remaining == 0 {
            // Every available window is full: report the one that frees up first.
            let mut soonest = 0;
            let mut soonest_wait = candidates[0].1.wait_time(now);
            for (index, (_, window)) in candidates.iter_mut().enumerate().skip(1) {
                let wait = window.wait_time(now);
                if wait < soonest_wait {
                    soonest = index;
                    soonest_wait = wait;
                }
            }
            return Reservation::Throttled {
                endpoint: candidates[soonest].0,
                wait: soonest_wait,
            };
        }

        let (endpoint, window) = &mut candidates[best];
        if window.try_reserve(now) {
            Reservation::Granted(*endpoint)
        } else {
            Reservation::Throttled {
                endpoint: *endpoint,
                wait: window.wait_time(now),
            }
        }
    }

    /// Endpoints currently eligible for fetches, primary first.
    pub fn available_endpoints(&self) -> Vec<EndpointId> {
        self.endpoints
            .iter()
            .filter(|record| record.is_available())
            .map(|record| record.id)
            .collect()
    }

    pub fn is_available(&self, id: EndpointId) -> bool {
        self.endpoint(id).is_available()
    }

    /// Calls currently counted in each endpoint's window.
    pub fn window_usage(&self) -> Vec<(EndpointId, usize)> {
        let now = Instant::now();
        self.endpoints
            .iter()
            .map(|record| (record.id, record.window().usage(now)))
            .collect()
    }

    /// Sustained calls per minute an endpoint's window allows.
    fn per_minute(&self, id: EndpointId) -> u64 {
        let cap = self.endpoint(id).window().cap() as f64;
        (cap * 60.0 / self.window.as_secs_f64()).round() as u64
    }

    /// Human-readable throughput estimate for progress reporting.
    pub fn processing_rate_description(&self) -> String {
        match self.available_endpoints().as_slice() {
            [] => "No endpoint available, processing paused".to_string(),
            [single] => format!(
                "~{} requests/minute, 1 endpoint down",
                self.per_minute(*single)
            ),
            both => {
                let total: u64 = both.iter().map(|id| self.per_minute(*id)).sum();
                format!("~{} requests/minute using {} endpoints", total, both.len())
            }
        }
    }

    /// Which endpoints are in use, for progress reporting and operation logs.
    pub fn mode_description(&self) -> String {
        match self.available_endpoints().as_slice() {
            [] => "No endpoint available".to_string(),
            [single] => format!("Single endpoint ({} only)", single),
            both => format!(
                "Dual endpoint ({})",
                both.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" + ")
            ),
        }
    }
}
