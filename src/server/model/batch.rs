//! Progress and result types for identifier batches.

use std::time::Duration;

use crate::server::model::fetch::{EndpointId, FetchFailure, PlayerRecord};

/// Progress events emitted while a batch runs.
#[derive(Clone, Debug, PartialEq)]
pub enum BatchProgress {
    /// An identifier is about to be fetched. `done` counts settled identifiers.
    Fetching {
        identifier: String,
        done: usize,
        total: usize,
    },
    /// Waiting out a throttle before retrying `identifier`.
    Waiting {
        identifier: String,
        remaining: Duration,
    },
    /// An identifier reached a final state.
    Settled {
        identifier: String,
        succeeded: bool,
        done: usize,
        total: usize,
    },
}

/// Final accounting of a batch.
///
/// Every identifier handed to the batch appears in exactly one of
/// `succeeded`, `failed` or `skipped`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchReport {
    pub succeeded: Vec<PlayerRecord>,
    pub failed: Vec<(String, FetchFailure)>,
    /// Identifiers never attempted because the batch was aborted.
    pub skipped: Vec<String>,
    /// Set when the batch stopped early because no endpoint was available.
    pub aborted: bool,
    pub throttle_waits: u32,
    /// Successful fetches per endpoint, for operation logs.
    pub served_by_a: usize,
    pub served_by_b: usize,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.skipped.len()
    }

    pub(crate) fn record_success(&mut self, record: PlayerRecord, endpoint: EndpointId) {
        match endpoint {
            EndpointId::A => self.served_by_a += 1,
            EndpointId::B => self.served_by_b += 1,
        }
        self.succeeded.push(record);
    }
}
