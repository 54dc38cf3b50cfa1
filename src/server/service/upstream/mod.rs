//! Upstream game API endpoints.
//!
//! Each of the two redundant endpoints is reached through an `Upstream`
//! implementation. The rate-limited source owns one per endpoint and is the only
//! caller; implementations perform exactly one request per call and never retry.

pub mod http;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;

use crate::server::{error::upstream::UpstreamError, model::fetch::PlayerRecord};

/// A single upstream endpoint serving player records.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Lightweight reachability check.
    ///
    /// # Returns
    /// - `Ok(())` - Endpoint answered normally
    /// - `Err(UpstreamError::RateLimited)` - Endpoint is up but refusing calls for now
    /// - `Err(_)` - Endpoint is unreachable or broken
    async fn probe(&self) -> Result<(), UpstreamError>;

    /// Fetches the record for one player identifier with a single request.
    async fn fetch_player(&self, identifier: &str) -> Result<PlayerRecord, UpstreamError>;
}
