use std::time::Duration;
use thiserror::Error;

/// Errors reported by a single upstream endpoint call.
///
/// The rate-limited source classifies these into fetch outcomes: `RateLimited`
/// becomes `throttled`, every other variant becomes `failed`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// The endpoint explicitly refused the call because of rate limiting.
    ///
    /// `retry_after` holds the wait advertised by the endpoint, if any.
    #[error("Rate limited by upstream")]
    RateLimited { retry_after: Option<Duration> },

    /// The request never produced a response (connection, timeout, TLS).
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status that is not a rate limit.
    #[error("Upstream returned status {0}")]
    Status(u16),

    /// The response body could not be interpreted as a player record.
    #[error("Failed to decode upstream response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            UpstreamError::Decode(err.to_string())
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}
