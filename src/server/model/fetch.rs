//! Value types produced by the rate-limited source.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

/// One of the two redundant upstream endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum EndpointId {
    A,
    B,
}

impl EndpointId {
    pub const ALL: [EndpointId; 2] = [EndpointId::A, EndpointId::B];

    pub(crate) fn index(self) -> usize {
        match self {
            EndpointId::A => 0,
            EndpointId::B => 1,
        }
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointId::A => f.write_str("A"),
            EndpointId::B => f.write_str("B"),
        }
    }
}

/// Player data returned by an endpoint.
///
/// The payload shape belongs to the game API; it is kept as raw JSON and only
/// the fields callers commonly display get accessors.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerRecord {
    pub identifier: String,
    pub data: Value,
}

impl PlayerRecord {
    pub fn new(identifier: impl Into<String>, data: Value) -> Self {
        Self {
            identifier: identifier.into(),
            data,
        }
    }

    pub fn nickname(&self) -> Option<&str> {
        self.data.get("nickname").and_then(Value::as_str)
    }
}

/// Why a fetch ended in `failed`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchFailure {
    /// Both endpoints are marked unavailable; nothing was sent.
    NoEndpointAvailable,
    /// A single call failed; other identifiers are unaffected.
    Transport { endpoint: EndpointId, reason: String },
    /// The caller gave up on an identifier after repeated throttling.
    ThrottleRetriesExhausted { attempts: u32 },
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::NoEndpointAvailable => f.write_str("no endpoint available"),
            FetchFailure::Transport { endpoint, reason } => {
                write!(f, "endpoint {} failed: {}", endpoint, reason)
            }
            FetchFailure::ThrottleRetriesExhausted { attempts } => {
                write!(f, "still throttled after {} attempts", attempts)
            }
        }
    }
}

/// Coarse status of a fetch outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    Success,
    Throttled,
    Failed,
}

/// Result of one fetch attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchOutcome {
    Success {
        record: PlayerRecord,
        endpoint: EndpointId,
    },
    /// Flow control, not an error: retry the same identifier after `wait`.
    Throttled { endpoint: EndpointId, wait: Duration },
    Failed(FetchFailure),
}

impl FetchOutcome {
    pub fn status(&self) -> FetchStatus {
        match self {
            FetchOutcome::Success { .. } => FetchStatus::Success,
            FetchOutcome::Throttled { .. } => FetchStatus::Throttled,
            FetchOutcome::Failed(_) => FetchStatus::Failed,
        }
    }

    /// The endpoint that served or refused the call, if one was chosen.
    pub fn endpoint(&self) -> Option<EndpointId> {
        match self {
            FetchOutcome::Success { endpoint, .. } | FetchOutcome::Throttled { endpoint, .. } => {
                Some(*endpoint)
            }
            FetchOutcome::Failed(FetchFailure::Transport { endpoint, .. }) => Some(*endpoint),
            FetchOutcome::Failed(_) => None,
        }
    }

    pub fn wait(&self) -> Option<Duration> {
        match self {
            FetchOutcome::Throttled { wait, .. } => Some(*wait),
            _ => None,
        }
    }
}
