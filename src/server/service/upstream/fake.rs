//! Scripted in-memory upstream for source and batch tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use crate::server::{
    error::upstream::UpstreamError, model::fetch::PlayerRecord, service::upstream::Upstream,
};

/// Upstream whose responses are scripted per identifier.
///
/// Unscripted identifiers succeed with a generated nickname.
pub(crate) struct FakeUpstream {
    probe_ok: AtomicBool,
    probe_rate_limited: AtomicBool,
    calls: Mutex<Vec<String>>,
    scripted: Mutex<HashMap<String, VecDeque<Result<(), UpstreamError>>>>,
}

impl FakeUpstream {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            probe_ok: AtomicBool::new(true),
            probe_rate_limited: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
            scripted: Mutex::new(HashMap::new()),
        })
    }

    pub(crate) fn set_probe_ok(&self, ok: bool) {
        self.probe_ok.store(ok, Ordering::SeqCst);
    }

    /// Makes probes answer with a rate limit instead of success.
    pub(crate) fn set_probe_rate_limited(&self, limited: bool) {
        self.probe_rate_limited.store(limited, Ordering::SeqCst);
    }

    /// Queues responses for `identifier`; `Ok(())` yields a generated record.
    pub(crate) fn script(&self, identifier: &str, results: Vec<Result<(), UpstreamError>>) {
        self.scripted
            .lock()
            .unwrap()
            .insert(identifier.to_string(), results.into());
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn probe(&self) -> Result<(), UpstreamError> {
        if self.probe_rate_limited.load(Ordering::SeqCst) {
            return Err(UpstreamError::RateLimited { retry_after: None });
        }
        if self.probe_ok.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(UpstreamError::Transport("probe refused".to_string()))
        }
    }

    async fn fetch_player(&self, identifier: &str) -> Result<PlayerRecord, UpstreamError> {
        self.calls.lock().unwrap().push(identifier.to_string());

        let scripted = self
            .scripted
            .lock()
            .unwrap()
            .get_mut(identifier)
            .and_then(VecDeque::pop_front);

        scripted.unwrap_or(Ok(())).map(|()| {
            PlayerRecord::new(
                identifier,
                json!({ "nickname": format!("player-{}", identifier) }),
            )
        })
    }
}
