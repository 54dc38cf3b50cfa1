//! Scriptable mock of the game API.
//!
//! Serves `GET {base}/player?fid=...` and `GET {base}/health` where `base` is
//! `http://127.0.0.1:{port}/api/`. The player route answers every request with
//! the current `MockReply` and records the requested identifiers.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

use crate::error::TestError;

/// Answer returned by the player route.
#[derive(Clone, Debug)]
pub enum MockReply {
    /// 200 with `{"code": 0, "data": <payload>}`.
    Player(Value),
    /// 429, with a `Retry-After` header in seconds when set.
    RateLimited { retry_after: Option<u64> },
    /// Bare response with the given status code.
    Status(u16),
    /// 200 with a body that is not JSON.
    Garbage,
}

struct MockState {
    reply: MockReply,
    healthy: bool,
    player_requests: Vec<String>,
}

type SharedState = Arc<Mutex<MockState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to a running mock game API.
///
/// The server stops when the handle is shut down or dropped.
pub struct MockGameApi {
    addr: SocketAddr,
    state: SharedState,
    shutdown: Option<oneshot::Sender<()>>,
    server: Option<JoinHandle<()>>,
}

impl MockGameApi {
    /// Starts the server on an ephemeral localhost port.
    ///
    /// The initial reply is an empty player payload and the health route is up.
    ///
    /// # Returns
    /// - `Ok(MockGameApi)` - Running server
    /// - `Err(TestError::Io)` - Failed to bind the listener
    pub async fn start() -> Result<Self, TestError> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let state: SharedState = Arc::new(Mutex::new(MockState {
            reply: MockReply::Player(json!({})),
            healthy: true,
            player_requests: Vec::new(),
        }));

        let router = Router::new()
            .route("/api/player", get(player))
            .route("/api/health", get(health))
            .with_state(state.clone());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Ok(Self {
            addr,
            state,
            shutdown: Some(shutdown_tx),
            server: Some(server),
        })
    }

    /// Base URL of the API, with a trailing slash.
    pub fn base_url(&self) -> String {
        format!("http://{}/api/", self.addr)
    }

    /// Sets the answer for all subsequent player requests.
    pub fn set_reply(&self, reply: MockReply) {
        lock(&self.state).reply = reply;
    }

    /// Makes the health route answer 200 when `true`, 503 otherwise.
    pub fn set_healthy(&self, healthy: bool) {
        lock(&self.state).healthy = healthy;
    }

    /// Identifiers received by the player route, in arrival order.
    pub fn player_requests(&self) -> Vec<String> {
        lock(&self.state).player_requests.clone()
    }

    /// Stops the server and waits until its listener is closed.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(server) = self.server.take() {
            let _ = server.await;
        }
    }
}

impl Drop for MockGameApi {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn player(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let reply = {
        let mut state = lock(&state);
        state
            .player_requests
            .push(params.get("fid").cloned().unwrap_or_default());
        state.reply.clone()
    };

    match reply {
        MockReply::Player(data) => Json(json!({ "code": 0, "data": data })).into_response(),
        MockReply::RateLimited { retry_after } => {
            let mut response = StatusCode::TOO_MANY_REQUESTS.into_response();
            if let Some(seconds) = retry_after {
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
            }
            response
        }
        MockReply::Status(code) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        MockReply::Garbage => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            "<html>not json</html>",
        )
            .into_response(),
    }
}

async fn health(State(state): State<SharedState>) -> StatusCode {
    if lock(&state).healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that the player route wraps the payload and records the identifier.
    ///
    /// Expected: 200 with the payload under `data`, `fid` recorded
    #[tokio::test]
    async fn serves_player_payload() {
        let api = MockGameApi::start().await.unwrap();
        api.set_reply(MockReply::Player(json!({"nickname": "Frost"})));

        let body: Value = reqwest::get(format!("{}player?fid=77", api.base_url()))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["data"]["nickname"], "Frost");
        assert_eq!(api.player_requests(), vec!["77".to_string()]);
    }

    /// Tests the rate limit reply headers.
    ///
    /// Expected: 429 with `Retry-After: 12`
    #[tokio::test]
    async fn rate_limit_sets_retry_after() {
        let api = MockGameApi::start().await.unwrap();
        api.set_reply(MockReply::RateLimited {
            retry_after: Some(12),
        });

        let response = reqwest::get(format!("{}player?fid=1", api.base_url()))
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 429);
        assert_eq!(
            response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok()),
            Some("12")
        );
    }

    /// Tests toggling the health route.
    ///
    /// Expected: 200 while healthy, 503 after `set_healthy(false)`
    #[tokio::test]
    async fn health_follows_toggle() {
        let api = MockGameApi::start().await.unwrap();
        let url = format!("{}health", api.base_url());

        assert_eq!(reqwest::get(&url).await.unwrap().status().as_u16(), 200);

        api.set_healthy(false);
        assert_eq!(reqwest::get(&url).await.unwrap().status().as_u16(), 503);
    }
}
