use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use serde_json::Value;
use url::Url;

use crate::server::{
    error::{upstream::UpstreamError, AppError},
    model::fetch::PlayerRecord,
    service::upstream::Upstream,
};

const PLAYER_PATH: &str = "player";
const HEALTH_PATH: &str = "health";

/// Game API endpoint reached over HTTP.
///
/// Player records are fetched with `GET {base}/player?fid=<id>` and availability
/// is probed with `GET {base}/health`. Which response statuses count as rate
/// limiting is configuration, since the upstream does not document it.
pub struct HttpUpstream {
    client: reqwest::Client,
    player_url: Url,
    health_url: Url,
    throttle_statuses: Vec<u16>,
}

impl HttpUpstream {
    /// Creates an upstream rooted at `base_url`.
    ///
    /// The base is treated as a directory, so `http://host/api` and
    /// `http://host/api/` both resolve the player route to `http://host/api/player`.
    ///
    /// # Arguments
    /// - `client` - Shared reqwest client (timeouts are configured on it)
    /// - `base_url` - Root URL of the endpoint
    /// - `throttle_statuses` - HTTP statuses classified as rate limiting
    ///
    /// # Returns
    /// - `Ok(HttpUpstream)` - Routes resolved against the base URL
    /// - `Err(AppError::UrlErr)` - The base URL cannot be joined with the routes
    pub fn new(
        client: reqwest::Client,
        mut base_url: Url,
        throttle_statuses: Vec<u16>,
    ) -> Result<Self, AppError> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            player_url: base_url.join(PLAYER_PATH)?,
            health_url: base_url.join(HEALTH_PATH)?,
            throttle_statuses,
        })
    }

    fn is_throttle_status(&self, status: reqwest::StatusCode) -> bool {
        self.throttle_statuses.contains(&status.as_u16())
    }
}

/// Reads a `Retry-After` header given in seconds.
///
/// HTTP-date values are ignored and fall back to the configured default wait.
fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Unwraps a `{"data": {...}}` envelope if present.
fn player_payload(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or_default()
        }
        other => other,
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn probe(&self) -> Result<(), UpstreamError> {
        let response = self.client.get(self.health_url.clone()).send().await?;
        let status = response.status();

        if self.is_throttle_status(status) {
            return Err(UpstreamError::RateLimited {
                retry_after: retry_after(&response),
            });
        }
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        Ok(())
    }

    async fn fetch_player(&self, identifier: &str) -> Result<PlayerRecord, UpstreamError> {
        let response = self
            .client
            .get(self.player_url.clone())
            .query(&[("fid", identifier)])
            .send()
            .await?;
        let status = response.status();

        if self.is_throttle_status(status) {
            return Err(UpstreamError::RateLimited {
                retry_after: retry_after(&response),
            });
        }
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;

        Ok(PlayerRecord::new(identifier, player_payload(body)))
    }
}
