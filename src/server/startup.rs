use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::server::{
    config::Config,
    error::AppError,
    service::{
        source::{RateLimitedSource, SourceConfig},
        upstream::http::HttpUpstream,
    },
};

/// Installs the global tracing subscriber.
///
/// Reads the filter from `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Builds the HTTP client shared by both game API endpoints.
///
/// Redirects are disabled so an endpoint cannot bounce requests elsewhere, and
/// every request is bounded by the configured timeout.
///
/// # Arguments
/// - `config` - Application configuration containing the request timeout
///
/// # Returns
/// - `Ok(reqwest::Client)` - Configured client
/// - `Err(AppError::ReqwestErr)` - TLS backend failed to initialize
pub fn setup_reqwest_client(config: &Config) -> Result<reqwest::Client, AppError> {
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(config.request_timeout)
        .build()?;

    Ok(client)
}

/// Builds the rate-limited source over endpoints A and B.
///
/// # Arguments
/// - `config` - Endpoint URLs, window caps and throttle settings
/// - `client` - HTTP client shared by both endpoints
///
/// # Returns
/// - `Ok(RateLimitedSource)` - Source with both endpoints initially available
/// - `Err(AppError::UrlErr)` - An endpoint URL cannot be used as a base
pub fn build_source(
    config: &Config,
    client: reqwest::Client,
) -> Result<RateLimitedSource, AppError> {
    let endpoint_a = HttpUpstream::new(
        client.clone(),
        config.endpoint_a_url.clone(),
        config.throttle_status_codes.clone(),
    )?;
    let endpoint_b = HttpUpstream::new(
        client,
        config.endpoint_b_url.clone(),
        config.throttle_status_codes.clone(),
    )?;

    Ok(RateLimitedSource::new(
        SourceConfig::from_config(config),
        Arc::new(endpoint_a),
        Arc::new(endpoint_b),
    ))
}
