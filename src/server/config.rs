use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::server::error::{config::ConfigError, AppError};

const DEFAULT_ENDPOINT_CAP: usize = 30;
const DEFAULT_RATE_WINDOW_SECS: u64 = 60;
const DEFAULT_THROTTLE_WAIT_SECS: u64 = 60;
const DEFAULT_THROTTLE_STATUS_CODES: &str = "429";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PROBE_SCHEDULE: &str = "0 */5 * * * *";
const DEFAULT_THROTTLE_POLL_SECS: u64 = 5;
const DEFAULT_MAX_THROTTLE_RETRIES: u32 = 10;

pub struct Config {
    pub discord_bot_token: String,

    pub endpoint_a_url: Url,
    pub endpoint_b_url: Url,
    pub endpoint_a_cap: usize,
    pub endpoint_b_cap: usize,

    pub rate_window: Duration,
    pub default_throttle_wait: Duration,
    pub throttle_status_codes: Vec<u16>,
    pub request_timeout: Duration,

    pub probe_schedule: String,

    pub throttle_poll_interval: Duration,
    pub max_throttle_retries: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// `from_env` delegates here with `std::env::var`; tests pass a map instead
    /// so they never touch the process environment.
    ///
    /// # Arguments
    /// - `lookup` - Returns the raw value of a variable, or `None` if unset
    ///
    /// # Returns
    /// - `Ok(Config)` - All required variables present and every value valid
    /// - `Err(AppError::ConfigErr)` - A variable is missing or malformed
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name).ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
        };

        let rate_window = Duration::from_secs(parse_or(
            &lookup,
            "RATE_WINDOW_SECS",
            DEFAULT_RATE_WINDOW_SECS,
        )?);
        if rate_window.is_zero() {
            return Err(invalid("RATE_WINDOW_SECS", "0", "window must be non-zero").into());
        }

        let endpoint_a_cap = parse_or(&lookup, "ENDPOINT_A_CAP", DEFAULT_ENDPOINT_CAP)?;
        let endpoint_b_cap = parse_or(&lookup, "ENDPOINT_B_CAP", DEFAULT_ENDPOINT_CAP)?;
        for (name, cap) in [("ENDPOINT_A_CAP", endpoint_a_cap), ("ENDPOINT_B_CAP", endpoint_b_cap)]
        {
            if cap == 0 {
                return Err(invalid(name, "0", "cap must be at least 1").into());
            }
        }

        let default_throttle_wait = Duration::from_secs(parse_or(
            &lookup,
            "DEFAULT_THROTTLE_WAIT_SECS",
            DEFAULT_THROTTLE_WAIT_SECS,
        )?);
        if default_throttle_wait > rate_window {
            return Err(invalid(
                "DEFAULT_THROTTLE_WAIT_SECS",
                &default_throttle_wait.as_secs().to_string(),
                "wait must not exceed RATE_WINDOW_SECS",
            )
            .into());
        }

        Ok(Self {
            discord_bot_token: required("DISCORD_BOT_TOKEN")?,
            endpoint_a_url: parse_url("ENDPOINT_A_URL", required("ENDPOINT_A_URL")?)?,
            endpoint_b_url: parse_url("ENDPOINT_B_URL", required("ENDPOINT_B_URL")?)?,
            endpoint_a_cap,
            endpoint_b_cap,
            rate_window,
            default_throttle_wait,
            throttle_status_codes: parse_status_codes(
                &lookup("THROTTLE_STATUS_CODES")
                    .unwrap_or_else(|| DEFAULT_THROTTLE_STATUS_CODES.to_string()),
            )?,
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            probe_schedule: lookup("PROBE_SCHEDULE")
                .unwrap_or_else(|| DEFAULT_PROBE_SCHEDULE.to_string()),
            throttle_poll_interval: Duration::from_secs(parse_or(
                &lookup,
                "THROTTLE_POLL_SECS",
                DEFAULT_THROTTLE_POLL_SECS,
            )?),
            max_throttle_retries: parse_or(
                &lookup,
                "MAX_THROTTLE_RETRIES",
                DEFAULT_MAX_THROTTLE_RETRIES,
            )?,
        })
    }
}

fn invalid(name: &str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidEnvVar {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| invalid(name, &raw, e)),
        None => Ok(default),
    }
}

fn parse_url(name: &str, raw: String) -> Result<Url, ConfigError> {
    Url::parse(&raw).map_err(|e| invalid(name, &raw, e))
}

/// Parses the comma separated throttle statuses.
///
/// Only client and server error statuses (400-599) are accepted, and at least
/// one must be given.
fn parse_status_codes(raw: &str) -> Result<Vec<u16>, ConfigError> {
    let codes = raw
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(|code| {
            let status = code
                .parse::<u16>()
                .map_err(|e| invalid("THROTTLE_STATUS_CODES", raw, e))?;
            if !(400..=599).contains(&status) {
                return Err(invalid(
                    "THROTTLE_STATUS_CODES",
                    raw,
                    format!("{} is not an error status", status),
                ));
            }
            Ok(status)
        })
        .collect::<Result<Vec<u16>, ConfigError>>()?;

    if codes.is_empty() {
        return Err(invalid(
            "THROTTLE_STATUS_CODES",
            raw,
            "at least one status is required",
        ));
    }

    Ok(codes)
}
