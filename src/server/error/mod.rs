//! Error types for the dispatcher and its collaborators.
//!
//! `AppError` is the top-level error that job actions, startup and the bot
//! bootstrap return. Errors raised by an upstream endpoint are kept in their
//! own `UpstreamError` type because the rate-limited source converts them into
//! fetch outcomes instead of propagating them.

pub mod config;
pub mod upstream;

use thiserror::Error;

use crate::server::error::{config::ConfigError, upstream::UpstreamError};

/// Top-level application error type.
///
/// Aggregates the errors that can occur during startup and while a job action
/// runs. Most variants use `#[from]` so `?` converts them automatically.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup or environment variable loading.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Error returned by one of the upstream game API endpoints.
    #[error(transparent)]
    UpstreamErr(#[from] UpstreamError),

    /// HTTP client construction or request error from reqwest.
    #[error(transparent)]
    ReqwestErr(#[from] reqwest::Error),

    /// Invalid endpoint URL.
    #[error(transparent)]
    UrlErr(#[from] url::ParseError),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// Cron scheduler error.
    #[error(transparent)]
    SchedulerErr(#[from] tokio_cron_scheduler::JobSchedulerError),

    /// Invalid caller input, such as a malformed identifier list.
    ///
    /// # Fields
    /// - Message describing what was invalid about the input
    #[error("{0}")]
    BadRequest(String),

    /// Internal error with custom message.
    #[error("{0}")]
    InternalError(String),
}

/// Manual conversion from serenity::Error to AppError.
///
/// Boxes the error to reduce the size of the AppError enum, as serenity::Error
/// is very large and would make all AppError variants larger if not boxed.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}
