//! Server-side core of the alliance bot.
//!
//! Everything here runs inside the bot process. The Discord presentation layer
//! and persistence are external collaborators: they build jobs, submit them to
//! the dispatcher, and consume the results the job actions produce.
//!
//! # Architecture
//!
//! - **Service Layer** (`service/`) - The job dispatcher, the rate-limited source
//!   over the two game API endpoints, the HTTP upstream, and batch processing
//! - **Model Layer** (`model/`) - Jobs, queue snapshots, fetch outcomes, batch reports
//! - **Error Layer** (`error/`) - Application and upstream error types
//!
//! # Infrastructure
//!
//! - **Configuration** (`config`) - Environment-based application configuration
//! - **State** (`state`) - Dispatcher and source shared with command handlers
//! - **Startup** (`startup`) - Tracing, HTTP client and source construction
//! - **Scheduler** (`scheduler/`) - Cron jobs (periodic availability probes)
//! - **Bot** (`bot/`) - Discord client bootstrap and event handlers
//!
//! # Job Flow
//!
//! 1. A command handler builds a `Job` and calls `Dispatcher::submit`
//! 2. The dispatcher worker pops jobs in FIFO order and runs one at a time
//! 3. The job action fetches players through `RateLimitedSource`, waiting out
//!    throttles itself
//! 4. The action reports its results; failures are logged and the queue moves on

pub mod bot;
pub mod config;
pub mod error;
pub mod model;
pub mod scheduler;
pub mod service;
pub mod startup;
pub mod state;
pub mod util;
