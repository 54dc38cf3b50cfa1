//! Server-side domain models.
//!
//! Jobs and queue snapshots used by the dispatcher, fetch outcomes produced by
//! the rate-limited source, and the reports built by batch runs on top of it.

pub mod batch;
pub mod fetch;
pub mod job;
