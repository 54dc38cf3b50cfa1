//! Cron jobs for recurring background work.

pub mod availability;
