//! Shared state handed to the bot's command handlers.
//!
//! The dispatcher and the rate-limited source are created once at startup and
//! passed explicitly to whatever builds jobs, instead of living in a global.

use std::sync::Arc;

use crate::server::service::{
    batch::BatchOptions, dispatcher::Dispatcher, source::RateLimitedSource,
};

/// Application state shared by all event and command handlers.
///
/// Cheap to clone: the dispatcher is a handle over shared state and the source
/// sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The process-wide job queue.
    pub dispatcher: Dispatcher,

    /// Rate-limited access to the game API endpoints.
    ///
    /// Only job actions running on the dispatcher should fetch through it;
    /// handlers may read its descriptions for progress messages.
    pub source: Arc<RateLimitedSource>,

    /// Pacing used by batch jobs built from this state.
    pub batch_options: BatchOptions,
}

impl AppState {
    pub fn new(
        dispatcher: Dispatcher,
        source: Arc<RateLimitedSource>,
        batch_options: BatchOptions,
    ) -> Self {
        Self {
            dispatcher,
            source,
            batch_options,
        }
    }
}
