//! Ready event handler for bot initialization.
//!
//! Fired once per gateway connection after authentication. Logs the bot identity
//! together with the dispatcher and endpoint state it starts out with.

use serenity::all::{Context, Ready};

use crate::server::state::AppState;

/// Handles the ready event when the bot connects to Discord.
///
/// # Arguments
/// - `state` - Shared state, read for the startup log line
/// - `ctx` - Discord context (unused)
/// - `ready` - Ready event data containing bot user information
pub async fn handle_ready(state: &AppState, _ctx: Context, ready: Ready) {
    tracing::info!("{} is connected to Discord", ready.user.name);
    tracing::info!(
        "Dispatcher {}, {}",
        if state.dispatcher.is_started() {
            "running"
        } else {
            "not started"
        },
        state.source.mode_description()
    );
}
