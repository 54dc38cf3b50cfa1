//! Message handler for the queue status command.

use serenity::all::{Context, Message};

use crate::server::state::AppState;

/// Text command answered with a queue and endpoint status report.
pub const QUEUE_COMMAND: &str = "!queue";

/// Handle message creation in a channel
///
/// Replies to `!queue` in guild channels with the current dispatcher status and
/// the endpoint mode. Other messages and bot authors are ignored.
pub async fn handle_message(state: &AppState, ctx: Context, message: Message) {
    if message.author.bot || message.guild_id.is_none() {
        return;
    }

    if message.content.trim() != QUEUE_COMMAND {
        return;
    }

    let report = queue_report(state);

    if let Err(e) = message.channel_id.say(&ctx.http, report).await {
        tracing::error!(
            "Failed to send queue report to channel {}: {}",
            message.channel_id,
            e
        );
    }
}

/// Builds the status report sent in reply to `!queue`.
///
/// # Returns
/// - `String` - Three lines: queue summary, endpoint mode, processing rate
pub fn queue_report(state: &AppState) -> String {
    format!(
        "**Queue:** {}\n**Mode:** {}\n**Rate:** {}",
        state.dispatcher.status().summary(),
        state.source.mode_description(),
        state.source.processing_rate_description()
    )
}
