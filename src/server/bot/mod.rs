//! Discord bot integration.
//!
//! The bot is the process host for the dispatcher: it connects to the gateway,
//! logs readiness and answers a small queue status command. Slash commands that
//! build member-addition and alliance-control jobs are registered by the
//! presentation layer against the same `AppState`.
//!
//! # Gateway Intents
//!
//! The bot requires the following gateway intents:
//! - `GUILDS` - Receive guild availability events
//! - `GUILD_MESSAGES` - Receive messages in guild channels
//! - `MESSAGE_CONTENT` - Read message text for the `!queue` command (privileged intent)
//!
//! Note: `MESSAGE_CONTENT` is a privileged intent and must be explicitly enabled
//! in the Discord Developer Portal for the bot application.

pub mod handler;
pub mod start;
