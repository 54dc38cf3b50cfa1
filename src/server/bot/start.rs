use serenity::all::{Client, GatewayIntents};

use crate::server::bot::handler::Handler;
use crate::server::config::Config;
use crate::server::error::AppError;
use crate::server::state::AppState;

/// Builds the Discord client without connecting.
///
/// # Arguments
/// - `config` - Application configuration containing the bot token
/// - `state` - Shared state handed to the event handler
///
/// # Returns
/// - `Ok(Client)` - Client ready to be started
/// - `Err(AppError::DiscordErr)` - Client construction failed (e.g. malformed token)
pub async fn init_bot(config: &Config, state: AppState) -> Result<Client, AppError> {
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let client = Client::builder(&config.discord_bot_token, intents)
        .event_handler(Handler::new(state))
        .await?;

    Ok(client)
}

/// Connects the bot to Discord and runs until the connection shuts down.
///
/// # Arguments
/// - `client` - Client returned by `init_bot`
///
/// # Returns
/// - `Ok(())` - The gateway connection closed cleanly
/// - `Err(AppError::DiscordErr)` - Connection or authentication failed
pub async fn start_bot(mut client: Client) -> Result<(), AppError> {
    tracing::info!("Starting Discord bot...");

    client.start().await?;

    Ok(())
}
