use std::sync::Arc;

use alliance_dispatch::server::{
    bot,
    config::Config,
    error::AppError,
    scheduler::availability,
    service::{batch::BatchOptions, dispatcher::Dispatcher, jobs},
    startup,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    startup::init_tracing();

    let config = Config::from_env()?;

    let http_client = startup::setup_reqwest_client(&config)?;
    let source = Arc::new(startup::build_source(&config, http_client)?);

    let dispatcher = Dispatcher::new();
    dispatcher.start();

    // Refresh availability before the first batch can be submitted
    dispatcher.submit(jobs::availability_probe(source.clone()));

    let _scheduler =
        availability::start_scheduler(&config.probe_schedule, dispatcher.clone(), source.clone())
            .await?;

    tracing::info!("Starting bot");

    let state = AppState::new(dispatcher, source, BatchOptions::from_config(&config));
    let client = bot::start::init_bot(&config, state).await?;

    if let Err(e) = bot::start::start_bot(client).await {
        tracing::error!("Discord bot error: {}", e);
        return Err(e);
    }

    Ok(())
}
