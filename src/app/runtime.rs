use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use serenity::all::{Client, GatewayIntents};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use valopro_core::{AlertScheduler, MatchFeed, MatchService, Settings, VlrClient};

use crate::app::discord::{ChannelAlertSink, Handler};
use crate::app::terminal;
use crate::cli::Args;

pub(crate) async fn run_bot() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // .env before tracing so RUST_LOG can come from it
    let dotenv = dotenvy::dotenv();
    terminal::init_tracing(args.default_log_level());
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => debug!("No .env file"),
        Err(e) => warn!(error = %e, "Ignoring unreadable .env"),
    }
    debug!(?args, "CLI arguments parsed");

    let settings = Settings::from_env()?.apply_overrides(&args.overrides())?;
    info!(
        api_base = %settings.api_base,
        alert_channel = ?settings.alerts.channel_id,
        "valopro starting"
    );
    if settings.alerts.channel_id.is_none() {
        info!("ALERT_CHANNEL_ID not set; start alerts disabled");
    }

    let feed: Arc<dyn MatchFeed> = Arc::new(VlrClient::with_base_url(settings.api_base.as_str())?);
    let service = Arc::new(MatchService::new(Arc::clone(&feed)));

    let (ready_tx, ready_rx) = watch::channel(false);
    let handler = Handler::new(service, ready_tx, !args.no_command_sync);
    let mut client = Client::builder(&settings.token, GatewayIntents::GUILDS)
        .event_handler(handler)
        .await
        .context("failed to build Discord client")?;

    let sink = Arc::new(ChannelAlertSink::new(Arc::clone(&client.http)));
    let scheduler = Arc::new(AlertScheduler::new(feed, sink, settings.alerts));
    let scheduler_task = tokio::spawn(scheduler.run(ready_rx));

    let shard_manager = Arc::clone(&client.shard_manager);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested");
                shard_manager.shutdown_all().await;
            }
            Err(e) => warn!(error = %e, "Ctrl-C handler unavailable"),
        }
    });

    let result = client.start().await;

    scheduler_task.abort();
    drop(client);
    info!("valopro stopped");

    result.context("Discord gateway stopped with an error")
}
