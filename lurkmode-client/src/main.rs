//! lurkmode - read-only Twitch chat in the terminal
//!
//! Joins a channel anonymously, classifies chat events and shows the most
//! recent ones in a Ratatui interface.

use std::process::ExitCode;
use std::sync::Arc;

use lurkmode_utils::{init_logging_with_config, LogConfig, LurkError, Result};

mod cli;
mod config;
mod connection;
mod dispatch;
mod history;
mod ui;

use cli::Args;
use config::{load_config, ClientConfig};
use connection::{IngestConnection, IrcSession, SessionControl};
use dispatch::dispatch_channel;
use ui::App;

const USAGE: &str = "Usage: lurkmode <channel_name>";

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command-line arguments first (before terminal setup)
    let args = Args::parse_args();

    let Some(channel) = args.channel.clone() else {
        println!("{}", USAGE);
        return ExitCode::FAILURE;
    };

    // Log to file, the terminal belongs to the UI
    if let Err(e) = init_logging_with_config(LogConfig::client()) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }
    tracing::info!("lurkmode starting");
    tracing::debug!("CLI args: {:?}", args);

    let mut config = load_config();
    config.apply_args(&args);

    match run_app(channel, config).await {
        Ok(()) => {
            tracing::info!("lurkmode exiting normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("lurkmode error: {}", e);
            // Printed after the terminal has been restored
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_app(channel: String, config: ClientConfig) -> Result<()> {
    let (tx, rx) = dispatch_channel(config.dispatch_capacity);
    let tx = tx
        .with_timeout(config.enqueue_timeout())
        .with_policy(config.stall_policy);
    tracing::debug!(timeout = ?tx.timeout(), policy = ?tx.policy(), "Dispatch channel ready");

    let session = IrcSession::new(config.server.clone())
        .with_connect_timeout(config.connect_timeout());
    let ingest = Arc::new(IngestConnection::new(session, tx));
    let control: Arc<dyn SessionControl> = ingest.clone();
    control.add_channel(&channel);

    let ingest_task = {
        let ingest = Arc::clone(&ingest);
        tokio::spawn(async move { ingest.connect().await })
    };

    let mut app = App::new(channel, &config, rx, control);
    let ui_result = app.run().await;
    tracing::debug!(state = ?app.state(), "UI loop returned");
    drop(app);

    if let Err(e) = ui_result {
        // The UI is gone, nothing would drain the channel
        let _ = ingest.disconnect();
        ingest_task.abort();
        return Err(e);
    }

    // The UI only returns after the channel closed, so ingest is done
    ingest_task
        .await
        .map_err(|e| LurkError::internal(format!("Ingest task failed: {}", e)))?
}
