use std::sync::Arc;

use anyhow::Context;
use poster_finder_metadata::tmdb::TmdbClient;
use poster_finder_plugin::config::PluginConfig;
use poster_finder_plugin::memory_host::InMemoryDocument;
use poster_finder_plugin::ui::ChannelUi;
use poster_finder_plugin::{CommandHandler, bridge};
use tokio::io::{AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Stdio bridge: one JSON UI message per line in, one per line out.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // stdout carries the UI channel, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let config = PluginConfig::from_env();
    let catalog =
        TmdbClient::from_config(config.tmdb.clone()).context("failed to build TMDB client")?;
    let document = Arc::new(InMemoryDocument::new());

    let (ui, mut outbound) = ChannelUi::new();
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(message) = outbound.recv().await {
            let line = match serde_json::to_string(&message) {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "failed to encode UI message");
                    continue;
                }
            };
            stdout.write_all(line.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    });

    let handler = Arc::new(CommandHandler::new(
        config,
        Arc::new(catalog),
        document,
        Arc::new(ui.clone()),
    ));
    info!("poster finder ready");

    let input = BufReader::new(tokio::io::stdin());
    let served = bridge::serve(input, handler.clone(), Arc::new(ui.clone())).await;

    drop(handler);
    drop(ui);
    writer.await.context("writer task failed")??;
    served.context("failed to read stdin")?;
    info!("poster finder stopped");
    Ok(())
}
