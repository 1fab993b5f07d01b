//! Headless host bridge binary for stdin/stdout JSON communication.
//!
//! This binary reads `CommandEnvelope` messages as newline-delimited JSON
//! from stdin, dispatches them to the sync handler, and writes
//! `ResponseEnvelope` and `EventEnvelope` messages to stdout.
//!
//! All tracing/diagnostic output goes to stderr so that stdout remains a
//! clean JSON protocol channel.

use schedule_feed::HttpFetcher;
use session_bridge::host::BridgeHandler;
use session_bridge::host::stdio::run_stdio_bridge;
use session_bridge::{FileStore, SyncConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise tracing to stderr only (stdout is reserved for the JSON
    // protocol).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("session_bridge=info,schedule_feed=info")
            }),
        )
        .init();

    tracing::info!("session-bridge-host starting");

    // The host pushes its settings with `settings.update`; the file only
    // supplies HTTP options and a starting point.
    let config_path = SyncConfig::default_config_path();
    let config = if config_path.is_file() {
        SyncConfig::from_file(&config_path)?
    } else {
        SyncConfig::default()
    };

    let fetcher = HttpFetcher::new(&config.feed)?;
    let store = FileStore::default_location();
    tracing::info!(state_dir = %store.root().display(), "using state directory");

    run_stdio_bridge(BridgeHandler::new(config, fetcher, store))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "session-bridge-host exited with error");
            anyhow::anyhow!("session-bridge-host failed: {e}")
        })?;

    tracing::info!("session-bridge-host shut down cleanly");
    Ok(())
}
