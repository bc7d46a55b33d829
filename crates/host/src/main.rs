//! Host harness for the player record store.
//!
//! Stands in for the game server: loads configuration, sets up logging,
//! activates the store, and replays newline-delimited JSON lifecycle events
//! from stdin. Query results are written to stdout as JSON lines. End of
//! input (or Ctrl+C) deactivates the store.
//!
//! ```bash
//! printf '%s\n' \
//!   '{"event":"connected","player":42}' \
//!   '{"event":"died","player":42}' \
//!   '{"event":"query","player":42}' \
//!   '{"event":"checkpoint"}' | RECORDS_DATA_DIR=./data player-records
//! ```
mod feed;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use records_runtime::{RecordsConfig, RecordsRuntime};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use feed::{FeedOutcome, HostLine};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = RecordsConfig::from_env();
    let log_dir = std::env::var_os("RECORDS_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| config.data_dir.join("logs"));
    let _guard = setup_logging(&log_dir)?;

    tracing::info!("Starting player record host");
    tracing::info!("Data directory: {}", config.data_dir.display());
    tracing::info!("Autosave: {:?}", config.autosave_interval);

    let mut runtime = RecordsRuntime::open(&config).with_context(|| {
        format!(
            "failed to activate record store in {}",
            config.data_dir.display()
        )
    })?;
    let handle = runtime.handle();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read event feed")?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, shutting down");
                None
            }
        };
        let Some(line) = line else { break };

        if line.trim().is_empty() {
            continue;
        }

        let parsed = match serde_json::from_str::<HostLine>(&line) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Skipping malformed feed line {:?}: {}", line, e);
                continue;
            }
        };

        match feed::apply(&handle, parsed).await? {
            FeedOutcome::Applied => {}
            FeedOutcome::Reply(reply) => {
                let mut json = serde_json::to_vec(&reply)?;
                json.push(b'\n');
                stdout.write_all(&json).await?;
                stdout.flush().await?;
            }
        }
    }

    runtime
        .shutdown()
        .await
        .context("failed to write player records on shutdown")?;

    tracing::info!("Host shutdown complete");
    Ok(())
}

/// Setup logging to both stderr and a file under `log_dir`
fn setup_logging(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "records.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::info!("Log file: {}/records.log", log_dir.display());

    Ok(guard)
}
