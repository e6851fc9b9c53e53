//! `qcbingo-cli` -- replays a bingo action script and prints the result.
//!
//! Usage: `qcbingo-cli <script.json>`
//!
//! # Environment variables
//!
//! | Variable             | Required | Default   | Description                         |
//! |----------------------|----------|-----------|-------------------------------------|
//! | `BINGO_BOARD_SIZE`   | no       | `5`       | Board size (1-25)                   |
//! | `BINGO_RULES`        | no       | `builtin` | `builtin` or `permissive`           |
//! | `BINGO_VALIDATOR_ID` | no       | `qc`      | Validator for marks without one     |
//! | `LOG_FORMAT`         | no       | `text`    | `text` or `json`                    |
//! | `RUST_LOG`           | no       | --        | Standard `tracing` env filter       |

use std::sync::Arc;

use anyhow::Context;
use qcbingo_cli::config::{CliConfig, LogFormat};
use qcbingo_cli::runner;
use qcbingo_cli::script::Script;
use qcbingo_events::EventBus;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = CliConfig::from_env()?;
    init_tracing(config.log_format);

    let path = std::env::args()
        .nth(1)
        .context("usage: qcbingo-cli <script.json>")?;
    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read script {path}"))?;
    let script = Script::from_json(&raw).with_context(|| format!("Invalid script {path}"))?;

    tracing::info!(
        board_size = config.board_size,
        rules = ?config.rules,
        actions = script.actions.len(),
        "Replaying script",
    );

    let bus = Arc::new(EventBus::default());
    let mut rx = bus.subscribe();
    let listener = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => tracing::info!(
                    event_type = %event.event_type,
                    actor = event.actor.as_deref().unwrap_or("-"),
                    payload = %event.payload,
                    "Bingo event",
                ),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event listener lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let output = runner::run_script(&config, script, &bus)?;

    // Dropping the last sender closes the channel and ends the listener.
    drop(bus);
    listener.await.context("Event listener task panicked")?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "qcbingo_cli=info,qcbingo_core=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}
