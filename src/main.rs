#![deny(clippy::all)]

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use whatsthat::bridge::subtitle_text;
use whatsthat::trace::{CaptionTrace, TracePage, TracePlayer};
use whatsthat::{install_caption_hook, load_config, BridgeRequest, NO_RECORD};

/// Ask a recorded caption trace "what was just said?"
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Caption trace to replay (JSON)
    trace: PathBuf,

    /// Config file overriding the built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds to look back, overriding the configured window
    #[arg(long)]
    window: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(window) = args.window {
        anyhow::ensure!(
            window.is_finite() && window >= 0.0,
            "--window must be a non-negative number of seconds"
        );
        config.replay.window_seconds = window;
    }

    let trace = CaptionTrace::from_path(&args.trace)
        .with_context(|| format!("Failed to load caption trace {}", args.trace.display()))?;
    info!(cues = trace.cues.len(), position = trace.position, "Caption trace loaded");

    let window = config.replay.window_seconds;
    let player = TracePlayer::new(trace);
    let page = Arc::new(TracePage::new(player.clone()));
    let bridge =
        install_caption_hook(page, config.replay).context("Caption hook already installed")?;

    let reply = bridge
        .handle_message(&BridgeRequest::LastTen.to_message())
        .await
        .context("Caption request got no reply")?;

    println!("{}", serde_json::to_string_pretty(&reply)?);
    match subtitle_text(&reply) {
        Some(text) if text != NO_RECORD => info!("Last {}s: {}", window, text),
        _ => info!("Nothing was said in the last {}s", window),
    }

    let status = player.status();
    info!(
        position = status.position,
        playback_rate = status.playback_rate,
        paused = status.paused,
        muted = status.muted,
        captions_on = status.captions_on,
        "Player restored"
    );

    Ok(())
}
