//! TrackMap CLI
//!
//! Inspection harness for playback negotiation: prints the device profile a
//! player declares and replays recorded playback-info responses through the
//! stream index reconciler.
//!
//! # Usage
//!
//! ```bash
//! trackmap profile --player native --hevc --bit-depth 10
//! trackmap reconcile --playback-info response.json --tracks tracks.json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use trackmap::adapters::init_tracing;
use trackmap::cli::{commands, Cli, Commands};
use trackmap::config::PlaybackSettings;

/// Main entry point for the TrackMap CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = PlaybackSettings::load(cli.config.as_deref(), &cli.settings_overrides())
        .context("Failed to resolve settings")?;
    init_tracing(&settings.logging()).context("Failed to initialize logging")?;

    info!("Starting TrackMap");
    info!(
        config = ?cli.config,
        player = ?settings.player,
        mode = ?settings.compatibility_mode,
        max_bitrate = ?settings.max_bitrate,
        custom_profiles = settings.custom_profiles.len(),
        "Resolved settings"
    );

    match cli.command {
        Commands::Profile(args) => {
            info!("Executing profile command");
            commands::profile(&settings, args)?;
        }
        Commands::Reconcile(args) => {
            info!("Executing reconcile command");
            commands::reconcile(&settings, args).await?;
        }
    }

    Ok(())
}
