//! CLI module for TrackMap
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::SettingsOverrides;

pub mod args;
pub mod commands;

/// TrackMap playback negotiation harness
///
/// Prints the device profile a player would declare, and replays recorded
/// playback-info responses through the stream index reconciler.
#[derive(Parser, Debug)]
#[command(name = "trackmap")]
#[command(about = "TrackMap - Device profiles and stream index reconciliation")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Settings file (default: ./trackmap.toml when present)
    #[arg(long, global = true, env = "TRACKMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format (pretty, compact, json)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the device profile as JSON
    Profile(args::ProfileArgs),
    /// Reconcile a recorded playback-info response
    Reconcile(args::ReconcileArgs),
}

impl Cli {
    /// Settings given on the command line, global and per command
    pub fn settings_overrides(&self) -> SettingsOverrides {
        let mut overrides = SettingsOverrides {
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
            ..Default::default()
        };

        let playback = match &self.command {
            Commands::Profile(args) => &args.playback,
            Commands::Reconcile(args) => &args.playback,
        };
        overrides.player = playback.player.clone();
        overrides.compatibility_mode = playback.mode.clone();
        overrides.max_bitrate = playback.max_bitrate.clone();
        overrides
    }
}
