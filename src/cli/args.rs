//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::profile::StaticDecodeCapabilities;

/// Playback settings shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct PlaybackArgs {
    /// Compatibility mode (auto, most-compatible, direct-play, custom)
    #[arg(long)]
    pub mode: Option<String>,

    /// Player engine (vlc, native)
    #[arg(long)]
    pub player: Option<String>,

    /// Maximum bitrate in bits per second, or "max"
    #[arg(long)]
    pub max_bitrate: Option<String>,
}

/// Decoder capabilities of the simulated device
#[derive(Args, Debug, Clone)]
pub struct CapabilityArgs {
    /// Device decodes HEVC
    #[arg(long)]
    pub hevc: bool,

    /// Device decodes AV1
    #[arg(long)]
    pub av1: bool,

    /// Device outputs Dolby Vision
    #[arg(long)]
    pub dolby_vision: bool,

    /// Highest decodable video bit depth
    #[arg(long, default_value = "8")]
    pub bit_depth: u8,
}

impl CapabilityArgs {
    pub fn capabilities(&self) -> StaticDecodeCapabilities {
        StaticDecodeCapabilities {
            hevc: self.hevc,
            av1: self.av1,
            dolby_vision: self.dolby_vision,
            max_bit_depth: self.bit_depth,
        }
    }
}

/// Arguments for the profile command
#[derive(Args, Debug)]
pub struct ProfileArgs {
    #[command(flatten)]
    pub playback: PlaybackArgs,

    #[command(flatten)]
    pub capabilities: CapabilityArgs,

    /// Print single-line JSON
    #[arg(long)]
    pub compact: bool,
}

/// Arguments for the reconcile command
#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Recorded playback-info response (JSON)
    #[arg(long)]
    pub playback_info: PathBuf,

    /// Item the response belongs to
    #[arg(long, default_value = "item")]
    pub item_id: String,

    /// ETag of the media source to select
    #[arg(long)]
    pub source_etag: Option<String>,

    /// Engine subtitle track list (JSON array of {"index", "title"})
    #[arg(long)]
    pub tracks: Option<PathBuf>,

    #[command(flatten)]
    pub playback: PlaybackArgs,

    #[command(flatten)]
    pub capabilities: CapabilityArgs,
}
