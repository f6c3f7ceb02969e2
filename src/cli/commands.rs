//! Command implementations

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::adapters::{JsonPlaybackInfoAdapter, RecordingEngineAdapter};
use crate::app::{LoadRequest, PlaybackSession};
use crate::cli::args::{CapabilityArgs, ProfileArgs, ReconcileArgs};
use crate::config::PlaybackSettings;
use crate::domain::model::{EngineTrack, PlayMethod};
use crate::ports::{EngineConfiguration, EngineEvent};
use crate::profile::{CapabilityDeclarator, DeviceProfile};
use crate::streams::IndexMap;

/// Output of the reconcile command
#[derive(Debug, Serialize)]
pub struct ReconcileReport {
    pub attempt: u64,
    pub play_method: PlayMethod,
    pub phase1: IndexMap,
    /// Map after the engine track list was applied; absent without `--tracks`
    pub refined: Option<IndexMap>,
    pub unresolved: Vec<i32>,
    pub engine: EngineConfiguration,
}

fn declarator(settings: &PlaybackSettings, capabilities: &CapabilityArgs) -> CapabilityDeclarator {
    CapabilityDeclarator::new(settings.player, Arc::new(capabilities.capabilities()))
}

/// Build the device profile for the profile command
pub fn build_profile(settings: &PlaybackSettings, args: &ProfileArgs) -> DeviceProfile {
    declarator(settings, &args.capabilities).declare(&settings.profile_request())
}

/// Execute the profile command
pub fn profile(settings: &PlaybackSettings, args: ProfileArgs) -> Result<()> {
    info!(
        player = ?settings.player,
        mode = ?settings.compatibility_mode,
        "Declaring device profile"
    );

    let profile = build_profile(settings, &args);
    let json = if args.compact {
        serde_json::to_string(&profile)
    } else {
        serde_json::to_string_pretty(&profile)
    }
    .context("Failed to serialize device profile")?;

    println!("{}", json);
    Ok(())
}

/// Read an engine subtitle track list
pub fn read_tracks(path: &Path) -> Result<Vec<EngineTrack>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read track list {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid track list {}", path.display()))
}

/// Replay a recorded response through a session and report both phases
pub async fn run_reconcile(settings: &PlaybackSettings, args: &ReconcileArgs) -> Result<ReconcileReport> {
    let session = PlaybackSession::new(
        declarator(settings, &args.capabilities),
        settings.profile_request(),
        Arc::new(JsonPlaybackInfoAdapter::new(&args.playback_info)),
        Arc::new(RecordingEngineAdapter::new()),
    );

    let mut request = LoadRequest::new(&args.item_id);
    request.source_e_tag = args.source_etag.clone();

    let loaded = session
        .load(request)
        .await
        .with_context(|| format!("Failed to load {}", args.playback_info.display()))?;

    let refined = match &args.tracks {
        Some(path) => {
            let subtitle_tracks = read_tracks(path)?;
            let outcome = session
                .handle_engine_event(EngineEvent::MediaParsed {
                    attempt: loaded.attempt,
                    subtitle_tracks,
                })
                .await;
            info!(?outcome, "Applied engine track list");
            session.index_map().await
        }
        None => None,
    };

    Ok(ReconcileReport {
        attempt: loaded.attempt.0,
        play_method: loaded.play_method,
        phase1: loaded.index_map,
        refined,
        unresolved: session.unresolved_sidecars().await,
        engine: loaded.configuration,
    })
}

/// Execute the reconcile command
pub async fn reconcile(settings: &PlaybackSettings, args: ReconcileArgs) -> Result<()> {
    let report = run_reconcile(settings, &args).await?;
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}
