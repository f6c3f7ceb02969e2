// Playback session - Orchestrates one item's load and track reconciliation

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::domain::model::{AttemptId, MediaSource, PlayMethod};
use crate::error::{TrackmapError, TrackmapResult};
use crate::ports::{
    EngineConfiguration, EngineEvent, MediaEnginePort, MediaLocator, PlaybackInfoPort,
    PlaybackInfoRequest, SidecarSubtitle,
};
use crate::profile::{CapabilityDeclarator, DeviceProfile, ProfileRequest};
use crate::streams::{IndexMap, IndexReconciler, ReconcilerState, RefineOutcome};

/// Request to start playing an item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadRequest {
    pub item_id: String,
    pub user_id: Option<String>,
    /// Media source the user picked, if any
    pub media_source_id: Option<String>,
    /// ETag of the media source the user picked, if any
    pub source_e_tag: Option<String>,
    pub start_seconds: f64,
}

impl LoadRequest {
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            ..Default::default()
        }
    }

    pub fn with_source_e_tag(mut self, e_tag: impl Into<String>) -> Self {
        self.source_e_tag = Some(e_tag.into());
        self
    }
}

/// Result of a successful load
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedMedia {
    pub attempt: AttemptId,
    pub play_method: PlayMethod,
    pub play_session_id: String,
    pub media_source_id: Option<String>,
    /// Analytic map installed for this attempt
    pub index_map: IndexMap,
    pub configuration: EngineConfiguration,
}

/// Drives declarator, server and reconciler for one player.
///
/// Every load gets a fresh [`AttemptId`]; only the newest attempt may install
/// its reconciler, and engine events tagged with any other attempt are dropped.
pub struct PlaybackSession {
    declarator: CapabilityDeclarator,
    profile_request: ProfileRequest,
    playback_info_port: Arc<dyn PlaybackInfoPort>,
    engine_port: Arc<dyn MediaEnginePort>,
    latest_attempt: AtomicU64,
    reconciler: RwLock<Option<IndexReconciler>>,
}

impl PlaybackSession {
    /// Create new session with injected ports
    pub fn new(
        declarator: CapabilityDeclarator,
        profile_request: ProfileRequest,
        playback_info_port: Arc<dyn PlaybackInfoPort>,
        engine_port: Arc<dyn MediaEnginePort>,
    ) -> Self {
        Self {
            declarator,
            profile_request,
            playback_info_port,
            engine_port,
            latest_attempt: AtomicU64::new(0),
            reconciler: RwLock::new(None),
        }
    }

    /// Device profile declared on every load
    pub fn device_profile(&self) -> DeviceProfile {
        self.declarator.declare(&self.profile_request)
    }

    /// Attempt id of the newest load or cancellation
    pub fn current_attempt(&self) -> AttemptId {
        AttemptId(self.latest_attempt.load(Ordering::SeqCst))
    }

    fn next_attempt(&self) -> AttemptId {
        AttemptId(self.latest_attempt.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn is_latest(&self, attempt: AttemptId) -> bool {
        self.current_attempt() == attempt
    }

    /// Load an item: declare capabilities, ask the server, build the analytic
    /// map and hand the media to the engine.
    pub async fn load(&self, request: LoadRequest) -> TrackmapResult<LoadedMedia> {
        let attempt = self.next_attempt();
        info!(%attempt, item_id = %request.item_id, "Starting playback attempt");

        let mut info_request = PlaybackInfoRequest::new(&request.item_id, self.device_profile());
        info_request.user_id = request.user_id.clone();
        info_request.media_source_id = request.media_source_id.clone();

        let response = self.playback_info_port.playback_info(info_request).await?;
        if !self.is_latest(attempt) {
            info!(%attempt, "Discarding playback info for superseded attempt");
            return Err(TrackmapError::Superseded { attempt: attempt.0 });
        }

        let source_dto = response
            .select_source(request.source_e_tag.as_deref())
            .cloned()
            .ok_or_else(|| TrackmapError::NoMediaSource {
                item_id: request.item_id.clone(),
            })?;
        let play_session_id =
            response
                .play_session_id
                .clone()
                .ok_or_else(|| TrackmapError::NoPlaySession {
                    item_id: request.item_id.clone(),
                })?;

        let source = MediaSource::from(source_dto);
        let play_method = source.play_method()?;

        let mut reconciler = IndexReconciler::new(attempt);
        reconciler.build(&source, play_method);
        let index_map = reconciler.index_map().clone();

        let configuration = engine_configuration(
            attempt,
            &request,
            &source,
            play_method,
            &play_session_id,
            &reconciler,
        )?;

        {
            let mut slot = self.reconciler.write().await;
            if !self.is_latest(attempt) {
                info!(%attempt, "Attempt superseded before install");
                return Err(TrackmapError::Superseded { attempt: attempt.0 });
            }
            *slot = Some(reconciler);
        }

        info!(
            %attempt,
            %play_method,
            mapped = index_map.len(),
            sidecars = configuration.sidecar_subtitles.len(),
            "Installed index map"
        );

        if !self.is_latest(attempt) {
            info!(%attempt, "Attempt cancelled before reaching the engine");
            return Err(TrackmapError::Superseded { attempt: attempt.0 });
        }
        self.engine_port.play_new_media(configuration.clone()).await?;
        if !self.is_latest(attempt) {
            info!(%attempt, "Attempt superseded while the engine was opening it");
            return Err(TrackmapError::Superseded { attempt: attempt.0 });
        }

        Ok(LoadedMedia {
            attempt,
            play_method,
            play_session_id,
            media_source_id: source.id,
            index_map,
            configuration,
        })
    }

    /// Apply an engine track notification to the current reconciler
    pub async fn handle_engine_event(&self, event: EngineEvent) -> RefineOutcome {
        let received = event.attempt();
        let current = self.current_attempt();
        if received != current {
            warn!(%current, %received, "Dropping stale engine event");
            return RefineOutcome::Stale { current, received };
        }

        let mut slot = self.reconciler.write().await;
        match slot.as_mut() {
            Some(reconciler) => reconciler.refine(received, event.subtitle_tracks()),
            None => {
                debug!(%received, "Engine event before any index map was installed");
                RefineOutcome::NotBuilt
            }
        }
    }

    /// Local engine track for a server stream index
    pub async fn local_index(&self, server_index: i32) -> Option<i32> {
        self.reconciler
            .read()
            .await
            .as_ref()
            .and_then(|r| r.local_index(server_index))
    }

    /// Snapshot of the installed map
    pub async fn index_map(&self) -> Option<IndexMap> {
        self.reconciler
            .read()
            .await
            .as_ref()
            .map(|r| r.index_map().clone())
    }

    pub async fn reconciler_state(&self) -> Option<ReconcilerState> {
        self.reconciler.read().await.as_ref().map(|r| r.state())
    }

    /// Sidecar subtitles still lacking an engine track
    pub async fn unresolved_sidecars(&self) -> Vec<i32> {
        self.reconciler
            .read()
            .await
            .as_ref()
            .map(|r| r.unresolved_sidecars())
            .unwrap_or_default()
    }

    /// Abandon the current attempt; in-flight loads and events become stale
    pub async fn cancel(&self) -> TrackmapResult<()> {
        let attempt = self.next_attempt();
        self.reconciler.write().await.take();
        info!(%attempt, "Playback cancelled");
        self.engine_port.stop().await
    }
}

fn engine_configuration(
    attempt: AttemptId,
    request: &LoadRequest,
    source: &MediaSource,
    play_method: PlayMethod,
    play_session_id: &str,
    reconciler: &IndexReconciler,
) -> TrackmapResult<EngineConfiguration> {
    let locator = match (play_method, &source.transcoding_url) {
        (PlayMethod::Transcode, Some(url)) => MediaLocator::Transcode { url: url.clone() },
        (PlayMethod::Transcode, None) => {
            return Err(TrackmapError::Engine {
                message: "Transcode selected without a transcoding URL".to_string(),
            })
        }
        _ => MediaLocator::Static {
            item_id: request.item_id.clone(),
            media_source_id: source
                .id
                .clone()
                .unwrap_or_else(|| request.item_id.clone()),
            play_session_id: play_session_id.to_string(),
            tag: source.e_tag.clone(),
        },
    };

    let sidecar_subtitles = source
        .sidecar_subtitles()
        .filter_map(|stream| {
            stream.delivery_url.as_ref().map(|url| SidecarSubtitle {
                server_index: stream.server_index,
                delivery_url: url.clone(),
                language: stream.language.clone(),
                title: stream.display_title.clone(),
            })
        })
        .collect();

    Ok(EngineConfiguration {
        attempt,
        locator,
        sidecar_subtitles,
        audio_index: source
            .default_audio_stream_index
            .and_then(|i| reconciler.local_index(i)),
        subtitle_index: source
            .default_subtitle_stream_index
            .and_then(|i| reconciler.local_index(i)),
        start_seconds: request.start_seconds,
    })
}
