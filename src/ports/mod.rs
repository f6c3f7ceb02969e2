// Ports - Interface definitions (contracts)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::model::{AttemptId, EngineTrack, PlaybackInfoResponse};
use crate::error::TrackmapResult;
use crate::profile::DeviceProfile;

/// Body of a playback-info request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlaybackInfoRequest {
    pub item_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user_id: Option<String>,
    pub device_profile: DeviceProfile,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub max_streaming_bitrate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub media_source_id: Option<String>,
    #[serde(default)]
    pub auto_open_live_stream: bool,
}

impl PlaybackInfoRequest {
    pub fn new(item_id: impl Into<String>, device_profile: DeviceProfile) -> Self {
        let max_streaming_bitrate = device_profile.max_streaming_bitrate;
        Self {
            item_id: item_id.into(),
            user_id: None,
            device_profile,
            max_streaming_bitrate,
            media_source_id: None,
            auto_open_live_stream: true,
        }
    }
}

/// Port for the server's playback-info endpoint
#[async_trait]
pub trait PlaybackInfoPort: Send + Sync {
    /// Ask the server how it will deliver an item to this device
    async fn playback_info(&self, request: PlaybackInfoRequest) -> TrackmapResult<PlaybackInfoResponse>;
}

/// Where the engine reads the main media from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MediaLocator {
    /// Server-side transcode (HLS playlist)
    Transcode { url: String },
    /// Source file as stored, direct played or remuxed by the server
    Static {
        item_id: String,
        media_source_id: String,
        play_session_id: String,
        tag: Option<String>,
    },
}

/// Sidecar subtitle handed to the engine; attached in list order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidecarSubtitle {
    pub server_index: i32,
    pub delivery_url: String,
    pub language: Option<String>,
    pub title: Option<String>,
}

/// Everything the engine needs to start one playback attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineConfiguration {
    pub attempt: AttemptId,
    pub locator: MediaLocator,
    pub sidecar_subtitles: Vec<SidecarSubtitle>,
    /// Local engine track, already translated through the index map
    pub audio_index: Option<i32>,
    pub subtitle_index: Option<i32>,
    pub start_seconds: f64,
}

/// Port for the local media engine
#[async_trait]
pub trait MediaEnginePort: Send + Sync {
    /// Replace whatever is playing with a new attempt
    async fn play_new_media(&self, configuration: EngineConfiguration) -> TrackmapResult<()>;

    /// Stop playback
    async fn stop(&self) -> TrackmapResult<()>;
}

/// Track notifications emitted by the engine, tagged with the attempt that opened the media
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    MediaParsed {
        attempt: AttemptId,
        subtitle_tracks: Vec<EngineTrack>,
    },
    TracksChanged {
        attempt: AttemptId,
        subtitle_tracks: Vec<EngineTrack>,
    },
}

impl EngineEvent {
    pub fn attempt(&self) -> AttemptId {
        match self {
            EngineEvent::MediaParsed { attempt, .. } | EngineEvent::TracksChanged { attempt, .. } => {
                *attempt
            }
        }
    }

    pub fn subtitle_tracks(&self) -> &[EngineTrack] {
        match self {
            EngineEvent::MediaParsed {
                subtitle_tracks, ..
            }
            | EngineEvent::TracksChanged {
                subtitle_tracks, ..
            } => subtitle_tracks,
        }
    }
}
