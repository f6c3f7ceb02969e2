// Domain models - Core types and data structures

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::errors::DomainError;

/// Elementary stream kind as reported by the media server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    /// Embedded images, data tracks, lyrics and anything else the server reports
    Other,
}

impl StreamKind {
    /// Parse the server's `Type` string; unknown kinds map to `Other`
    pub fn parse(kind: &str) -> Self {
        match kind {
            "Video" => StreamKind::Video,
            "Audio" => StreamKind::Audio,
            "Subtitle" => StreamKind::Subtitle,
            _ => StreamKind::Other,
        }
    }
}

/// Media stream exactly as it arrives on the wire; every field is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaStreamDto {
    #[serde(rename = "Type", default)]
    pub stream_type: Option<String>,
    #[serde(default)]
    pub index: Option<i32>,
    #[serde(default)]
    pub is_external: Option<bool>,
    #[serde(default)]
    pub delivery_url: Option<String>,
    #[serde(default)]
    pub codec: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub display_title: Option<String>,
    #[serde(default)]
    pub is_default: Option<bool>,
    #[serde(default)]
    pub is_forced: Option<bool>,
}

/// One validated elementary stream of a media source.
///
/// `kind` and `server_index` are guaranteed present; a server stream without
/// them never becomes a `MediaStream` (see [`validate_streams`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaStream {
    pub kind: StreamKind,
    pub server_index: i32,
    pub is_external: bool,
    pub delivery_url: Option<String>,
    pub codec: Option<String>,
    pub language: Option<String>,
    pub display_title: Option<String>,
    pub is_default: bool,
    pub is_forced: bool,
}

impl MediaStream {
    /// Create a muxed (internal) stream
    pub fn internal(kind: StreamKind, server_index: i32) -> Self {
        Self {
            kind,
            server_index,
            is_external: false,
            delivery_url: None,
            codec: None,
            language: None,
            display_title: None,
            is_default: false,
            is_forced: false,
        }
    }

    /// Create an external stream, optionally with its sidecar delivery URL
    pub fn external(kind: StreamKind, server_index: i32, delivery_url: Option<String>) -> Self {
        Self {
            is_external: true,
            delivery_url,
            ..Self::internal(kind, server_index)
        }
    }

    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = Some(codec.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Muxed into the main container
    pub fn is_internal(&self) -> bool {
        !self.is_external
    }

    /// Subtitle attached to the engine as a separate sidecar resource
    pub fn is_sidecar_subtitle(&self) -> bool {
        self.kind == StreamKind::Subtitle && self.delivery_url.is_some()
    }
}

impl TryFrom<MediaStreamDto> for MediaStream {
    type Error = DomainError;

    fn try_from(dto: MediaStreamDto) -> Result<Self, Self::Error> {
        let kind = dto
            .stream_type
            .as_deref()
            .map(StreamKind::parse)
            .ok_or_else(|| DomainError::MissingField("Type".to_string()))?;
        let server_index = dto
            .index
            .ok_or_else(|| DomainError::MissingField("Index".to_string()))?;

        Ok(Self {
            kind,
            server_index,
            is_external: dto.is_external.unwrap_or(false),
            delivery_url: dto.delivery_url,
            codec: dto.codec,
            language: dto.language,
            display_title: dto.display_title,
            is_default: dto.is_default.unwrap_or(false),
            is_forced: dto.is_forced.unwrap_or(false),
        })
    }
}

/// Validate a server stream list, dropping streams that cannot be mapped.
///
/// Order of the surviving streams is preserved.
pub fn validate_streams(dtos: Vec<MediaStreamDto>) -> Vec<MediaStream> {
    dtos.into_iter()
        .enumerate()
        .filter_map(|(position, dto)| match MediaStream::try_from(dto) {
            Ok(stream) => Some(stream),
            Err(e) => {
                warn!(position, "Skipping unmappable media stream: {}", e);
                None
            }
        })
        .collect()
}

/// How the server decided to deliver a media source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayMethod {
    DirectPlay,
    DirectStream,
    Transcode,
}

impl fmt::Display for PlayMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayMethod::DirectPlay => write!(f, "DirectPlay"),
            PlayMethod::DirectStream => write!(f, "DirectStream"),
            PlayMethod::Transcode => write!(f, "Transcode"),
        }
    }
}

/// Media source as it arrives in a playback-info response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaSourceDto {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "ETag", default)]
    pub e_tag: Option<String>,
    #[serde(default)]
    pub open_token: Option<String>,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub supports_direct_play: bool,
    #[serde(default)]
    pub supports_direct_stream: bool,
    #[serde(default)]
    pub transcoding_url: Option<String>,
    #[serde(default)]
    pub default_audio_stream_index: Option<i32>,
    #[serde(default)]
    pub default_subtitle_stream_index: Option<i32>,
    #[serde(default)]
    pub media_streams: Vec<MediaStreamDto>,
}

/// Validated media source selected for playback
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaSource {
    pub id: Option<String>,
    pub e_tag: Option<String>,
    pub container: Option<String>,
    pub supports_direct_play: bool,
    pub supports_direct_stream: bool,
    pub transcoding_url: Option<String>,
    pub default_audio_stream_index: Option<i32>,
    pub default_subtitle_stream_index: Option<i32>,
    pub streams: Vec<MediaStream>,
}

impl From<MediaSourceDto> for MediaSource {
    fn from(dto: MediaSourceDto) -> Self {
        Self {
            id: dto.id,
            e_tag: dto.e_tag,
            container: dto.container,
            supports_direct_play: dto.supports_direct_play,
            supports_direct_stream: dto.supports_direct_stream,
            transcoding_url: dto.transcoding_url,
            default_audio_stream_index: dto.default_audio_stream_index,
            default_subtitle_stream_index: dto.default_subtitle_stream_index,
            streams: validate_streams(dto.media_streams),
        }
    }
}

impl MediaSource {
    /// Build a source directly from validated streams
    pub fn with_streams(streams: Vec<MediaStream>) -> Self {
        Self {
            id: None,
            e_tag: None,
            container: None,
            supports_direct_play: false,
            supports_direct_stream: false,
            transcoding_url: None,
            default_audio_stream_index: None,
            default_subtitle_stream_index: None,
            streams,
        }
    }

    /// The play method the server chose for this source.
    ///
    /// A transcoding URL always wins; the server only issues one when it
    /// decided against direct delivery.
    pub fn play_method(&self) -> Result<PlayMethod, DomainError> {
        if self.transcoding_url.is_some() {
            Ok(PlayMethod::Transcode)
        } else if self.supports_direct_play {
            Ok(PlayMethod::DirectPlay)
        } else if self.supports_direct_stream {
            Ok(PlayMethod::DirectStream)
        } else {
            Err(DomainError::NoPlayMethod(format!(
                "media source {} supports neither direct play, direct stream nor transcoding",
                self.id.as_deref().unwrap_or("<unknown>")
            )))
        }
    }

    /// Sidecar subtitles in attachment order
    pub fn sidecar_subtitles(&self) -> impl Iterator<Item = &MediaStream> {
        self.streams.iter().filter(|s| s.is_sidecar_subtitle())
    }
}

/// Playback-info response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlaybackInfoResponse {
    #[serde(default)]
    pub play_session_id: Option<String>,
    #[serde(default)]
    pub media_sources: Vec<MediaSourceDto>,
}

impl PlaybackInfoResponse {
    /// Pick the media source matching the one the user asked for.
    ///
    /// Preference: same ETag, then a source whose open token embeds its own id,
    /// then the first source.
    pub fn select_source(&self, requested_e_tag: Option<&str>) -> Option<&MediaSourceDto> {
        if let Some(e_tag) = requested_e_tag {
            if let Some(source) = self
                .media_sources
                .iter()
                .find(|s| s.e_tag.as_deref() == Some(e_tag))
            {
                return Some(source);
            }
        }

        let by_open_token = self.media_sources.iter().find(|s| {
            matches!((&s.open_token, &s.id), (Some(token), Some(id)) if token.contains(id.as_str()))
        });
        if by_open_token.is_some() {
            return by_open_token;
        }

        let first = self.media_sources.first();
        if first.is_some() {
            warn!("Unable to find matching media source, defaulting to first media source");
        }
        first
    }
}

/// Subtitle track as enumerated by the local media engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineTrack {
    pub index: i32,
    #[serde(default)]
    pub title: String,
}

impl EngineTrack {
    pub fn new(index: i32, title: impl Into<String>) -> Self {
        Self {
            index,
            title: title.into(),
        }
    }
}

/// Identifier of one playback attempt; strictly increasing within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttemptId(pub u64);

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
