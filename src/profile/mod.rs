//! Capability declaration ("device profile") module
//!
//! Describes what the local player can decode so the media server can decide
//! between direct play, direct stream and transcoding. The wire shape follows
//! the server's PascalCase JSON; codec and container lists travel as
//! comma-joined strings.

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

pub mod builder;
pub mod capabilities;
pub mod defaults;

pub use builder::{CapabilityDeclarator, ProfileRequest};
pub use capabilities::{DecodeCapabilities, StaticDecodeCapabilities};

/// Media type a profile applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProfileType {
    Audio,
    #[default]
    Video,
    Photo,
    Subtitle,
}

/// Direct play allow-list entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DirectPlayProfile {
    #[serde(with = "comma_list", default, skip_serializing_if = "Vec::is_empty")]
    pub container: Vec<String>,
    #[serde(rename = "AudioCodec", with = "comma_list", default, skip_serializing_if = "Vec::is_empty")]
    pub audio_codecs: Vec<String>,
    #[serde(rename = "VideoCodec", with = "comma_list", default, skip_serializing_if = "Vec::is_empty")]
    pub video_codecs: Vec<String>,
    #[serde(rename = "Type")]
    pub profile_type: ProfileType,
}

impl DirectPlayProfile {
    /// Profile that accepts any container and codec of the given type
    pub fn unrestricted(profile_type: ProfileType) -> Self {
        Self {
            container: Vec::new(),
            audio_codecs: Vec::new(),
            video_codecs: Vec::new(),
            profile_type,
        }
    }
}

/// Streaming protocol of a transcoding target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscodeProtocol {
    Http,
    Hls,
}

/// Context a transcoding profile is used in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncodingContext {
    Streaming,
    Static,
}

/// Server-side transcoding target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TranscodingProfile {
    pub container: String,
    #[serde(rename = "Type")]
    pub profile_type: ProfileType,
    #[serde(rename = "AudioCodec", with = "comma_list", default, skip_serializing_if = "Vec::is_empty")]
    pub audio_codecs: Vec<String>,
    #[serde(rename = "VideoCodec", with = "comma_list", default, skip_serializing_if = "Vec::is_empty")]
    pub video_codecs: Vec<String>,
    pub protocol: TranscodeProtocol,
    pub context: EncodingContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_audio_channels: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_segments: Option<u32>,
    #[serde(default)]
    pub break_on_non_key_frames: bool,
    #[serde(default)]
    pub enable_subtitles_in_manifest: bool,
}

impl TranscodingProfile {
    /// HLS streaming target with the settings every built-in profile shares
    pub fn hls(
        container: &str,
        profile_type: ProfileType,
        video_codecs: Vec<String>,
        audio_codecs: Vec<String>,
    ) -> Self {
        Self {
            container: container.to_string(),
            profile_type,
            audio_codecs,
            video_codecs,
            protocol: TranscodeProtocol::Hls,
            context: EncodingContext::Streaming,
            max_audio_channels: Some("8".to_string()),
            min_segments: Some(2),
            break_on_non_key_frames: true,
            enable_subtitles_in_manifest: false,
        }
    }
}

/// Codec family a codec profile applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodecType {
    Video,
    VideoAudio,
    Audio,
}

/// Comparison operator of a profile condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileConditionType {
    Equals,
    NotEquals,
    LessThanEqual,
    GreaterThanEqual,
    EqualsAny,
}

/// Stream property a profile condition inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileConditionValue {
    AudioChannels,
    Height,
    IsAnamorphic,
    IsInterlaced,
    RefFrames,
    VideoBitDepth,
    VideoLevel,
    VideoProfile,
    VideoRangeType,
    Width,
}

/// One fine-grained codec restriction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProfileCondition {
    pub condition: ProfileConditionType,
    pub property: ProfileConditionValue,
    pub value: String,
    pub is_required: bool,
}

impl ProfileCondition {
    pub fn new(
        condition: ProfileConditionType,
        property: ProfileConditionValue,
        value: impl Into<String>,
    ) -> Self {
        Self {
            condition,
            property,
            value: value.into(),
            is_required: false,
        }
    }
}

/// Per-codec conditions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CodecProfile {
    #[serde(rename = "Type")]
    pub codec_type: CodecType,
    pub codec: String,
    #[serde(default)]
    pub conditions: Vec<ProfileCondition>,
    #[serde(default)]
    pub apply_conditions: Vec<ProfileCondition>,
}

/// How a subtitle format reaches the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubtitleDeliveryMethod {
    /// Burned into the video by the transcoder
    Encode,
    /// Muxed into the delivered container
    Embed,
    /// Sidecar file fetched separately
    External,
    /// Segmented alongside the HLS playlist
    Hls,
    Drop,
}

/// Subtitle format support entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubtitleProfile {
    pub format: String,
    pub method: SubtitleDeliveryMethod,
}

impl SubtitleProfile {
    pub fn new(format: &str, method: SubtitleDeliveryMethod) -> Self {
        Self {
            format: format.to_string(),
            method,
        }
    }
}

/// MIME override for a delivered container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseProfile {
    pub container: String,
    #[serde(rename = "Type")]
    pub profile_type: ProfileType,
    pub mime_type: String,
}

/// Container-level conditions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerProfile {
    #[serde(rename = "Type")]
    pub profile_type: ProfileType,
    #[serde(default)]
    pub conditions: Vec<ProfileCondition>,
    #[serde(with = "comma_list", default, skip_serializing_if = "Vec::is_empty")]
    pub container: Vec<String>,
}

/// Complete capability declaration sent with a playback-info request.
///
/// Every profile list is always present on the wire, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeviceProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_streaming_bitrate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_static_bitrate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_streaming_transcoding_bitrate: Option<u32>,
    #[serde(default)]
    pub direct_play_profiles: Vec<DirectPlayProfile>,
    #[serde(default)]
    pub transcoding_profiles: Vec<TranscodingProfile>,
    #[serde(default)]
    pub container_profiles: Vec<ContainerProfile>,
    #[serde(default)]
    pub codec_profiles: Vec<CodecProfile>,
    #[serde(default)]
    pub response_profiles: Vec<ResponseProfile>,
    #[serde(default)]
    pub subtitle_profiles: Vec<SubtitleProfile>,
}

/// Compatibility mode selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompatibilityMode {
    /// Engine defaults
    #[default]
    Auto,
    /// Lowest-common-denominator mp4/h264/aac
    MostCompatible,
    /// Accept anything, never transcode
    DirectPlay,
    /// User supplied profiles
    Custom,
}

impl CompatibilityMode {
    /// Parse compatibility mode from string
    pub fn parse(mode: &str) -> Result<Self, DomainError> {
        match mode.to_lowercase().replace('_', "-").as_str() {
            "auto" => Ok(CompatibilityMode::Auto),
            "most-compatible" | "mostcompatible" => Ok(CompatibilityMode::MostCompatible),
            "direct-play" | "directplay" => Ok(CompatibilityMode::DirectPlay),
            "custom" => Ok(CompatibilityMode::Custom),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid compatibility mode: {}. Valid modes: auto, most-compatible, direct-play, custom",
                mode
            ))),
        }
    }
}

/// Local playback engine the profile is declared for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayerKind {
    /// libVLC based engine; decodes nearly everything
    #[default]
    Vlc,
    /// Platform media framework
    Native,
}

impl PlayerKind {
    /// Parse player kind from string
    pub fn parse(player: &str) -> Result<Self, DomainError> {
        match player.to_lowercase().as_str() {
            "vlc" | "libvlc" => Ok(PlayerKind::Vlc),
            "native" | "avkit" => Ok(PlayerKind::Native),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid player: {}. Valid players: vlc, native",
                player
            ))),
        }
    }
}

/// Whether custom profiles extend or replace the engine defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CustomProfileAction {
    #[default]
    Add,
    Replace,
}

impl CustomProfileAction {
    pub fn parse(action: &str) -> Result<Self, DomainError> {
        match action.to_lowercase().as_str() {
            "add" => Ok(CustomProfileAction::Add),
            "replace" => Ok(CustomProfileAction::Replace),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid custom profile action: {}. Valid actions: add, replace",
                action
            ))),
        }
    }
}

/// User defined direct play (and optionally transcoding) profile
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomDeviceProfile {
    #[serde(default)]
    pub audio: Vec<String>,
    #[serde(default)]
    pub video: Vec<String>,
    #[serde(default)]
    pub container: Vec<String>,
    #[serde(rename = "type", default)]
    pub profile_type: ProfileType,
    #[serde(default)]
    pub use_as_transcoding_profile: bool,
}

impl CustomDeviceProfile {
    fn as_direct_play(&self) -> DirectPlayProfile {
        DirectPlayProfile {
            container: self.container.clone(),
            audio_codecs: self.audio.clone(),
            video_codecs: self.video.clone(),
            profile_type: self.profile_type,
        }
    }

    fn as_transcoding(&self) -> TranscodingProfile {
        let container = self
            .container
            .first()
            .map(String::as_str)
            .unwrap_or("mp4");
        let mut profile = TranscodingProfile::hls(
            container,
            self.profile_type,
            self.video.clone(),
            self.audio.clone(),
        );
        profile.enable_subtitles_in_manifest = true;
        profile
    }
}

/// Comma-joined string lists, as the server expects codec and container sets
mod comma_list {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(items: &[String], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&items.join(","))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Split a comma separated list into owned items
pub(crate) fn codecs(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}
