//! Built-in profile tables for each playback engine

use crate::profile::capabilities::DecodeCapabilities;
use crate::profile::{
    codecs, CodecProfile, CodecType, DirectPlayProfile, PlayerKind, ProfileCondition,
    ProfileConditionType, ProfileConditionValue, ProfileType, ResponseProfile,
    SubtitleDeliveryMethod, SubtitleProfile, TranscodingProfile,
};

// libVLC decodes every container/video codec ffmpeg can, but not TrueHD/MLP audio,
// so only the audio list is restricted.
const VLC_DIRECT_PLAY_AUDIO: &str = "flac,alac,aac,eac3,ac3,dts,opus,vorbis,mp3,mp2,mp1,\
pcm_s24be,pcm_s24le,pcm_s16be,pcm_s16le,pcm_u8,pcm_alaw,pcm_mulaw,pcm_bluray,pcm_dvd,\
wavpack,wmav2,wmav1,wmapro,wmalossless,nellymoser,speex,amr_nb,amr_wb";

// PCM, wavpack and the wma family cannot be muxed into mp4
const VLC_TRANSCODE_AUDIO: &str = "flac,alac,aac,eac3,ac3,dts,opus,vorbis,mp3,mp2,mp1";

const VLC_TRANSCODE_VIDEO: &str =
    "hevc,h264,av1,vp9,vc1,mpeg4,h263,mpeg2video,mpeg1video,mjpeg";

// Text formats the server can convert come first
const VLC_EMBEDDED_SUBTITLES: &[&str] = &[
    "pgssub", "dvdsub", "subrip", "ass", "ssa", "vtt", "mov_text", "ttml", "text", "dvbsub",
    "libzvbi_teletextdec", "xsub", "vplayer", "subviewer", "subviewer1", "sami", "realtext",
    "pjs", "mpl2", "jacosub", "cc_dec",
];

const VLC_EXTERNAL_SUBTITLES: &[&str] = &[
    "subrip", "ttml", "vtt", "ass", "ssa", "pgssub", "text", "dvbsub", "libzvbi_teletextdec",
    "dvdsub", "xsub", "vplayer", "subviewer", "subviewer1", "sami", "realtext", "pjs", "mpl2",
    "jacosub",
];

const NATIVE_CONTAINERS: &str = "mp4,m4v,mov,mpegts";
const NATIVE_AUDIO: &str = "aac,ac3,eac3,mp3,alac,flac,opus";

/// Default direct play profiles of a player
pub fn direct_play_profiles(
    player: PlayerKind,
    capabilities: &dyn DecodeCapabilities,
) -> Vec<DirectPlayProfile> {
    match player {
        PlayerKind::Vlc => vec![DirectPlayProfile {
            container: Vec::new(),
            audio_codecs: codecs(VLC_DIRECT_PLAY_AUDIO),
            video_codecs: Vec::new(),
            profile_type: ProfileType::Video,
        }],
        PlayerKind::Native => vec![DirectPlayProfile {
            container: codecs(NATIVE_CONTAINERS),
            audio_codecs: codecs(NATIVE_AUDIO),
            video_codecs: native_video_codecs(capabilities),
            profile_type: ProfileType::Video,
        }],
    }
}

/// Default transcoding targets of a player
pub fn transcoding_profiles(
    player: PlayerKind,
    capabilities: &dyn DecodeCapabilities,
) -> Vec<TranscodingProfile> {
    match player {
        PlayerKind::Vlc => vec![TranscodingProfile::hls(
            "mp4",
            ProfileType::Video,
            codecs(VLC_TRANSCODE_VIDEO),
            codecs(VLC_TRANSCODE_AUDIO),
        )],
        PlayerKind::Native => {
            let mut video = vec!["h264".to_string()];
            if capabilities.supports_hevc() {
                video.insert(0, "hevc".to_string());
            }
            vec![TranscodingProfile::hls(
                "mp4",
                ProfileType::Video,
                video,
                codecs("aac,ac3,eac3,alac,flac,opus"),
            )]
        }
    }
}

/// Per-codec restrictions of a player
pub fn codec_profiles(
    player: PlayerKind,
    capabilities: &dyn DecodeCapabilities,
) -> Vec<CodecProfile> {
    match player {
        PlayerKind::Vlc => Vec::new(),
        PlayerKind::Native => {
            let mut profiles = vec![CodecProfile {
                codec_type: CodecType::Video,
                codec: "h264".to_string(),
                conditions: vec![
                    ProfileCondition::new(
                        ProfileConditionType::NotEquals,
                        ProfileConditionValue::IsAnamorphic,
                        "true",
                    ),
                    ProfileCondition::new(
                        ProfileConditionType::EqualsAny,
                        ProfileConditionValue::VideoProfile,
                        "high|main|baseline|constrained baseline",
                    ),
                    ProfileCondition::new(
                        ProfileConditionType::LessThanEqual,
                        ProfileConditionValue::VideoLevel,
                        "80",
                    ),
                    ProfileCondition::new(
                        ProfileConditionType::NotEquals,
                        ProfileConditionValue::IsInterlaced,
                        "true",
                    ),
                    ProfileCondition::new(
                        ProfileConditionType::LessThanEqual,
                        ProfileConditionValue::VideoBitDepth,
                        "8",
                    ),
                ],
                apply_conditions: Vec::new(),
            }];

            if capabilities.supports_hevc() {
                let range_types = if capabilities.supports_dolby_vision() {
                    "SDR|HDR10|HLG|DOVI|DOVIWithHDR10|DOVIWithHLG|DOVIWithSDR"
                } else {
                    "SDR|HDR10|HLG"
                };
                profiles.push(CodecProfile {
                    codec_type: CodecType::Video,
                    codec: "hevc".to_string(),
                    conditions: vec![
                        ProfileCondition::new(
                            ProfileConditionType::NotEquals,
                            ProfileConditionValue::IsAnamorphic,
                            "true",
                        ),
                        ProfileCondition::new(
                            ProfileConditionType::EqualsAny,
                            ProfileConditionValue::VideoProfile,
                            "main|main 10",
                        ),
                        ProfileCondition::new(
                            ProfileConditionType::LessThanEqual,
                            ProfileConditionValue::VideoLevel,
                            "175",
                        ),
                        ProfileCondition::new(
                            ProfileConditionType::NotEquals,
                            ProfileConditionValue::IsInterlaced,
                            "true",
                        ),
                        ProfileCondition::new(
                            ProfileConditionType::LessThanEqual,
                            ProfileConditionValue::VideoBitDepth,
                            capabilities.max_video_bit_depth().to_string(),
                        ),
                        ProfileCondition::new(
                            ProfileConditionType::EqualsAny,
                            ProfileConditionValue::VideoRangeType,
                            range_types,
                        ),
                    ],
                    apply_conditions: Vec::new(),
                });
            }

            profiles
        }
    }
}

/// Subtitle delivery table of a player
pub fn subtitle_profiles(player: PlayerKind) -> Vec<SubtitleProfile> {
    match player {
        PlayerKind::Vlc => VLC_EMBEDDED_SUBTITLES
            .iter()
            .map(|format| SubtitleProfile::new(format, SubtitleDeliveryMethod::Embed))
            .chain(
                VLC_EXTERNAL_SUBTITLES
                    .iter()
                    .map(|format| SubtitleProfile::new(format, SubtitleDeliveryMethod::External)),
            )
            .collect(),
        PlayerKind::Native => vec![
            SubtitleProfile::new("cc_dec", SubtitleDeliveryMethod::Embed),
            SubtitleProfile::new("ttml", SubtitleDeliveryMethod::Embed),
            SubtitleProfile::new("mov_text", SubtitleDeliveryMethod::Embed),
            SubtitleProfile::new("vtt", SubtitleDeliveryMethod::Hls),
            SubtitleProfile::new("subrip", SubtitleDeliveryMethod::External),
            SubtitleProfile::new("vtt", SubtitleDeliveryMethod::External),
            SubtitleProfile::new("pgssub", SubtitleDeliveryMethod::Encode),
            SubtitleProfile::new("dvdsub", SubtitleDeliveryMethod::Encode),
            SubtitleProfile::new("dvbsub", SubtitleDeliveryMethod::Encode),
            SubtitleProfile::new("ass", SubtitleDeliveryMethod::Encode),
            SubtitleProfile::new("ssa", SubtitleDeliveryMethod::Encode),
        ],
    }
}

/// MIME overrides of a player
pub fn response_profiles(player: PlayerKind) -> Vec<ResponseProfile> {
    match player {
        PlayerKind::Vlc => Vec::new(),
        PlayerKind::Native => vec![ResponseProfile {
            container: "m4v".to_string(),
            profile_type: ProfileType::Video,
            mime_type: "video/mp4".to_string(),
        }],
    }
}

/// Lowest-common-denominator direct play profile
pub fn compatibility_direct_play_profiles() -> Vec<DirectPlayProfile> {
    vec![DirectPlayProfile {
        container: codecs("mp4"),
        audio_codecs: codecs("aac"),
        video_codecs: codecs("h264"),
        profile_type: ProfileType::Video,
    }]
}

/// Lowest-common-denominator transcoding target
pub fn compatibility_transcoding_profiles() -> Vec<TranscodingProfile> {
    vec![TranscodingProfile::hls(
        "mp4",
        ProfileType::Video,
        codecs("h264"),
        codecs("aac"),
    )]
}

/// Accept-anything profile used when transcoding is forbidden
pub fn forced_direct_play_profiles() -> Vec<DirectPlayProfile> {
    vec![DirectPlayProfile::unrestricted(ProfileType::Video)]
}

fn native_video_codecs(capabilities: &dyn DecodeCapabilities) -> Vec<String> {
    let mut video = codecs("h264,mpeg4");
    if capabilities.supports_hevc() {
        video.push("hevc".to_string());
    }
    if capabilities.supports_av1() {
        video.push("av1".to_string());
    }
    video
}
