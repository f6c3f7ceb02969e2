//! Device profile construction

use std::sync::Arc;

use tracing::{debug, info};

use crate::profile::capabilities::DecodeCapabilities;
use crate::profile::defaults;
use crate::profile::{
    CompatibilityMode, CustomDeviceProfile, CustomProfileAction, DeviceProfile, PlayerKind,
};

/// Inputs of a single capability declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileRequest {
    /// Compatibility mode chosen by the user
    pub mode: CompatibilityMode,
    /// Bitrate ceiling applied to static, streaming and audio transcoding
    pub max_bitrate: Option<u32>,
    /// User profiles, consulted only in custom mode
    pub custom_profiles: Vec<CustomDeviceProfile>,
    /// Extend or replace the engine defaults in custom mode
    pub custom_action: CustomProfileAction,
}

impl ProfileRequest {
    pub fn new(mode: CompatibilityMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn with_max_bitrate(mut self, max_bitrate: Option<u32>) -> Self {
        self.max_bitrate = max_bitrate;
        self
    }

    pub fn with_custom_profiles(
        mut self,
        profiles: Vec<CustomDeviceProfile>,
        action: CustomProfileAction,
    ) -> Self {
        self.custom_profiles = profiles;
        self.custom_action = action;
        self
    }
}

/// Builds the device profile declared to the server before playback
pub struct CapabilityDeclarator {
    player: PlayerKind,
    capabilities: Arc<dyn DecodeCapabilities>,
}

impl CapabilityDeclarator {
    /// Create a declarator for a player and its decode capabilities
    pub fn new(player: PlayerKind, capabilities: Arc<dyn DecodeCapabilities>) -> Self {
        Self {
            player,
            capabilities,
        }
    }

    /// Produce the capability declaration for a request.
    ///
    /// Pure: identical requests yield identical profiles.
    pub fn declare(&self, request: &ProfileRequest) -> DeviceProfile {
        let capabilities = self.capabilities.as_ref();

        let mut profile = DeviceProfile {
            name: Some(format!("trackmap-{:?}", self.player).to_lowercase()),
            codec_profiles: defaults::codec_profiles(self.player, capabilities),
            response_profiles: defaults::response_profiles(self.player),
            subtitle_profiles: defaults::subtitle_profiles(self.player),
            ..Default::default()
        };

        match request.mode {
            CompatibilityMode::Auto => {
                profile.direct_play_profiles =
                    defaults::direct_play_profiles(self.player, capabilities);
                profile.transcoding_profiles =
                    defaults::transcoding_profiles(self.player, capabilities);
            }
            CompatibilityMode::MostCompatible => {
                profile.direct_play_profiles = defaults::compatibility_direct_play_profiles();
                profile.transcoding_profiles = defaults::compatibility_transcoding_profiles();
            }
            CompatibilityMode::DirectPlay => {
                profile.direct_play_profiles = defaults::forced_direct_play_profiles();
                profile.transcoding_profiles = Vec::new();
            }
            CompatibilityMode::Custom => {
                if request.custom_action == CustomProfileAction::Add {
                    profile.direct_play_profiles =
                        defaults::direct_play_profiles(self.player, capabilities);
                }
                profile.transcoding_profiles =
                    defaults::transcoding_profiles(self.player, capabilities);

                // Flagged custom profiles take over transcoding entirely
                if request
                    .custom_profiles
                    .iter()
                    .any(|p| p.use_as_transcoding_profile)
                {
                    profile.transcoding_profiles.clear();
                }

                for custom in &request.custom_profiles {
                    profile.direct_play_profiles.push(custom.as_direct_play());
                    if custom.use_as_transcoding_profile {
                        profile.transcoding_profiles.push(custom.as_transcoding());
                    }
                }

                debug!(
                    "Applied {} custom profiles ({:?})",
                    request.custom_profiles.len(),
                    request.custom_action
                );
            }
        }

        if let Some(max_bitrate) = request.max_bitrate {
            profile.max_static_bitrate = Some(max_bitrate);
            profile.max_streaming_bitrate = Some(max_bitrate);
            profile.music_streaming_transcoding_bitrate = Some(max_bitrate);
        }

        info!(
            mode = ?request.mode,
            player = ?self.player,
            direct_play = profile.direct_play_profiles.len(),
            transcoding = profile.transcoding_profiles.len(),
            "Built device profile"
        );

        profile
    }
}
