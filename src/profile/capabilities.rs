//! Platform decode capability queries

use serde::{Deserialize, Serialize};

/// What the local hardware/decoder stack can actually decode.
///
/// Implemented by the platform layer (GPU/decoder capability API) and handed to
/// the declarator explicitly.
pub trait DecodeCapabilities: Send + Sync {
    /// HEVC decode is available
    fn supports_hevc(&self) -> bool;

    /// AV1 decode is available
    fn supports_av1(&self) -> bool;

    /// Dolby Vision output is available
    fn supports_dolby_vision(&self) -> bool;

    /// Highest video bit depth the decoder accepts
    fn max_video_bit_depth(&self) -> u8;
}

/// Fixed capability table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticDecodeCapabilities {
    #[serde(default)]
    pub hevc: bool,
    #[serde(default)]
    pub av1: bool,
    #[serde(default)]
    pub dolby_vision: bool,
    #[serde(default = "default_bit_depth")]
    pub max_bit_depth: u8,
}

fn default_bit_depth() -> u8 {
    8
}

impl Default for StaticDecodeCapabilities {
    fn default() -> Self {
        Self {
            hevc: false,
            av1: false,
            dolby_vision: false,
            max_bit_depth: default_bit_depth(),
        }
    }
}

impl StaticDecodeCapabilities {
    /// A modern decoder with HEVC, AV1 and 10-bit support
    pub fn modern() -> Self {
        Self {
            hevc: true,
            av1: true,
            dolby_vision: false,
            max_bit_depth: 10,
        }
    }
}

impl DecodeCapabilities for StaticDecodeCapabilities {
    fn supports_hevc(&self) -> bool {
        self.hevc
    }

    fn supports_av1(&self) -> bool {
        self.av1
    }

    fn supports_dolby_vision(&self) -> bool {
        self.dolby_vision
    }

    fn max_video_bit_depth(&self) -> u8 {
        self.max_bit_depth
    }
}
