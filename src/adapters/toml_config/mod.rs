// TOML config adapter - Settings files in TOML

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{TrackmapError, TrackmapResult};
use crate::profile::CustomDeviceProfile;

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "trackmap.toml";

/// Settings file layout. Every value is optional; absent values fall through
/// to the next layer of the hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    #[serde(default)]
    pub playback: PlaybackSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// `[playback]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlaybackSection {
    pub player: Option<String>,
    pub compatibility_mode: Option<String>,
    pub max_bitrate: Option<BitrateValue>,
    pub custom_profile_action: Option<String>,
    #[serde(default)]
    pub custom_profiles: Vec<CustomDeviceProfile>,
}

/// `[logging]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub format: Option<String>,
}

/// Bitrate written either as a number or as a keyword such as `"max"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BitrateValue {
    Bits(u32),
    Keyword(String),
}

impl BitrateValue {
    pub fn as_setting(&self) -> String {
        match self {
            BitrateValue::Bits(bits) => bits.to_string(),
            BitrateValue::Keyword(keyword) => keyword.clone(),
        }
    }
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse settings from TOML text
    pub fn parse(content: &str) -> TrackmapResult<SettingsFile> {
        Ok(toml::from_str(content)?)
    }

    /// Load a settings file that must exist
    pub fn load_file(path: &Path) -> TrackmapResult<SettingsFile> {
        let content = std::fs::read_to_string(path).map_err(|e| TrackmapError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let settings = Self::parse(&content)?;
        info!(path = %path.display(), "Loaded settings file");
        Ok(settings)
    }

    /// Load the explicit file, or `trackmap.toml` in `dir` when present
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> TrackmapResult<Option<SettingsFile>> {
        if let Some(path) = explicit {
            return Self::load_file(path).map(Some);
        }

        let candidate: PathBuf = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            Self::load_file(&candidate).map(Some)
        } else {
            debug!(path = %candidate.display(), "No settings file found");
            Ok(None)
        }
    }
}
