//! Settings hierarchy
//!
//! Precedence: CLI > Env > File > Defaults.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::adapters::toml_config::{SettingsFile, TomlConfigAdapter};
use crate::domain::errors::DomainError;
use crate::error::TrackmapResult;
use crate::profile::{
    CompatibilityMode, CustomDeviceProfile, CustomProfileAction, PlayerKind, ProfileRequest,
};
use crate::utils::logging::{LogFormat, LogLevel, LoggingConfig};

/// Bitrate used for the `max` keyword (360 Mbps)
pub const MAX_BITRATE: u32 = 360_000_000;

/// Environment variables and the setting each one overrides
pub const ENV_MAPPINGS: &[(&str, &str)] = &[
    ("TRACKMAP_PLAYER", "player"),
    ("TRACKMAP_COMPATIBILITY_MODE", "compatibility_mode"),
    ("TRACKMAP_MAX_BITRATE", "max_bitrate"),
    ("TRACKMAP_LOG_LEVEL", "log_level"),
];

/// Fully resolved playback settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackSettings {
    pub player: PlayerKind,
    pub compatibility_mode: CompatibilityMode,
    pub max_bitrate: Option<u32>,
    pub custom_profile_action: CustomProfileAction,
    pub custom_profiles: Vec<CustomDeviceProfile>,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            player: PlayerKind::Vlc,
            compatibility_mode: CompatibilityMode::Auto,
            max_bitrate: None,
            custom_profile_action: CustomProfileAction::Add,
            custom_profiles: Vec::new(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Pretty,
        }
    }
}

/// Values given on the command line; `None` leaves the lower layers in place
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub player: Option<String>,
    pub compatibility_mode: Option<String>,
    pub max_bitrate: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

impl SettingsOverrides {
    fn pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("player", self.player.as_deref()),
            ("compatibility_mode", self.compatibility_mode.as_deref()),
            ("max_bitrate", self.max_bitrate.as_deref()),
            ("log_level", self.log_level.as_deref()),
            ("log_format", self.log_format.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }
}

impl PlaybackSettings {
    /// Resolve settings from the process environment and the settings file
    pub fn load(config_path: Option<&Path>, overrides: &SettingsOverrides) -> TrackmapResult<Self> {
        let cwd = std::env::current_dir()?;
        let file = TomlConfigAdapter::discover(config_path, &cwd)?;
        Self::resolve(file.as_ref(), |name| std::env::var(name).ok(), overrides)
    }

    /// Apply every layer on top of the defaults.
    ///
    /// `env` looks up an environment variable by name.
    pub fn resolve<F>(
        file: Option<&SettingsFile>,
        env: F,
        overrides: &SettingsOverrides,
    ) -> TrackmapResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(file) = file {
            settings.apply_file(file)?;
        }

        let mut env_overrides = 0;
        for (var, key) in ENV_MAPPINGS {
            if let Some(value) = env(var) {
                info!("Found environment override: {} = {}", var, value);
                settings.set(key, &value)?;
                env_overrides += 1;
            }
        }
        if env_overrides > 0 {
            info!("Applied {} environment variable overrides", env_overrides);
        }

        for (key, value) in overrides.pairs() {
            info!("CLI override: {} = {}", key, value);
            settings.set(key, value)?;
        }

        Ok(settings)
    }

    fn apply_file(&mut self, file: &SettingsFile) -> Result<(), DomainError> {
        let playback = &file.playback;
        if let Some(player) = &playback.player {
            self.set("player", player)?;
        }
        if let Some(mode) = &playback.compatibility_mode {
            self.set("compatibility_mode", mode)?;
        }
        if let Some(bitrate) = &playback.max_bitrate {
            self.set("max_bitrate", &bitrate.as_setting())?;
        }
        if let Some(action) = &playback.custom_profile_action {
            self.set("custom_profile_action", action)?;
        }
        self.custom_profiles = playback.custom_profiles.clone();

        if let Some(level) = &file.logging.level {
            self.set("log_level", level)?;
        }
        if let Some(format) = &file.logging.format {
            self.set("log_format", format)?;
        }
        Ok(())
    }

    /// Set one setting from its string form
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), DomainError> {
        let invalid = |e: DomainError| DomainError::InvalidConfig(format!("{}: {}", key, e));
        match key {
            "player" => self.player = PlayerKind::parse(value).map_err(invalid)?,
            "compatibility_mode" => {
                self.compatibility_mode = CompatibilityMode::parse(value).map_err(invalid)?
            }
            "max_bitrate" => self.max_bitrate = Some(parse_bitrate(value).map_err(invalid)?),
            "custom_profile_action" => {
                self.custom_profile_action = CustomProfileAction::parse(value).map_err(invalid)?
            }
            "log_level" => self.log_level = LogLevel::parse(value).map_err(invalid)?,
            "log_format" => self.log_format = LogFormat::parse(value).map_err(invalid)?,
            _ => {
                return Err(DomainError::InvalidConfig(format!(
                    "Unknown setting: {}",
                    key
                )))
            }
        }
        Ok(())
    }

    /// Declarator input described by these settings
    pub fn profile_request(&self) -> ProfileRequest {
        ProfileRequest::new(self.compatibility_mode)
            .with_max_bitrate(self.max_bitrate)
            .with_custom_profiles(self.custom_profiles.clone(), self.custom_profile_action)
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig::new(self.log_level, self.log_format)
    }
}

/// Parse a bitrate in bits per second, or the `max` keyword
pub fn parse_bitrate(value: &str) -> Result<u32, DomainError> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("max") {
        return Ok(MAX_BITRATE);
    }
    match value.parse::<u32>() {
        Ok(0) => Err(DomainError::BadArgs("Bitrate must be positive".to_string())),
        Ok(bits) => Ok(bits),
        Err(_) => Err(DomainError::BadArgs(format!(
            "Invalid bitrate: {}. Use bits per second or 'max'",
            value
        ))),
    }
}
