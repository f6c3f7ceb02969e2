// Adapters - External system implementations

pub mod json_playback_info;
pub mod recording_engine;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use json_playback_info::JsonPlaybackInfoAdapter;
pub use recording_engine::RecordingEngineAdapter;
pub use toml_config::TomlConfigAdapter;
pub use tracing_log::init_tracing;
