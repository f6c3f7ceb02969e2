// Application layer - Use case orchestration

pub mod playback_session;

pub use playback_session::{LoadRequest, LoadedMedia, PlaybackSession};
