//! TrackMap Library
//!
//! Playback compatibility negotiation for a media-server client: declares what
//! the local player can decode, and reconciles the server's stream indices with
//! the track indices of the local media engine.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod profile;
pub mod streams;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{AttemptId, EngineTrack, MediaSource, MediaStream, PlayMethod, StreamKind};
pub use error::{TrackmapError, TrackmapResult};
pub use profile::{CapabilityDeclarator, DeviceProfile, ProfileRequest};
pub use streams::{IndexMap, IndexReconciler};
