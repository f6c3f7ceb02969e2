//! Per-attempt index reconciliation state machine

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::model::{AttemptId, EngineTrack, MediaSource, MediaStream, PlayMethod};
use crate::streams::{adjusted_index_map, resolve_external_subtitle_indexes, IndexMap};

/// Progress of one reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReconcilerState {
    /// No media source received yet
    Unbuilt,
    /// Analytic map computed
    AnalyticallyMapped,
    /// Engine track list applied
    Refined,
}

/// Result of [`IndexReconciler::build`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Built { mapped: usize },
    /// The reconciler was already built; nothing changed
    AlreadyBuilt,
}

/// Result of [`IndexReconciler::refine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineOutcome {
    Applied { resolved: usize },
    /// The event belongs to a different playback attempt
    Stale {
        current: AttemptId,
        received: AttemptId,
    },
    /// No analytic map exists yet
    NotBuilt,
    /// The engine track list was already applied
    AlreadyRefined,
}

/// Owns the index map of exactly one playback attempt.
///
/// Transitions only move forward: `Unbuilt → AnalyticallyMapped → Refined`.
/// A new media load needs a new reconciler.
#[derive(Debug, Clone)]
pub struct IndexReconciler {
    attempt: AttemptId,
    state: ReconcilerState,
    play_method: Option<PlayMethod>,
    streams: Vec<MediaStream>,
    map: IndexMap,
}

impl IndexReconciler {
    /// Create an unbuilt reconciler for a playback attempt
    pub fn new(attempt: AttemptId) -> Self {
        Self {
            attempt,
            state: ReconcilerState::Unbuilt,
            play_method: None,
            streams: Vec::new(),
            map: IndexMap::new(),
        }
    }

    /// Compute the analytic map from the selected media source
    pub fn build(&mut self, source: &MediaSource, play_method: PlayMethod) -> BuildOutcome {
        if self.state != ReconcilerState::Unbuilt {
            warn!(attempt = %self.attempt, "Reconciler already built, ignoring media source");
            return BuildOutcome::AlreadyBuilt;
        }

        self.map = adjusted_index_map(
            &source.streams,
            play_method,
            source.default_audio_stream_index,
        );
        self.streams = source.streams.clone();
        self.play_method = Some(play_method);
        self.state = ReconcilerState::AnalyticallyMapped;

        BuildOutcome::Built {
            mapped: self.map.len(),
        }
    }

    /// Apply the engine's live subtitle track list for `attempt`
    pub fn refine(&mut self, attempt: AttemptId, subtitle_tracks: &[EngineTrack]) -> RefineOutcome {
        if attempt != self.attempt {
            warn!(
                current = %self.attempt,
                received = %attempt,
                "Dropping engine tracks from another playback attempt"
            );
            return RefineOutcome::Stale {
                current: self.attempt,
                received: attempt,
            };
        }

        match self.state {
            ReconcilerState::Unbuilt => {
                debug!(attempt = %self.attempt, "Engine tracks arrived before media source");
                RefineOutcome::NotBuilt
            }
            ReconcilerState::Refined => RefineOutcome::AlreadyRefined,
            ReconcilerState::AnalyticallyMapped => {
                let resolved =
                    resolve_external_subtitle_indexes(&mut self.map, &self.streams, subtitle_tracks);
                self.state = ReconcilerState::Refined;

                info!(
                    attempt = %self.attempt,
                    resolved,
                    unresolved = self.unresolved_sidecars().len(),
                    "Refined index map from engine tracks"
                );
                RefineOutcome::Applied { resolved }
            }
        }
    }

    /// Engine track index for a server stream index
    pub fn local_index(&self, server_index: i32) -> Option<i32> {
        self.map.local_index(server_index)
    }

    /// Sidecar subtitles that have no engine track
    pub fn unresolved_sidecars(&self) -> Vec<i32> {
        self.streams
            .iter()
            .filter(|s| s.is_sidecar_subtitle() && !self.map.contains_server_index(s.server_index))
            .map(|s| s.server_index)
            .collect()
    }

    pub fn index_map(&self) -> &IndexMap {
        &self.map
    }

    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    pub fn state(&self) -> ReconcilerState {
        self.state
    }

    pub fn play_method(&self) -> Option<PlayMethod> {
        self.play_method
    }
}
