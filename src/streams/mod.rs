//! Stream index reconciliation module
//!
//! The media server and the local engine number tracks independently. This
//! module maps server stream indices onto engine track indices in two phases:
//! an analytic pass from the stream list and play method ([`mapper`]), then a
//! runtime pass for sidecar subtitles once the engine enumerates its tracks
//! ([`resolver`]). [`reconciler`] ties both to one playback attempt.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::warn;

pub mod mapper;
pub mod reconciler;
pub mod resolver;

pub use mapper::adjusted_index_map;
pub use reconciler::{BuildOutcome, IndexReconciler, ReconcilerState, RefineOutcome};
pub use resolver::resolve_external_subtitle_indexes;

/// Partial mapping from server stream index to local engine track index.
///
/// Local indices are unique: an insert that would reuse one is refused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IndexMap {
    entries: BTreeMap<i32, i32>,
}

impl IndexMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `server_index` to `local_index`.
    ///
    /// Returns `false` and leaves the map unchanged when the server index is
    /// already mapped, the local index is negative, or the local index is
    /// already claimed by another server index.
    pub fn insert(&mut self, server_index: i32, local_index: i32) -> bool {
        if local_index < 0 {
            warn!(server_index, local_index, "Refusing negative local track index");
            return false;
        }
        if let Some(existing) = self.entries.get(&server_index) {
            warn!(
                server_index,
                existing = *existing,
                local_index,
                "Server index already mapped"
            );
            return false;
        }
        if let Some((owner, _)) = self.entries.iter().find(|(_, local)| **local == local_index) {
            warn!(
                server_index,
                local_index,
                owner = *owner,
                "Local track index already claimed"
            );
            return false;
        }

        self.entries.insert(server_index, local_index);
        true
    }

    /// Local engine track for a server stream, if resolved
    pub fn local_index(&self, server_index: i32) -> Option<i32> {
        self.entries.get(&server_index).copied()
    }

    pub fn contains_server_index(&self, server_index: i32) -> bool {
        self.entries.contains_key(&server_index)
    }

    /// Every local index currently in use
    pub fn claimed_local_indices(&self) -> BTreeSet<i32> {
        self.entries.values().copied().collect()
    }

    /// `(server_index, local_index)` pairs in ascending server index order
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.entries.iter().map(|(server, local)| (*server, *local))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(i32, i32)> for IndexMap {
    fn from_iter<T: IntoIterator<Item = (i32, i32)>>(iter: T) -> Self {
        let mut map = IndexMap::new();
        for (server, local) in iter {
            map.insert(server, local);
        }
        map
    }
}
