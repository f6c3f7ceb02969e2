//! Runtime (phase two) resolution of sidecar subtitle indices

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::domain::model::{EngineTrack, MediaStream};
use crate::streams::IndexMap;

/// Fill in engine indices for sidecar subtitles that the analytic pass left
/// unmapped, using the engine's live subtitle track list.
///
/// The engine registers sidecar tracks after every track native to the opened
/// container, so the sidecars are the highest unclaimed indices. The last `N`
/// unclaimed indices are zipped, ascending, with the `N` unmapped sidecar
/// subtitles in stream-list order. Existing entries are never changed; when
/// the engine offers fewer free indices than there are sidecars, the trailing
/// sidecars stay unmapped.
///
/// Returns the number of newly mapped streams.
pub fn resolve_external_subtitle_indexes(
    map: &mut IndexMap,
    streams: &[MediaStream],
    engine_subtitle_tracks: &[EngineTrack],
) -> usize {
    let targets: Vec<&MediaStream> = streams
        .iter()
        .filter(|s| s.is_sidecar_subtitle() && !map.contains_server_index(s.server_index))
        .collect();
    if targets.is_empty() {
        return 0;
    }

    let claimed = map.claimed_local_indices();
    let unmapped: Vec<i32> = engine_subtitle_tracks
        .iter()
        .map(|track| track.index)
        .filter(|index| *index >= 0 && !claimed.contains(index))
        .collect::<BTreeSet<i32>>()
        .into_iter()
        .collect();

    let tail = &unmapped[unmapped.len().saturating_sub(targets.len())..];
    if tail.len() < targets.len() {
        warn!(
            sidecars = targets.len(),
            available = tail.len(),
            "Engine reported fewer free subtitle tracks than sidecar subtitles"
        );
    }

    let mut resolved = 0;
    for (stream, local) in targets.iter().zip(tail.iter()) {
        debug!(
            server_index = stream.server_index,
            local_index = *local,
            "Resolved sidecar subtitle"
        );
        if map.insert(stream.server_index, *local) {
            resolved += 1;
        }
    }

    resolved
}
