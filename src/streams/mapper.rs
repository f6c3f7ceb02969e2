//! Analytic (phase one) stream index mapping

use tracing::{debug, info, warn};

use crate::domain::model::{MediaStream, PlayMethod, StreamKind};
use crate::streams::IndexMap;

/// Compute the server → engine index map that follows from the stream list and
/// play method alone.
///
/// * `Transcode`: the output container holds the first internal video stream and
///   the selected audio stream, in that order. Sidecar subtitles follow in list
///   order, because they are attached to the engine in that order.
/// * `DirectPlay` / `DirectStream`: the server numbers external streams before
///   internal ones, so every internal stream shifts down by the external count.
///   External streams stay unmapped until the engine reports its tracks.
pub fn adjusted_index_map(
    streams: &[MediaStream],
    play_method: PlayMethod,
    default_audio_index: Option<i32>,
) -> IndexMap {
    let map = match play_method {
        PlayMethod::Transcode => transcode_map(streams, default_audio_index),
        PlayMethod::DirectPlay | PlayMethod::DirectStream => direct_map(streams),
    };

    info!(
        %play_method,
        streams = streams.len(),
        mapped = map.len(),
        "Built analytic index map"
    );
    map
}

fn transcode_map(streams: &[MediaStream], default_audio_index: Option<i32>) -> IndexMap {
    let mut map = IndexMap::new();
    let mut container_tracks: Vec<&MediaStream> = Vec::with_capacity(2);

    if let Some(video) = streams
        .iter()
        .find(|s| s.kind == StreamKind::Video && s.is_internal())
    {
        container_tracks.push(video);
    }

    // The transcoder keeps only the selected audio track
    if let Some(selected) = default_audio_index {
        if let Some(audio) = streams.iter().find(|s| {
            s.kind == StreamKind::Audio && s.is_internal() && s.server_index == selected
        }) {
            container_tracks.push(audio);
        }
    }

    for (local, stream) in container_tracks.iter().enumerate() {
        debug!(
            server_index = stream.server_index,
            local_index = local,
            kind = ?stream.kind,
            "Mapped container track"
        );
        map.insert(stream.server_index, local as i32);
    }

    let first_sidecar = container_tracks.len();
    for (offset, subtitle) in streams.iter().filter(|s| s.is_sidecar_subtitle()).enumerate() {
        let local = (first_sidecar + offset) as i32;
        debug!(
            server_index = subtitle.server_index,
            local_index = local,
            "Mapped sidecar subtitle"
        );
        map.insert(subtitle.server_index, local);
    }

    map
}

fn direct_map(streams: &[MediaStream]) -> IndexMap {
    let mut map = IndexMap::new();
    let external_count = streams.iter().filter(|s| s.is_external).count() as i32;

    for stream in streams.iter().filter(|s| s.is_internal()) {
        let Some(local) = stream.server_index.checked_sub(external_count) else {
            warn!(
                server_index = stream.server_index,
                external_count,
                "Local track index out of range"
            );
            continue;
        };
        debug!(
            server_index = stream.server_index,
            local_index = local,
            external_count,
            "Mapped internal track"
        );
        map.insert(stream.server_index, local);
    }

    map
}
