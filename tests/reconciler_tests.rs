use std::collections::BTreeSet;

use trackmap::domain::model::{
    validate_streams, EngineTrack, MediaSource, MediaStream, MediaStreamDto, PlayMethod,
    PlaybackInfoResponse, StreamKind,
};
use trackmap::streams::{
    adjusted_index_map, resolve_external_subtitle_indexes, IndexMap, IndexReconciler,
    RefineOutcome,
};
use trackmap::AttemptId;

/// Stream list builders shared by the scenarios
mod test_utils {
    use super::*;

    pub fn video(index: i32) -> MediaStream {
        MediaStream::internal(StreamKind::Video, index).with_codec("h264")
    }

    pub fn audio(index: i32) -> MediaStream {
        MediaStream::internal(StreamKind::Audio, index).with_codec("aac")
    }

    pub fn embedded_subtitle(index: i32) -> MediaStream {
        MediaStream::internal(StreamKind::Subtitle, index)
    }

    pub fn sidecar(index: i32) -> MediaStream {
        MediaStream::external(
            StreamKind::Subtitle,
            index,
            Some(format!("/Videos/abc/abc/Subtitles/{}/0/Stream.srt", index)),
        )
        .with_language("eng")
    }

    pub fn tracks(entries: &[(i32, &str)]) -> Vec<EngineTrack> {
        entries
            .iter()
            .map(|(index, title)| EngineTrack::new(*index, *title))
            .collect()
    }

    /// Every layout of `externals` sidecars followed by internal streams drawn
    /// from a fixed pattern, numbered the way the server numbers them.
    pub fn layouts() -> Vec<(Vec<MediaStream>, Option<i32>)> {
        let pattern = [
            StreamKind::Video,
            StreamKind::Audio,
            StreamKind::Audio,
            StreamKind::Subtitle,
            StreamKind::Audio,
            StreamKind::Subtitle,
        ];
        let mut layouts = Vec::new();
        for externals in 0..4 {
            for internals in 0..=pattern.len() {
                let mut streams: Vec<MediaStream> = (0..externals).map(sidecar).collect();
                for (offset, kind) in pattern.iter().take(internals).enumerate() {
                    streams.push(MediaStream::internal(*kind, externals + offset as i32));
                }
                let audio_indices: Vec<i32> = streams
                    .iter()
                    .filter(|s| s.kind == StreamKind::Audio)
                    .map(|s| s.server_index)
                    .collect();
                layouts.push((streams.clone(), None));
                for selected in audio_indices {
                    layouts.push((streams.clone(), Some(selected)));
                }
            }
        }
        layouts
    }

    pub fn assert_unique_values(map: &IndexMap) {
        let values: Vec<i32> = map.iter().map(|(_, local)| local).collect();
        let distinct: BTreeSet<i32> = values.iter().copied().collect();
        assert_eq!(values.len(), distinct.len(), "duplicate local index in {:?}", map);
    }
}

use test_utils::*;

const METHODS: [PlayMethod; 3] = [
    PlayMethod::DirectPlay,
    PlayMethod::DirectStream,
    PlayMethod::Transcode,
];

#[test]
fn test_transcode_container_ordering() {
    let streams = vec![audio(3), audio(4), video(5), audio(6)];
    let map = adjusted_index_map(&streams, PlayMethod::Transcode, Some(3));

    assert_eq!(map.iter().collect::<Vec<_>>(), vec![(3, 1), (5, 0)]);
    assert!(!map.contains_server_index(4));
    assert!(!map.contains_server_index(6));
}

#[test]
fn test_direct_play_shift() {
    let streams = vec![sidecar(0), sidecar(1), video(2), audio(3)];
    let map = adjusted_index_map(&streams, PlayMethod::DirectPlay, Some(3));

    assert_eq!(map.iter().collect::<Vec<_>>(), vec![(2, 0), (3, 1)]);
    assert_eq!(map.local_index(0), None);
    assert_eq!(map.local_index(1), None);
}

#[test]
fn test_external_subtitle_tail_assignment() {
    let streams = vec![sidecar(0), sidecar(1), video(2), audio(3)];
    let mut map = adjusted_index_map(&streams, PlayMethod::DirectPlay, Some(3));

    let engine = tracks(&[(0, "forced"), (1, "eng"), (4, "spa"), (5, "fre")]);
    let resolved = resolve_external_subtitle_indexes(&mut map, &streams, &engine);

    assert_eq!(resolved, 2);
    assert_eq!(map.local_index(0), Some(4));
    assert_eq!(map.local_index(1), Some(5));
}

#[test]
fn test_richer_container_than_expected() {
    // The engine exposes two embedded subtitles the server filtered out
    let streams = vec![sidecar(0), sidecar(1), video(2), audio(3)];
    let mut map = adjusted_index_map(&streams, PlayMethod::DirectStream, Some(3));

    let engine = tracks(&[
        (-1, "Disable"),
        (2, "Embedded 1"),
        (3, "Embedded 2"),
        (4, "eng"),
        (5, "spa"),
    ]);
    resolve_external_subtitle_indexes(&mut map, &streams, &engine);

    assert_eq!(map.local_index(0), Some(4));
    assert_eq!(map.local_index(1), Some(5));
    assert_eq!(map.local_index(2), Some(0));
    assert_eq!(map.local_index(3), Some(1));
}

#[test]
fn test_end_to_end_transcode_scenario() {
    let json = r#"{
        "PlaySessionId": "session",
        "MediaSources": [{
            "Id": "source",
            "TranscodingUrl": "/videos/source/master.m3u8?PlaySessionId=session",
            "DefaultAudioStreamIndex": 1,
            "MediaStreams": [
                {"Type": "Video", "Index": 0, "Codec": "hevc"},
                {"Type": "Audio", "Index": 1, "Codec": "eac3", "Language": "eng"},
                {"Type": "Audio", "Index": 2, "Codec": "aac", "Language": "jpn"},
                {"Type": "Subtitle", "Index": 3, "IsExternal": true, "DeliveryUrl": "/subs/3.vtt"}
            ]
        }]
    }"#;
    let response: PlaybackInfoResponse = serde_json::from_str(json).unwrap();
    let source = MediaSource::from(response.select_source(None).unwrap().clone());
    let play_method = source.play_method().unwrap();
    assert_eq!(play_method, PlayMethod::Transcode);

    let map = adjusted_index_map(&source.streams, play_method, source.default_audio_stream_index);

    assert_eq!(map.len(), 3);
    assert_eq!(map.local_index(0), Some(0));
    assert_eq!(map.local_index(1), Some(1));
    assert_eq!(map.local_index(2), None);
    assert_eq!(map.local_index(3), Some(2));
}

#[test]
fn test_streams_without_index_are_skipped() {
    let dtos: Vec<MediaStreamDto> = serde_json::from_str(
        r#"[
            {"Type": "Video", "Index": 0},
            {"Type": "Audio"},
            {"Index": 7},
            {"Type": "Audio", "Index": 1}
        ]"#,
    )
    .unwrap();
    let streams = validate_streams(dtos);

    assert_eq!(streams.len(), 2);
    let map = adjusted_index_map(&streams, PlayMethod::DirectPlay, Some(1));
    assert_eq!(map.iter().collect::<Vec<_>>(), vec![(0, 0), (1, 1)]);
}

#[test]
fn test_phase_one_uniqueness_and_determinism() {
    for (streams, selected) in layouts() {
        for method in METHODS {
            let first = adjusted_index_map(&streams, method, selected);
            let second = adjusted_index_map(&streams, method, selected);
            assert_eq!(first, second);
            assert_unique_values(&first);
        }
    }
}

#[test]
fn test_phase_two_is_non_destructive() {
    let engine_lists = [
        tracks(&[]),
        tracks(&[(-1, "Disable")]),
        tracks(&[(0, "a"), (1, "b"), (2, "c")]),
        tracks(&[(3, "a"), (4, "b"), (5, "c"), (6, "d"), (7, "e"), (8, "f"), (9, "g")]),
        tracks(&[(1, "a"), (1, "dup"), (10, "b")]),
    ];

    for (streams, selected) in layouts() {
        for method in METHODS {
            let phase1 = adjusted_index_map(&streams, method, selected);
            for engine in &engine_lists {
                let mut refined = phase1.clone();
                resolve_external_subtitle_indexes(&mut refined, &streams, engine);

                for (server, local) in phase1.iter() {
                    assert_eq!(refined.local_index(server), Some(local));
                }
                assert!(refined.len() >= phase1.len());
                assert_unique_values(&refined);

                let new_keys: Vec<i32> = refined
                    .iter()
                    .map(|(server, _)| server)
                    .filter(|server| !phase1.contains_server_index(*server))
                    .collect();
                for server in new_keys {
                    let stream = streams.iter().find(|s| s.server_index == server).unwrap();
                    assert!(stream.is_sidecar_subtitle());
                }
            }
        }
    }
}

#[test]
fn test_stale_refinement_never_touches_newer_attempt() {
    let source = MediaSource::with_streams(vec![sidecar(0), video(1), audio(2)]);

    let mut older = IndexReconciler::new(AttemptId(1));
    older.build(&source, PlayMethod::DirectPlay);

    let mut newer = IndexReconciler::new(AttemptId(2));
    newer.build(&source, PlayMethod::DirectPlay);
    let before = newer.index_map().clone();

    let outcome = newer.refine(AttemptId(1), &tracks(&[(0, "a"), (1, "b"), (9, "late")]));
    assert!(matches!(outcome, RefineOutcome::Stale { .. }));
    assert_eq!(newer.index_map(), &before);
    assert_eq!(newer.unresolved_sidecars(), vec![0]);
}
