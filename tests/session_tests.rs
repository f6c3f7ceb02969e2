use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use trackmap::adapters::RecordingEngineAdapter;
use trackmap::app::{LoadRequest, PlaybackSession};
use trackmap::domain::model::{EngineTrack, PlaybackInfoResponse, PlayMethod};
use trackmap::ports::{
    EngineConfiguration, EngineEvent, MediaEnginePort, MediaLocator, PlaybackInfoPort,
    PlaybackInfoRequest,
};
use trackmap::profile::{
    CapabilityDeclarator, CompatibilityMode, PlayerKind, ProfileRequest,
    StaticDecodeCapabilities,
};
use trackmap::streams::{ReconcilerState, RefineOutcome};
use trackmap::{AttemptId, TrackmapError, TrackmapResult};

/// In-memory playback-info server with optional per-item gates
mod test_utils {
    use super::*;

    #[derive(Default)]
    pub struct MockPlaybackInfo {
        pub responses: HashMap<String, PlaybackInfoResponse>,
        pub gates: HashMap<String, Arc<Notify>>,
        pub requests: Mutex<Vec<PlaybackInfoRequest>>,
    }

    impl MockPlaybackInfo {
        pub fn with_response(mut self, item_id: &str, json: &str) -> Self {
            let response = serde_json::from_str(json).unwrap();
            self.responses.insert(item_id.to_string(), response);
            self
        }

        pub fn with_gate(mut self, item_id: &str, gate: Arc<Notify>) -> Self {
            self.gates.insert(item_id.to_string(), gate);
            self
        }
    }

    #[async_trait]
    impl PlaybackInfoPort for MockPlaybackInfo {
        async fn playback_info(
            &self,
            request: PlaybackInfoRequest,
        ) -> TrackmapResult<PlaybackInfoResponse> {
            let item_id = request.item_id.clone();
            self.requests.lock().await.push(request);

            if let Some(gate) = self.gates.get(&item_id) {
                gate.notified().await;
            }

            self.responses
                .get(&item_id)
                .cloned()
                .ok_or_else(|| TrackmapError::PlaybackInfo {
                    message: format!("unknown item {}", item_id),
                })
        }
    }

    /// Engine that holds `play_new_media` open until released
    #[derive(Default)]
    pub struct GatedEngine {
        pub inner: RecordingEngineAdapter,
        pub entered: Notify,
        pub release: Notify,
    }

    #[async_trait]
    impl MediaEnginePort for GatedEngine {
        async fn play_new_media(&self, configuration: EngineConfiguration) -> TrackmapResult<()> {
            self.entered.notify_one();
            self.release.notified().await;
            self.inner.play_new_media(configuration).await
        }

        async fn stop(&self) -> TrackmapResult<()> {
            self.inner.stop().await
        }
    }

    /// Direct play: two sidecars numbered before video and audio
    pub const DIRECT_PLAY: &str = r#"{
        "PlaySessionId": "ps-direct",
        "MediaSources": [{
            "Id": "direct-source",
            "ETag": "etag-direct",
            "SupportsDirectPlay": true,
            "DefaultAudioStreamIndex": 3,
            "DefaultSubtitleStreamIndex": 0,
            "MediaStreams": [
                {"Type": "Subtitle", "Index": 0, "IsExternal": true, "DeliveryUrl": "/subs/0.srt", "Language": "eng"},
                {"Type": "Subtitle", "Index": 1, "IsExternal": true, "DeliveryUrl": "/subs/1.srt", "Language": "spa"},
                {"Type": "Video", "Index": 2},
                {"Type": "Audio", "Index": 3}
            ]
        }]
    }"#;

    pub const TRANSCODE: &str = r#"{
        "PlaySessionId": "ps-transcode",
        "MediaSources": [{
            "Id": "transcode-source",
            "TranscodingUrl": "/videos/transcode-source/master.m3u8",
            "DefaultAudioStreamIndex": 2,
            "MediaStreams": [
                {"Type": "Video", "Index": 0},
                {"Type": "Audio", "Index": 1},
                {"Type": "Audio", "Index": 2},
                {"Type": "Subtitle", "Index": 3, "IsExternal": true, "DeliveryUrl": "/subs/3.vtt"}
            ]
        }]
    }"#;

    pub fn session(
        playback_info: Arc<MockPlaybackInfo>,
        engine: Arc<RecordingEngineAdapter>,
    ) -> PlaybackSession {
        let declarator = CapabilityDeclarator::new(
            PlayerKind::Vlc,
            Arc::new(StaticDecodeCapabilities::default()),
        );
        PlaybackSession::new(
            declarator,
            ProfileRequest::new(CompatibilityMode::Auto).with_max_bitrate(Some(20_000_000)),
            playback_info,
            engine,
        )
    }

    pub fn subtitle_tracks(indices: &[i32]) -> Vec<EngineTrack> {
        indices
            .iter()
            .map(|i| EngineTrack::new(*i, format!("Track {}", i)))
            .collect()
    }
}

use test_utils::*;

#[tokio::test]
async fn test_direct_play_load_and_refine() {
    let info = Arc::new(MockPlaybackInfo::default().with_response("movie", DIRECT_PLAY));
    let engine = Arc::new(RecordingEngineAdapter::new());
    let session = session(info.clone(), engine.clone());

    let loaded = session.load(LoadRequest::new("movie")).await.unwrap();
    assert_eq!(loaded.attempt, AttemptId(1));
    assert_eq!(loaded.play_method, PlayMethod::DirectPlay);
    assert_eq!(loaded.play_session_id, "ps-direct");
    assert_eq!(session.local_index(2).await, Some(0));
    assert_eq!(session.local_index(0).await, None);
    assert_eq!(session.unresolved_sidecars().await, vec![0, 1]);

    let played = engine.last_played().await.unwrap();
    assert_eq!(
        played.locator,
        MediaLocator::Static {
            item_id: "movie".to_string(),
            media_source_id: "direct-source".to_string(),
            play_session_id: "ps-direct".to_string(),
            tag: Some("etag-direct".to_string()),
        }
    );
    let sidecar_order: Vec<i32> = played
        .sidecar_subtitles
        .iter()
        .map(|s| s.server_index)
        .collect();
    assert_eq!(sidecar_order, vec![0, 1]);
    assert_eq!(played.audio_index, Some(1));
    assert_eq!(played.subtitle_index, None);

    let outcome = session
        .handle_engine_event(EngineEvent::MediaParsed {
            attempt: loaded.attempt,
            subtitle_tracks: subtitle_tracks(&[-1, 0, 1, 4, 5]),
        })
        .await;
    assert_eq!(outcome, RefineOutcome::Applied { resolved: 2 });
    assert_eq!(session.local_index(0).await, Some(4));
    assert_eq!(session.local_index(1).await, Some(5));
    assert_eq!(session.reconciler_state().await, Some(ReconcilerState::Refined));

    let again = session
        .handle_engine_event(EngineEvent::TracksChanged {
            attempt: loaded.attempt,
            subtitle_tracks: subtitle_tracks(&[6, 7]),
        })
        .await;
    assert_eq!(again, RefineOutcome::AlreadyRefined);
    assert_eq!(session.local_index(0).await, Some(4));
}

#[tokio::test]
async fn test_request_carries_device_profile() {
    let info = Arc::new(MockPlaybackInfo::default().with_response("movie", DIRECT_PLAY));
    let session = session(info.clone(), Arc::new(RecordingEngineAdapter::new()));

    session.load(LoadRequest::new("movie")).await.unwrap();

    let requests = info.requests.lock().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].max_streaming_bitrate, Some(20_000_000));
    assert_eq!(requests[0].device_profile.max_static_bitrate, Some(20_000_000));
    assert!(!requests[0].device_profile.direct_play_profiles.is_empty());
}

#[tokio::test]
async fn test_transcode_load_maps_sidecar_after_container_tracks() {
    let info = Arc::new(MockPlaybackInfo::default().with_response("show", TRANSCODE));
    let engine = Arc::new(RecordingEngineAdapter::new());
    let session = session(info, engine.clone());

    let loaded = session.load(LoadRequest::new("show")).await.unwrap();
    assert_eq!(loaded.play_method, PlayMethod::Transcode);
    assert_eq!(loaded.index_map.len(), 3);
    assert_eq!(session.local_index(1).await, None);
    assert_eq!(session.local_index(3).await, Some(2));
    assert!(session.unresolved_sidecars().await.is_empty());

    let played = engine.last_played().await.unwrap();
    assert_eq!(
        played.locator,
        MediaLocator::Transcode {
            url: "/videos/transcode-source/master.m3u8".to_string()
        }
    );
    assert_eq!(played.audio_index, Some(1));
}

#[tokio::test]
async fn test_superseded_load_does_not_install() {
    let gate = Arc::new(Notify::new());
    let info = Arc::new(
        MockPlaybackInfo::default()
            .with_response("slow", DIRECT_PLAY)
            .with_response("fast", TRANSCODE)
            .with_gate("slow", gate.clone()),
    );
    let engine = Arc::new(RecordingEngineAdapter::new());
    let session = Arc::new(session(info.clone(), engine.clone()));

    let slow = {
        let session = session.clone();
        tokio::spawn(async move { session.load(LoadRequest::new("slow")).await })
    };
    while info.requests.lock().await.is_empty() {
        tokio::task::yield_now().await;
    }

    let fast = session.load(LoadRequest::new("fast")).await.unwrap();
    assert_eq!(fast.attempt, AttemptId(2));

    gate.notify_one();
    let result = slow.await.unwrap();
    assert!(matches!(result, Err(TrackmapError::Superseded { attempt: 1 })));

    assert_eq!(session.index_map().await.unwrap(), fast.index_map);
    assert_eq!(engine.played().await.len(), 1);
}

#[tokio::test]
async fn test_stale_event_is_dropped() {
    let info = Arc::new(
        MockPlaybackInfo::default()
            .with_response("first", DIRECT_PLAY)
            .with_response("second", DIRECT_PLAY),
    );
    let session = session(info, Arc::new(RecordingEngineAdapter::new()));

    let first = session.load(LoadRequest::new("first")).await.unwrap();
    let second = session.load(LoadRequest::new("second")).await.unwrap();

    let outcome = session
        .handle_engine_event(EngineEvent::MediaParsed {
            attempt: first.attempt,
            subtitle_tracks: subtitle_tracks(&[0, 1, 8, 9]),
        })
        .await;
    assert_eq!(
        outcome,
        RefineOutcome::Stale {
            current: second.attempt,
            received: first.attempt
        }
    );
    assert_eq!(session.local_index(0).await, None);
    assert_eq!(
        session.reconciler_state().await,
        Some(ReconcilerState::AnalyticallyMapped)
    );
}

#[tokio::test]
async fn test_cancel_discards_map_and_late_events() {
    let info = Arc::new(MockPlaybackInfo::default().with_response("movie", DIRECT_PLAY));
    let engine = Arc::new(RecordingEngineAdapter::new());
    let session = session(info, engine.clone());

    let loaded = session.load(LoadRequest::new("movie")).await.unwrap();
    session.cancel().await.unwrap();

    assert_eq!(session.index_map().await, None);
    assert_eq!(session.local_index(2).await, None);
    assert_eq!(engine.stop_count().await, 1);

    let outcome = session
        .handle_engine_event(EngineEvent::MediaParsed {
            attempt: loaded.attempt,
            subtitle_tracks: subtitle_tracks(&[0, 1, 4, 5]),
        })
        .await;
    assert!(matches!(outcome, RefineOutcome::Stale { .. }));
}

#[tokio::test]
async fn test_cancel_while_engine_opens_media() {
    let info = Arc::new(MockPlaybackInfo::default().with_response("movie", DIRECT_PLAY));
    let engine = Arc::new(GatedEngine::default());
    let declarator =
        CapabilityDeclarator::new(PlayerKind::Vlc, Arc::new(StaticDecodeCapabilities::default()));
    let session = PlaybackSession::new(
        declarator,
        ProfileRequest::new(CompatibilityMode::Auto),
        info,
        engine.clone(),
    );

    let (loaded, cancelled) = tokio::join!(session.load(LoadRequest::new("movie")), async {
        engine.entered.notified().await;
        let cancelled = session.cancel().await;
        engine.release.notify_one();
        cancelled
    });

    cancelled.unwrap();
    assert!(matches!(
        loaded,
        Err(TrackmapError::Superseded { attempt: 1 })
    ));
    assert_eq!(session.current_attempt(), AttemptId(2));
    assert_eq!(session.index_map().await, None);
    assert_eq!(engine.inner.stop_count().await, 1);
}

#[tokio::test]
async fn test_missing_media_source_and_play_session() {
    let info = Arc::new(
        MockPlaybackInfo::default()
            .with_response("empty", r#"{"PlaySessionId": "ps", "MediaSources": []}"#)
            .with_response(
                "no-session",
                r#"{"MediaSources": [{"Id": "s", "SupportsDirectPlay": true}]}"#,
            )
            .with_response(
                "unplayable",
                r#"{"PlaySessionId": "ps", "MediaSources": [{"Id": "s"}]}"#,
            ),
    );
    let session = session(info, Arc::new(RecordingEngineAdapter::new()));

    assert!(matches!(
        session.load(LoadRequest::new("empty")).await,
        Err(TrackmapError::NoMediaSource { .. })
    ));
    assert!(matches!(
        session.load(LoadRequest::new("no-session")).await,
        Err(TrackmapError::NoPlaySession { .. })
    ));
    assert!(matches!(
        session.load(LoadRequest::new("unplayable")).await,
        Err(TrackmapError::Domain(_))
    ));
    assert!(matches!(
        session.load(LoadRequest::new("unknown")).await,
        Err(TrackmapError::PlaybackInfo { .. })
    ));
}

#[tokio::test]
async fn test_source_selected_by_etag() {
    let json = r#"{
        "PlaySessionId": "ps",
        "MediaSources": [
            {"Id": "a", "ETag": "tag-a", "SupportsDirectPlay": true,
             "MediaStreams": [{"Type": "Video", "Index": 0}]},
            {"Id": "b", "ETag": "tag-b", "SupportsDirectStream": true,
             "MediaStreams": [{"Type": "Video", "Index": 0}]}
        ]
    }"#;
    let info = Arc::new(MockPlaybackInfo::default().with_response("multi", json));
    let session = session(info, Arc::new(RecordingEngineAdapter::new()));

    let loaded = session
        .load(LoadRequest::new("multi").with_source_e_tag("tag-b"))
        .await
        .unwrap();
    assert_eq!(loaded.media_source_id.as_deref(), Some("b"));
    assert_eq!(loaded.play_method, PlayMethod::DirectStream);
}
