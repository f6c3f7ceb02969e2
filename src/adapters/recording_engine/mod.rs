// Recording engine adapter - Media engine that only records what it was asked to play

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::TrackmapResult;
use crate::ports::{EngineConfiguration, MediaEnginePort};

/// Headless media engine used by the CLI and tests
#[derive(Default)]
pub struct RecordingEngineAdapter {
    played: Mutex<Vec<EngineConfiguration>>,
    stops: Mutex<usize>,
}

impl RecordingEngineAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configurations passed to `play_new_media`, oldest first
    pub async fn played(&self) -> Vec<EngineConfiguration> {
        self.played.lock().await.clone()
    }

    pub async fn last_played(&self) -> Option<EngineConfiguration> {
        self.played.lock().await.last().cloned()
    }

    pub async fn stop_count(&self) -> usize {
        *self.stops.lock().await
    }
}

#[async_trait]
impl MediaEnginePort for RecordingEngineAdapter {
    async fn play_new_media(&self, configuration: EngineConfiguration) -> TrackmapResult<()> {
        info!(
            attempt = %configuration.attempt,
            sidecars = configuration.sidecar_subtitles.len(),
            "Engine received new media"
        );
        self.played.lock().await.push(configuration);
        Ok(())
    }

    async fn stop(&self) -> TrackmapResult<()> {
        *self.stops.lock().await += 1;
        Ok(())
    }
}
