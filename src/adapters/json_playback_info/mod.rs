// JSON playback-info adapter - Serves recorded playback-info responses from disk

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::model::PlaybackInfoResponse;
use crate::error::{TrackmapError, TrackmapResult};
use crate::ports::{PlaybackInfoPort, PlaybackInfoRequest};

/// Playback-info port backed by a JSON file holding a server response
pub struct JsonPlaybackInfoAdapter {
    path: PathBuf,
    requests: Mutex<Vec<PlaybackInfoRequest>>,
}

impl JsonPlaybackInfoAdapter {
    /// Create adapter for a recorded response file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first
    pub async fn requests(&self) -> Vec<PlaybackInfoRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl PlaybackInfoPort for JsonPlaybackInfoAdapter {
    async fn playback_info(&self, request: PlaybackInfoRequest) -> TrackmapResult<PlaybackInfoResponse> {
        debug!(
            item_id = %request.item_id,
            profile = ?request.device_profile.name,
            "Serving recorded playback info"
        );
        self.requests.lock().await.push(request);

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| TrackmapError::PlaybackInfo {
                message: format!("Failed to read {}: {}", self.path.display(), e),
            })?;
        let response: PlaybackInfoResponse = serde_json::from_str(&content)?;

        info!(
            path = %self.path.display(),
            media_sources = response.media_sources.len(),
            "Loaded playback info"
        );
        Ok(response)
    }
}
