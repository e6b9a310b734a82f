//! Transcription backends
//!
//! `HttpTranscriber` posts a video reference to a transcription service and
//! converts its second-offset segments into display segments.
//! `FileTranscriber` reads an already-transcribed segment list from disk.

use super::retry::send_with_retry;
use super::Transcriber;
use crate::error::ServiceError;
use crate::transcript::{format_timestamp, Segment, VideoReference};
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, instrument};
use zeroize::Zeroize;

/// Client for a remote transcription service
pub struct HttpTranscriber {
    endpoint_url: String,
    token: Option<String>,
    language_code: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct TranscribeRequest<'a> {
    video_id: &'a str,
    url: String,
    language: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    segments: Vec<WireSegment>,
}

/// Segment as returned by the service, offsets in seconds
#[derive(Debug, Deserialize)]
struct WireSegment {
    #[serde(default)]
    id: Option<String>,
    text: String,
    start: f64,
    #[serde(default)]
    end: Option<f64>,
}

impl HttpTranscriber {
    pub fn new(
        endpoint_url: &str,
        token: Option<String>,
        language_code: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client for HttpTranscriber")?;

        Ok(Self {
            endpoint_url: endpoint_url.trim_end_matches('/').to_string(),
            token,
            language_code: language_code.to_string(),
            client,
        })
    }

    fn transcriptions_url(&self) -> String {
        format!("{}/transcriptions", self.endpoint_url)
    }
}

/// Convert wire segments, dropping blank ones and assigning missing ids
fn into_segments(wire: Vec<WireSegment>) -> Vec<Segment> {
    wire.into_iter()
        .enumerate()
        .filter(|(_, s)| !s.text.trim().is_empty())
        .map(|(index, s)| Segment {
            id: s.id.unwrap_or_else(|| format!("seg-{}", index + 1)),
            text: s.text.trim().to_string(),
            start_time: format_timestamp(s.start.max(0.0) as u64),
            end_time: s.end.map(|end| format_timestamp(end.max(0.0) as u64)),
        })
        .collect()
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    #[instrument(skip(self, video), fields(video = %video))]
    async fn transcribe(&self, video: &VideoReference) -> Result<Vec<Segment>, ServiceError> {
        let url = self.transcriptions_url();
        let body = TranscribeRequest {
            video_id: &video.video_id,
            url: video.watch_url(),
            language: &self.language_code,
        };

        let response = send_with_retry("transcription", || {
            let request = self.client.post(&url).json(&body);
            match &self.token {
                Some(token) => request.bearer_auth(token),
                None => request,
            }
        })
        .await?;

        let parsed: TranscribeResponse = response.json().await.map_err(|e| {
            ServiceError::InvalidResponse(format!("Failed to parse transcription response: {}", e))
        })?;

        let segments = into_segments(parsed.segments);
        info!(segments = segments.len(), "Transcript received");
        Ok(segments)
    }
}

impl Drop for HttpTranscriber {
    fn drop(&mut self) {
        if let Some(token) = self.token.as_mut() {
            token.zeroize();
        }
    }
}

/// Reads a JSON array of segments from a file, regardless of the video
pub struct FileTranscriber {
    path: PathBuf,
}

impl FileTranscriber {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Transcriber for FileTranscriber {
    #[instrument(skip(self, video), fields(path = ?self.path, video = %video))]
    async fn transcribe(&self, video: &VideoReference) -> Result<Vec<Segment>, ServiceError> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let segments: Vec<Segment> = serde_json::from_str(&contents)?;
        info!(segments = segments.len(), "Loaded transcript from file");
        Ok(segments)
    }
}
