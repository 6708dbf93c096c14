//! In-memory collaborators for exercising the pipelines without network access.

use crate::{
    ExtractOptions, MetadataExtractor, TimedText, TranscriptHandle, TranscriptProvider,
    UpstreamError,
};
use async_trait::async_trait;
use domain::{ProxyConfig, VideoId};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// One provider call as observed by an in-memory collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub operation: &'static str,
    pub target: String,
    pub proxy: Option<String>,
}

type Track = (TranscriptHandle, Vec<TimedText>);

/// Transcript provider holding tracks per video id
#[derive(Default)]
pub struct InMemoryTranscripts {
    tracks: Arc<RwLock<HashMap<String, Vec<Track>>>>,
    unavailable: Arc<RwLock<HashMap<String, String>>>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    latency: Option<Duration>,
}

impl InMemoryTranscripts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call, to widen interleavings under concurrent use
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Register a transcript for a video; tracks are listed in insertion order
    pub fn add_track(
        &self,
        video_id: &VideoId,
        language_code: &str,
        is_generated: bool,
        segments: Vec<TimedText>,
    ) {
        let handle = TranscriptHandle {
            video_id: video_id.clone(),
            language_code: language_code.to_string(),
            language: language_code.to_string(),
            is_generated,
            base_url: format!("memory://{}/{}/{}", video_id, language_code, is_generated),
        };
        self.tracks
            .write()
            .expect("Failed to acquire write lock on tracks")
            .entry(video_id.to_string())
            .or_default()
            .push((handle, segments));
    }

    /// Make every call for this video fail as unavailable
    pub fn mark_unavailable(&self, video_id: &VideoId, reason: &str) {
        self.unavailable
            .write()
            .expect("Failed to acquire write lock on unavailable")
            .insert(video_id.to_string(), reason.to_string());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .read()
            .expect("Failed to acquire read lock on calls")
            .clone()
    }

    async fn record(&self, operation: &'static str, target: String, proxy: Option<&ProxyConfig>) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.calls
            .write()
            .expect("Failed to acquire write lock on calls")
            .push(RecordedCall {
                operation,
                target,
                proxy: proxy.map(|p| p.url().to_string()),
            });
    }

    fn check_available(&self, video_id: &str) -> Result<(), UpstreamError> {
        let unavailable = self
            .unavailable
            .read()
            .expect("Failed to acquire read lock on unavailable");
        match unavailable.get(video_id) {
            Some(reason) => Err(UpstreamError::VideoUnavailable {
                video_id: video_id.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TranscriptProvider for InMemoryTranscripts {
    async fn list_transcripts(
        &self,
        video_id: &VideoId,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Vec<TranscriptHandle>, UpstreamError> {
        self.record("list_transcripts", video_id.to_string(), proxy)
            .await;
        self.check_available(video_id.as_str())?;

        let tracks = self
            .tracks
            .read()
            .expect("Failed to acquire read lock on tracks");
        match tracks.get(video_id.as_str()) {
            Some(tracks) if !tracks.is_empty() => {
                Ok(tracks.iter().map(|(handle, _)| handle.clone()).collect())
            }
            _ => Err(UpstreamError::TranscriptsDisabled(video_id.to_string())),
        }
    }

    async fn fetch(
        &self,
        handle: &TranscriptHandle,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Vec<TimedText>, UpstreamError> {
        self.record("fetch", handle.base_url.clone(), proxy).await;
        self.check_available(handle.video_id.as_str())?;

        self.tracks
            .read()
            .expect("Failed to acquire read lock on tracks")
            .get(handle.video_id.as_str())
            .and_then(|tracks| tracks.iter().find(|(h, _)| h == handle))
            .map(|(_, segments)| segments.clone())
            .ok_or_else(|| UpstreamError::Parse(format!("unknown transcript {}", handle.base_url)))
    }
}

/// Metadata extractor replaying scripted responses per URL.
///
/// Responses are consumed in order; once a URL's script runs out the last
/// response is repeated. URLs without a script yield an empty payload.
#[derive(Default)]
pub struct InMemoryExtractor {
    scripts: Arc<RwLock<HashMap<String, VecDeque<Result<Value, String>>>>>,
    last: Arc<RwLock<HashMap<String, Result<Value, String>>>>,
    calls: Arc<RwLock<Vec<(String, ExtractOptions)>>>,
}

impl InMemoryExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, url: &str, response: Value) {
        self.push(url, Ok(response));
    }

    pub fn push_failure(&self, url: &str, message: &str) {
        self.push(url, Err(message.to_string()));
    }

    fn push(&self, url: &str, response: Result<Value, String>) {
        self.scripts
            .write()
            .expect("Failed to acquire write lock on scripts")
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn calls(&self) -> Vec<(String, ExtractOptions)> {
        self.calls
            .read()
            .expect("Failed to acquire read lock on calls")
            .clone()
    }
}

#[async_trait]
impl MetadataExtractor for InMemoryExtractor {
    async fn extract_info(
        &self,
        url: &str,
        options: &ExtractOptions,
    ) -> Result<Value, UpstreamError> {
        self.calls
            .write()
            .expect("Failed to acquire write lock on calls")
            .push((url.to_string(), options.clone()));

        let next = self
            .scripts
            .write()
            .expect("Failed to acquire write lock on scripts")
            .get_mut(url)
            .and_then(VecDeque::pop_front);

        let mut last = self
            .last
            .write()
            .expect("Failed to acquire write lock on last");
        let response = match next {
            Some(response) => {
                last.insert(url.to_string(), response.clone());
                response
            }
            None => last
                .get(url)
                .cloned()
                .unwrap_or_else(|| Ok(Value::Object(Default::default()))),
        };

        response.map_err(UpstreamError::Extraction)
    }
}
