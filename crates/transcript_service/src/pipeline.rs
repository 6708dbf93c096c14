use domain::{ProxyConfig, Transcript, TranscriptSegment, VideoId};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};
use upstream::{TimedText, TranscriptProvider, UpstreamError, find_transcript};

/// Language tried when the preferred languages yield nothing
pub const FALLBACK_LANGUAGE: &str = "en";

/// Retrieval strategies, tried in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PreferredLanguages,
    English,
    FirstAvailable,
}

impl Stage {
    pub const ORDER: [Stage; 3] = [
        Stage::PreferredLanguages,
        Stage::English,
        Stage::FirstAvailable,
    ];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::PreferredLanguages => "preferred languages",
            Stage::English => "english",
            Stage::FirstAvailable => "first available",
        })
    }
}

/// Obtains a transcript through an ordered fallback chain
pub struct TranscriptPipeline {
    provider: Arc<dyn TranscriptProvider>,
}

impl TranscriptPipeline {
    pub fn new(provider: Arc<dyn TranscriptProvider>) -> Self {
        Self { provider }
    }

    /// Run the stages in order and return the first transcript obtained.
    ///
    /// When every stage fails the error of the last stage is returned.
    pub async fn fetch(
        &self,
        video_id: &VideoId,
        languages: &[String],
        proxy: Option<&ProxyConfig>,
    ) -> Result<Transcript, UpstreamError> {
        let mut failure = None;

        for stage in Stage::ORDER {
            match self.attempt(stage, video_id, languages, proxy).await {
                Ok(raw) => {
                    info!(
                        "Transcript for {} obtained via {} ({} segments)",
                        video_id,
                        stage,
                        raw.len()
                    );
                    return Ok(build_transcript(video_id, raw));
                }
                Err(e) => {
                    warn!("Transcript stage '{}' failed for {}: {}", stage, video_id, e);
                    failure = Some(e);
                }
            }
        }

        Err(failure.unwrap_or_else(|| UpstreamError::TranscriptsDisabled(video_id.to_string())))
    }

    /// Run a single stage
    pub async fn attempt(
        &self,
        stage: Stage,
        video_id: &VideoId,
        languages: &[String],
        proxy: Option<&ProxyConfig>,
    ) -> Result<Vec<TimedText>, UpstreamError> {
        match stage {
            Stage::PreferredLanguages => {
                self.provider
                    .fetch_transcript(video_id, languages, proxy)
                    .await
            }
            Stage::English => {
                let handles = self.provider.list_transcripts(video_id, proxy).await?;
                let handle = find_transcript(&handles, &[FALLBACK_LANGUAGE]).ok_or_else(|| {
                    UpstreamError::NoTranscriptFound {
                        video_id: video_id.to_string(),
                        languages: vec![FALLBACK_LANGUAGE.to_string()],
                    }
                })?;
                self.provider.fetch(handle, proxy).await
            }
            Stage::FirstAvailable => {
                let handles = self.provider.list_transcripts(video_id, proxy).await?;
                let handle = handles
                    .first()
                    .ok_or_else(|| UpstreamError::TranscriptsDisabled(video_id.to_string()))?;
                self.provider.fetch(handle, proxy).await
            }
        }
    }
}

fn build_transcript(video_id: &VideoId, raw: Vec<TimedText>) -> Transcript {
    let segments = raw
        .into_iter()
        .map(|t| TranscriptSegment::new(t.text, t.start, t.duration))
        .collect();
    Transcript::new(video_id.clone(), segments)
}
