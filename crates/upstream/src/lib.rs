mod captions;
#[cfg(any(test, feature = "test-support"))]
pub mod in_memory;
mod ytdlp;

pub use captions::YouTubeCaptions;
pub use ytdlp::YtDlp;

use async_trait::async_trait;
use domain::{ProxyConfig, SortMode, VideoId};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("The video {video_id} is unavailable: {reason}")]
    VideoUnavailable { video_id: String, reason: String },

    #[error("Transcripts are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error("No transcript found for video {video_id} in languages {languages:?}")]
    NoTranscriptFound {
        video_id: String,
        languages: Vec<String>,
    },

    #[error("YouTube is blocking requests from this IP")]
    RequestBlocked,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected upstream response: {0}")]
    Parse(String),

    #[error("{0}")]
    Extraction(String),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// A raw timed text entry as delivered by a transcript provider
#[derive(Debug, Clone, PartialEq)]
pub struct TimedText {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// A transcript the provider can fetch for a video
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptHandle {
    pub video_id: VideoId,
    pub language_code: String,
    pub language: String,
    pub is_generated: bool,
    pub base_url: String,
}

/// Pick the first handle matching the preference order.
///
/// For each language code, manually created transcripts win over
/// auto-generated ones.
pub fn find_transcript<'a, S: AsRef<str>>(
    handles: &'a [TranscriptHandle],
    languages: &[S],
) -> Option<&'a TranscriptHandle> {
    languages.iter().find_map(|lang| {
        let lang = lang.as_ref();
        handles
            .iter()
            .find(|h| !h.is_generated && h.language_code == lang)
            .or_else(|| handles.iter().find(|h| h.language_code == lang))
    })
}

/// Source of timed transcripts.
///
/// The proxy is passed on every call; implementations must not keep it
/// beyond the call or publish it through process-wide state.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Enumerate the transcripts available for a video, in provider order
    async fn list_transcripts(
        &self,
        video_id: &VideoId,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Vec<TranscriptHandle>, UpstreamError>;

    /// Download the timed text behind a handle
    async fn fetch(
        &self,
        handle: &TranscriptHandle,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Vec<TimedText>, UpstreamError>;

    /// Fetch the transcript in the first available preferred language
    async fn fetch_transcript(
        &self,
        video_id: &VideoId,
        languages: &[String],
        proxy: Option<&ProxyConfig>,
    ) -> Result<Vec<TimedText>, UpstreamError> {
        let handles = self.list_transcripts(video_id, proxy).await?;
        let handle =
            find_transcript(&handles, languages).ok_or_else(|| UpstreamError::NoTranscriptFound {
                video_id: video_id.to_string(),
                languages: languages.to_vec(),
            })?;
        self.fetch(handle, proxy).await
    }
}

/// Options understood by a metadata extractor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractOptions {
    /// Ask the extractor to include the comment section
    pub comments: bool,
    pub proxy: Option<ProxyConfig>,
    /// Sort hint forwarded to the extractor
    pub comment_sort: SortMode,
    /// Upper bound on the number of comments the extractor should collect
    pub max_comments: Option<usize>,
}

/// General purpose media metadata extraction
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    async fn extract_info(&self, url: &str, options: &ExtractOptions)
    -> Result<Value, UpstreamError>;
}
