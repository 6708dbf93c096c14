use crate::VideoId;
use serde::{Deserialize, Serialize};

/// One timed caption unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

impl TranscriptSegment {
    /// Non-finite or negative timings are clamped to zero; text is kept verbatim.
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start: non_negative(start),
            duration: non_negative(duration),
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Transcript of a single video, segments in source order
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    video_id: VideoId,
    segments: Vec<TranscriptSegment>,
    full_text: String,
}

impl Transcript {
    pub fn new(video_id: VideoId, segments: Vec<TranscriptSegment>) -> Self {
        let full_text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();

        Self {
            video_id,
            segments,
            full_text,
        }
    }

    pub fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    pub fn segments(&self) -> &[TranscriptSegment] {
        &self.segments
    }

    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}
