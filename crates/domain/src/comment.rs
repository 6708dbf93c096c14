use crate::VideoId;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Comment ordering requested by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Most liked first
    #[default]
    Top,
    /// Newest first
    New,
}

impl SortMode {
    /// Case-insensitive; anything unrecognized falls back to `Top`.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("new") => SortMode::New,
            _ => SortMode::Top,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Top => "top",
            SortMode::New => "new",
        }
    }
}

/// A normalized comment
#[derive(Debug, Clone, PartialEq)]
pub struct CommentRecord {
    pub author: String,
    pub text: String,
    pub vote_count: i64,
    pub timestamp: Option<Number>,
    pub reply_count: i64,
    pub comment_id: String,
}

impl CommentRecord {
    /// Normalize one loosely-typed upstream entry.
    ///
    /// Entries that are not JSON objects are rejected; missing or mistyped
    /// fields inside an object fall back to their defaults.
    pub fn from_raw(raw: &Value) -> Option<Self> {
        let obj = raw.as_object()?;

        let string_field = |key: &str| {
            obj.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let count_field = |key: &str| obj.get(key).and_then(as_count).unwrap_or(0);

        Some(Self {
            author: string_field("author"),
            text: string_field("text"),
            vote_count: count_field("like_count"),
            timestamp: match obj.get("timestamp") {
                Some(Value::Number(n)) => Some(n.clone()),
                _ => None,
            },
            reply_count: count_field("reply_count"),
            comment_id: string_field("id"),
        })
    }

    fn timestamp_key(&self) -> f64 {
        self.timestamp
            .as_ref()
            .and_then(Number::as_f64)
            .unwrap_or(0.0)
    }
}

fn as_count(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_u64().map(|v| i64::try_from(v).unwrap_or(i64::MAX)))
        .or_else(|| value.as_f64().filter(|v| v.is_finite()).map(|v| v as i64))
}

/// Stable descending sort by the key `mode` selects.
pub fn sort_comments(comments: &mut [CommentRecord], mode: SortMode) {
    match mode {
        SortMode::Top => comments.sort_by(|a, b| b.vote_count.cmp(&a.vote_count)),
        SortMode::New => comments.sort_by(|a, b| {
            b.timestamp_key()
                .partial_cmp(&a.timestamp_key())
                .unwrap_or(Ordering::Equal)
        }),
    }
}

/// Sorted, possibly truncated comments for one video
#[derive(Debug, Clone, PartialEq)]
pub struct CommentPage {
    pub video_id: VideoId,
    pub comments: Vec<CommentRecord>,
    pub sort_mode: SortMode,
    /// Whether upstream returned any comments at all, before filtering.
    pub comments_available: bool,
    pub applied_limit: Option<usize>,
}

impl CommentPage {
    pub fn total_returned(&self) -> usize {
        self.comments.len()
    }
}
