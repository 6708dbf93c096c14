use domain::{CommentPage, CommentRecord, ProxyConfig, SortMode, VideoId, sort_comments};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};
use upstream::{ExtractOptions, MetadataExtractor, UpstreamError};

/// Most comments requested from the extractor, whatever the caller's limit
pub const MAX_UPSTREAM_COMMENTS: usize = 100;

/// Obtains, validates, sorts and truncates the comments of a video
pub struct CommentPipeline {
    extractor: Arc<dyn MetadataExtractor>,
}

impl CommentPipeline {
    pub fn new(extractor: Arc<dyn MetadataExtractor>) -> Self {
        Self { extractor }
    }

    pub async fn fetch(
        &self,
        video_id: &VideoId,
        sort_mode: SortMode,
        limit: Option<usize>,
        proxy: Option<&ProxyConfig>,
    ) -> Result<CommentPage, UpstreamError> {
        let url = video_id.watch_url();
        let options = ExtractOptions {
            comments: true,
            proxy: proxy.cloned(),
            comment_sort: sort_mode,
            max_comments: Some(MAX_UPSTREAM_COMMENTS),
        };

        info!("Extracting comments for video: {}", video_id);
        let mut raw = self.extract(&url, &options).await?;
        if raw.is_empty() {
            warn!("No comments on first extraction for {}, retrying once", video_id);
            raw = self.extract(&url, &options).await?;
        }

        let comments_available = !raw.is_empty();
        let mut comments: Vec<CommentRecord> =
            raw.iter().filter_map(CommentRecord::from_raw).collect();
        if comments.len() < raw.len() {
            warn!(
                "Dropped {} malformed comments for {}",
                raw.len() - comments.len(),
                video_id
            );
        }

        sort_comments(&mut comments, sort_mode);
        if let Some(limit) = limit {
            comments.truncate(limit);
        }

        Ok(CommentPage {
            video_id: video_id.clone(),
            comments,
            sort_mode,
            comments_available,
            applied_limit: limit,
        })
    }

    async fn extract(
        &self,
        url: &str,
        options: &ExtractOptions,
    ) -> Result<Vec<Value>, UpstreamError> {
        let info = self
            .extractor
            .extract_info(url, options)
            .await
            .inspect_err(|e| error!("Failed to fetch comments for {}: {}", url, e))?;
        Ok(raw_comments(info))
    }
}

/// The `comments` sequence of an extraction payload; any other shape counts as none
pub fn raw_comments(info: Value) -> Vec<Value> {
    match info {
        Value::Object(mut map) => match map.remove("comments") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
