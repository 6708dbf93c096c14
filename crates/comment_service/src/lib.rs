mod pipeline;

pub use pipeline::{CommentPipeline, MAX_UPSTREAM_COMMENTS, raw_comments};

use api_error::{ApiError, require_video_id};
use axum::extract::rejection::QueryRejection;
use axum::{Json, Router, extract::Query, extract::State, routing::get};
use domain::{CommentPage, CommentRecord, ProxyConfig, SortMode};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::sync::Arc;
use upstream::MetadataExtractor;

/// Query string of `GET /comments`
#[derive(Debug, Default, Deserialize)]
pub struct CommentParams {
    pub video_id: Option<String>,
    pub limit: Option<String>,
    /// `top` or `new`
    pub sort_by: Option<String>,
    pub proxy: Option<String>,
}

/// A comment as exposed over HTTP
#[derive(Debug, Serialize)]
pub struct Comment {
    pub author: String,
    pub text: String,
    pub votes: i64,
    /// Timestamp, or an empty string when unknown
    pub time: Value,
    pub reply_count: i64,
    pub cid: String,
    pub time_parsed: Option<Number>,
}

impl From<CommentRecord> for Comment {
    fn from(record: CommentRecord) -> Self {
        Self {
            time: record
                .timestamp
                .clone()
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(String::new())),
            time_parsed: record.timestamp,
            author: record.author,
            text: record.text,
            votes: record.vote_count,
            reply_count: record.reply_count,
            cid: record.comment_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    pub video_id: String,
    pub comments: Vec<Comment>,
    pub total_comments: usize,
    pub sort_by: SortMode,
    pub comments_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limited_to: Option<usize>,
}

impl From<CommentPage> for CommentsResponse {
    fn from(page: CommentPage) -> Self {
        Self {
            video_id: page.video_id.to_string(),
            total_comments: page.total_returned(),
            comments: page.comments.into_iter().map(Comment::from).collect(),
            sort_by: page.sort_mode,
            comments_available: page.comments_available,
            limited_to: page.applied_limit,
        }
    }
}

#[derive(Clone)]
struct CommentState {
    pipeline: Arc<CommentPipeline>,
    default_proxy: Option<ProxyConfig>,
}

/// A positive integer limit; anything else counts as no limit
pub fn parse_limit(raw: Option<&str>) -> Option<usize> {
    raw?.trim().parse::<usize>().ok().filter(|limit| *limit > 0)
}

async fn get_comments(
    State(state): State<CommentState>,
    query: Result<Query<CommentParams>, QueryRejection>,
) -> Result<Json<CommentsResponse>, ApiError> {
    let Query(params) = query?;
    let video_id = require_video_id(params.video_id.as_deref())?;
    let limit = parse_limit(params.limit.as_deref());
    let sort_mode = SortMode::parse_lenient(params.sort_by.as_deref());
    let proxy = ProxyConfig::build(params.proxy.as_deref()).or(state.default_proxy);

    let page = state
        .pipeline
        .fetch(&video_id, sort_mode, limit, proxy.as_ref())
        .await
        .map_err(|e| ApiError::NotFound(format!("Failed to fetch comments: {}", e)))?;

    Ok(Json(CommentsResponse::from(page)))
}

/// Create the router for the comments API
pub fn create_router(
    extractor: Arc<dyn MetadataExtractor>,
    default_proxy: Option<ProxyConfig>,
) -> Router {
    let state = CommentState {
        pipeline: Arc::new(CommentPipeline::new(extractor)),
        default_proxy,
    };
    Router::new()
        .route("/comments", get(get_comments))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;
    use upstream::in_memory::InMemoryExtractor;

    const WATCH_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    fn extractor() -> Arc<InMemoryExtractor> {
        let extractor = Arc::new(InMemoryExtractor::new());
        extractor.push_response(
            WATCH_URL,
            json!({"comments": [
                {"author": "@a", "text": "older", "like_count": 2, "timestamp": 100, "id": "c1"},
                {"author": "@b", "text": "newer", "like_count": 10, "timestamp": 200, "id": "c2"},
                {"author": "@c", "text": "undated", "like_count": 5, "id": "c3"},
                "not a comment",
            ]}),
        );
        extractor
    }

    async fn send(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn limit_parsing() {
        assert_eq!(parse_limit(None), None);
        assert_eq!(parse_limit(Some("25")), Some(25));
        assert_eq!(parse_limit(Some(" 3 ")), Some(3));
        assert_eq!(parse_limit(Some("0")), None);
        assert_eq!(parse_limit(Some("-2")), None);
        assert_eq!(parse_limit(Some("ten")), None);
    }

    #[tokio::test]
    async fn returns_sorted_comments() {
        let (status, body) = send(
            create_router(extractor(), None),
            "/comments?video_id=dQw4w9WgXcQ",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["video_id"], "dQw4w9WgXcQ");
        assert_eq!(body["sort_by"], "top");
        assert_eq!(body["total_comments"], 3);
        assert_eq!(body["comments_available"], true);
        assert!(body.get("limited_to").is_none());
        assert_eq!(
            body["comments"][0],
            json!({
                "author": "@b",
                "text": "newer",
                "votes": 10,
                "time": 200,
                "reply_count": 0,
                "cid": "c2",
                "time_parsed": 200,
            })
        );
        assert_eq!(body["comments"][1]["cid"], "c3");
        assert_eq!(body["comments"][1]["time"], "");
        assert_eq!(body["comments"][1]["time_parsed"], Value::Null);
    }

    #[tokio::test]
    async fn new_sort_with_limit() {
        let (status, body) = send(
            create_router(extractor(), None),
            "/comments?video_id=https://www.youtube.com/watch?v=dQw4w9WgXcQ&sort_by=NEW&limit=2",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sort_by"], "new");
        assert_eq!(body["limited_to"], 2);
        assert_eq!(body["total_comments"], 2);
        assert_eq!(body["comments"][0]["cid"], "c2");
        assert_eq!(body["comments"][1]["cid"], "c1");
    }

    #[tokio::test]
    async fn unknown_sort_falls_back_to_top() {
        let (_, body) = send(
            create_router(extractor(), None),
            "/comments?video_id=dQw4w9WgXcQ&sort_by=controversial",
        )
        .await;
        assert_eq!(body["sort_by"], "top");
        assert_eq!(body["comments"][0]["cid"], "c2");
    }

    #[tokio::test]
    async fn bad_input_is_rejected() {
        let router = create_router(extractor(), None);
        let (status, body) = send(router.clone(), "/comments?limit=5").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "video_id parameter is required"}));

        let (status, body) = send(router, "/comments?video_id=nope").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid YouTube video ID or URL"}));
    }

    #[tokio::test]
    async fn repeated_parameter_is_a_json_bad_request() {
        let (status, body) = send(
            create_router(extractor(), None),
            "/comments?video_id=dQw4w9WgXcQ&sort_by=top&sort_by=new",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields = body.as_object().unwrap();
        assert_eq!(fields.len(), 1);
        assert!(fields["error"].as_str().unwrap().contains("sort_by"));
    }

    #[tokio::test]
    async fn extractor_failure_is_not_found() {
        let extractor = Arc::new(InMemoryExtractor::new());
        extractor.push_failure(WATCH_URL, "ERROR: Video unavailable");

        let (status, body) = send(
            create_router(extractor, None),
            "/comments?video_id=dQw4w9WgXcQ",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"error": "Failed to fetch comments: ERROR: Video unavailable"})
        );
    }

    #[tokio::test]
    async fn proxy_parameter_reaches_extractor() {
        let extractor = extractor();
        let router = create_router(extractor.clone(), None);
        let (status, _) = send(
            router,
            "/comments?video_id=dQw4w9WgXcQ&proxy=https://proxy.example.com:443",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let (_, options) = &extractor.calls()[0];
        assert_eq!(
            options.proxy.as_ref().map(ProxyConfig::url),
            Some("https://proxy.example.com:443")
        );
    }
}
