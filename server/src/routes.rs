use axum::{Json, Router, response::Response, routing::get};
use domain::ProxyConfig;
use serde::Serialize;
use serde_json::{Value, json};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use upstream::{MetadataExtractor, TranscriptProvider};

pub const SERVICE_NAME: &str = "youtube2text-api";

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
    })
}

async fn docs() -> Json<Value> {
    Json(json!({
        "service": "YouTube2Text API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/health": {
                "method": "GET",
                "description": "Health check endpoint",
            },
            "/transcript": {
                "method": "GET",
                "description": "Get transcript for a YouTube video",
                "parameters": {
                    "video_id": "YouTube video ID or URL (required)",
                    "languages": "Comma-separated language codes (optional, default: en)",
                    "proxy": "Proxy URL for outbound requests (optional, http:// assumed)",
                },
                "example": "/transcript?video_id=dQw4w9WgXcQ&languages=en,es",
            },
            "/comments": {
                "method": "GET",
                "description": "Get comments for a YouTube video",
                "parameters": {
                    "video_id": "YouTube video ID or URL (required)",
                    "limit": "Maximum number of comments to return (optional)",
                    "sort_by": "Sort order: \"top\" or \"new\" (optional, default: top)",
                    "proxy": "Proxy URL for outbound requests (optional, http:// assumed)",
                },
                "example": "/comments?video_id=dQw4w9WgXcQ&limit=50&sort_by=top",
            },
        },
    }))
}

fn handle_panic(_: Box<dyn Any + Send + 'static>) -> Response {
    api_error::panic_response()
}

/// Panic recovery and request tracing shared by every route
fn with_middleware(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

/// Assemble the full HTTP application
pub fn create_app(
    transcripts: Arc<dyn TranscriptProvider>,
    extractor: Arc<dyn MetadataExtractor>,
    default_proxy: Option<ProxyConfig>,
) -> Router {
    let router = Router::new()
        .route("/", get(docs))
        .route("/health", get(health))
        .merge(transcript_service::create_router(
            transcripts,
            default_proxy.clone(),
        ))
        .merge(comment_service::create_router(extractor, default_proxy));
    with_middleware(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use domain::VideoId;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use upstream::TimedText;
    use upstream::in_memory::{InMemoryExtractor, InMemoryTranscripts};

    fn app() -> Router {
        let transcripts = Arc::new(InMemoryTranscripts::new());
        transcripts.add_track(
            &VideoId::resolve("dQw4w9WgXcQ").unwrap(),
            "en",
            false,
            vec![TimedText {
                text: "Never gonna give you up".to_string(),
                start: 18.8,
                duration: 2.1,
            }],
        );
        let extractor = Arc::new(InMemoryExtractor::new());
        extractor.push_response(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            json!({"comments": [{"author": "@fan", "text": "classic", "like_count": 1}]}),
        );
        create_app(transcripts, extractor, None)
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

    async fn boom() -> &'static str {
        panic!("handler exploded")
    }

    #[tokio::test]
    async fn health_reports_service() {
        let (status, body) = send(app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "healthy", "service": "youtube2text-api"}));
    }

    #[tokio::test]
    async fn docs_describe_endpoints() {
        let (status, body) = send(app(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "YouTube2Text API");
        for endpoint in ["/health", "/transcript", "/comments"] {
            assert_eq!(body["endpoints"][endpoint]["method"], "GET");
        }
    }

    #[tokio::test]
    async fn serves_transcripts_and_comments() {
        let (status, body) = send(app(), "/transcript?video_id=dQw4w9WgXcQ").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["full_text"], "Never gonna give you up");

        let (status, body) = send(app(), "/comments?video_id=dQw4w9WgXcQ&limit=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["comments"][0]["author"], "@fan");
        assert_eq!(body["limited_to"], 1);
    }

    #[tokio::test]
    async fn panics_become_internal_errors() {
        let router = with_middleware(Router::new().route("/boom", get(boom)));
        let (status, body) = send(router, "/boom").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Internal server error"}));
    }
}
