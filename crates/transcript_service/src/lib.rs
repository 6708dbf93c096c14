mod pipeline;

pub use pipeline::{FALLBACK_LANGUAGE, Stage, TranscriptPipeline};

use api_error::{ApiError, require_video_id};
use axum::extract::rejection::QueryRejection;
use axum::{Json, Router, extract::Query, extract::State, routing::get};
use domain::{ProxyConfig, TranscriptSegment};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use upstream::TranscriptProvider;

/// Query string of `GET /transcript`
#[derive(Debug, Default, Deserialize)]
pub struct TranscriptParams {
    pub video_id: Option<String>,
    /// Comma-separated language codes in preference order
    pub languages: Option<String>,
    pub proxy: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub video_id: String,
    pub transcript: Vec<TranscriptSegment>,
    pub full_text: String,
    pub total_segments: usize,
}

#[derive(Clone)]
struct TranscriptState {
    pipeline: Arc<TranscriptPipeline>,
    default_proxy: Option<ProxyConfig>,
}

/// Split the `languages` parameter, defaulting to English
pub fn parse_languages(raw: Option<&str>) -> Vec<String> {
    let languages: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect();

    if languages.is_empty() {
        vec![FALLBACK_LANGUAGE.to_string()]
    } else {
        languages
    }
}

async fn get_transcript(
    State(state): State<TranscriptState>,
    query: Result<Query<TranscriptParams>, QueryRejection>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let Query(params) = query?;
    let video_id = require_video_id(params.video_id.as_deref())?;
    let languages = parse_languages(params.languages.as_deref());
    let proxy = ProxyConfig::build(params.proxy.as_deref()).or(state.default_proxy);

    let transcript = state
        .pipeline
        .fetch(&video_id, &languages, proxy.as_ref())
        .await
        .map_err(|e| ApiError::NotFound(format!("No transcript available for video: {}", e)))?;

    Ok(Json(TranscriptResponse {
        video_id: transcript.video_id().to_string(),
        total_segments: transcript.segment_count(),
        full_text: transcript.full_text().to_string(),
        transcript: transcript.segments().to_vec(),
    }))
}

/// Create the router for the transcript API
pub fn create_router(
    provider: Arc<dyn TranscriptProvider>,
    default_proxy: Option<ProxyConfig>,
) -> Router {
    let state = TranscriptState {
        pipeline: Arc::new(TranscriptPipeline::new(provider)),
        default_proxy,
    };
    Router::new()
        .route("/transcript", get(get_transcript))
        .with_state(state)
}
