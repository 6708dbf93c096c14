//! Transcript provider backed by YouTube's own caption tracks.
//!
//! The watch page yields the Innertube API key, the Innertube `player`
//! endpoint lists the caption tracks, and each track's `baseUrl` serves
//! timed-text XML.

use crate::{TimedText, TranscriptHandle, TranscriptProvider, UpstreamError};
use async_trait::async_trait;
use domain::{ProxyConfig, VideoId};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE};
use serde_json::{Value, json};
use tracing::debug;

const INNERTUBE_PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player";
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

lazy_static! {
    static ref API_KEY: Regex = Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#)
        .expect("api key pattern should compile");
    static ref TEXT_ELEMENT: Regex =
        Regex::new(r#"(?s)<text\s+start="([^"]*)"(?:\s+dur="([^"]*)")?[^>]*>(.*?)</text>"#)
            .expect("timed text pattern should compile");
    static ref TRANSCRIPT_ROOT: Regex =
        Regex::new(r"<transcript[\s/>]").expect("transcript root pattern should compile");
    static ref MARKUP: Regex = Regex::new(r"<[^>]*>").expect("markup pattern should compile");
}

/// Talks to youtube.com directly with reqwest.
///
/// A client is built per call so each request carries only its own proxy.
#[derive(Debug, Clone, Default)]
pub struct YouTubeCaptions;

impl YouTubeCaptions {
    pub fn new() -> Self {
        Self
    }

    fn client(&self, proxy: Option<&ProxyConfig>) -> Result<reqwest::Client, UpstreamError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(proxy) = proxy {
            builder = builder
                .proxy(reqwest::Proxy::http(proxy.http())?)
                .proxy(reqwest::Proxy::https(proxy.https())?);
        }
        Ok(builder.build()?)
    }

    async fn api_key(
        &self,
        client: &reqwest::Client,
        video_id: &VideoId,
    ) -> Result<String, UpstreamError> {
        let html = client
            .get(video_id.watch_url())
            .header(ACCEPT_LANGUAGE, "en-US")
            .header(COOKIE, "CONSENT=YES+cb")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        if let Some(caps) = API_KEY.captures(&html) {
            return Ok(caps[1].to_string());
        }
        if html.contains("class=\"g-recaptcha\"") {
            return Err(UpstreamError::RequestBlocked);
        }
        Err(UpstreamError::Parse(
            "INNERTUBE_API_KEY not found on watch page".to_string(),
        ))
    }

    async fn player_response(
        &self,
        client: &reqwest::Client,
        video_id: &VideoId,
    ) -> Result<Value, UpstreamError> {
        let key = self.api_key(client, video_id).await?;
        let body = json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": video_id.as_str(),
        });

        let response = client
            .post(INNERTUBE_PLAYER_URL)
            .query(&[("key", key.as_str())])
            .header(ACCEPT_LANGUAGE, "en-US")
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl TranscriptProvider for YouTubeCaptions {
    async fn list_transcripts(
        &self,
        video_id: &VideoId,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Vec<TranscriptHandle>, UpstreamError> {
        let client = self.client(proxy)?;
        let player = self.player_response(&client, video_id).await?;
        parse_caption_tracks(video_id, &player)
    }

    async fn fetch(
        &self,
        handle: &TranscriptHandle,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Vec<TimedText>, UpstreamError> {
        debug!(
            "Fetching {} ({}) transcript for {}",
            handle.language, handle.language_code, handle.video_id
        );
        let client = self.client(proxy)?;
        let xml = client
            .get(&handle.base_url)
            .header(ACCEPT_LANGUAGE, "en-US")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_timed_text(&xml)
    }
}

fn parse_caption_tracks(
    video_id: &VideoId,
    player: &Value,
) -> Result<Vec<TranscriptHandle>, UpstreamError> {
    let playability = &player["playabilityStatus"];
    let status = playability["status"].as_str().unwrap_or("OK");
    if status != "OK" {
        let reason = playability["reason"]
            .as_str()
            .unwrap_or(status)
            .to_string();
        if status == "LOGIN_REQUIRED" && reason.contains("not a bot") {
            return Err(UpstreamError::RequestBlocked);
        }
        return Err(UpstreamError::VideoUnavailable {
            video_id: video_id.to_string(),
            reason,
        });
    }

    let tracks = player["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"]
        .as_array()
        .filter(|tracks| !tracks.is_empty())
        .ok_or_else(|| UpstreamError::TranscriptsDisabled(video_id.to_string()))?;

    let (mut manual, generated): (Vec<_>, Vec<_>) = tracks
        .iter()
        .filter_map(|track| {
            let base_url = track["baseUrl"].as_str()?.replace("&fmt=srv3", "");
            let language_code = track["languageCode"].as_str()?.to_string();
            let language = track["name"]["runs"][0]["text"]
                .as_str()
                .or_else(|| track["name"]["simpleText"].as_str())
                .unwrap_or(&language_code)
                .to_string();
            Some(TranscriptHandle {
                video_id: video_id.clone(),
                is_generated: track["kind"].as_str() == Some("asr"),
                language_code,
                language,
                base_url,
            })
        })
        .partition(|handle| !handle.is_generated);

    manual.extend(generated);
    Ok(manual)
}

/// Decode a timed-text `<transcript>` document.
///
/// Anything else (an empty body, a consent or bot-check page) is an error so
/// the caller can move on to another track.
fn parse_timed_text(xml: &str) -> Result<Vec<TimedText>, UpstreamError> {
    if !TRANSCRIPT_ROOT.is_match(xml) {
        return Err(UpstreamError::Parse(
            "timed text response is not a transcript document".to_string(),
        ));
    }

    let segments = TEXT_ELEMENT
        .captures_iter(xml)
        .map(|caps| {
            let start = caps[1].parse::<f64>().unwrap_or(0.0);
            let duration = caps
                .get(2)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .unwrap_or(0.0);
            // Entities arrive XML-escaped on top of HTML-escaped.
            let unescaped = html_escape::decode_html_entities(&caps[3]);
            let decoded = html_escape::decode_html_entities(&unescaped);
            let text = MARKUP.replace_all(&decoded, "").into_owned();
            TimedText {
                text,
                start,
                duration,
            }
        })
        .collect();
    Ok(segments)
}
