//! Caption tracks from the public watch page
//!
//! The watch page embeds the player's caption list as JSON. Each track carries a `baseUrl`
//! serving timed text XML (`<text start=".." dur="..">..</text>`).

use async_trait::async_trait;
use html_escape::decode_html_entities;
use lru::LruCache;
use regex::Regex;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use tubeindex_core::{CaptionSource, TranscriptCandidate, TranscriptError, TranscriptSegment};

const WATCH_URL: &str = "https://www.youtube.com/watch";
const TRACK_CACHE_SIZE: usize = 64;

/// One listed track plus the URL of its timed text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    pub candidate: TranscriptCandidate,
    pub base_url: String,
}

pub struct WatchPageCaptions {
    client: reqwest::Client,
    watch_url: String,
    parser: TimedTextParser,
    tracks: Mutex<LruCache<String, Vec<CaptionTrack>>>,
}

impl WatchPageCaptions {
    pub fn new(client: reqwest::Client) -> Result<Self, regex::Error> {
        let capacity = NonZeroUsize::new(TRACK_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN);
        Ok(Self {
            client,
            watch_url: WATCH_URL.to_string(),
            parser: TimedTextParser::new()?,
            tracks: Mutex::new(LruCache::new(capacity)),
        })
    }

    /// Load watch pages from another host (proxies, local fakes)
    pub fn with_watch_url(mut self, watch_url: impl Into<String>) -> Self {
        self.watch_url = watch_url.into();
        self
    }

    async fn get_text(&self, video_id: &str, url: &str) -> Result<String, TranscriptError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US")
            .send()
            .await
            .map_err(|e| TranscriptError::unknown(video_id, e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TranscriptError::unknown(video_id, "too many requests"));
        }
        if !status.is_success() {
            return Err(TranscriptError::unknown(
                video_id,
                format!("caption request returned {}", status),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| TranscriptError::unknown(video_id, e.to_string()))
    }

    async fn load_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, TranscriptError> {
        if let Some(tracks) = self
            .tracks
            .lock()
            .ok()
            .and_then(|mut cache| cache.get(video_id).cloned())
        {
            return Ok(tracks);
        }

        let url = format!("{}?v={}", self.watch_url, video_id);
        let html = self.get_text(video_id, &url).await?;
        let tracks = parse_caption_tracks(video_id, &html)?;
        tracing::debug!("{} caption tracks listed for {}", tracks.len(), video_id);

        if let Ok(mut cache) = self.tracks.lock() {
            cache.put(video_id.to_string(), tracks.clone());
        }
        Ok(tracks)
    }
}

#[async_trait]
impl CaptionSource for WatchPageCaptions {
    async fn list_transcripts(
        &self,
        video_id: &str,
    ) -> Result<Vec<TranscriptCandidate>, TranscriptError> {
        Ok(self
            .load_tracks(video_id)
            .await?
            .into_iter()
            .map(|t| t.candidate)
            .collect())
    }

    async fn fetch(
        &self,
        video_id: &str,
        track: &TranscriptCandidate,
    ) -> Result<Vec<TranscriptSegment>, TranscriptError> {
        let tracks = self.load_tracks(video_id).await?;
        let selected = tracks
            .iter()
            .find(|t| t.candidate == *track)
            .ok_or_else(|| TranscriptError::NoTranscriptFound {
                video_id: video_id.to_string(),
                languages: vec![track.language_code.clone()],
            })?;

        let xml = self.get_text(video_id, &selected.base_url).await?;
        Ok(self.parser.parse(&xml))
    }
}

/// Pull the caption list out of a watch page and classify failures
pub fn parse_caption_tracks(
    video_id: &str,
    html: &str,
) -> Result<Vec<CaptionTrack>, TranscriptError> {
    let Some((_, after)) = html.split_once("\"captions\":") else {
        if html.contains("class=\"g-recaptcha\"") {
            return Err(TranscriptError::unknown(
                video_id,
                "too many requests (recaptcha challenge)",
            ));
        }
        if !html.contains("\"playabilityStatus\":") {
            return Err(TranscriptError::VideoUnavailable(video_id.to_string()));
        }
        return Err(TranscriptError::TranscriptsDisabled(video_id.to_string()));
    };

    let json = after
        .split_once(",\"videoDetails")
        .map(|(captions, _)| captions)
        .unwrap_or(after);
    let captions: CaptionsJson = serde_json::from_str(json.trim())
        .map_err(|_| TranscriptError::TranscriptsDisabled(video_id.to_string()))?;

    let tracks = captions
        .renderer
        .and_then(|r| r.caption_tracks)
        .ok_or_else(|| TranscriptError::TranscriptsDisabled(video_id.to_string()))?;

    Ok(tracks
        .into_iter()
        .map(|t| CaptionTrack {
            candidate: TranscriptCandidate {
                language: t.name.text(),
                is_generated: t.kind.as_deref() == Some("asr"),
                is_translatable: t.is_translatable,
                language_code: t.language_code,
            },
            base_url: t.base_url.replace("&fmt=srv3", ""),
        })
        .collect())
}

/// Timed text XML to segments
pub struct TimedTextParser {
    segment: Regex,
    markup: Regex,
}

impl TimedTextParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            segment: Regex::new(r#"(?s)<text\s+start="([0-9.]+)"(?:\s+dur="([0-9.]+)")?[^>]*>(.*?)</text>"#)?,
            markup: Regex::new(r"<[^>]*>")?,
        })
    }

    /// Empty lines are dropped; entities are decoded, including double-escaped ones
    pub fn parse(&self, xml: &str) -> Vec<TranscriptSegment> {
        self.segment
            .captures_iter(xml)
            .filter_map(|caps| {
                let raw = caps.get(3).map_or("", |m| m.as_str());
                let once = decode_html_entities(raw);
                let stripped = self.markup.replace_all(&once, "");
                let text = decode_html_entities(&stripped);
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                Some(TranscriptSegment {
                    text: text.to_string(),
                    start: caps[1].parse().unwrap_or(0.0),
                    duration: caps
                        .get(2)
                        .and_then(|m| m.as_str().parse().ok())
                        .unwrap_or(0.0),
                })
            })
            .collect()
    }
}

// =============================================================================
// Player JSON Types
// =============================================================================

#[derive(Deserialize)]
struct CaptionsJson {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    renderer: Option<TracklistRenderer>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    caption_tracks: Option<Vec<TrackJson>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackJson {
    base_url: String,
    #[serde(default)]
    name: TrackName,
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    is_translatable: bool,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct TrackName {
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<TextRun>,
}

#[derive(Deserialize)]
struct TextRun {
    text: String,
}

impl TrackName {
    fn text(self) -> String {
        self.simple_text
            .or_else(|| self.runs.into_iter().next().map(|r| r.text))
            .unwrap_or_default()
    }
}
