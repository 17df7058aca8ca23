//! Transcript resolution
//!
//! Picks the best caption track for a video by walking an ordered list of strategies.
//! Without a language preference the chain is: manual track in the default language,
//! then a generated track in that language, then whatever track the service lists first.
//! With explicit languages only those languages are accepted.

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::error::{ErrorKind, UnavailableReason};
use crate::source::{CaptionSource, TranscriptCandidate, TranscriptSegment};

/// Transcript resolution failures
#[derive(Debug, Clone, Error)]
pub enum TranscriptError {
    /// The uploader disabled captions
    #[error("Transcripts are disabled for video {0}")]
    TranscriptsDisabled(String),

    /// No track in any of the requested languages
    #[error("No transcript found for video {video_id} in requested languages {languages:?}")]
    NoTranscriptFound {
        video_id: String,
        languages: Vec<String>,
    },

    /// The video has no caption tracks at all
    #[error("No transcripts available for video {0}")]
    NoTranscript(String),

    /// Video missing or private
    #[error("Video {0} is unavailable")]
    VideoUnavailable(String),

    /// Unrecognized upstream failure
    #[error("Failed to get transcript for {video_id}: {message}")]
    Unknown { video_id: String, message: String },
}

impl TranscriptError {
    pub fn unknown(video_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unknown {
            video_id: video_id.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unknown { .. } => ErrorKind::UpstreamServiceError,
            _ => ErrorKind::TranscriptUnavailable,
        }
    }

    pub fn reason(&self) -> Option<UnavailableReason> {
        match self {
            Self::TranscriptsDisabled(_) => Some(UnavailableReason::Disabled),
            Self::NoTranscriptFound { .. } | Self::NoTranscript(_) => {
                Some(UnavailableReason::NoneFound)
            }
            Self::VideoUnavailable(_) => Some(UnavailableReason::VideoUnavailable),
            Self::Unknown { .. } => None,
        }
    }
}

/// A resolved transcript
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub video_id: String,
    pub track: TranscriptCandidate,
    /// Segment texts joined by newlines
    pub text: String,
    pub segments: usize,
}

impl Transcript {
    fn from_segments(
        video_id: &str,
        track: TranscriptCandidate,
        segments: Vec<TranscriptSegment>,
    ) -> Self {
        let text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            video_id: video_id.to_string(),
            track,
            text,
            segments: segments.len(),
        }
    }

    /// Length of the transcript text in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Caption availability for a video; never an error
#[derive(Debug, Clone, Serialize)]
pub struct Availability {
    pub video_id: String,
    pub has_transcripts: bool,
    pub available_transcripts: Vec<TranscriptCandidate>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One step of the resolution chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionStrategy {
    /// Manually created track in this language
    Manual(String),
    /// Auto-generated track in this language
    Generated(String),
    /// First track listed, any language
    AnyTrack,
    /// First listed track matching these languages, tried in preference order
    Languages(Vec<String>),
}

impl ResolutionStrategy {
    fn select<'a>(&self, tracks: &'a [TranscriptCandidate]) -> Option<&'a TranscriptCandidate> {
        match self {
            Self::Manual(code) => tracks
                .iter()
                .find(|t| !t.is_generated && t.language_code == *code),
            Self::Generated(code) => tracks
                .iter()
                .find(|t| t.is_generated && t.language_code == *code),
            Self::AnyTrack => tracks.first(),
            Self::Languages(codes) => codes
                .iter()
                .find_map(|code| tracks.iter().find(|t| t.language_code == *code)),
        }
    }
}

/// Resolves the best caption track for a video
pub struct TranscriptResolver {
    captions: Arc<dyn CaptionSource>,
    default_chain: Vec<ResolutionStrategy>,
}

impl TranscriptResolver {
    pub fn new(captions: Arc<dyn CaptionSource>) -> Self {
        Self::with_default_language(captions, "en")
    }

    pub fn with_default_language(captions: Arc<dyn CaptionSource>, language: &str) -> Self {
        Self {
            captions,
            default_chain: vec![
                ResolutionStrategy::Manual(language.to_string()),
                ResolutionStrategy::Generated(language.to_string()),
                ResolutionStrategy::AnyTrack,
            ],
        }
    }

    /// Strategies used when no languages are requested
    pub fn default_chain(&self) -> &[ResolutionStrategy] {
        &self.default_chain
    }

    /// Resolve a transcript.
    ///
    /// With `languages` only the requested languages are accepted (`NoTranscriptFound`
    /// otherwise). Without, the default chain runs; a track whose fetch fails hands over to
    /// the next strategy.
    pub async fn resolve(
        &self,
        video_id: &str,
        languages: Option<&[String]>,
    ) -> Result<Transcript, TranscriptError> {
        let tracks = self.captions.list_transcripts(video_id).await?;

        match languages.filter(|l| !l.is_empty()) {
            Some(languages) => {
                let strategy = ResolutionStrategy::Languages(languages.to_vec());
                let track = strategy.select(&tracks).cloned().ok_or_else(|| {
                    TranscriptError::NoTranscriptFound {
                        video_id: video_id.to_string(),
                        languages: languages.to_vec(),
                    }
                })?;
                let segments = self.captions.fetch(video_id, &track).await?;
                Ok(Transcript::from_segments(video_id, track, segments))
            }
            None => self.resolve_with_chain(video_id, &tracks).await,
        }
    }

    async fn resolve_with_chain(
        &self,
        video_id: &str,
        tracks: &[TranscriptCandidate],
    ) -> Result<Transcript, TranscriptError> {
        let mut attempted: Vec<&TranscriptCandidate> = Vec::new();
        let mut last_error = None;

        for strategy in &self.default_chain {
            let Some(track) = strategy.select(tracks) else {
                continue;
            };
            if attempted.contains(&track) {
                continue;
            }
            attempted.push(track);

            match self.captions.fetch(video_id, track).await {
                Ok(segments) => {
                    log::debug!(
                        "Resolved {} via {:?} ({})",
                        video_id,
                        strategy,
                        track.language_code
                    );
                    return Ok(Transcript::from_segments(video_id, track.clone(), segments));
                }
                Err(e) => {
                    log::warn!("Fetching {:?} track for {} failed: {}", strategy, video_id, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| TranscriptError::NoTranscript(video_id.to_string())))
    }

    /// List caption tracks without fetching any text. Read-only; never fails.
    pub async fn check_availability(&self, video_id: &str) -> Availability {
        match self.captions.list_transcripts(video_id).await {
            Ok(tracks) => Availability {
                video_id: video_id.to_string(),
                has_transcripts: !tracks.is_empty(),
                count: tracks.len(),
                available_transcripts: tracks,
                error: None,
            },
            Err(e) => Availability {
                video_id: video_id.to_string(),
                has_transcripts: false,
                available_transcripts: Vec::new(),
                count: 0,
                error: Some(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};

    pub(crate) fn track(code: &str, generated: bool) -> TranscriptCandidate {
        TranscriptCandidate {
            language: code.to_uppercase(),
            language_code: code.to_string(),
            is_generated: generated,
            is_translatable: true,
        }
    }

    /// In-memory captions: per video a track list (or an error); text is "<code> line".
    #[derive(Default)]
    pub(crate) struct StubCaptions {
        pub tracks: HashMap<String, Result<Vec<TranscriptCandidate>, TranscriptError>>,
        pub broken_fetch: HashSet<(String, String, bool)>,
    }

    impl StubCaptions {
        pub fn with_tracks(mut self, video_id: &str, tracks: Vec<TranscriptCandidate>) -> Self {
            self.tracks.insert(video_id.to_string(), Ok(tracks));
            self
        }

        pub fn with_error(mut self, video_id: &str, error: TranscriptError) -> Self {
            self.tracks.insert(video_id.to_string(), Err(error));
            self
        }

        pub fn with_broken_fetch(mut self, video_id: &str, code: &str, generated: bool) -> Self {
            self.broken_fetch
                .insert((video_id.to_string(), code.to_string(), generated));
            self
        }
    }

    #[async_trait]
    impl CaptionSource for StubCaptions {
        async fn list_transcripts(
            &self,
            video_id: &str,
        ) -> Result<Vec<TranscriptCandidate>, TranscriptError> {
            self.tracks
                .get(video_id)
                .cloned()
                .unwrap_or_else(|| Err(TranscriptError::VideoUnavailable(video_id.to_string())))
        }

        async fn fetch(
            &self,
            video_id: &str,
            track: &TranscriptCandidate,
        ) -> Result<Vec<TranscriptSegment>, TranscriptError> {
            let key = (
                video_id.to_string(),
                track.language_code.clone(),
                track.is_generated,
            );
            if self.broken_fetch.contains(&key) {
                return Err(TranscriptError::unknown(video_id, "connection reset"));
            }
            let kind = if track.is_generated { "auto" } else { "manual" };
            Ok(vec![
                TranscriptSegment {
                    text: format!("{} {} line one", track.language_code, kind),
                    start: 0.0,
                    duration: 1.5,
                },
                TranscriptSegment {
                    text: "line two".to_string(),
                    start: 1.5,
                    duration: 2.0,
                },
            ])
        }
    }

    fn resolver(captions: StubCaptions) -> TranscriptResolver {
        TranscriptResolver::new(Arc::new(captions))
    }

    #[tokio::test]
    async fn test_prefers_manual_english() {
        let r = resolver(StubCaptions::default().with_tracks(
            "v1",
            vec![track("de", false), track("en", true), track("en", false)],
        ));

        let t = r.resolve("v1", None).await.unwrap();
        assert_eq!(t.track, track("en", false));
        assert_eq!(t.text, "en manual line one\nline two");
        assert_eq!(t.segments, 2);
    }

    #[tokio::test]
    async fn test_falls_back_to_generated_english() {
        let r = resolver(
            StubCaptions::default().with_tracks("v1", vec![track("de", false), track("en", true)]),
        );
        let t = r.resolve("v1", None).await.unwrap();
        assert_eq!(t.track, track("en", true));
    }

    #[tokio::test]
    async fn test_falls_back_to_first_listed_track() {
        let r = resolver(
            StubCaptions::default().with_tracks("v1", vec![track("ja", true), track("de", false)]),
        );
        let t = r.resolve("v1", None).await.unwrap();
        assert_eq!(t.track.language_code, "ja");
    }

    #[tokio::test]
    async fn test_failed_fetch_moves_to_next_strategy() {
        let r = resolver(
            StubCaptions::default()
                .with_tracks("v1", vec![track("en", false), track("en", true)])
                .with_broken_fetch("v1", "en", false),
        );
        let t = r.resolve("v1", None).await.unwrap();
        assert_eq!(t.track, track("en", true));
    }

    #[tokio::test]
    async fn test_no_tracks_is_no_transcript() {
        let r = resolver(StubCaptions::default().with_tracks("v1", vec![]));
        let err = r.resolve("v1", None).await.unwrap_err();
        assert!(matches!(err, TranscriptError::NoTranscript(_)));
        assert_eq!(err.reason(), Some(UnavailableReason::NoneFound));
    }

    #[tokio::test]
    async fn test_requested_language_never_falls_back() {
        let r = resolver(StubCaptions::default().with_tracks("v1", vec![track("en", false)]));
        let langs = vec!["fr".to_string()];

        let err = r.resolve("v1", Some(&langs)).await.unwrap_err();
        match err {
            TranscriptError::NoTranscriptFound { languages, .. } => {
                assert_eq!(languages, vec!["fr".to_string()])
            }
            other => panic!("Expected NoTranscriptFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_requested_languages_in_preference_order() {
        let r = resolver(StubCaptions::default().with_tracks(
            "v1",
            vec![track("en", false), track("fr", true), track("de", false)],
        ));
        let langs = vec!["de".to_string(), "fr".to_string()];
        let t = r.resolve("v1", Some(&langs)).await.unwrap();
        assert_eq!(t.track.language_code, "de");
    }

    #[tokio::test]
    async fn test_upstream_errors_pass_through() {
        let r = resolver(
            StubCaptions::default()
                .with_error("v1", TranscriptError::TranscriptsDisabled("v1".to_string())),
        );
        let err = r.resolve("v1", None).await.unwrap_err();
        assert!(matches!(err, TranscriptError::TranscriptsDisabled(_)));
        assert_eq!(err.kind(), ErrorKind::TranscriptUnavailable);
    }

    #[tokio::test]
    async fn test_custom_default_language() {
        let captions = StubCaptions::default()
            .with_tracks("v1", vec![track("en", false), track("es", true)]);
        let r = TranscriptResolver::with_default_language(Arc::new(captions), "es");
        let t = r.resolve("v1", None).await.unwrap();
        assert_eq!(t.track.language_code, "es");
        assert_eq!(r.default_chain().len(), 3);
    }

    #[tokio::test]
    async fn test_check_availability() {
        let r = resolver(
            StubCaptions::default()
                .with_tracks("v1", vec![track("en", false), track("de", true)])
                .with_error("v2", TranscriptError::VideoUnavailable("v2".to_string())),
        );

        let ok = r.check_availability("v1").await;
        assert!(ok.has_transcripts);
        assert_eq!(ok.count, 2);
        assert!(ok.error.is_none());

        let bad = r.check_availability("v2").await;
        assert!(!bad.has_transcripts);
        assert_eq!(bad.count, 0);
        assert!(bad.error.unwrap().contains("unavailable"));
    }
}
