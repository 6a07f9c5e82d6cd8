//! Caption retrieval for QueryTube.
//!
//! A [`CaptionSource`] fetches the raw caption fragments for one video over a
//! given network [`Route`]. The [`TranscriptFetcher`] wraps a source with the
//! sanitize / retry / proxy-fallback policy and collapses every failure into a
//! [`FetchFailure`].

mod fetcher;
mod retry;
mod youtube;

pub use fetcher::TranscriptFetcher;
pub use retry::{AttemptState, RetryPolicy};
pub use youtube::YoutubeCaptions;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown to users whenever a transcript could not be fetched.
pub const TRANSCRIPT_FAILURE_MESSAGE: &str =
    "Failed to fetch transcript. Make sure the video has captions and the video_id is valid.";

/// One timed caption snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionFragment {
    /// Caption text.
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
}

impl CaptionFragment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// Network path used for a single fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Straight to the caption service.
    Direct,
    /// Through the configured forward proxy.
    Proxied,
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Direct => write!(f, "direct"),
            Route::Proxied => write!(f, "proxied"),
        }
    }
}

/// Error reported by a [`CaptionSource`] for one attempt.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptionError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request blocked by upstream: {0}")]
    Blocked(String),

    #[error("video unavailable: {0}")]
    VideoUnavailable(String),

    #[error("captions are disabled for video {0}")]
    CaptionsDisabled(String),

    #[error("no captions in language '{language}' (available: {})", .available.join(", "))]
    LanguageUnavailable {
        language: String,
        available: Vec<String>,
    },

    #[error("unexpected response: {0}")]
    Malformed(String),
}

impl CaptionError {
    /// Whether another attempt (possibly over a different route) may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, CaptionError::Transport(_) | CaptionError::Blocked(_))
    }
}

/// Per-request outcome when no transcript could be produced.
///
/// This is a value, not a process error: callers render it with
/// [`FetchFailure::user_message`] and carry on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchFailure {
    #[error("invalid video identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("transcript unavailable: {0}")]
    PermanentRetrieval(CaptionError),

    #[error("network failure after {attempts} attempt(s): {last_error}")]
    TransientNetwork { attempts: u32, last_error: CaptionError },
}

impl FetchFailure {
    /// Uniform user-facing rendering, identical for every cause.
    pub fn user_message(&self) -> &'static str {
        TRANSCRIPT_FAILURE_MESSAGE
    }
}

/// Trait for caption providers.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Fetch the caption fragments of `video_id` in `language`, in temporal order.
    async fn fetch(
        &self,
        video_id: &str,
        language: &str,
        route: Route,
    ) -> std::result::Result<Vec<CaptionFragment>, CaptionError>;
}

/// Remove every character outside `[A-Za-z0-9_-]`.
pub fn sanitize_video_id(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Join fragment texts with single spaces, keeping their order.
pub fn join_fragments(fragments: &[CaptionFragment]) -> String {
    fragments
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_foreign_characters() {
        assert_eq!(sanitize_video_id("dQw4w9WgXcQ!"), "dQw4w9WgXcQ");
        assert_eq!(sanitize_video_id(" abc 123 \n"), "abc123");
        assert_eq!(sanitize_video_id("a/b?c=d&e#f"), "abcdef");
        assert_eq!(sanitize_video_id("héllo_wörld-1"), "hllo_wrld-1");
        assert_eq!(
            sanitize_video_id("https://www.youtube.com/watch?v=abc"),
            "httpswwwyoutubecomwatchvabc"
        );
        assert_eq!(sanitize_video_id("!!!"), "");
    }

    #[test]
    fn test_sanitize_keeps_valid_ids() {
        for id in ["dQw4w9WgXcQ", "abc123", "A_b-C", "-_-", ""] {
            assert_eq!(sanitize_video_id(id), id);
        }
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            "dQw4w9WgXcQ",
            "  spaced id  ",
            "emoji🎬id",
            "semi;colon'quote\"",
            "youtu.be/xyz_-9",
            "\t\r\n",
            "",
        ];
        for input in inputs {
            let once = sanitize_video_id(input);
            assert_eq!(sanitize_video_id(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_sanitize_output_is_subsequence_of_input() {
        let input = "a!b@c#1$2%3_-";
        let output = sanitize_video_id(input);
        let mut chars = input.chars();
        assert!(output.chars().all(|c| chars.any(|i| i == c)));
    }

    #[test]
    fn test_join_preserves_order_with_single_spaces() {
        let fragments = vec![
            CaptionFragment::new("a", 0.0, 1.0),
            CaptionFragment::new("b", 1.0, 1.0),
            CaptionFragment::new("c", 2.0, 1.0),
        ];
        assert_eq!(join_fragments(&fragments), "a b c");
        assert_eq!(join_fragments(&[]), "");
    }

    #[test]
    fn test_transient_classification() {
        assert!(CaptionError::Transport("reset".into()).is_transient());
        assert!(CaptionError::Blocked("429".into()).is_transient());
        assert!(!CaptionError::CaptionsDisabled("x".into()).is_transient());
        assert!(!CaptionError::VideoUnavailable("x".into()).is_transient());
        assert!(!CaptionError::Malformed("x".into()).is_transient());
        assert!(!CaptionError::LanguageUnavailable {
            language: "fr".into(),
            available: vec!["en".into()],
        }
        .is_transient());
    }

    #[test]
    fn test_failures_render_uniform_message() {
        let failures = [
            FetchFailure::InvalidIdentifier("!!".into()),
            FetchFailure::PermanentRetrieval(CaptionError::CaptionsDisabled("abc".into())),
            FetchFailure::TransientNetwork {
                attempts: 3,
                last_error: CaptionError::Transport("reset".into()),
            },
        ];
        for failure in failures {
            assert_eq!(failure.user_message(), TRANSCRIPT_FAILURE_MESSAGE);
        }
    }

    #[test]
    fn test_language_unavailable_lists_codes() {
        let err = CaptionError::LanguageUnavailable {
            language: "fr".into(),
            available: vec!["en".into(), "de".into()],
        };
        assert_eq!(
            err.to_string(),
            "no captions in language 'fr' (available: en, de)"
        );
    }
}
