//! YouTube caption source.
//!
//! Looks up the caption tracks of a video through the innertube player
//! endpoint, then downloads the selected track's timed-text XML.

use super::{CaptionError, CaptionFragment, CaptionSource, Route};
use crate::config::TranscriptSettings;
use crate::error::{QueryTubeError, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";
const USER_AGENT: &str = concat!("querytube/", env!("CARGO_PKG_VERSION"));

/// Caption source backed by YouTube.
pub struct YoutubeCaptions {
    base_url: String,
    direct: reqwest::Client,
    proxied: Option<reqwest::Client>,
    text_regex: Regex,
    attr_regex: Regex,
    tag_regex: Regex,
}

impl YoutubeCaptions {
    /// Build the source from settings.
    ///
    /// The proxied client exists only when a proxy URL is configured; without
    /// one, proxied attempts reuse the direct client.
    pub fn new(settings: &TranscriptSettings) -> Result<Self> {
        let timeout = Duration::from_secs(settings.request_timeout_secs);

        let direct = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .no_proxy()
            .build()?;

        let proxied = match settings.proxy() {
            Some(proxy_url) => {
                let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
                    QueryTubeError::Config(format!("Invalid proxy URL {}: {}", proxy_url, e))
                })?;
                let client = reqwest::Client::builder()
                    .timeout(timeout)
                    .user_agent(USER_AGENT)
                    .proxy(proxy)
                    .build()?;
                Some(client)
            }
            None => None,
        };

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            direct,
            proxied,
            text_regex: Regex::new(r"(?s)<text([^>]*)>(.*?)</text>").expect("Invalid regex"),
            attr_regex: Regex::new(r#"(\w+)="([^"]*)""#).expect("Invalid regex"),
            tag_regex: Regex::new(r"<[^>]*>").expect("Invalid regex"),
        })
    }

    /// Whether retries have a separate proxy route.
    pub fn has_proxy(&self) -> bool {
        self.proxied.is_some()
    }

    fn client(&self, route: Route) -> &reqwest::Client {
        match (route, &self.proxied) {
            (Route::Proxied, Some(client)) => client,
            (Route::Proxied, None) => {
                debug!("No proxy configured, retrying over the direct route");
                &self.direct
            }
            (Route::Direct, _) => &self.direct,
        }
    }

    /// Ask the player endpoint for the video's caption tracks.
    async fn list_tracks(
        &self,
        client: &reqwest::Client,
        video_id: &str,
    ) -> std::result::Result<Vec<CaptionTrack>, CaptionError> {
        let url = format!("{}/youtubei/v1/player?prettyPrint=false", self.base_url);
        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": video_id,
        });

        let response = client
            .post(&url)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_body(response, video_id).await?;
        let player: PlayerResponse = serde_json::from_str(&body)
            .map_err(|e| CaptionError::Malformed(format!("player response: {}", e)))?;

        check_playability(player.playability_status.as_ref(), video_id)?;

        player
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .and_then(|r| r.caption_tracks)
            .filter(|tracks| !tracks.is_empty())
            .ok_or_else(|| CaptionError::CaptionsDisabled(video_id.to_string()))
    }

    /// Download and parse one caption track.
    async fn download_track(
        &self,
        client: &reqwest::Client,
        track: &CaptionTrack,
        video_id: &str,
    ) -> std::result::Result<Vec<CaptionFragment>, CaptionError> {
        let url = self.track_url(&track.base_url)?;
        debug!("Downloading caption track {}", track.language_code);

        let response = client.get(url).send().await.map_err(transport_error)?;
        let xml = read_body(response, video_id).await?;

        Ok(self.parse_timedtext(&xml))
    }

    /// Resolve a track URL against the base URL and drop its `fmt` parameter,
    /// so the service answers with the plain timed-text XML.
    fn track_url(&self, base_url: &str) -> std::result::Result<url::Url, CaptionError> {
        let absolute = if base_url.starts_with('/') {
            format!("{}{}", self.base_url, base_url)
        } else {
            base_url.to_string()
        };

        let mut url = url::Url::parse(&absolute)
            .map_err(|e| CaptionError::Malformed(format!("caption track URL {}: {}", absolute, e)))?;

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != "fmt")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }

        Ok(url)
    }

    /// Parse timed-text XML into fragments, in document order.
    fn parse_timedtext(&self, xml: &str) -> Vec<CaptionFragment> {
        self.text_regex
            .captures_iter(xml)
            .filter_map(|caps| {
                let attrs = caps.get(1).map_or("", |m| m.as_str());
                let raw = caps.get(2).map_or("", |m| m.as_str());

                let mut start = 0.0;
                let mut duration = 0.0;
                for attr in self.attr_regex.captures_iter(attrs) {
                    let value = attr[2].parse::<f64>().unwrap_or(0.0);
                    match &attr[1] {
                        "start" => start = value,
                        "dur" => duration = value,
                        _ => {}
                    }
                }

                // Entities arrive escaped twice, e.g. "&amp;#39;".
                let once = html_escape::decode_html_entities(raw);
                let twice = html_escape::decode_html_entities(&once);
                let text = self.tag_regex.replace_all(&twice, "");
                let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

                if text.is_empty() {
                    None
                } else {
                    Some(CaptionFragment::new(text, start, duration))
                }
            })
            .collect()
    }
}

#[async_trait]
impl CaptionSource for YoutubeCaptions {
    #[instrument(skip(self))]
    async fn fetch(
        &self,
        video_id: &str,
        language: &str,
        route: Route,
    ) -> std::result::Result<Vec<CaptionFragment>, CaptionError> {
        let client = self.client(route);

        let tracks = self.list_tracks(client, video_id).await?;
        let track = select_track(&tracks, language).ok_or_else(|| {
            CaptionError::LanguageUnavailable {
                language: language.to_string(),
                available: tracks.iter().map(|t| t.language_code.clone()).collect(),
            }
        })?;

        self.download_track(client, track, video_id).await
    }
}

// === Innertube response types ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    #[serde(default)]
    playability_status: Option<PlayabilityStatus>,
    #[serde(default)]
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    #[serde(default)]
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    name: Option<TrackName>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackName {
    #[serde(default)]
    simple_text: Option<String>,
    #[serde(default)]
    runs: Option<Vec<TextRun>>,
}

#[derive(Debug, Clone, Deserialize)]
struct TextRun {
    text: String,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    fn display_name(&self) -> Option<String> {
        let name = self.name.as_ref()?;
        name.simple_text.clone().or_else(|| {
            name.runs
                .as_ref()
                .map(|runs| runs.iter().map(|r| r.text.as_str()).collect::<String>())
        })
    }
}

/// Pick the track for `language`: exact code first (manual before generated),
/// then a track whose display name starts with it, so "english" works too.
fn select_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    let wanted = language.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }

    let by_code = |generated: bool| {
        tracks
            .iter()
            .find(|t| t.is_generated() == generated && t.language_code.to_lowercase() == wanted)
    };

    by_code(false).or_else(|| by_code(true)).or_else(|| {
        tracks.iter().find(|t| {
            t.display_name()
                .is_some_and(|n| n.to_lowercase().starts_with(&wanted))
        })
    })
}

fn check_playability(
    status: Option<&PlayabilityStatus>,
    video_id: &str,
) -> std::result::Result<(), CaptionError> {
    let Some(status) = status else {
        return Ok(());
    };

    let reason = status.reason.clone().unwrap_or_default();
    match status.status.as_deref() {
        None | Some("OK") => Ok(()),
        Some("LOGIN_REQUIRED") if reason.to_lowercase().contains("bot") => {
            Err(CaptionError::Blocked(reason))
        }
        Some(other) => Err(CaptionError::VideoUnavailable(if reason.is_empty() {
            format!("{} ({})", video_id, other)
        } else {
            format!("{}: {}", video_id, reason)
        })),
    }
}

fn transport_error(e: reqwest::Error) -> CaptionError {
    let message = error_chain(&e);
    if e.is_builder() {
        CaptionError::Malformed(message)
    } else {
        CaptionError::Transport(message)
    }
}

/// Render an error with all of its sources, outermost first.
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

async fn read_body(
    response: reqwest::Response,
    video_id: &str,
) -> std::result::Result<String, CaptionError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(CaptionError::Blocked(format!("HTTP {}", status)));
    }
    if status == StatusCode::NOT_FOUND {
        return Err(CaptionError::VideoUnavailable(video_id.to_string()));
    }
    if !status.is_success() {
        return Err(CaptionError::Malformed(format!("HTTP {}", status)));
    }

    // A body cut off mid-stream surfaces here.
    response.text().await.map_err(transport_error)
}
