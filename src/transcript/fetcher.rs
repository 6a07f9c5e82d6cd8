//! Transcript fetching with bounded retries and proxy fallback.

use super::{
    join_fragments, sanitize_video_id, AttemptState, CaptionError, CaptionSource, FetchFailure,
    RetryPolicy, YoutubeCaptions,
};
use crate::config::TranscriptSettings;
use crate::error::Result;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Fetches a video's transcript as plain text.
pub struct TranscriptFetcher {
    source: Arc<dyn CaptionSource>,
    policy: RetryPolicy,
}

impl TranscriptFetcher {
    pub fn new(source: Arc<dyn CaptionSource>, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    /// Create a fetcher over YouTube captions with the configured policy.
    pub fn from_settings(settings: &TranscriptSettings) -> Result<Self> {
        let captions = YoutubeCaptions::new(settings)?;
        if !captions.has_proxy() {
            warn!("No transcript proxy configured; retries will use the direct route");
        }

        Ok(Self::new(
            Arc::new(captions),
            RetryPolicy::new(settings.max_retries, settings.retry_delay()),
        ))
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Fetch the transcript of `identifier` in `language`.
    ///
    /// Transient transport errors are retried up to the policy's attempt limit,
    /// the first attempt going direct and the rest through the proxy. Any other
    /// error fails immediately. Nothing escapes as a panic or process error.
    #[instrument(skip(self), fields(max_retries = self.policy.max_retries))]
    pub async fn fetch_transcript(
        &self,
        identifier: &str,
        language: &str,
    ) -> std::result::Result<String, FetchFailure> {
        let video_id = sanitize_video_id(identifier);
        if video_id.is_empty() {
            error!("Identifier {:?} has no usable characters", identifier);
            return Err(FetchFailure::InvalidIdentifier(identifier.to_string()));
        }

        info!(
            "Fetching transcript for video_id: {}, language: {}",
            video_id, language
        );

        let max_retries = self.policy.max_retries;
        let mut state = AttemptState::start(max_retries);
        let mut last_error: Option<CaptionError> = None;

        while let (Some(attempt), Some(route)) = (state.attempt_number(), state.route()) {
            debug!("Attempt {}/{} ({})", attempt, max_retries, route);

            match self.source.fetch(&video_id, language, route).await {
                Ok(fragments) => {
                    if fragments.iter().all(|f| f.text.trim().is_empty()) {
                        let err = CaptionError::CaptionsDisabled(video_id.clone());
                        error!("Error fetching transcript for video ID {}: {:?}", video_id, err);
                        return Err(FetchFailure::PermanentRetrieval(err));
                    }

                    info!(
                        "Transcript fetched successfully ({} fragments, attempt {})",
                        fragments.len(),
                        attempt
                    );
                    return Ok(join_fragments(&fragments));
                }
                Err(err) if err.is_transient() => {
                    warn!("Attempt {} failed: {}", attempt, err);
                    state = state.after_transient_failure(max_retries);
                    last_error = Some(err);

                    if state != AttemptState::Exhausted {
                        info!("Retrying in {:?}...", self.policy.delay);
                        tokio::time::sleep(self.policy.delay).await;
                    }
                }
                Err(err) => {
                    error!("Error fetching transcript for video ID {}: {:?}", video_id, err);
                    return Err(FetchFailure::PermanentRetrieval(err));
                }
            }
        }

        let last_error = last_error
            .unwrap_or_else(|| CaptionError::Transport("no attempt was made".to_string()));
        error!(
            "All {} attempts failed for video ID {}: {:?}",
            max_retries, video_id, last_error
        );

        Err(FetchFailure::TransientNetwork {
            attempts: max_retries,
            last_error,
        })
    }
}
