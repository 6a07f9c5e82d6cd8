//! Request orchestration for QueryTube.
//!
//! Fetches the transcript, then either asks the model or reports the uniform
//! transcript failure.

use crate::answer::{AnswerGenerator, OpenAIChatModel};
use crate::config::{Prompts, Settings};
use crate::error::{QueryTubeError, Result};
use crate::transcript::{FetchFailure, TranscriptFetcher};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Message shown when the model call fails.
pub const GENERATION_FAILURE_MESSAGE: &str =
    "Failed to generate an answer. Please try again later.";

/// Inbound question about a video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Video identifier, as typed by the user.
    pub video_id: String,
    /// Natural-language question.
    pub query: String,
    /// Caption language; the configured default when absent.
    #[serde(default)]
    pub language: Option<String>,
}

/// Answer returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub video_id: String,
    pub youtube_url: String,
}

impl QueryResponse {
    fn new(answer: impl Into<String>, video_id: &str) -> Self {
        Self {
            answer: answer.into(),
            video_id: video_id.to_string(),
            youtube_url: youtube_url(video_id),
        }
    }
}

/// Outcome of one request, with the cause kept for logging and status codes.
#[derive(Debug)]
pub enum QueryOutcome {
    /// The model answered.
    Answered(QueryResponse),
    /// No transcript; the response carries the uniform failure message.
    TranscriptUnavailable(QueryResponse, FetchFailure),
    /// The model call failed; the response carries [`GENERATION_FAILURE_MESSAGE`].
    GenerationFailed(QueryResponse, QueryTubeError),
}

impl QueryOutcome {
    pub fn response(&self) -> &QueryResponse {
        match self {
            QueryOutcome::Answered(r)
            | QueryOutcome::TranscriptUnavailable(r, _)
            | QueryOutcome::GenerationFailed(r, _) => r,
        }
    }

    pub fn into_inner(self) -> QueryResponse {
        match self {
            QueryOutcome::Answered(r)
            | QueryOutcome::TranscriptUnavailable(r, _)
            | QueryOutcome::GenerationFailed(r, _) => r,
        }
    }
}

/// Canonical watch URL for a video identifier, used verbatim.
pub fn youtube_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Runs the fetch-then-answer sequence.
pub struct QueryService {
    fetcher: TranscriptFetcher,
    generator: AnswerGenerator,
    default_language: String,
}

impl QueryService {
    /// Create a service from its parts.
    pub fn new(
        fetcher: TranscriptFetcher,
        generator: AnswerGenerator,
        default_language: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            generator,
            default_language: default_language.into(),
        }
    }

    /// Create the production service: YouTube captions and the configured model.
    pub fn from_settings(settings: &Settings, api_key: &str) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let fetcher = TranscriptFetcher::from_settings(&settings.transcript)?;

        let model = OpenAIChatModel::new(&settings.model, api_key)?;
        info!("Using model {} at {}", model.model(), settings.model.api_base);
        let generator = AnswerGenerator::new(Arc::new(model)).with_prompts(prompts);

        Ok(Self::new(
            fetcher,
            generator,
            settings.transcript.default_language.clone(),
        ))
    }

    fn language_for<'a>(&'a self, request: &'a QueryRequest) -> &'a str {
        request
            .language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.default_language)
    }

    /// Answer one request.
    #[instrument(skip(self, request), fields(video_id = %request.video_id))]
    pub async fn answer(&self, request: &QueryRequest) -> QueryOutcome {
        let language = self.language_for(request);

        let transcript = match self.fetcher.fetch_transcript(&request.video_id, language).await {
            Ok(text) => text,
            Err(failure) => {
                warn!("No transcript: {}", failure);
                let response = QueryResponse::new(failure.user_message(), &request.video_id);
                return QueryOutcome::TranscriptUnavailable(response, failure);
            }
        };

        match self
            .generator
            .generate_answer(&transcript, &request.query)
            .await
        {
            Ok(answer) => QueryOutcome::Answered(QueryResponse::new(answer, &request.video_id)),
            Err(e) => {
                error!("Answer generation failed: {}", e);
                let response = QueryResponse::new(GENERATION_FAILURE_MESSAGE, &request.video_id);
                QueryOutcome::GenerationFailed(response, e)
            }
        }
    }
}
