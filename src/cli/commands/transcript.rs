//! Transcript command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::transcript::TranscriptFetcher;
use anyhow::Result;

/// Run the transcript command.
pub async fn run_transcript(
    video_id: &str,
    language: Option<String>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Transcript, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let language = language.unwrap_or_else(|| settings.transcript.default_language.clone());
    let fetcher = TranscriptFetcher::from_settings(&settings.transcript)?;

    let spinner = Output::spinner(&format!("Fetching {} captions...", language));
    let result = fetcher.fetch_transcript(video_id, &language).await;
    spinner.finish_and_clear();

    match result {
        Ok(text) => {
            println!("{}", text);
            Ok(())
        }
        Err(failure) => {
            Output::error(failure.user_message());
            Output::kv("Cause", &failure.to_string());
            Err(failure.into())
        }
    }
}
