//! Ask command implementation.
//!
//! Sends a question to a running backend, the same request a browser
//! front-end would make.

use crate::cli::Output;
use crate::orchestrator::{QueryRequest, QueryResponse};
use anyhow::{Context, Result};
use std::time::Duration;

/// Run the ask command.
pub async fn run_ask(video_id: &str, query: &str, language: &str, server: &str) -> Result<()> {
    let endpoint = answer_endpoint(server)?;

    let request = QueryRequest {
        video_id: video_id.to_string(),
        query: query.to_string(),
        language: Some(language.to_string()),
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(300))
        .build()?;

    let spinner = Output::spinner("Asking the backend...");

    let response = client.post(endpoint.clone()).json(&request).send().await;
    spinner.finish_and_clear();

    let response = response.with_context(|| format!("Failed to reach {}", endpoint))?;
    let status = response.status();
    let body: QueryResponse = response
        .json()
        .await
        .with_context(|| format!("Unexpected response from {} (HTTP {})", endpoint, status))?;

    if status.is_success() {
        println!("\n{}\n", body.answer.trim());
    } else {
        Output::error(&body.answer);
    }
    Output::kv("Video", &body.youtube_url);

    if !status.is_success() {
        anyhow::bail!("Backend returned HTTP {}", status);
    }

    Ok(())
}

/// Resolve the `/get_answer` endpoint against a server base URL.
fn answer_endpoint(server: &str) -> Result<url::Url> {
    let mut base = url::Url::parse(server).with_context(|| format!("Invalid server URL: {}", server))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join("get_answer")?)
}
