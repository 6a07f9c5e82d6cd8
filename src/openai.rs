//! Client factory for OpenAI-compatible chat endpoints.

use crate::config::ModelSettings;
use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create a chat client for the configured endpoint.
///
/// The API key is passed in by the caller; it is read once at startup and
/// never stored in [`ModelSettings`].
pub fn create_client(settings: &ModelSettings, api_key: &str) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .build()?;

    let config = OpenAIConfig::new()
        .with_api_base(settings.api_base.trim_end_matches('/'))
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::config::Config;

    #[test]
    fn test_create_client_uses_configured_base() {
        let settings = ModelSettings {
            api_base: "http://127.0.0.1:9/v1/".to_string(),
            request_timeout_secs: 1,
            ..Default::default()
        };

        let client = create_client(&settings, "test-key").unwrap();

        assert_eq!(client.config().api_base(), "http://127.0.0.1:9/v1");
    }
}
