//! OpenAI-compatible chat completion model.

use super::LanguageModel;
use crate::config::ModelSettings;
use crate::error::{QueryTubeError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Chat-completion model reached through an OpenAI-compatible API.
pub struct OpenAIChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
}

impl OpenAIChatModel {
    /// Create a model client from settings and the startup-time API key.
    pub fn new(settings: &ModelSettings, api_key: &str) -> Result<Self> {
        Ok(Self {
            client: create_client(settings, api_key)?,
            model: settings.name.clone(),
            temperature: settings.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LanguageModel for OpenAIChatModel {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| QueryTubeError::Generation(e.to_string()))?
                .into(),
        ];

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages(messages);
        if let Some(temperature) = self.temperature {
            builder.temperature(temperature);
        }
        let request = builder
            .build()
            .map_err(|e| QueryTubeError::Generation(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            QueryTubeError::OpenAI(format!("Failed to generate response: {}", e))
        })?;

        debug!("Completion returned {} choice(s)", response.choices.len());

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| QueryTubeError::Generation("Empty response from model".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_creation() {
        let settings = ModelSettings::default();
        let model = OpenAIChatModel::new(&settings, "test-key").unwrap();
        assert_eq!(model.model(), "gemini-1.5-flash");
        assert_eq!(model.temperature, None);
    }
}
