//! Answer generation from a transcript and a question.

mod openai;

pub use openai::OpenAIChatModel;

use crate::config::Prompts;
use crate::error::{QueryTubeError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Trait for hosted text-generation models.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a single prompt and return the model's raw text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Builds the answer prompt and delegates to a [`LanguageModel`].
pub struct AnswerGenerator {
    model: Arc<dyn LanguageModel>,
    prompts: Prompts,
}

impl AnswerGenerator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Render the prompt for `query` over `transcript_text`.
    pub fn build_prompt(&self, transcript_text: &str, query: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), transcript_text.to_string());
        vars.insert("query".to_string(), query.to_string());

        self.prompts.render_with_custom(&self.prompts.answer.user, &vars)
    }

    /// Answer `query` from `transcript_text` with a single model call.
    ///
    /// The model output is returned unmodified. Failures are not retried.
    #[instrument(skip(self, transcript_text), fields(context_len = transcript_text.len()))]
    pub async fn generate_answer(&self, transcript_text: &str, query: &str) -> Result<String> {
        if transcript_text.trim().is_empty() {
            return Err(QueryTubeError::InvalidInput(
                "cannot answer from an empty context".to_string(),
            ));
        }

        let prompt = self.build_prompt(transcript_text, query);
        let answer = self.model.complete(&prompt).await?;

        debug!("Generated answer ({} chars)", answer.len());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Model that echoes a fixed answer and records prompts.
    struct StubModel {
        answer: std::result::Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubModel {
        fn answering(answer: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: Ok(answer.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for StubModel {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.answer.clone().map_err(QueryTubeError::OpenAI)
        }
    }

    #[tokio::test]
    async fn test_prompt_embeds_context_and_query() {
        let model = StubModel::answering("  It's a greeting.\n");
        let generator = AnswerGenerator::new(model.clone());

        let answer = generator
            .generate_answer("Hello world", "What is this about?")
            .await
            .unwrap();

        assert_eq!(answer, "  It's a greeting.\n");
        let prompts = model.prompts.lock().unwrap();
        assert_eq!(
            prompts[0],
            "Context: Hello world\n\nQuery: What is this about?\n\nPlease provide a concise answer in 2-3 lines only."
        );
    }

    #[tokio::test]
    async fn test_empty_context_is_rejected_without_model_call() {
        let model = StubModel::answering("unused");
        let generator = AnswerGenerator::new(model.clone());

        let err = generator.generate_answer("  \n", "Why?").await.unwrap_err();

        assert!(matches!(err, QueryTubeError::InvalidInput(_)));
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_model_errors_are_surfaced() {
        let generator = AnswerGenerator::new(StubModel::failing("invalid api key"));

        let err = generator.generate_answer("text", "q").await.unwrap_err();

        assert!(err.to_string().contains("invalid api key"));
    }

    #[test]
    fn test_custom_prompt_template() {
        let mut prompts = Prompts::default();
        prompts.answer.user = "{{query}} | {{context}} | {{lang}}".to_string();
        prompts
            .variables
            .insert("lang".to_string(), "answer in French".to_string());

        let generator =
            AnswerGenerator::new(StubModel::answering("x")).with_prompts(prompts);

        assert_eq!(generator.build_prompt("ctx", "q"), "q | ctx | answer in French");
    }
}
