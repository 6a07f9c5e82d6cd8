//! Configuration module for QueryTube.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AnswerPrompts, Prompts};
pub use settings::{
    GeneralSettings, ModelSettings, PromptSettings, ServerSettings, Settings, TranscriptSettings,
};
