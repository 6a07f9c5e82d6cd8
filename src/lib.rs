//! QueryTube - ask questions about YouTube videos
//!
//! Fetches a video's captions and hands them, together with a question, to a
//! hosted language model that answers in a few lines.
//!
//! # Architecture
//!
//! - `config` - Configuration management and prompt templates
//! - `transcript` - Caption retrieval with retry and proxy fallback
//! - `answer` - Prompt construction and model calls
//! - `orchestrator` - Fetch-then-answer request handling
//! - `cli` - Command-line interface and HTTP backend
//!
//! # Example
//!
//! ```rust,no_run
//! use querytube::config::Settings;
//! use querytube::orchestrator::{QueryRequest, QueryService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let api_key = settings.model_api_key()?;
//!     let service = QueryService::from_settings(&settings, &api_key)?;
//!
//!     let request = QueryRequest {
//!         video_id: "dQw4w9WgXcQ".to_string(),
//!         query: "What is this video about?".to_string(),
//!         language: None,
//!     };
//!     println!("{}", service.answer(&request).await.response().answer);
//!
//!     Ok(())
//! }
//! ```

pub mod answer;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod transcript;

pub use error::{QueryTubeError, Result};
