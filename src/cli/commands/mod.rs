//! CLI command implementations.

mod ask;
mod config;
mod serve;
mod transcript;

pub use ask::run_ask;
pub use config::run_config;
pub use serve::{build_router, run_serve, AppState};
pub use transcript::run_transcript;
