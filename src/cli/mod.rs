//! CLI module for QueryTube.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// QueryTube - ask questions about YouTube videos
///
/// Fetches a video's captions and answers questions about it with an LLM.
#[derive(Parser, Debug)]
#[command(name = "querytube")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP backend
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Forward proxy for transcript retries (defaults to transcript.proxy_url)
        #[arg(long, env = "QUERYTUBE_PROXY_URL")]
        proxy_url: Option<String>,
    },

    /// Ask a running backend a question about a video
    Ask {
        /// Video ID (not the full URL)
        video_id: String,

        /// The question to ask
        query: String,

        /// Caption language
        #[arg(short, long, default_value = "en")]
        language: String,

        /// Backend base URL
        #[arg(short, long, env = "QUERYTUBE_SERVER", default_value = "http://127.0.0.1:8000")]
        server: String,
    },

    /// Fetch and print a video's transcript
    Transcript {
        /// Video ID
        video_id: String,

        /// Caption language (defaults to transcript.default_language)
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
