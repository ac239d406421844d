//! CLI definitions for Flourish.

use clap::{Parser, Subcommand};

/// Flourish CLI.
#[derive(Parser)]
#[command(name = "flourish")]
#[command(about = "One-click chat draft rewriting: composer detection, rewrite service, safe write-back")]
#[command(version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the rewrite service
    Serve {
        /// Server host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Server port
        #[arg(long, default_value_t = 3001)]
        port: u16,

        /// Chat-completions endpoint of an OpenAI-compatible provider
        #[arg(long, default_value = "https://openrouter.ai/api/v1/chat/completions")]
        upstream_url: String,

        /// Provider API key
        #[arg(long, env = "FLOURISH_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Model identifier
        #[arg(long, default_value = "google/gemini-2.0-flash-001")]
        model: String,
    },

    /// Attach to a Chrome tab and offer rewrites in its chat composer
    Attach {
        /// Chrome remote-debugging endpoint
        #[arg(long, default_value = "http://localhost:9222")]
        endpoint: String,

        /// Pick the first tab whose URL contains this string
        #[arg(long)]
        page_url: Option<String>,

        /// Base URL of the rewrite service
        #[arg(long, default_value = "http://localhost:3001")]
        api: String,

        /// Rewrite style mode
        #[arg(long, default_value = flourish_protocols::rewrite::DEFAULT_MODE)]
        mode: String,

        /// Style intensity, 1-5
        #[arg(long)]
        intensity: Option<u64>,
    },
}
