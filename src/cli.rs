//! CLI argument parsing via clap.

use chatwire::build_info;
use chatwire::config::ProviderKind;
use clap::{Parser, Subcommand};

/// Chat with OpenAI, Anthropic or Gemini endpoints from the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "chatwire",
    version = build_info::VERSION,
    long_version = build_info::LONG_VERSION
)]
pub struct Args {
    /// Prompt to send. Read from stdin when omitted.
    pub prompt: Option<String>,

    /// Path to config file (default: ./chatwire.toml or ~/.config/chatwire/chatwire.toml).
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<String>,

    /// Override model name.
    #[arg(short = 'm', long = "model", global = true)]
    pub model: Option<String>,

    /// Override API endpoint base URL.
    #[arg(long = "endpoint", global = true)]
    pub endpoint: Option<String>,

    /// Override wire protocol (openai, anthropic, gemini).
    #[arg(long = "provider", global = true)]
    pub provider: Option<ProviderKind>,

    /// Print the reply as it streams in. Tools are not offered in this mode.
    #[arg(long = "stream")]
    pub stream: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send a short request to check endpoint, model and token.
    Test,
    /// Generate images from a prompt.
    Image {
        prompt: String,
        /// Write the first image here instead of printing links.
        #[arg(short = 'o', long = "output")]
        output: Option<String>,
    },
    /// Show or clear the saved conversation.
    History {
        #[arg(long = "clear")]
        clear: bool,
    },
}
