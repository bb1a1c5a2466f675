//! CLI command definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use postforge::{InboundContext, InboundRequest};
use std::path::PathBuf;

/// Postforge - validated short-form crypto posts from chat completion APIs
#[derive(Parser, Debug)]
#[command(name = "postforge")]
#[command(about = "Generate validated short-form crypto posts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file layered over the bundled defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate one post
    Generate(GenerateArgs),

    /// Print the learning state kept for a token
    State {
        /// Token symbol
        #[arg(long, default_value = "BTC")]
        token: String,
    },
}

/// Arguments for `generate`
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Task text
    pub prompt: String,

    /// Token symbol the post is about
    #[arg(long)]
    pub token: Option<String>,

    /// Post shape: short or article
    #[arg(long)]
    pub mode: Option<String>,

    /// Output language
    #[arg(long)]
    pub language: Option<String>,

    /// Model identifier
    #[arg(long)]
    pub model: Option<String>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Completion token budget
    #[arg(long)]
    pub max_tokens: Option<i64>,

    /// Persona to write as
    #[arg(long)]
    pub persona: Option<String>,

    /// Outline the post should follow
    #[arg(long)]
    pub outline: Option<String>,

    /// Topic to rotate through (repeatable)
    #[arg(long = "topic")]
    pub topics: Vec<String>,

    /// Fallback hashtag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Fallback ticker (repeatable)
    #[arg(long = "ticker")]
    pub tickers: Vec<String>,

    /// Fallback mention (repeatable)
    #[arg(long = "mention")]
    pub mentions: Vec<String>,

    /// Ask for free text instead of a JSON object
    #[arg(long)]
    pub plain: bool,

    /// Deadline for the whole request in milliseconds
    #[arg(long)]
    pub deadline_ms: Option<u64>,

    /// Seed for persona, template and tweak choices
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format
    #[arg(long, default_value = "json")]
    pub format: OutputFormat,
}

impl GenerateArgs {
    /// Request body equivalent to these arguments.
    pub fn to_inbound(&self) -> InboundRequest {
        InboundRequest {
            prompt: Some(self.prompt.clone()),
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            language: self.language.clone(),
            token: self.token.clone(),
            mode: self.mode.clone(),
            structured: Some(!self.plain),
            deadline_ms: self.deadline_ms,
            context: Some(InboundContext {
                outline: self.outline.clone(),
                topic_bank: self.topics.clone(),
                tags: self.tags.clone(),
                tickers: self.tickers.clone(),
                mentions: self.mentions.clone(),
                persona: self.persona.clone(),
            }),
            ..InboundRequest::default()
        }
    }
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}
