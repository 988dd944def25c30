use clap::Parser;

use crate::llm::{DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::sink::DEFAULT_WINDOW;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "blog-crew",
    about = "Watch a planner, a writer and an editor agent draft a blog post"
)]
pub struct Config {
    /// HTTP listen address
    #[arg(long, env = "BLOG_CREW_LISTEN", default_value = "127.0.0.1:8501")]
    pub listen: String,

    /// API key for the chat completions endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model the agents use
    #[arg(long, env = "OPENAI_MODEL_NAME", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Characters of log tail shown in the live panel
    #[arg(long, env = "BLOG_CREW_LOG_WINDOW", default_value_t = DEFAULT_WINDOW)]
    pub log_window: usize,

    /// Completion token limit per agent turn
    #[arg(long, default_value_t = 4096)]
    pub max_tokens: u32,
}
