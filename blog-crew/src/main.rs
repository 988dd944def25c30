//! blog-crew: watch AI agents plan, write and edit a blog post.
//!
//! Serves a single page on `--listen`. Type a topic, press the button and
//! the planner, writer and editor agents run in turn while their log
//! streams into the page.
//!
//! Requires OPENAI_API_KEY (or `--api-key`); a `.env` file is honoured.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use blog_crew::config::Config;
use blog_crew::engine::LlmCrew;
use blog_crew::llm::LlmClient;
use blog_crew::runner::PipelineRunner;
use blog_crew::sink::LiveRegion;
use blog_crew::web::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("Ignoring unreadable .env file: {e}");
    }

    // Use JSON logs in production (BLOG_CREW_LOG_JSON=1), human-readable otherwise
    let json_logs = std::env::var("BLOG_CREW_LOG_JSON").unwrap_or_default() == "1";
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "blog_crew=info".into());
    if json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = Config::parse();
    if config.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; agent requests will fail");
    }

    let llm = LlmClient::new(config.api_key.clone().unwrap_or_default())
        .with_model(&config.model)
        .with_api_base(&config.api_base)
        .with_max_tokens(config.max_tokens);
    let region = Arc::new(LiveRegion::new());
    let runner = PipelineRunner::new(
        Arc::new(LlmCrew::new(llm)),
        region.clone(),
        config.log_window,
    );
    let state = Arc::new(AppState::new(runner, region));

    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        model = %config.model,
        log_window = config.log_window,
        "Starting blog-crew"
    );
    axum::serve(listener, web::router(state)).await?;
    Ok(())
}
