mod config;
mod llm;
mod models;
mod pipeline;
mod publish;
mod scrapers;

use std::sync::Arc;

use anyhow::Context;
use config::Config;
use llm::OpenAiChat;
use pipeline::Pipeline;
use publish::NatsStreamPublisher;
use scrapers::{BrowserSession, Zoopla};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🏠 Property Stream - Zoopla listings to NATS");
    info!("============================================");

    let cfg = Config::from_env()?;

    let nats = async_nats::connect(&cfg.nats_url)
        .await
        .with_context(|| format!("Failed to connect to NATS at {}", cfg.nats_url))?;
    let publisher = Arc::new(NatsStreamPublisher::new(nats.clone()));
    let model = Arc::new(OpenAiChat::new(&cfg.openai_api_key, config::MODEL));

    // The session is the only resource needing guaranteed release; dropping
    // it closes the CDP connection on every exit path.
    let session = BrowserSession::connect(&cfg.browser_ws_url)?;

    let pipeline = Pipeline::new(Arc::new(Zoopla), model, publisher, config::SUBJECT);
    let summary = pipeline.run(&session, config::SEARCH_LOCATION).await?;

    info!(
        "✅ Run complete: {} discovered, {} published, {} skipped",
        summary.discovered, summary.published, summary.skipped
    );

    nats.flush().await.context("Failed to flush NATS client")?;

    Ok(())
}
