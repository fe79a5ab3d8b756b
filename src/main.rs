use rss_summarizer::{Fetcher, OpenAiSummarizer, Pipeline, RunConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local runs pick up OPENAI_API_KEY from .env; absence of the file is fine.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = RunConfig::default();
    info!(
        "Starting feed summarizer run (feeds: {}, out: {})",
        config.feeds_path.display(),
        config.out_dir.display()
    );

    // Fail fast: without the credential no entry could render anyway.
    let summarizer = OpenAiSummarizer::from_env()?;
    let fetcher = Fetcher::new(&config);

    let pipeline = Pipeline::new(config, Box::new(fetcher), Box::new(summarizer));
    let report = pipeline.run().await?;

    for category in &report.categories {
        info!("  {}: {} items", category.name, category.items);
    }
    info!("Run finished: {} items total", report.total_items);
    Ok(())
}
