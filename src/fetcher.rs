use crate::types::{PipelineError, Result, RunConfig};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Retrieval seam for feed documents. The pipeline only ever sees this
/// trait, so tests can substitute canned responses.
#[async_trait]
pub trait FetchFeed: Send + Sync {
    /// Fetch the raw feed document at `url`.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// HTTP fetcher backed by a shared reqwest client.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(config: &RunConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }
}

#[async_trait]
impl FetchFeed for Fetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url)?;
        debug!("Fetching feed: {}", parsed);

        let response = self.client.get(parsed).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Fetch(format!(
                "HTTP {} for {}",
                status, url
            )));
        }

        let content = response.text().await?;
        debug!("Fetched {} bytes from {}", content.len(), url);
        Ok(content)
    }
}
