// src/utils/fetch.rs

use std::time::Duration;

use reqwest::header;

/// The page could not be fetched: network failure, timeout or non-2xx status.
#[derive(Debug, thiserror::Error)]
#[error("Error fetching content: {0}")]
pub struct FetchError(#[from] reqwest::Error);

/// HTTP client for answer-key pages. Single attempt, bounded by a timeout.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, link: &str) -> Result<String, FetchError> {
        tracing::info!("Fetching answer key from {}", link);
        let response = self
            .client
            .get(link)
            .header(header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}
