use crate::error::FetchError;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// A fetched documentation page, body still unparsed.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub html: String,
}

/// Retrieves documentation pages.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// HTTP fetcher with a bounded timeout; follows redirects.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(FetchError::ClientBuild)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed = validate_url(url)?;
        tracing::info!(url = %parsed, "fetching documentation");

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?
            .error_for_status()
            .map_err(FetchError::from_reqwest)?;

        let final_url = response.url().to_string();
        let html = response.text().await.map_err(FetchError::from_reqwest)?;
        tracing::debug!(bytes = html.len(), "fetched documentation");

        Ok(FetchedPage {
            url: final_url,
            html,
        })
    }
}

/// Accept only absolute http(s) URLs.
pub fn validate_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url.trim()).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(FetchError::InvalidUrl(format!(
            "{url}: unsupported scheme {scheme}"
        ))),
    }
}
