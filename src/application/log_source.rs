// Log source trait for fetching the raw power log
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid log url: {0}")]
    InvalidUrl(String),
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("failed to read response body from {url}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[async_trait]
pub trait LogSource: Send + Sync {
    /// Fetch the whole log as text. Only a success status yields a body.
    async fn fetch_log(&self) -> Result<String, FetchError>;
}
