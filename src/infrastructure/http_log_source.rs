// HTTP log source implementation
use crate::application::log_source::{FetchError, LogSource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpLogSource {
    client: reqwest::Client,
    log_url: Url,
}

impl HttpLogSource {
    /// `log_path` is resolved relative to `page_url`, the way a page resolves
    /// a relative link.
    pub fn new(page_url: &str, log_path: &str, timeout: Option<Duration>) -> Result<Self> {
        let log_url = resolve_log_url(page_url, log_path)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { client, log_url })
    }

    pub fn log_url(&self) -> &Url {
        &self.log_url
    }
}

fn resolve_log_url(page_url: &str, log_path: &str) -> Result<Url, FetchError> {
    Url::parse(page_url)
        .and_then(|base| base.join(log_path))
        .map_err(|e| FetchError::InvalidUrl(format!("{} relative to {}: {}", log_path, page_url, e)))
}

#[async_trait]
impl LogSource for HttpLogSource {
    async fn fetch_log(&self) -> Result<String, FetchError> {
        let url = self.log_url.to_string();
        tracing::debug!("Fetching power log from {}", url);

        let response = self
            .client
            .get(self.log_url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|source| FetchError::Body {
                url: url.clone(),
                source,
            })?;

        tracing::debug!("Fetched {} bytes from {}", text.len(), url);
        Ok(text)
    }
}
