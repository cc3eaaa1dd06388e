//! Content source: the image site's listing and post pages
//!
//! All network reads against the image site go through the [`Fetcher`] trait so
//! the selection pipeline can run against canned pages in tests.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::{Result, SourceError};

pub mod listing;
pub mod post_page;

// Mock fetcher is available for all builds to support integration tests
pub mod mock;

pub use listing::{fetch_listing, parse_listing};
pub use post_page::{parse_post_page, PostPage, PostPageSelectors};

/// Read-only HTTP access to the image site
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET a page and return its body as text
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Transport` on connection failure or a non-success status.
    async fn fetch_text(&self, url: &str) -> Result<String>;

    /// GET a binary resource such as an image
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`Fetcher`] backed by a reqwest client
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| transport_error("client setup", e))?;

        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Transport {
                url: url.to_string(),
                reason: format!("HTTP {}", status),
            }
            .into());
        }

        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.get(url)
            .await?
            .text()
            .await
            .map_err(|e| transport_error(url, e))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let bytes = self
            .get(url)
            .await?
            .bytes()
            .await
            .map_err(|e| transport_error(url, e))?;
        Ok(bytes.to_vec())
    }
}

fn transport_error(url: &str, error: reqwest::Error) -> crate::error::ImgcastError {
    SourceError::Transport {
        url: url.to_string(),
        reason: error.to_string(),
    }
    .into()
}

/// Compile a CSS selector, reporting the offending text on failure
pub(crate) fn selector(css: &str) -> Result<scraper::Selector> {
    scraper::Selector::parse(css).map_err(|e| {
        SourceError::Selector {
            selector: css.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}
