//! Front-page listing: ordered post links

use scraper::Html;
use tracing::{info, warn};
use url::Url;

use super::{selector, Fetcher};
use crate::config::SourceConfig;
use crate::error::{Result, SourceError};

/// Fetch the listing page and extract post links in listing order
///
/// # Errors
///
/// A failed listing request is fatal for the run and is returned as-is.
pub async fn fetch_listing(fetcher: &dyn Fetcher, config: &SourceConfig) -> Result<Vec<Url>> {
    info!("Scraping post links from {}", config.listing_url);

    let base = Url::parse(&config.listing_url)
        .map_err(|_| SourceError::InvalidUrl(config.listing_url.clone()))?;
    let html = fetcher.fetch_text(base.as_str()).await?;
    let links = parse_listing(&html, &base, &config.link_selector)?;

    info!("Found {} post links", links.len());
    Ok(links)
}

/// Extract absolute post URLs from listing markup, in document order
///
/// Relative hrefs resolve against `base`. Anchors without a usable href are skipped.
pub fn parse_listing(html: &str, base: &Url, link_selector: &str) -> Result<Vec<Url>> {
    let document = Html::parse_document(html);
    let anchors = selector(link_selector)?;

    let mut links = Vec::new();
    for anchor in document.select(&anchors) {
        let Some(href) = anchor.value().attr("href") else {
            warn!("Skipping listing anchor without href");
            continue;
        };
        match base.join(href.trim()) {
            Ok(url) => links.push(url),
            Err(e) => warn!("Skipping unparseable listing href '{}': {}", href, e),
        }
    }

    Ok(links)
}
