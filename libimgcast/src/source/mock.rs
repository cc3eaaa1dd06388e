//! Mock fetcher for testing
//!
//! Serves canned pages and binary bodies keyed by URL and records every
//! request, so tests can assert exactly which pages a run touched. Unknown
//! URLs answer with a transport error, like a 404 would.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::Fetcher;
use crate::error::{Result, SourceError};

#[derive(Debug, Clone)]
enum Body {
    Text(String),
    Bytes(Vec<u8>),
}

/// In-memory [`Fetcher`]
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    responses: HashMap<String, Body>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`
    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.responses
            .insert(url.to_string(), Body::Text(html.into()));
        self
    }

    /// Serve `bytes` for `url`
    pub fn with_bytes(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.responses.insert(url.to_string(), Body::Bytes(bytes));
        self
    }

    /// Every URL requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn lookup(&self, url: &str) -> Result<Body> {
        self.requests.lock().unwrap().push(url.to_string());

        self.responses.get(url).cloned().ok_or_else(|| {
            SourceError::Transport {
                url: url.to_string(),
                reason: "HTTP 404 Not Found".to_string(),
            }
            .into()
        })
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        match self.lookup(url)? {
            Body::Text(text) => Ok(text),
            Body::Bytes(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        match self.lookup(url)? {
            Body::Text(text) => Ok(text.into_bytes()),
            Body::Bytes(bytes) => Ok(bytes),
        }
    }
}
