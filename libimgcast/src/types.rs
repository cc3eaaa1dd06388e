//! Core types for Imgcast

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The most recent post on the publishing account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

/// A listing post that passed every filter and has its image on disk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    /// 1-based position among accepted posts for this run
    pub rank: usize,
    pub source_url: String,
    pub title: String,
    pub image_path: PathBuf,
    pub mime_type: ImageMimeType,
    pub width: u32,
    pub height: u32,
}

// ============================================================================
// Image Types
// ============================================================================

/// Image types the publisher can upload
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ImageMimeType {
    Jpeg,
    Png,
}

impl ImageMimeType {
    /// Detect MIME type from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Detect MIME type from the last path segment of an image URL
    ///
    /// Query strings and fragments are ignored, so
    /// `https://i.imgur.com/abc.png?1` is a PNG.
    pub fn from_url(url: &url::Url) -> Option<Self> {
        let segment = url.path_segments()?.next_back()?;
        let (_, ext) = segment.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    /// Get the MIME type string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Get the file extension used for downloaded copies
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

impl std::fmt::Display for ImageMimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Run Results
// ============================================================================

/// Result of publishing a single candidate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublishResult {
    pub rank: usize,
    pub success: bool,
    /// Platform post ID (if successful)
    pub post_id: Option<String>,
    /// Error message (if failed)
    pub error: Option<String>,
}

/// Summary of a run that went past the duplicate guard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub candidates: Vec<Candidate>,
    pub results: Vec<PublishResult>,
    pub dry_run: bool,
}

impl RunReport {
    pub fn published(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.success).count()
    }

    /// True when publishing was attempted and nothing went through
    pub fn all_failed(&self) -> bool {
        !self.results.is_empty() && self.published() == 0
    }
}

/// How a run ended, short of a fatal error
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The account already posted today; nothing else was done
    AlreadyPosted(PostRecord),
    Completed(RunReport),
}
