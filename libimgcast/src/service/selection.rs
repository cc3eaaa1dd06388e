//! Candidate selection: walk the listing until enough single-image posts pass
//!
//! Links are visited in listing order with a forward cursor. Unsupported or
//! unreachable posts and out-of-range images are skipped; an image URL with
//! an unknown extension aborts the whole run.

use std::fmt;
use std::path::Path;
use tracing::{info, warn};
use url::Url;

use crate::error::{ImageError, Result};
use crate::imaging;
use crate::source::{parse_post_page, Fetcher, PostPage, PostPageSelectors};
use crate::types::{Candidate, ImageMimeType};

/// Why a listing link did not produce a candidate
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    /// Zero markers (animated) or several (album/gallery)
    UnsupportedPostType { markers: usize },
    /// Single item page without the named element
    Incomplete(&'static str),
    /// Post page or image download failed
    Transport(String),
    /// Downloaded file is not a readable image
    Undecodable,
    OutOfBounds { width: u32, height: u32 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedPostType { markers: 0 } => write!(f, "not a still image"),
            Self::UnsupportedPostType { markers } => write!(f, "album with {} items", markers),
            Self::Incomplete(what) => write!(f, "page has no {}", what),
            Self::Transport(reason) => write!(f, "fetch failed: {}", reason),
            Self::Undecodable => write!(f, "image could not be read"),
            Self::OutOfBounds { width, height } => {
                write!(f, "image is {}x{}, outside the allowed size", width, height)
            }
        }
    }
}

/// Outcome of evaluating one listing link
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOutcome {
    Accepted(Candidate),
    Rejected(RejectReason),
}

/// Select up to `max_posts` candidates from `links`, in listing order
///
/// Returns fewer than `max_posts` when the links run out.
///
/// # Errors
///
/// Fails on an image URL with an unsupported extension or when a download
/// cannot be written to `image_dir`. Files saved for earlier ranks are left
/// in place.
pub async fn select_candidates(
    fetcher: &dyn Fetcher,
    selectors: &PostPageSelectors,
    links: &[Url],
    max_posts: usize,
    image_dir: &Path,
) -> Result<Vec<Candidate>> {
    info!("Collecting up to {} single-image posts", max_posts);

    tokio::fs::create_dir_all(image_dir)
        .await
        .map_err(|source| ImageError::Io {
            path: image_dir.display().to_string(),
            source,
        })?;

    let mut candidates = Vec::with_capacity(max_posts.min(links.len()));
    let mut cursor = links.iter();

    while candidates.len() < max_posts {
        let Some(link) = cursor.next() else {
            warn!(
                "Insufficient single-image posts on front page: found {} of {}",
                candidates.len(),
                max_posts
            );
            break;
        };

        let rank = candidates.len() + 1;
        match evaluate_link(fetcher, selectors, link, rank, image_dir).await? {
            CandidateOutcome::Accepted(candidate) => {
                info!(
                    "Accepted No. {}: {} ({}x{})",
                    rank, link, candidate.width, candidate.height
                );
                candidates.push(candidate);
            }
            CandidateOutcome::Rejected(reason) => {
                warn!("Unusable post {} ({}), skipping", link, reason);
            }
        }
    }

    Ok(candidates)
}

/// Fetch one post, download its image as `pic<rank>` and check it
pub async fn evaluate_link(
    fetcher: &dyn Fetcher,
    selectors: &PostPageSelectors,
    link: &Url,
    rank: usize,
    image_dir: &Path,
) -> Result<CandidateOutcome> {
    let html = match fetcher.fetch_text(link.as_str()).await {
        Ok(html) => html,
        Err(e) => return Ok(CandidateOutcome::Rejected(RejectReason::Transport(e.to_string()))),
    };

    let (title, image_url) = match parse_post_page(&html, link, selectors) {
        PostPage::SingleImage { title, image_url } => (title, image_url),
        PostPage::Unsupported { markers } => {
            return Ok(CandidateOutcome::Rejected(
                RejectReason::UnsupportedPostType { markers },
            ))
        }
        PostPage::Incomplete(what) => {
            return Ok(CandidateOutcome::Rejected(RejectReason::Incomplete(what)))
        }
    };

    let mime_type = ImageMimeType::from_url(&image_url)
        .ok_or_else(|| ImageError::UnknownFormat(image_url.to_string()))?;

    let bytes = match fetcher.fetch_bytes(image_url.as_str()).await {
        Ok(bytes) => bytes,
        Err(e) => return Ok(CandidateOutcome::Rejected(RejectReason::Transport(e.to_string()))),
    };

    let path = imaging::image_path(image_dir, rank, mime_type);
    imaging::save_image(&path, &bytes).await?;

    let Some((width, height)) = imaging::read_dimensions(&path) else {
        imaging::discard_image(&path).await;
        return Ok(CandidateOutcome::Rejected(RejectReason::Undecodable));
    };

    if !imaging::within_bounds(width, height) {
        imaging::discard_image(&path).await;
        return Ok(CandidateOutcome::Rejected(RejectReason::OutOfBounds {
            width,
            height,
        }));
    }

    Ok(CandidateOutcome::Accepted(Candidate {
        rank,
        source_url: link.to_string(),
        title,
        image_path: path,
        mime_type,
        width,
        height,
    }))
}
