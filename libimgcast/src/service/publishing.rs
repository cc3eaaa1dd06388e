//! Publishing accepted candidates to the platform

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::caption::caption_for;
use crate::error::{ImgcastError, PlatformError};
use crate::platforms::Platform;
use crate::types::{Candidate, PublishResult};

/// Publish each candidate in rank order
///
/// Every candidate gets its own upload and post; a failure is recorded in its
/// result and does not stop the remaining candidates.
pub async fn publish_candidates(
    platform: &dyn Platform,
    candidates: &[Candidate],
    today: NaiveDate,
) -> Vec<PublishResult> {
    let mut ordered: Vec<&Candidate> = candidates.iter().collect();
    ordered.sort_by_key(|c| c.rank);

    let mut results = Vec::with_capacity(ordered.len());
    for candidate in ordered {
        results.push(publish_one(platform, candidate, today).await);
    }
    results
}

async fn publish_one(
    platform: &dyn Platform,
    candidate: &Candidate,
    today: NaiveDate,
) -> PublishResult {
    let caption = caption_for(candidate, today);
    if let Some(limit) = platform.character_limit() {
        let length = caption.chars().count();
        if length > limit {
            let error: ImgcastError = PlatformError::Validation(format!(
                "Caption exceeds {} character limit (got {} characters)",
                limit, length
            ))
            .into();
            warn!("Not posting No. {}: {}", candidate.rank, error);
            return failure(candidate.rank, &error);
        }
    }

    info!(
        "Posting No. {} to {}: {}",
        candidate.rank,
        platform.name(),
        candidate.source_url
    );

    match platform
        .post_with_image(&caption, &candidate.image_path, candidate.mime_type)
        .await
    {
        Ok(post_id) => {
            info!("Posted No. {} as {}", candidate.rank, post_id);
            PublishResult {
                rank: candidate.rank,
                success: true,
                post_id: Some(post_id),
                error: None,
            }
        }
        Err(e) => {
            warn!("Failed to post No. {}: {}", candidate.rank, e);
            failure(candidate.rank, &e)
        }
    }
}

fn failure(rank: usize, error: &ImgcastError) -> PublishResult {
    PublishResult {
        rank,
        success: false,
        post_id: None,
        error: Some(error.to_string()),
    }
}
