//! Caption text for republished posts

use chrono::NaiveDate;

use crate::types::Candidate;

/// Maximum caption length accepted by the platform, in characters
pub const CAPTION_LIMIT: usize = 280;

const ELLIPSIS_QUOTE: &str = "...\"";

/// Build the caption for a candidate, truncated to [`CAPTION_LIMIT`]
pub fn caption_for(candidate: &Candidate, today: NaiveDate) -> String {
    truncate_caption(compose_caption(
        candidate.rank,
        today,
        &candidate.source_url,
        &candidate.title,
    ))
}

/// `No. {rank} post on imgur {date}: {url}` followed by the quoted title
pub fn compose_caption(rank: usize, today: NaiveDate, source_url: &str, title: &str) -> String {
    format!(
        "No. {} post on imgur {}: {}\n\"{}\"",
        rank,
        today.format("%Y-%m-%d"),
        source_url,
        title
    )
}

/// Cut an over-long caption to exactly [`CAPTION_LIMIT`] characters
///
/// The cut ignores word and quote boundaries; the result always ends in `..."`.
pub fn truncate_caption(caption: String) -> String {
    if caption.chars().count() <= CAPTION_LIMIT {
        return caption;
    }

    let keep = CAPTION_LIMIT - ELLIPSIS_QUOTE.len();
    let mut truncated: String = caption.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS_QUOTE);
    truncated
}
