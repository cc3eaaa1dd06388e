//! Duplicate guard: at most one batch of posts per calendar day

use chrono::{DateTime, FixedOffset};
use tracing::info;

use crate::error::Result;
use crate::platforms::Platform;
use crate::types::PostRecord;

/// Result of the daily duplicate check
#[derive(Debug, Clone, PartialEq)]
pub enum GuardStatus {
    /// Nothing posted yet today
    Clear,
    /// The account's newest post is from today
    AlreadyPosted(PostRecord),
}

/// Whether `record` was created on the same calendar day as `now`
///
/// The post's timestamp is converted into `now`'s offset before comparing dates.
pub fn posted_on_same_day(record: &PostRecord, now: &DateTime<FixedOffset>) -> bool {
    record.created_at.with_timezone(now.offset()).date_naive() == now.date_naive()
}

/// Check the account's newest post against today's date
///
/// An account with no posts passes the guard.
pub async fn check_posted_today(
    platform: &dyn Platform,
    now: &DateTime<FixedOffset>,
) -> Result<GuardStatus> {
    info!("Checking no post has been made today");

    match platform.latest_post().await? {
        Some(record) if posted_on_same_day(&record, now) => {
            info!("Already posted today ({}): quitting", record.id);
            Ok(GuardStatus::AlreadyPosted(record))
        }
        Some(record) => {
            info!("Last post was on {}, proceeding", record.created_at.date_naive());
            Ok(GuardStatus::Clear)
        }
        None => {
            info!("Account has no posts yet, proceeding");
            Ok(GuardStatus::Clear)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::mock::MockPlatform;
    use chrono::{TimeZone, Utc};

    fn now(offset_hours: i32, y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(offset_hours * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
    }

    fn record_at(y: i32, m: u32, d: u32, h: u32) -> PostRecord {
        PostRecord {
            id: "1".to_string(),
            created_at: Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_same_day_in_utc() {
        let record = record_at(2026, 10, 16, 1);
        assert!(posted_on_same_day(&record, &now(0, 2026, 10, 16, 23)));
        assert!(!posted_on_same_day(&record, &now(0, 2026, 10, 17, 0)));
    }

    #[test]
    fn test_same_day_respects_local_offset() {
        // 23:00 UTC on the 15th is already the 16th at UTC+2
        let record = record_at(2026, 10, 15, 23);
        assert!(posted_on_same_day(&record, &now(2, 2026, 10, 16, 9)));
        assert!(!posted_on_same_day(&record, &now(0, 2026, 10, 16, 9)));
    }

    #[test]
    fn test_same_date_different_year() {
        let record = record_at(2025, 10, 16, 12);
        assert!(!posted_on_same_day(&record, &now(0, 2026, 10, 16, 12)));
    }

    #[tokio::test]
    async fn test_guard_trips_when_posted_today() {
        let record = record_at(2026, 10, 16, 8);
        let platform = MockPlatform::with_latest_post("mock", record.clone());

        let status = check_posted_today(&platform, &now(0, 2026, 10, 16, 20))
            .await
            .unwrap();
        assert_eq!(status, GuardStatus::AlreadyPosted(record));
    }

    #[tokio::test]
    async fn test_guard_clear_when_posted_yesterday() {
        let platform = MockPlatform::with_latest_post("mock", record_at(2026, 10, 15, 8));
        let status = check_posted_today(&platform, &now(0, 2026, 10, 16, 8))
            .await
            .unwrap();
        assert_eq!(status, GuardStatus::Clear);
    }

    #[tokio::test]
    async fn test_guard_clear_for_empty_account() {
        let platform = MockPlatform::success("mock");
        let status = check_posted_today(&platform, &now(0, 2026, 10, 16, 8))
            .await
            .unwrap();
        assert_eq!(status, GuardStatus::Clear);
        assert_eq!(platform.timeline_call_count(), 1);
    }

    #[tokio::test]
    async fn test_guard_propagates_timeline_error() {
        let platform = MockPlatform::timeline_failure("mock", "timeline unavailable");
        let result = check_posted_today(&platform, &now(0, 2026, 10, 16, 8)).await;
        assert!(result.is_err());
    }
}
