//! Service layer for Imgcast
//!
//! A run is four sequential stages: duplicate guard, listing fetch, candidate
//! selection and publishing. [`Pipeline`] owns the platform client, the content
//! fetcher and the run settings, and reports how the run ended as a
//! [`RunOutcome`] so the caller decides the process exit status.
//!
//! # Example
//!
//! ```no_run
//! use libimgcast::config::Config;
//! use libimgcast::platforms::twitter::TwitterClient;
//! use libimgcast::service::{Pipeline, RunOptions};
//! use libimgcast::source::HttpFetcher;
//!
//! # async fn example() -> libimgcast::Result<()> {
//! let config = Config::load()?;
//! let pipeline = Pipeline::new(
//!     Box::new(TwitterClient::from_config(&config.twitter)?),
//!     Box::new(HttpFetcher::new(&config.source.user_agent)?),
//!     config.source.clone(),
//!     RunOptions::from_config(&config.run),
//! );
//!
//! let outcome = pipeline.run(chrono::Local::now().into()).await?;
//! # Ok(())
//! # }
//! ```

pub mod guard;
pub mod publishing;
pub mod selection;

use chrono::{DateTime, FixedOffset};
use std::path::PathBuf;
use tracing::info;

use self::guard::{check_posted_today, GuardStatus};
use self::publishing::publish_candidates;
use self::selection::select_candidates;
use crate::caption::caption_for;
use crate::config::{RunConfig, SourceConfig};
use crate::error::{ImgcastError, Result};
use crate::platforms::Platform;
use crate::source::{fetch_listing, Fetcher, PostPageSelectors};
use crate::types::{RunOutcome, RunReport};

/// Per-run settings
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub max_posts: usize,
    pub image_dir: PathBuf,
    /// Select candidates but skip uploading and posting
    pub dry_run: bool,
    /// Skip the duplicate guard
    pub force: bool,
}

impl RunOptions {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            max_posts: config.max_posts,
            image_dir: config.image_dir.clone(),
            dry_run: false,
            force: false,
        }
    }
}

/// One guarded scrape-and-publish run
pub struct Pipeline {
    platform: Box<dyn Platform>,
    fetcher: Box<dyn Fetcher>,
    source: SourceConfig,
    options: RunOptions,
}

impl Pipeline {
    pub fn new(
        platform: Box<dyn Platform>,
        fetcher: Box<dyn Fetcher>,
        source: SourceConfig,
        options: RunOptions,
    ) -> Self {
        Self {
            platform,
            fetcher,
            source,
            options,
        }
    }

    /// Run every stage once, with `now` as the current local time
    ///
    /// # Errors
    ///
    /// Returns an error if the guard's timeline query or the listing fetch
    /// fails, if a selected image has an unsupported type, or if images cannot
    /// be written. Individual publish failures are reported in the
    /// [`RunReport`] instead.
    pub async fn run(&self, now: DateTime<FixedOffset>) -> Result<RunOutcome> {
        if self.options.max_posts == 0 {
            return Err(ImgcastError::InvalidInput(
                "max posts must be at least 1".to_string(),
            ));
        }
        let selectors = PostPageSelectors::from_config(&self.source)?;

        if self.options.force {
            info!("Skipping the daily duplicate check");
        } else if let GuardStatus::AlreadyPosted(record) =
            check_posted_today(self.platform.as_ref(), &now).await?
        {
            return Ok(RunOutcome::AlreadyPosted(record));
        }

        let links = fetch_listing(self.fetcher.as_ref(), &self.source).await?;

        let candidates = select_candidates(
            self.fetcher.as_ref(),
            &selectors,
            &links,
            self.options.max_posts,
            &self.options.image_dir,
        )
        .await?;

        let today = now.date_naive();
        if self.options.dry_run {
            for candidate in &candidates {
                info!("Dry run, would post:\n{}", caption_for(candidate, today));
            }
            return Ok(RunOutcome::Completed(RunReport {
                candidates,
                results: Vec::new(),
                dry_run: true,
            }));
        }

        let results = publish_candidates(self.platform.as_ref(), &candidates, today).await;
        let report = RunReport {
            candidates,
            results,
            dry_run: false,
        };
        info!(
            "Run finished: {} posted, {} failed",
            report.published(),
            report.failed()
        );

        Ok(RunOutcome::Completed(report))
    }
}
