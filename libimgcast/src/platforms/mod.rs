//! Platform abstraction and implementations
//!
//! The publishing side of a run talks to one social platform through the
//! [`Platform`] trait: read the newest post for the duplicate guard, upload an
//! image, and create a post carrying it.
//!
//! # Examples
//!
//! ```no_run
//! use libimgcast::config::Config;
//! use libimgcast::platforms::{Platform, twitter::TwitterClient};
//!
//! # async fn example() -> libimgcast::error::Result<()> {
//! let config = Config::load()?;
//! let client = TwitterClient::from_config(&config.twitter)?;
//!
//! if let Some(latest) = client.latest_post().await? {
//!     println!("Last posted at {}", latest.created_at);
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;
use crate::types::{ImageMimeType, PostRecord};

pub mod twitter;

// Mock platform is available for all builds (not just tests) to support integration tests
pub mod mock;

/// Unified interface to the publishing platform
#[async_trait]
pub trait Platform: Send + Sync {
    /// Lowercase platform identifier (e.g., "twitter")
    fn name(&self) -> &str;

    /// Maximum post length in characters, if the platform has one
    fn character_limit(&self) -> Option<usize>;

    /// Fetch the most recent post on the configured account
    ///
    /// Returns `None` when the account has never posted.
    async fn latest_post(&self) -> Result<Option<PostRecord>>;

    /// Upload an image file and return the platform's media ID
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the upload is refused.
    async fn upload_media(&self, path: &Path, mime_type: ImageMimeType) -> Result<String>;

    /// Create a post with text and already-uploaded media, returning its ID
    async fn create_post(&self, text: &str, media_ids: &[String]) -> Result<String>;

    /// Upload one image and post it with `text`
    ///
    /// This is a convenience method that handles the full workflow.
    async fn post_with_image(
        &self,
        text: &str,
        path: &Path,
        mime_type: ImageMimeType,
    ) -> Result<String> {
        let media_id = self.upload_media(path, mime_type).await?;
        tracing::debug!("Uploaded {} to {} as media {}", path.display(), self.name(), media_id);
        self.create_post(text, &[media_id]).await
    }
}
