//! Mock platform implementation for testing
//!
//! This module provides a configurable mock platform that can simulate an
//! account history, upload/post failures and call accounting. It's designed for
//! use in integration tests to verify the full run without credentials or
//! network access.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{PlatformError, Result};
use crate::platforms::Platform;
use crate::types::{ImageMimeType, PostRecord};

/// A post created through the mock
#[derive(Debug, Clone, PartialEq)]
pub struct MockPost {
    pub text: String,
    pub media_ids: Vec<String>,
}

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Platform name
    pub name: String,

    /// Returned by `latest_post`
    pub latest_post: Option<PostRecord>,

    /// Error to return from `latest_post`
    pub timeline_error: Option<String>,

    /// Error to return from every upload
    pub upload_error: Option<String>,

    /// 1-based post attempts that fail, e.g. `[2]` fails the second post
    pub failing_posts: Vec<usize>,

    /// Character limit reported and enforced by `create_post`
    pub character_limit: Option<usize>,

    /// Number of times latest_post has been called
    pub timeline_call_count: Arc<Mutex<usize>>,

    /// Files uploaded, in order
    pub uploads: Arc<Mutex<Vec<PathBuf>>>,

    /// Number of times create_post has been called
    pub post_call_count: Arc<Mutex<usize>>,

    /// Posts that have been made (for verification)
    pub posts: Arc<Mutex<Vec<MockPost>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            latest_post: None,
            timeline_error: None,
            upload_error: None,
            failing_posts: Vec::new(),
            character_limit: Some(280),
            timeline_call_count: Arc::new(Mutex::new(0)),
            uploads: Arc::new(Mutex::new(Vec::new())),
            post_call_count: Arc::new(Mutex::new(0)),
            posts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock platform for testing
#[derive(Debug, Clone)]
pub struct MockPlatform {
    config: MockConfig,
}

impl MockPlatform {
    /// Create a new mock platform with the given configuration
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// Create a mock platform with an empty account that accepts everything
    pub fn success(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            ..Default::default()
        })
    }

    /// Create a mock platform whose newest post is `latest`
    pub fn with_latest_post(name: &str, latest: PostRecord) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            latest_post: Some(latest),
            ..Default::default()
        })
    }

    /// Create a mock platform whose timeline request fails
    pub fn timeline_failure(name: &str, error: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            timeline_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// Create a mock platform that rejects every upload
    pub fn upload_failure(name: &str, error: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            upload_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// Create a mock platform that fails the given 1-based post attempts
    pub fn failing_posts(name: &str, attempts: &[usize]) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            failing_posts: attempts.to_vec(),
            ..Default::default()
        })
    }

    /// Get the number of times latest_post was called
    pub fn timeline_call_count(&self) -> usize {
        *self.config.timeline_call_count.lock().unwrap()
    }

    /// Get the number of times create_post was called
    pub fn post_call_count(&self) -> usize {
        *self.config.post_call_count.lock().unwrap()
    }

    /// Get every uploaded file path
    pub fn uploads(&self) -> Vec<PathBuf> {
        self.config.uploads.lock().unwrap().clone()
    }

    /// Get all successful posts
    pub fn posts(&self) -> Vec<MockPost> {
        self.config.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Platform for MockPlatform {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn character_limit(&self) -> Option<usize> {
        self.config.character_limit
    }

    async fn latest_post(&self) -> Result<Option<PostRecord>> {
        *self.config.timeline_call_count.lock().unwrap() += 1;

        match &self.config.timeline_error {
            Some(error) => Err(PlatformError::Network(error.clone()).into()),
            None => Ok(self.config.latest_post.clone()),
        }
    }

    async fn upload_media(&self, path: &Path, _mime_type: ImageMimeType) -> Result<String> {
        if let Some(error) = &self.config.upload_error {
            return Err(PlatformError::Posting(error.clone()).into());
        }
        if !path.exists() {
            return Err(
                PlatformError::Posting(format!("File not found: {}", path.display())).into(),
            );
        }

        let mut uploads = self.config.uploads.lock().unwrap();
        uploads.push(path.to_path_buf());
        Ok(format!("{}-media-{}", self.config.name, uploads.len()))
    }

    async fn create_post(&self, text: &str, media_ids: &[String]) -> Result<String> {
        let attempt = {
            let mut count = self.config.post_call_count.lock().unwrap();
            *count += 1;
            *count
        };

        if self.config.failing_posts.contains(&attempt) {
            return Err(PlatformError::Posting(format!("Mock post {} failed", attempt)).into());
        }

        if let Some(limit) = self.config.character_limit {
            let length = text.chars().count();
            if length > limit {
                return Err(PlatformError::Validation(format!(
                    "Content exceeds {} character limit (got {} characters)",
                    limit, length
                ))
                .into());
            }
        }

        let mut posts = self.config.posts.lock().unwrap();
        posts.push(MockPost {
            text: text.to_string(),
            media_ids: media_ids.to_vec(),
        });
        Ok(format!("{}:post-{}", self.config.name, posts.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_mock_success() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pic1.png");
        std::fs::write(&path, b"png").unwrap();

        let platform = MockPlatform::success("test");
        assert_eq!(platform.name(), "test");
        assert_eq!(platform.latest_post().await.unwrap(), None);

        let post_id = platform
            .post_with_image("hello", &path, ImageMimeType::Png)
            .await
            .unwrap();
        assert_eq!(post_id, "test:post-1");

        assert_eq!(platform.uploads(), vec![path]);
        assert_eq!(
            platform.posts(),
            vec![MockPost {
                text: "hello".to_string(),
                media_ids: vec!["test-media-1".to_string()],
            }]
        );
    }

    #[tokio::test]
    async fn test_mock_latest_post() {
        let record = PostRecord {
            id: "42".to_string(),
            created_at: Utc::now(),
        };
        let platform = MockPlatform::with_latest_post("test", record.clone());

        assert_eq!(platform.latest_post().await.unwrap(), Some(record));
        assert_eq!(platform.timeline_call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_timeline_failure() {
        let platform = MockPlatform::timeline_failure("test", "Connection refused");
        let err = platform.latest_post().await.unwrap_err();
        assert!(err.to_string().contains("Connection refused"));
    }

    #[tokio::test]
    async fn test_mock_upload_missing_file() {
        let platform = MockPlatform::success("test");
        let result = platform
            .upload_media(Path::new("/nonexistent/pic1.jpg"), ImageMimeType::Jpeg)
            .await;
        assert!(result.unwrap_err().to_string().contains("File not found"));
    }

    #[tokio::test]
    async fn test_mock_upload_failure_skips_post() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pic1.jpg");
        std::fs::write(&path, b"jpg").unwrap();

        let platform = MockPlatform::upload_failure("test", "media rejected");
        let result = platform
            .post_with_image("hello", &path, ImageMimeType::Jpeg)
            .await;

        assert!(result.unwrap_err().to_string().contains("media rejected"));
        assert_eq!(platform.post_call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_failing_posts() {
        let platform = MockPlatform::failing_posts("test", &[2]);

        assert!(platform.create_post("one", &[]).await.is_ok());
        assert!(platform.create_post("two", &[]).await.is_err());
        assert!(platform.create_post("three", &[]).await.is_ok());

        assert_eq!(platform.post_call_count(), 3);
        assert_eq!(platform.posts().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_enforces_character_limit() {
        let platform = MockPlatform::success("test");
        let result = platform.create_post(&"x".repeat(281), &[]).await;
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("character limit"));
    }
}
