//! Imgcast - republish the imgur front page to Twitter
//!
//! This library scrapes the day's most popular single-image posts, downloads
//! and checks their images, and posts each one with a ranked caption. A run
//! refuses to post twice on the same calendar day.

pub mod caption;
pub mod config;
pub mod error;
pub mod imaging;
pub mod logging;
pub mod platforms;
pub mod service;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{ImgcastError, Result};
pub use service::{Pipeline, RunOptions};
pub use types::{Candidate, PostRecord, RunOutcome, RunReport};
