//! Error types for Imgcast

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImgcastError>;

#[derive(Error, Debug)]
pub enum ImgcastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ImgcastError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ImgcastError::InvalidInput(_) => 3,
            ImgcastError::Platform(PlatformError::Authentication(_)) => 2,
            ImgcastError::Platform(_) => 1,
            ImgcastError::Config(_) => 1,
            ImgcastError::Source(_) => 1,
            ImgcastError::Image(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Errors from the social platform API
#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Content validation failed: {0}")]
    Validation(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),
}

/// Errors while fetching or parsing content from the image site
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("Invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),
}

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Unknown image type at {0}; only jpg and png are supported")]
    UnknownFormat(String),

    #[error("Failed to write image {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_invalid_input() {
        let error = ImgcastError::InvalidInput("max posts must be positive".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_authentication_error() {
        let error = ImgcastError::Platform(PlatformError::Authentication("bad token".to_string()));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_other_errors() {
        let posting = ImgcastError::Platform(PlatformError::Posting("boom".to_string()));
        let rate_limit = ImgcastError::Platform(PlatformError::RateLimit("slow down".to_string()));
        let config = ImgcastError::Config(ConfigError::MissingField("twitter".to_string()));
        let source = ImgcastError::Source(SourceError::InvalidUrl("::".to_string()));
        let image = ImgcastError::Image(ImageError::UnknownFormat("x.webp".to_string()));

        assert_eq!(posting.exit_code(), 1);
        assert_eq!(rate_limit.exit_code(), 1);
        assert_eq!(config.exit_code(), 1);
        assert_eq!(source.exit_code(), 1);
        assert_eq!(image.exit_code(), 1);
    }

    #[test]
    fn test_error_message_formatting_platform() {
        let error = ImgcastError::Platform(PlatformError::Posting(
            "Twitter rejected the status".to_string(),
        ));
        assert_eq!(
            error.to_string(),
            "Platform error: Posting failed: Twitter rejected the status"
        );
    }

    #[test]
    fn test_error_message_formatting_config() {
        let error = ImgcastError::Config(ConfigError::MissingField(
            "twitter.consumer_key".to_string(),
        ));
        assert_eq!(
            error.to_string(),
            "Configuration error: Missing required field: twitter.consumer_key"
        );
    }

    #[test]
    fn test_transport_error_names_url() {
        let error = SourceError::Transport {
            url: "https://imgur.com".to_string(),
            reason: "HTTP 503".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("https://imgur.com"));
        assert!(message.contains("503"));
    }

    #[test]
    fn test_unknown_format_message() {
        let error = ImageError::UnknownFormat("https://i.imgur.com/a.webp".to_string());
        let message = format!("{}", ImgcastError::from(error));
        assert!(message.starts_with("Image error: Unknown image type"));
        assert!(message.contains("a.webp"));
    }

    #[test]
    fn test_error_conversion_from_source_error() {
        let source_error = SourceError::InvalidUrl("nope".to_string());
        let imgcast_error: ImgcastError = source_error.into();

        match imgcast_error {
            ImgcastError::Source(_) => {}
            _ => panic!("Expected ImgcastError::Source"),
        }
    }

    #[test]
    fn test_platform_error_clone() {
        let original = PlatformError::Network("Connection failed".to_string());
        let cloned = original.clone();

        assert_eq!(format!("{}", original), format!("{}", cloned));
    }
}
